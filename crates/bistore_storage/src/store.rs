//! Store trait definition.

use crate::error::{StoreError, StoreResult};
use std::io::SeekFrom;

/// A random-access byte resource with one physical cursor.
///
/// Stores are **unbuffered**: `read` and `write` act on the medium at the
/// current cursor and advance it by the number of bytes transferred.
///
/// # Invariants
///
/// - `tell` is always a valid, nonnegative offset
/// - `write` overwrites existing bytes in place and grows the store when
///   it runs past the end
/// - `read` returns `0` only at the end of the data
/// - `close` may be called more than once; every other operation on a
///   closed store fails with [`StoreError::Closed`]
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait Store {
    /// Reads up to `buf.len()` bytes at the cursor.
    ///
    /// Returns the number of bytes read; `0` means the cursor is at or past
    /// the end of the data.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or an I/O error occurs.
    fn read(&mut self, buf: &mut [u8]) -> StoreResult<usize>;

    /// Writes all of `data` at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or an I/O error occurs.
    fn write(&mut self, data: &[u8]) -> StoreResult<()>;

    /// Pushes previously written bytes to the medium.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StoreResult<()>;

    /// Moves the cursor to the absolute `position`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SeekPastEnd`] if the medium cannot address
    /// `position`, or an I/O error.
    fn seek(&mut self, position: u64) -> StoreResult<()>;

    /// Returns the cursor position, measured from the start.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed.
    fn tell(&self) -> StoreResult<u64>;

    /// Returns the current size of the store in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StoreResult<u64>;

    /// Releases the medium.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the medium fails.
    fn close(&mut self) -> StoreResult<()>;
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> StoreResult<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, data: &[u8]) -> StoreResult<()> {
        (**self).write(data)
    }

    fn flush(&mut self) -> StoreResult<()> {
        (**self).flush()
    }

    fn seek(&mut self, position: u64) -> StoreResult<()> {
        (**self).seek(position)
    }

    fn tell(&self) -> StoreResult<u64> {
        (**self).tell()
    }

    fn size(&self) -> StoreResult<u64> {
        (**self).size()
    }

    fn close(&mut self) -> StoreResult<()> {
        (**self).close()
    }
}

/// Resolves a [`SeekFrom`] into an absolute position.
///
/// `current` is the cursor the relative offset applies to and `size` the
/// length of the store.
///
/// # Errors
///
/// Returns [`StoreError::NegativeSeek`] if the target lies before the start
/// of the store, or an I/O error if it overflows `u64`.
pub fn resolve_seek(from: SeekFrom, current: u64, size: u64) -> StoreResult<u64> {
    let (base, offset) = match from {
        SeekFrom::Start(position) => return Ok(position),
        SeekFrom::Current(offset) => (current, offset),
        SeekFrom::End(offset) => (size, offset),
    };

    let target = i128::from(base) + i128::from(offset);
    if target < 0 {
        return Err(StoreError::NegativeSeek { base, offset });
    }

    u64::try_from(target).map_err(|_| {
        StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("seek target overflows: base {base}, offset {offset}"),
        ))
    })
}
