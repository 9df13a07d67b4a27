//! `std::io` stream views over a [`BufferedStore`].
//!
//! Both views borrow the store. Every call first switches the store into
//! the view's mode, so a view and direct calls on the store can be
//! interleaved freely. Closing a view closes the whole store.

use crate::error::BufferResult;
use crate::store::BufferedStore;
use bistore_storage::Store;
use std::fmt;
use std::io;

/// A readable view of a [`BufferedStore`].
///
/// Implements [`io::Read`] and [`io::BufRead`].
pub struct StoreReader<'a, S: Store> {
    store: &'a mut BufferedStore<S>,
}

impl<'a, S: Store> StoreReader<'a, S> {
    pub(crate) fn new(store: &'a mut BufferedStore<S>) -> Self {
        Self { store }
    }

    /// Returns how many bytes can be read without touching the store.
    pub fn available(&mut self) -> BufferResult<usize> {
        self.store.reading(|source| Ok(source.buffer().len()))
    }

    /// Switches to read mode, then closes the whole store.
    ///
    /// Both steps run; the first failure is returned.
    pub fn close(self) -> BufferResult<()> {
        if self.store.is_closed() {
            return Ok(());
        }
        let switched = self.store.switch_to_read();
        let closed = self.store.close();
        switched.and(closed)
    }
}

impl<S: Store> io::Read for StoreReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.store.read(buf).map_err(Into::into)
    }
}

impl<S: Store> io::BufRead for StoreReader<'_, S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.store.ensure_open()?;
        self.store.switch_to_read()?;
        io::BufRead::fill_buf(self.store.source_mut())
    }

    fn consume(&mut self, amt: usize) {
        io::BufRead::consume(self.store.source_mut(), amt);
    }
}

impl<S: Store> fmt::Debug for StoreReader<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}.reader()", self.store)
    }
}

/// A writable view of a [`BufferedStore`].
///
/// Implements [`io::Write`]. Bytes stay in the store's write buffer until
/// a segment fills up, the view is flushed, or the store leaves write mode.
pub struct StoreWriter<'a, S: Store> {
    store: &'a mut BufferedStore<S>,
}

impl<'a, S: Store> StoreWriter<'a, S> {
    pub(crate) fn new(store: &'a mut BufferedStore<S>) -> Self {
        Self { store }
    }

    /// Switches to write mode, then closes the whole store.
    ///
    /// Both steps run; the first failure is returned. Pending writes reach
    /// the store as part of closing.
    pub fn close(self) -> BufferResult<()> {
        if self.store.is_closed() {
            return Ok(());
        }
        let switched = self.store.switch_to_write();
        let closed = self.store.close();
        switched.and(closed)
    }
}

impl<S: Store> io::Write for StoreWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.store.write(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.store.flush().map_err(Into::into)
    }
}

impl<S: Store> fmt::Debug for StoreWriter<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}.writer()", self.store)
    }
}
