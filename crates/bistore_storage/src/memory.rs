//! In-memory store for testing.

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

/// An in-memory store.
///
/// This store keeps all data in a `Vec<u8>` and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Scratch data that doesn't need persistence
///
/// By default the cursor may be moved past the end of the data; a write
/// there zero-fills the gap. A [`MemoryStore::bounded`] store rejects such
/// seeks instead.
///
/// # Example
///
/// ```rust
/// use bistore_storage::{MemoryStore, Store};
///
/// let mut store = MemoryStore::new();
/// store.write(b"test data").unwrap();
/// assert_eq!(store.tell().unwrap(), 9);
/// assert_eq!(store.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Vec<u8>,
    position: u64,
    bounded: bool,
    closed: bool,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store with pre-existing data.
    ///
    /// The cursor starts at offset 0.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Creates a store over `data` that refuses to seek past its length.
    #[must_use]
    pub fn bounded(data: Vec<u8>) -> Self {
        Self {
            data,
            bounded: true,
            ..Self::default()
        }
    }

    /// Returns a copy of all data in the store.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.data.clone()
    }

    /// Consumes the store and returns its data.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Returns true once [`Store::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn read(&mut self, buf: &mut [u8]) -> StoreResult<usize> {
        self.ensure_open()?;

        let len = self.data.len() as u64;
        if self.position >= len {
            return Ok(0);
        }

        let start = self.position as usize;
        let count = buf.len().min(self.data.len() - start);
        buf[..count].copy_from_slice(&self.data[start..start + count]);
        self.position += count as u64;
        Ok(count)
    }

    fn write(&mut self, new_data: &[u8]) -> StoreResult<()> {
        self.ensure_open()?;

        if new_data.is_empty() {
            return Ok(());
        }

        let too_large = StoreError::TooLarge {
            position: self.position,
            len: new_data.len(),
        };
        let Some((start, end)) = usize::try_from(self.position)
            .ok()
            .and_then(|start| Some((start, start.checked_add(new_data.len())?)))
        else {
            return Err(too_large);
        };
        if self.data.len() < end {
            self.data
                .try_reserve(end - self.data.len())
                .map_err(|_| too_large)?;
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(new_data);
        self.position = end as u64;
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        // Nothing is buffered in memory
        self.ensure_open()
    }

    fn seek(&mut self, position: u64) -> StoreResult<()> {
        self.ensure_open()?;

        let size = self.data.len() as u64;
        if self.bounded && position > size {
            return Err(StoreError::SeekPastEnd { position, size });
        }
        self.position = position;
        Ok(())
    }

    fn tell(&self) -> StoreResult<u64> {
        self.ensure_open()?;
        Ok(self.position)
    }

    fn size(&self) -> StoreResult<u64> {
        self.ensure_open()?;
        Ok(self.data.len() as u64)
    }

    fn close(&mut self) -> StoreResult<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.size().unwrap(), 0);
        assert_eq!(store.tell().unwrap(), 0);
        assert!(store.contents().is_empty());
    }

    #[test]
    fn memory_write_advances_cursor() {
        let mut store = MemoryStore::new();

        store.write(b"hello").unwrap();
        assert_eq!(store.tell().unwrap(), 5);

        store.write(b" world").unwrap();
        assert_eq!(store.tell().unwrap(), 11);
        assert_eq!(store.size().unwrap(), 11);
    }

    #[test]
    fn memory_read_returns_data_at_cursor() {
        let mut store = MemoryStore::with_data(b"hello world".to_vec());
        store.seek(6).unwrap();

        let mut buf = [0u8; 16];
        let n = store.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"world");
        assert_eq!(store.tell().unwrap(), 11);
    }

    #[test]
    fn memory_read_at_end_returns_zero() {
        let mut store = MemoryStore::with_data(b"abc".to_vec());
        store.seek(3).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(store.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn memory_write_overwrites_in_place() {
        let mut store = MemoryStore::with_data(b"hello world".to_vec());
        store.seek(0).unwrap();
        store.write(b"J").unwrap();
        assert_eq!(store.contents(), b"Jello world");
        assert_eq!(store.size().unwrap(), 11);
    }

    #[test]
    fn memory_write_past_end_zero_fills() {
        let mut store = MemoryStore::with_data(b"ab".to_vec());
        store.seek(4).unwrap();
        store.write(b"z").unwrap();
        assert_eq!(store.contents(), b"ab\0\0z");
    }

    #[test]
    fn memory_write_beyond_addressable_end_fails() {
        let mut store = MemoryStore::with_data(b"ab".to_vec());
        store.seek(u64::MAX).unwrap();

        let result = store.write(b"x");
        assert!(matches!(
            result,
            Err(StoreError::TooLarge { position: u64::MAX, len: 1 })
        ));
        assert_eq!(store.contents(), b"ab");
        assert_eq!(store.tell().unwrap(), u64::MAX);

        // Zero-length writes never grow the store.
        store.write(b"").unwrap();
        assert_eq!(store.size().unwrap(), 2);
    }

    #[test]
    fn memory_bounded_rejects_seek_past_end() {
        let mut store = MemoryStore::bounded(b"abc".to_vec());
        assert!(store.seek(3).is_ok());

        let result = store.seek(4);
        assert!(matches!(
            result,
            Err(StoreError::SeekPastEnd { position: 4, size: 3 })
        ));
        assert_eq!(store.tell().unwrap(), 3);
    }

    #[test]
    fn memory_empty_write() {
        let mut store = MemoryStore::new();
        store.write(b"").unwrap();
        assert_eq!(store.size().unwrap(), 0);
        assert_eq!(store.tell().unwrap(), 0);
    }

    #[test]
    fn memory_closed_rejects_operations() {
        let mut store = MemoryStore::with_data(b"data".to_vec());
        store.close().unwrap();

        assert!(store.is_closed());
        assert!(matches!(store.tell(), Err(StoreError::Closed)));
        assert!(matches!(store.write(b"x"), Err(StoreError::Closed)));
        assert!(matches!(store.read(&mut [0u8; 1]), Err(StoreError::Closed)));
        assert_eq!(store.contents(), b"data");
    }

    #[test]
    fn memory_close_is_idempotent() {
        let mut store = MemoryStore::new();
        assert!(store.close().is_ok());
        assert!(store.close().is_ok());
    }

    #[test]
    fn memory_boxed_store_delegates() {
        let mut store: Box<dyn Store> = Box::new(MemoryStore::new());
        store.write(b"boxed").unwrap();
        assert_eq!(store.size().unwrap(), 5);
    }
}
