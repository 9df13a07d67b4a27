//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up buffered stores over
//! memory and temporary files.

use bistore_core::{BufferedStore, StoreConfig};
use bistore_storage::{FileStore, MemoryStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A file store in a temporary directory that is removed on drop.
pub struct TempFileStore {
    /// The file store.
    pub store: FileStore,
    path: PathBuf,
    /// Kept alive so the directory outlives the store.
    _temp_dir: TempDir,
}

impl TempFileStore {
    /// Creates an empty file store.
    pub fn new() -> Self {
        Self::with_data(&[])
    }

    /// Creates a file store whose file starts with `data`.
    pub fn with_data(data: &[u8]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("store.bin");
        std::fs::write(&path, data).expect("Failed to seed store file");
        let store = FileStore::open(&path).expect("Failed to open file store");

        Self {
            store,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the backing file from disk.
    pub fn contents(&self) -> Vec<u8> {
        std::fs::read(&self.path).expect("Failed to read store file")
    }

    /// Wraps the file store in a [`BufferedStore`].
    ///
    /// The returned guard keeps the temporary directory alive.
    pub fn buffered(self, config: StoreConfig) -> (BufferedStore<FileStore>, TempFileGuard) {
        let guard = TempFileGuard {
            path: self.path,
            _temp_dir: self._temp_dir,
        };
        (BufferedStore::with_config(self.store, config), guard)
    }
}

impl Default for TempFileStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a temporary store file alive after its store was moved out.
pub struct TempFileGuard {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TempFileGuard {
    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the backing file from disk.
    pub fn contents(&self) -> Vec<u8> {
        std::fs::read(&self.path).expect("Failed to read store file")
    }
}

/// Creates a buffered store over an empty memory store.
pub fn memory_store() -> BufferedStore<MemoryStore> {
    BufferedStore::new(MemoryStore::new())
}

/// Creates a buffered store over a memory store holding `data`.
pub fn memory_store_with(data: &[u8], config: StoreConfig) -> BufferedStore<MemoryStore> {
    BufferedStore::with_config(MemoryStore::with_data(data.to_vec()), config)
}

/// Runs a test with a buffered store over a temporary file.
///
/// The closure receives the store and the file path. The store is closed
/// before this returns, so the file holds every accepted write.
///
/// # Example
///
/// ```rust,ignore
/// use bistore_testkit::with_file_store;
///
/// #[test]
/// fn my_test() {
///     let contents = with_file_store(b"abc", |store, _| {
///         store.seek(3).unwrap();
///         store.write(b"def").unwrap();
///     });
///     assert_eq!(contents, b"abcdef");
/// }
/// ```
pub fn with_file_store<F>(data: &[u8], f: F) -> Vec<u8>
where
    F: FnOnce(&mut BufferedStore<FileStore>, &Path),
{
    let (mut store, guard) = TempFileStore::with_data(data).buffered(StoreConfig::default());
    f(&mut store, guard.path());
    store.close().expect("Failed to close file store");
    guard.contents()
}

/// Small buffer sizes that force fills and emits on almost every call.
pub fn tiny_config() -> StoreConfig {
    StoreConfig::new().read_chunk_size(4).segment_size(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_store_starts_with_data() {
        let fixture = TempFileStore::with_data(b"seed");
        assert_eq!(fixture.contents(), b"seed");
        assert!(fixture.path().ends_with("store.bin"));
    }

    #[test]
    fn with_file_store_returns_closed_contents() {
        let contents = with_file_store(b"abc", |store, path| {
            assert!(path.exists());
            store.seek(3).unwrap();
            store.write(b"def").unwrap();
        });
        assert_eq!(contents, b"abcdef");
    }

    #[test]
    fn memory_store_with_tiny_config() {
        let mut store = memory_store_with(b"0123456789", tiny_config());
        assert_eq!(store.read_vec(6).unwrap(), b"012345");
        assert_eq!(store.tell().unwrap(), 6);
    }
}
