//! File-based store for persistent data.

use crate::error::{StoreError, StoreResult};
use crate::store::Store;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-based store.
///
/// This store provides persistent random access using OS file APIs.
/// Data survives process restarts. Seeking past the end is allowed; the
/// operating system zero-fills the gap on the next write.
///
/// # Durability
///
/// - `flush()` calls `File::flush()` to push data to the OS
/// - `sync()` calls `File::sync_all()` to ensure data is on disk
///
/// # Example
///
/// ```no_run
/// use bistore_storage::{FileStore, Store};
/// use std::path::Path;
///
/// let mut store = FileStore::open(Path::new("data.bin")).unwrap();
/// store.write(b"persistent data").unwrap();
/// store.sync().unwrap();  // Ensure data is durable
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: Option<File>,
    position: u64,
}

impl FileStore {
    /// Opens or creates a file store at the given path.
    ///
    /// Existing contents are kept and the cursor starts at offset 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            position: 0,
        })
    }

    /// Opens or creates a file store, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or file cannot be opened.
    pub fn open_with_create_dirs(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Syncs all data and metadata to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the sync fails.
    pub fn sync(&mut self) -> StoreResult<()> {
        self.file()?.sync_all()?;
        Ok(())
    }

    fn file(&self) -> StoreResult<&File> {
        self.file.as_ref().ok_or(StoreError::Closed)
    }

    fn file_mut(&mut self) -> StoreResult<&mut File> {
        self.file.as_mut().ok_or(StoreError::Closed)
    }
}

impl Store for FileStore {
    fn read(&mut self, buf: &mut [u8]) -> StoreResult<usize> {
        let position = self.position;
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(position))?;

        let count = loop {
            match file.read(buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        self.position += count as u64;
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> StoreResult<()> {
        if data.is_empty() {
            return self.file().map(|_| ());
        }

        let position = self.position;
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(position))?;
        file.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        self.file_mut()?.flush()?;
        Ok(())
    }

    fn seek(&mut self, position: u64) -> StoreResult<()> {
        self.file()?;
        self.position = position;
        Ok(())
    }

    fn tell(&self) -> StoreResult<u64> {
        self.file()?;
        Ok(self.position)
    }

    fn size(&self) -> StoreResult<u64> {
        Ok(self.file()?.metadata()?.len())
    }

    fn close(&mut self) -> StoreResult<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        Ok(())
    }
}
