//! Append command implementation.

use super::CommandResult;
use bistore_core::BufferedStore;
use bistore_storage::FileStore;
use std::io::SeekFrom;
use std::path::Path;
use tracing::info;

/// Runs the append command. Creates the file if it does not exist.
pub fn run(path: &Path, bytes: &[u8]) -> CommandResult {
    info!("Appending {} bytes to {:?}", bytes.len(), path);

    let mut store = BufferedStore::new(FileStore::open_with_create_dirs(path)?);
    let start = store.seek_from(SeekFrom::End(0))?;
    store.write(bytes)?;
    let size = store.size()?;
    store.close()?;

    println!("Appended {} bytes at {}, file is now {} bytes", bytes.len(), start, size);
    Ok(())
}
