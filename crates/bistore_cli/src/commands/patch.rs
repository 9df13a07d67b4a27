//! Patch command implementation.

use super::{open_existing, CommandResult};
use std::path::Path;
use tracing::info;

/// Runs the patch command.
///
/// Overwrites bytes in place starting at `offset`. Writing past the end
/// grows the file.
pub fn run(path: &Path, offset: u64, bytes: &[u8]) -> CommandResult {
    info!("Patching {} bytes at offset {} in {:?}", bytes.len(), offset, path);

    let mut store = open_existing(path)?;
    let size = store.size()?;
    if offset > size {
        return Err(format!("Offset {} is past the end of the file ({} bytes)", offset, size).into());
    }

    store.seek(offset)?;
    store.write(bytes)?;
    let end = store.tell()?;
    store.close()?;

    println!("Patched {} bytes at {}..{}", bytes.len(), offset, end);
    Ok(())
}
