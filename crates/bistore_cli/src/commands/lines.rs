//! Lines command implementation.

use super::{open_existing, CommandResult};
use bistore_core::BufferError;
use std::path::Path;
use tracing::{info, warn};

/// Runs the lines command.
///
/// Prints up to `count` lines starting at byte `offset`. Every line must
/// end with `\n` or `\r\n` within `max_len` bytes.
pub fn run(path: &Path, offset: u64, max_len: u64, count: Option<usize>) -> CommandResult {
    info!("Reading lines from {:?} at offset {}", path, offset);
    for (position, line) in lines(path, offset, max_len, count)? {
        println!("{:>8}: {}", position, line);
    }
    Ok(())
}

/// Reads lines, returning each with the byte offset it starts at.
pub fn lines(
    path: &Path,
    offset: u64,
    max_len: u64,
    count: Option<usize>,
) -> CommandResult<Vec<(u64, String)>> {
    let mut store = open_existing(path)?;
    store.seek(offset)?;

    let mut lines = Vec::new();
    while count.map_or(true, |count| lines.len() < count) && !store.exhausted()? {
        let position = store.tell()?;
        match store.read_utf8_line_strict_limit(max_len) {
            Ok(line) => lines.push((position, line)),
            Err(err @ BufferError::MissingNewline { .. }) => {
                warn!(position, "stopping at unterminated or overlong line");
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        }
    }

    store.close()?;
    Ok(lines)
}
