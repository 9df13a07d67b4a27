//! Dump command implementation.

use super::{open_existing, CommandResult};
use std::path::Path;
use tracing::info;

const ROW_WIDTH: usize = 16;

/// Runs the dump command.
///
/// Prints `length` bytes starting at `offset`, or everything to the end
/// when `length` is `None`.
pub fn run(path: &Path, offset: u64, length: Option<u64>) -> CommandResult {
    info!("Dumping {:?} from offset {}", path, offset);
    for row in dump(path, offset, length)? {
        println!("{row}");
    }
    Ok(())
}

/// Formats the requested range as hex dump rows.
pub fn dump(path: &Path, offset: u64, length: Option<u64>) -> CommandResult<Vec<String>> {
    let mut store = open_existing(path)?;
    let size = store.size()?;
    if offset > size {
        return Err(format!("Offset {} is past the end of the file ({} bytes)", offset, size).into());
    }

    store.seek(offset)?;
    let available = size - offset;
    let count = length.map_or(available, |length| length.min(available));
    let bytes = store.read_vec(count)?;
    store.close()?;

    Ok(bytes
        .chunks(ROW_WIDTH)
        .enumerate()
        .map(|(row, chunk)| format_row(offset + (row * ROW_WIDTH) as u64, chunk))
        .collect())
}

fn format_row(offset: u64, chunk: &[u8]) -> String {
    let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
    let ascii: String = chunk
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect();
    format!(
        "{:08x}  {:<width$}  |{}|",
        offset,
        hex.join(" "),
        ascii,
        width = ROW_WIDTH * 3 - 1
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_row_pads_short_rows() {
        let row = format_row(0x10, b"Hi\n");
        assert!(row.starts_with("00000010  48 69 0a "));
        assert!(row.ends_with("|Hi.|"));
        assert_eq!(row.len(), format_row(0, &[0u8; 16]).len() - 13);
    }

    #[test]
    fn dump_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, (0u8..40).collect::<Vec<_>>()).unwrap();

        let rows = dump(&path, 4, Some(20)).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("00000004  04 05"));
        assert!(rows[1].starts_with("00000014  14 15 16 17"));

        assert_eq!(dump(&path, 40, None).unwrap().len(), 0);
        assert!(dump(&path, 41, None).is_err());
    }
}
