//! CLI command implementations.

pub mod append;
pub mod dump;
pub mod inspect;
pub mod lines;
pub mod patch;

use bistore_core::BufferedStore;
use bistore_storage::FileStore;
use std::error::Error;
use std::path::Path;

/// Result type shared by all commands.
pub type CommandResult<T = ()> = Result<T, Box<dyn Error>>;

/// Opens an existing file as a buffered store.
pub fn open_existing(path: &Path) -> CommandResult<BufferedStore<FileStore>> {
    if !path.is_file() {
        return Err(format!("No file found at {}", path.display()).into());
    }
    Ok(BufferedStore::new(FileStore::open(path)?))
}

/// Resolves the bytes given by `--text` or `--hex`.
pub fn payload(text: Option<String>, hex: Option<String>) -> CommandResult<Vec<u8>> {
    match (text, hex) {
        (Some(text), None) => Ok(text.into_bytes()),
        (None, Some(hex)) => parse_hex(&hex),
        _ => Err("Exactly one of --text or --hex is required".into()),
    }
}

/// Parses hex digits into bytes. Whitespace between digits is ignored.
pub fn parse_hex(input: &str) -> CommandResult<Vec<u8>> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return Err(format!("Odd number of hex digits in {input:?}").into());
    }

    if let Some(bad) = digits.iter().find(|b| !b.is_ascii_hexdigit()) {
        return Err(format!("Invalid hex digit {:?}", char::from(*bad)).into());
    }

    Ok(digits
        .chunks(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect())
}

fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_ignores_whitespace() {
        assert_eq!(parse_hex("de ad\tBE ef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn parse_hex_rejects_bad_input() {
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn payload_needs_exactly_one_source() {
        assert_eq!(payload(Some("hi".into()), None).unwrap(), b"hi");
        assert_eq!(payload(None, Some("6869".into())).unwrap(), b"hi");
        assert!(payload(None, None).is_err());
        assert!(payload(Some("a".into()), Some("61".into())).is_err());
    }

    #[test]
    fn open_existing_requires_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_existing(&dir.path().join("missing.bin")).is_err());
    }
}
