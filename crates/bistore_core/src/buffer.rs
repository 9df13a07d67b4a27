//! In-memory byte buffer shared by the read and write adapters.

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// A contiguous FIFO byte buffer.
///
/// The read adapter appends fetched bytes at the back and consumes from
/// the front; the write adapter appends caller bytes at the back and emits
/// from the front. Search helpers take offsets relative to the front.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    bytes: BytesMut,
}

impl Buffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Discards all buffered bytes.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Returns the buffered bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the byte at `index`, if buffered.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Appends bytes at the back.
    pub fn extend_from_slice(&mut self, data: &[u8]) {
        self.bytes.extend_from_slice(data);
    }

    /// Appends one byte at the back.
    pub fn push(&mut self, byte: u8) {
        self.bytes.put_u8(byte);
    }

    /// Reserves `additional` bytes of spare room at the back and returns a
    /// zeroed slice of exactly that length for an in-place fill.
    ///
    /// Callers must follow up with [`Buffer::truncate`] to drop the part of
    /// the slice that was not filled.
    pub(crate) fn spare(&mut self, additional: usize) -> &mut [u8] {
        let start = self.bytes.len();
        self.bytes.resize(start + additional, 0);
        &mut self.bytes[start..]
    }

    /// Shortens the buffer to `len` bytes.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Drops `count` bytes from the front.
    ///
    /// # Panics
    ///
    /// Panics if `count > len()`.
    pub fn consume(&mut self, count: usize) {
        self.bytes.advance(count);
    }

    /// Removes and returns `count` bytes from the front.
    ///
    /// # Panics
    ///
    /// Panics if `count > len()`.
    pub fn split_to(&mut self, count: usize) -> Bytes {
        self.bytes.split_to(count).freeze()
    }

    /// Removes and returns all buffered bytes.
    pub fn take(&mut self) -> Bytes {
        self.bytes.split().freeze()
    }

    /// Finds `byte` in `[from, to)`, clamped to the buffered range.
    #[must_use]
    pub fn index_of(&self, byte: u8, from: usize, to: usize) -> Option<usize> {
        let to = to.min(self.bytes.len());
        if from >= to {
            return None;
        }
        self.bytes[from..to]
            .iter()
            .position(|&b| b == byte)
            .map(|i| i + from)
    }

    /// Finds the first occurrence of `pattern` at or after `from`.
    ///
    /// An empty pattern matches at `from` when `from` is within the buffer.
    #[must_use]
    pub fn index_of_bytes(&self, pattern: &[u8], from: usize) -> Option<usize> {
        if from > self.bytes.len() {
            return None;
        }
        if pattern.is_empty() {
            return Some(from);
        }
        self.bytes[from..]
            .windows(pattern.len())
            .position(|window| window == pattern)
            .map(|i| i + from)
    }

    /// Finds the first byte at or after `from` that is any of `targets`.
    #[must_use]
    pub fn index_of_element(&self, targets: &[u8], from: usize) -> Option<usize> {
        if from >= self.bytes.len() {
            return None;
        }
        self.bytes[from..]
            .iter()
            .position(|b| targets.contains(b))
            .map(|i| i + from)
    }

    /// Returns true if the buffered bytes at `offset` equal `bytes`.
    #[must_use]
    pub fn range_equals(&self, offset: usize, bytes: &[u8]) -> bool {
        offset
            .checked_add(bytes.len())
            .and_then(|end| self.bytes.get(offset..end))
            .is_some_and(|window| window == bytes)
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_of(data: &[u8]) -> Buffer {
        let mut buffer = Buffer::new();
        buffer.extend_from_slice(data);
        buffer
    }

    #[test]
    fn consume_and_split_take_from_front() {
        let mut buffer = buffer_of(b"abcdef");
        buffer.consume(2);
        assert_eq!(buffer.as_slice(), b"cdef");

        let head = buffer.split_to(3);
        assert_eq!(&head[..], b"cde");
        assert_eq!(buffer.as_slice(), b"f");

        assert_eq!(&buffer.take()[..], b"f");
        assert!(buffer.is_empty());
    }

    #[test]
    fn spare_then_truncate_keeps_filled_prefix() {
        let mut buffer = buffer_of(b"ab");
        let spare = buffer.spare(4);
        spare[..2].copy_from_slice(b"cd");
        buffer.truncate(4);
        assert_eq!(buffer.as_slice(), b"abcd");
    }

    #[test]
    fn index_of_respects_range() {
        let buffer = buffer_of(b"a,b,c");
        assert_eq!(buffer.index_of(b',', 0, 5), Some(1));
        assert_eq!(buffer.index_of(b',', 2, 5), Some(3));
        assert_eq!(buffer.index_of(b',', 2, 3), None);
        assert_eq!(buffer.index_of(b',', 4, 100), None);
    }

    #[test]
    fn index_of_bytes_finds_pattern() {
        let buffer = buffer_of(b"hello world, hello");
        assert_eq!(buffer.index_of_bytes(b"hello", 0), Some(0));
        assert_eq!(buffer.index_of_bytes(b"hello", 1), Some(13));
        assert_eq!(buffer.index_of_bytes(b"bye", 0), None);
        assert_eq!(buffer.index_of_bytes(b"", 4), Some(4));
    }

    #[test]
    fn index_of_element_matches_any_target() {
        let buffer = buffer_of(b"key=value;next");
        assert_eq!(buffer.index_of_element(b"=;", 0), Some(3));
        assert_eq!(buffer.index_of_element(b"=;", 4), Some(9));
        assert_eq!(buffer.index_of_element(b"#", 0), None);
    }

    #[test]
    fn range_equals_checks_bounds() {
        let buffer = buffer_of(b"abcdef");
        assert!(buffer.range_equals(2, b"cd"));
        assert!(!buffer.range_equals(2, b"cx"));
        assert!(!buffer.range_equals(5, b"fg"));
        assert!(buffer.range_equals(6, b""));
    }
}
