//! Read-ahead buffering over a store.

use crate::buffer::Buffer;
use crate::config::DEFAULT_READ_CHUNK_SIZE;
use crate::error::{BufferError, BufferResult};
use crate::options::Options;
use bistore_storage::{Store, StoreError};
use bytes::Bytes;
use std::io;

/// Longest prefix shown in a missing-newline error.
const MAX_LINE_PREVIEW: usize = 32;

/// A store reader with a read-ahead buffer.
///
/// Data is fetched from the store in chunks of `chunk_size` bytes and
/// handed out from the buffer. The store's cursor therefore runs ahead of
/// the caller by `buffer().len()` bytes.
///
/// Offsets taken by the search methods are relative to the next unread
/// byte. Every operation that needs more data than the store holds fails
/// with [`BufferError::UnexpectedEof`].
#[derive(Debug)]
pub struct BufferedSource<S> {
    store: S,
    buffer: Buffer,
    chunk_size: usize,
    closed: bool,
}

impl<S: Store> BufferedSource<S> {
    /// Creates a source with the default chunk size.
    pub fn new(store: S) -> Self {
        Self::with_chunk_size(store, DEFAULT_READ_CHUNK_SIZE)
    }

    /// Creates a source that fetches `chunk_size` bytes per fill.
    pub fn with_chunk_size(store: S, chunk_size: usize) -> Self {
        Self {
            store,
            buffer: Buffer::new(),
            chunk_size: chunk_size.max(1),
            closed: false,
        }
    }

    /// Returns the fetched-but-unread bytes.
    #[must_use]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Returns the read buffer for direct manipulation, e.g. discarding it.
    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    /// Returns the wrapped store.
    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.store
    }

    /// Returns the wrapped store mutably.
    ///
    /// Moving the store's cursor without clearing the buffer desynchronizes
    /// the two.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the source, dropping buffered bytes.
    pub fn into_inner(self) -> S {
        self.store
    }

    fn ensure_open(&self) -> BufferResult<()> {
        if self.closed {
            return Err(StoreError::Closed.into());
        }
        Ok(())
    }

    /// Fetches one chunk from the store. Returns false at end of store.
    fn fill(&mut self) -> BufferResult<bool> {
        self.ensure_open()?;

        let start = self.buffer.len();
        let spare = self.buffer.spare(self.chunk_size);
        match self.store.read(spare) {
            Ok(count) => {
                self.buffer.truncate(start + count);
                Ok(count > 0)
            }
            Err(err) => {
                self.buffer.truncate(start);
                Err(err.into())
            }
        }
    }

    /// Returns true if the buffer is empty and the store has no more data.
    pub fn exhausted(&mut self) -> BufferResult<bool> {
        self.ensure_open()?;
        Ok(self.buffer.is_empty() && !self.fill()?)
    }

    /// Buffers at least `count` bytes if the store has them.
    ///
    /// Returns false if the store ran dry first.
    pub fn request(&mut self, count: u64) -> BufferResult<bool> {
        self.ensure_open()?;
        while (self.buffer.len() as u64) < count {
            if !self.fill()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Buffers at least `count` bytes or fails.
    pub fn require(&mut self, count: u64) -> BufferResult<()> {
        if !self.request(count)? {
            return Err(BufferError::eof(count, self.buffer.len() as u64));
        }
        Ok(())
    }

    /// Discards `count` bytes.
    pub fn skip(&mut self, count: u64) -> BufferResult<()> {
        let mut remaining = count;
        while remaining > 0 {
            if self.buffer.is_empty() && !self.fill()? {
                return Err(BufferError::eof(count, count - remaining));
            }
            let step = remaining.min(self.buffer.len() as u64);
            self.buffer.consume(step as usize);
            remaining -= step;
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> BufferResult<[u8; N]> {
        self.require(N as u64)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buffer.as_slice()[..N]);
        self.buffer.consume(N);
        Ok(out)
    }

    /// Reads one byte.
    pub fn read_byte(&mut self) -> BufferResult<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    /// Reads a big-endian `i16`.
    pub fn read_i16(&mut self) -> BufferResult<i16> {
        self.read_array().map(i16::from_be_bytes)
    }

    /// Reads a little-endian `i16`.
    pub fn read_i16_le(&mut self) -> BufferResult<i16> {
        self.read_array().map(i16::from_le_bytes)
    }

    /// Reads a big-endian `i32`.
    pub fn read_i32(&mut self) -> BufferResult<i32> {
        self.read_array().map(i32::from_be_bytes)
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32_le(&mut self) -> BufferResult<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Reads a big-endian `i64`.
    pub fn read_i64(&mut self) -> BufferResult<i64> {
        self.read_array().map(i64::from_be_bytes)
    }

    /// Reads a little-endian `i64`.
    pub fn read_i64_le(&mut self) -> BufferResult<i64> {
        self.read_array().map(i64::from_le_bytes)
    }

    /// Reads a signed decimal number.
    ///
    /// Accepts an optional leading `-` followed by digits, and stops at the
    /// first byte that is not a digit (which is left unread).
    pub fn read_decimal_i64(&mut self) -> BufferResult<i64> {
        self.require(1)?;

        let mut pos = 0usize;
        let mut negative = false;
        // Accumulated as a negative number so that i64::MIN fits.
        let mut value: i64 = 0;
        while self.request(pos as u64 + 1)? {
            let byte = self.buffer.as_slice()[pos];
            match byte {
                b'0'..=b'9' => {
                    let digit = i64::from(byte - b'0');
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_sub(digit))
                        .ok_or_else(|| self.number_too_large(pos + 1))?;
                }
                b'-' if pos == 0 => negative = true,
                _ => break,
            }
            pos += 1;
        }

        if pos == usize::from(negative) {
            return Err(match self.buffer.get(pos) {
                Some(byte) => BufferError::number_format(format!(
                    "expected leading [0-9] or '-' character but was {byte:#04x}"
                )),
                None => BufferError::number_format("expected a digit before end of store"),
            });
        }

        let value = if negative {
            value
        } else {
            value
                .checked_neg()
                .ok_or_else(|| self.number_too_large(pos))?
        };
        self.buffer.consume(pos);
        Ok(value)
    }

    /// Reads an unsigned hexadecimal number (either case, no prefix).
    ///
    /// Stops at the first byte that is not a hex digit.
    pub fn read_hex_u64(&mut self) -> BufferResult<u64> {
        self.require(1)?;

        let mut pos = 0usize;
        let mut value: u64 = 0;
        while self.request(pos as u64 + 1)? {
            let byte = self.buffer.as_slice()[pos];
            let Some(digit) = char::from(byte).to_digit(16) else {
                break;
            };
            if value & 0xf000_0000_0000_0000 != 0 {
                return Err(self.number_too_large(pos + 1));
            }
            value = (value << 4) | u64::from(digit);
            pos += 1;
        }

        if pos == 0 {
            let byte = self.buffer.as_slice()[0];
            return Err(BufferError::number_format(format!(
                "expected leading [0-9a-fA-F] character but was {byte:#04x}"
            )));
        }

        self.buffer.consume(pos);
        Ok(value)
    }

    fn number_too_large(&self, len: usize) -> BufferError {
        let len = len.min(self.buffer.len());
        BufferError::number_format(format!(
            "number too large: {}",
            String::from_utf8_lossy(&self.buffer.as_slice()[..len])
        ))
    }

    /// Reads everything up to the end of the store.
    pub fn read_byte_string(&mut self) -> BufferResult<Bytes> {
        while self.fill()? {}
        Ok(self.buffer.take())
    }

    /// Reads exactly `count` bytes.
    pub fn read_byte_string_n(&mut self, count: u64) -> BufferResult<Bytes> {
        self.require(count)?;
        Ok(self.buffer.split_to(count as usize))
    }

    /// Reads everything up to the end of the store into a vector.
    pub fn read_to_vec(&mut self) -> BufferResult<Vec<u8>> {
        self.read_byte_string().map(Vec::from)
    }

    /// Reads exactly `count` bytes into a vector.
    pub fn read_vec(&mut self, count: u64) -> BufferResult<Vec<u8>> {
        self.read_byte_string_n(count).map(Vec::from)
    }

    /// Reads up to `buf.len()` bytes, returning how many were read.
    ///
    /// Returns `0` only at the end of the store (or for an empty `buf`).
    pub fn read(&mut self, buf: &mut [u8]) -> BufferResult<usize> {
        self.ensure_open()?;
        if buf.is_empty() {
            return Ok(0);
        }
        if self.buffer.is_empty() && !self.fill()? {
            return Ok(0);
        }

        let count = buf.len().min(self.buffer.len());
        buf[..count].copy_from_slice(&self.buffer.as_slice()[..count]);
        self.buffer.consume(count);
        Ok(count)
    }

    /// Fills `buf` completely.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> BufferResult<()> {
        self.require(buf.len() as u64)?;
        buf.copy_from_slice(&self.buffer.as_slice()[..buf.len()]);
        self.buffer.consume(buf.len());
        Ok(())
    }

    /// Copies everything up to the end of the store into `sink`.
    ///
    /// Returns the number of bytes copied.
    pub fn read_all<W: io::Write + ?Sized>(&mut self, sink: &mut W) -> BufferResult<u64> {
        let mut total = 0u64;
        loop {
            if self.buffer.is_empty() && !self.fill()? {
                return Ok(total);
            }
            sink.write_all(self.buffer.as_slice())?;
            total += self.buffer.len() as u64;
            self.buffer.clear();
        }
    }

    /// Reads everything up to the end of the store as UTF-8.
    pub fn read_utf8(&mut self) -> BufferResult<String> {
        Ok(String::from_utf8(self.read_to_vec()?)?)
    }

    /// Reads exactly `count` bytes as UTF-8.
    pub fn read_utf8_n(&mut self, count: u64) -> BufferResult<String> {
        Ok(String::from_utf8(self.read_vec(count)?)?)
    }

    /// Reads a line terminated by `\n` or `\r\n`, without the terminator.
    ///
    /// The final line need not be terminated. Returns `None` at the end of
    /// the store.
    pub fn read_utf8_line(&mut self) -> BufferResult<Option<String>> {
        match self.index_of(b'\n')? {
            Some(newline) => self.read_line_at(newline).map(Some),
            None if self.buffer.is_empty() => Ok(None),
            None => {
                let len = self.buffer.len();
                self.take_utf8(len, len).map(Some)
            }
        }
    }

    /// Reads a line that must be terminated by `\n` or `\r\n`.
    pub fn read_utf8_line_strict(&mut self) -> BufferResult<String> {
        self.read_utf8_line_strict_limit(u64::MAX)
    }

    /// Reads a terminated line of at most `limit` bytes (terminator
    /// excluded).
    ///
    /// Fails with [`BufferError::MissingNewline`] if no terminator is found
    /// within the limit or before the end of the store. Nothing is consumed
    /// on failure.
    pub fn read_utf8_line_strict_limit(&mut self, limit: u64) -> BufferResult<String> {
        let scan = limit.saturating_add(1);
        if let Some(newline) = self.index_of_range(b'\n', 0, scan)? {
            return self.read_line_at(newline);
        }

        // A line of exactly `limit` bytes followed by "\r\n".
        if scan < u64::MAX
            && self.request(scan)?
            && self.buffer.get(scan as usize - 1) == Some(b'\r')
            && self.request(scan + 1)?
            && self.buffer.get(scan as usize) == Some(b'\n')
        {
            return self.read_line_at(scan);
        }

        let preview = self.buffer.len().min(MAX_LINE_PREVIEW);
        let content = self.buffer.as_slice()[..preview]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>();
        Err(BufferError::MissingNewline {
            limit: limit.min(self.buffer.len() as u64),
            content,
        })
    }

    /// Consumes the line ending at the `\n` found at `newline`.
    fn read_line_at(&mut self, newline: u64) -> BufferResult<String> {
        let newline = newline as usize;
        let end = if newline > 0 && self.buffer.get(newline - 1) == Some(b'\r') {
            newline - 1
        } else {
            newline
        };
        self.take_utf8(end, newline + 1)
    }

    /// Decodes the first `len` buffered bytes, then consumes `consumed`
    /// bytes. Nothing is consumed if the bytes are not valid UTF-8.
    fn take_utf8(&mut self, len: usize, consumed: usize) -> BufferResult<String> {
        let text = String::from_utf8(self.buffer.as_slice()[..len].to_vec())?;
        self.buffer.consume(consumed);
        Ok(text)
    }

    /// Reads one UTF-8 encoded code point.
    ///
    /// Malformed, overlong and surrogate encodings decode to
    /// [`char::REPLACEMENT_CHARACTER`]; only the malformed prefix is
    /// consumed.
    pub fn read_utf8_code_point(&mut self) -> BufferResult<char> {
        self.require(1)?;

        let lead = self.buffer.as_slice()[0];
        let (len, min, mut code_point) = match lead {
            0x00..=0x7f => (1, 0, u32::from(lead)),
            0xc0..=0xdf => (2, 0x80, u32::from(lead & 0x1f)),
            0xe0..=0xef => (3, 0x800, u32::from(lead & 0x0f)),
            0xf0..=0xf7 => (4, 0x1_0000, u32::from(lead & 0x07)),
            _ => {
                self.buffer.consume(1);
                return Ok(char::REPLACEMENT_CHARACTER);
            }
        };

        self.require(len as u64)?;
        for i in 1..len {
            let byte = self.buffer.as_slice()[i];
            if byte & 0xc0 != 0x80 {
                self.buffer.consume(i);
                return Ok(char::REPLACEMENT_CHARACTER);
            }
            code_point = (code_point << 6) | u32::from(byte & 0x3f);
        }
        self.buffer.consume(len);

        if code_point < min {
            return Ok(char::REPLACEMENT_CHARACTER);
        }
        Ok(char::from_u32(code_point).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Finds the first `byte`, loading more data as needed.
    pub fn index_of(&mut self, byte: u8) -> BufferResult<Option<u64>> {
        self.index_of_range(byte, 0, u64::MAX)
    }

    /// Finds the first `byte` at or after `from`.
    pub fn index_of_from(&mut self, byte: u8, from: u64) -> BufferResult<Option<u64>> {
        self.index_of_range(byte, from, u64::MAX)
    }

    /// Finds the first `byte` in `[from, to)`.
    ///
    /// Only loads as much data as the range needs. An empty or inverted
    /// range finds nothing.
    pub fn index_of_range(&mut self, byte: u8, from: u64, to: u64) -> BufferResult<Option<u64>> {
        self.ensure_open()?;

        let mut from = from;
        while from < to {
            let found = self
                .buffer
                .index_of(byte, clamp_index(from), clamp_index(to));
            if let Some(index) = found {
                return Ok(Some(index as u64));
            }

            let scanned = self.buffer.len() as u64;
            if scanned >= to || !self.fill()? {
                return Ok(None);
            }
            from = from.max(scanned);
        }
        Ok(None)
    }

    /// Finds the first occurrence of `pattern` at or after `from`.
    pub fn index_of_bytes(&mut self, pattern: &[u8], from: u64) -> BufferResult<Option<u64>> {
        self.ensure_open()?;

        let mut from = from;
        loop {
            if let Some(index) = self.buffer.index_of_bytes(pattern, clamp_index(from)) {
                return Ok(Some(index as u64));
            }

            let scanned = self.buffer.len() as u64;
            if !self.fill()? {
                return Ok(None);
            }
            // A match may straddle the old end of the buffer.
            from = from.max((scanned + 1).saturating_sub(pattern.len() as u64));
        }
    }

    /// Finds the first byte at or after `from` that is any of `targets`.
    pub fn index_of_element(&mut self, targets: &[u8], from: u64) -> BufferResult<Option<u64>> {
        self.ensure_open()?;

        let mut from = from;
        loop {
            if let Some(index) = self.buffer.index_of_element(targets, clamp_index(from)) {
                return Ok(Some(index as u64));
            }

            let scanned = self.buffer.len() as u64;
            if !self.fill()? {
                return Ok(None);
            }
            from = from.max(scanned);
        }
    }

    /// Returns true if the bytes at `offset` equal `bytes`.
    ///
    /// Returns false, rather than failing, if the store ends first.
    pub fn range_equals(&mut self, offset: u64, bytes: &[u8]) -> BufferResult<bool> {
        let Some(end) = offset.checked_add(bytes.len() as u64) else {
            return Ok(false);
        };
        if !self.request(end)? {
            return Ok(false);
        }
        Ok(self.buffer.range_equals(offset as usize, bytes))
    }

    /// Consumes the first of `options` that prefixes the unread data.
    ///
    /// Returns its index, or `None` (consuming nothing) if none match.
    pub fn select(&mut self, options: &Options) -> BufferResult<Option<usize>> {
        for (index, option) in options.iter().enumerate() {
            if self.range_equals(0, option)? {
                self.buffer.consume(option.len());
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Discards buffered bytes and closes the store.
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> BufferResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.buffer.clear();
        self.store.close()?;
        Ok(())
    }
}

fn clamp_index(offset: u64) -> usize {
    usize::try_from(offset).unwrap_or(usize::MAX)
}

impl<S: Store> io::Read for BufferedSource<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        BufferedSource::read(self, buf).map_err(Into::into)
    }
}

impl<S: Store> io::BufRead for BufferedSource<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.buffer.is_empty() {
            self.fill()?;
        }
        Ok(self.buffer.as_slice())
    }

    fn consume(&mut self, amt: usize) {
        let amt = amt.min(self.buffer.len());
        self.buffer.consume(amt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistore_storage::MemoryStore;
    use std::io::BufRead;

    fn source(data: &[u8]) -> BufferedSource<MemoryStore> {
        BufferedSource::new(MemoryStore::with_data(data.to_vec()))
    }

    fn small_chunks(data: &[u8], chunk: usize) -> BufferedSource<MemoryStore> {
        BufferedSource::with_chunk_size(MemoryStore::with_data(data.to_vec()), chunk)
    }

    #[test]
    fn read_ahead_moves_store_cursor() {
        let mut src = small_chunks(b"0123456789", 4);
        assert_eq!(src.read_byte().unwrap(), b'0');
        assert_eq!(src.buffer().len(), 3);
        assert_eq!(src.get_ref().tell().unwrap(), 4);
    }

    #[test]
    fn typed_reads_big_and_little_endian() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x1234i16.to_be_bytes());
        data.extend_from_slice(&0x1234i16.to_le_bytes());
        data.extend_from_slice(&(-7i32).to_be_bytes());
        data.extend_from_slice(&(-7i32).to_le_bytes());
        data.extend_from_slice(&i64::MIN.to_be_bytes());
        data.extend_from_slice(&0x0102_0304_0506_0708i64.to_le_bytes());

        let mut src = small_chunks(&data, 3);
        assert_eq!(src.read_i16().unwrap(), 0x1234);
        assert_eq!(src.read_i16_le().unwrap(), 0x1234);
        assert_eq!(src.read_i32().unwrap(), -7);
        assert_eq!(src.read_i32_le().unwrap(), -7);
        assert_eq!(src.read_i64().unwrap(), i64::MIN);
        assert_eq!(src.read_i64_le().unwrap(), 0x0102_0304_0506_0708);
        assert!(src.exhausted().unwrap());
    }

    #[test]
    fn short_read_fails_with_eof() {
        let mut src = source(b"ab");
        let result = src.read_i32();
        assert!(matches!(
            result,
            Err(BufferError::UnexpectedEof {
                needed: 4,
                available: 2
            })
        ));
        // Nothing consumed
        assert_eq!(src.read_byte().unwrap(), b'a');
    }

    #[test]
    fn decimal_parsing() {
        let mut src = source(b"123 -45 -9223372036854775808 x");
        assert_eq!(src.read_decimal_i64().unwrap(), 123);
        src.skip(1).unwrap();
        assert_eq!(src.read_decimal_i64().unwrap(), -45);
        src.skip(1).unwrap();
        assert_eq!(src.read_decimal_i64().unwrap(), i64::MIN);
        src.skip(1).unwrap();
        assert!(matches!(
            src.read_decimal_i64(),
            Err(BufferError::NumberFormat { .. })
        ));
    }

    #[test]
    fn decimal_at_end_of_store() {
        let mut src = small_chunks(b"987", 1);
        assert_eq!(src.read_decimal_i64().unwrap(), 987);
        assert!(src.exhausted().unwrap());
    }

    #[test]
    fn decimal_overflow_fails() {
        let mut src = source(b"9223372036854775808");
        let err = src.read_decimal_i64().unwrap_err();
        assert!(err.to_string().contains("number too large"));
    }

    #[test]
    fn decimal_lone_minus_fails() {
        let mut src = source(b"-x");
        assert!(matches!(
            src.read_decimal_i64(),
            Err(BufferError::NumberFormat { .. })
        ));
    }

    #[test]
    fn hex_parsing() {
        let mut src = source(b"ffFF;0000000000000000001;g");
        assert_eq!(src.read_hex_u64().unwrap(), 0xffff);
        src.skip(1).unwrap();
        assert_eq!(src.read_hex_u64().unwrap(), 1);
        src.skip(1).unwrap();
        assert!(matches!(
            src.read_hex_u64(),
            Err(BufferError::NumberFormat { .. })
        ));
    }

    #[test]
    fn hex_overflow_fails() {
        let mut src = source(b"10000000000000000");
        assert!(matches!(
            src.read_hex_u64(),
            Err(BufferError::NumberFormat { .. })
        ));
    }

    #[test]
    fn byte_strings_and_vectors() {
        let mut src = small_chunks(b"headerpayload", 5);
        assert_eq!(&src.read_byte_string_n(6).unwrap()[..], b"header");
        assert_eq!(src.read_to_vec().unwrap(), b"payload");
        assert!(src.read_byte_string().unwrap().is_empty());
    }

    #[test]
    fn read_into_slice_returns_partial_counts() {
        let mut src = small_chunks(b"abcdef", 4);
        let mut buf = [0u8; 8];
        assert_eq!(src.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"abcd");
        assert_eq!(src.read(&mut buf).unwrap(), 2);
        assert_eq!(src.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn read_exact_and_read_all() {
        let mut src = small_chunks(b"0123456789", 3);
        let mut head = [0u8; 4];
        src.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"0123");

        let mut rest = Vec::new();
        assert_eq!(src.read_all(&mut rest).unwrap(), 6);
        assert_eq!(rest, b"456789");
    }

    #[test]
    fn skip_past_end_fails() {
        let mut src = source(b"abc");
        assert!(matches!(
            src.skip(5),
            Err(BufferError::UnexpectedEof {
                needed: 5,
                available: 3
            })
        ));
    }

    #[test]
    fn lines_with_both_terminators() {
        let mut src = small_chunks(b"first\r\nsecond\nlast", 3);
        assert_eq!(src.read_utf8_line().unwrap().as_deref(), Some("first"));
        assert_eq!(src.read_utf8_line().unwrap().as_deref(), Some("second"));
        assert_eq!(src.read_utf8_line().unwrap().as_deref(), Some("last"));
        assert_eq!(src.read_utf8_line().unwrap(), None);
    }

    #[test]
    fn strict_line_requires_terminator() {
        let mut src = source(b"done\nopen");
        assert_eq!(src.read_utf8_line_strict().unwrap(), "done");
        assert!(matches!(
            src.read_utf8_line_strict(),
            Err(BufferError::MissingNewline { .. })
        ));
        // Nothing consumed on failure
        assert_eq!(src.read_utf8().unwrap(), "open");
    }

    #[test]
    fn invalid_utf8_line_is_left_unread() {
        let mut src = small_chunks(b"ok\n\xff\xfe\r\ntail\xc3", 2);
        assert_eq!(src.read_utf8_line().unwrap().as_deref(), Some("ok"));
        assert!(matches!(
            src.read_utf8_line(),
            Err(BufferError::InvalidUtf8(_))
        ));
        assert_eq!(src.read_vec(4).unwrap(), b"\xff\xfe\r\n");

        assert!(matches!(
            src.read_utf8_line(),
            Err(BufferError::InvalidUtf8(_))
        ));
        assert_eq!(src.read_to_vec().unwrap(), b"tail\xc3");
    }

    #[test]
    fn strict_line_limit() {
        let mut src = source(b"abcd\nabcd\r\nabcdef\n");
        assert_eq!(src.read_utf8_line_strict_limit(4).unwrap(), "abcd");
        assert_eq!(src.read_utf8_line_strict_limit(4).unwrap(), "abcd");
        let err = src.read_utf8_line_strict_limit(4).unwrap_err();
        assert!(matches!(err, BufferError::MissingNewline { limit: 4, .. }));
        assert_eq!(src.read_utf8_line_strict_limit(6).unwrap(), "abcdef");
    }

    #[test]
    fn code_points() {
        let mut src = source("a\u{e9}\u{20ac}\u{1f600}".as_bytes());
        assert_eq!(src.read_utf8_code_point().unwrap(), 'a');
        assert_eq!(src.read_utf8_code_point().unwrap(), '\u{e9}');
        assert_eq!(src.read_utf8_code_point().unwrap(), '\u{20ac}');
        assert_eq!(src.read_utf8_code_point().unwrap(), '\u{1f600}');
    }

    #[test]
    fn malformed_code_points_are_replaced() {
        let mut src = source(&[0xff, 0xc3, b'a', 0xc0, 0x80]);
        assert_eq!(src.read_utf8_code_point().unwrap(), char::REPLACEMENT_CHARACTER);
        assert_eq!(src.read_utf8_code_point().unwrap(), char::REPLACEMENT_CHARACTER);
        assert_eq!(src.read_utf8_code_point().unwrap(), 'a');
        // Overlong encoding of NUL
        assert_eq!(src.read_utf8_code_point().unwrap(), char::REPLACEMENT_CHARACTER);
        assert!(src.exhausted().unwrap());
    }

    #[test]
    fn index_of_loads_across_chunks() {
        let mut src = small_chunks(b"aaaaaaaaab", 2);
        assert_eq!(src.index_of(b'b').unwrap(), Some(9));
        assert_eq!(src.index_of_from(b'a', 3).unwrap(), Some(3));
        assert_eq!(src.index_of(b'z').unwrap(), None);
    }

    #[test]
    fn index_of_range_stops_loading_at_bound() {
        let mut src = small_chunks(b"0123456789", 2);
        assert_eq!(src.index_of_range(b'9', 0, 4).unwrap(), None);
        assert_eq!(src.buffer().len(), 4);
        assert_eq!(src.index_of_range(b'3', 2, 4).unwrap(), Some(3));
        assert_eq!(src.index_of_range(b'3', 4, 2).unwrap(), None);
    }

    #[test]
    fn index_of_bytes_straddling_chunks() {
        let mut src = small_chunks(b"xxxxneedlexx", 5);
        assert_eq!(src.index_of_bytes(b"needle", 0).unwrap(), Some(4));
        assert_eq!(src.index_of_bytes(b"needle", 5).unwrap(), None);
    }

    #[test]
    fn index_of_element_finds_any() {
        let mut src = small_chunks(b"name: value", 2);
        assert_eq!(src.index_of_element(b":=", 0).unwrap(), Some(4));
        assert_eq!(src.index_of_element(b"#", 0).unwrap(), None);
    }

    #[test]
    fn range_equals_without_consuming() {
        let mut src = small_chunks(b"hello world", 3);
        assert!(src.range_equals(6, b"world").unwrap());
        assert!(!src.range_equals(6, b"worlds").unwrap());
        assert!(!src.range_equals(0, b"help").unwrap());
        assert_eq!(src.read_byte().unwrap(), b'h');
    }

    #[test]
    fn select_consumes_first_matching_option() {
        let options = Options::from_strs(&["GET ", "POST ", "PUT "]);
        let mut src = source(b"POST /index");
        assert_eq!(src.select(&options).unwrap(), Some(1));
        assert_eq!(src.read_utf8().unwrap(), "/index");
    }

    #[test]
    fn select_without_match_consumes_nothing() {
        let options = Options::from_strs(&["GET ", "PUT "]);
        let mut src = source(b"DELETE /");
        assert_eq!(src.select(&options).unwrap(), None);
        assert_eq!(src.read_byte().unwrap(), b'D');
    }

    #[test]
    fn buf_read_lines() {
        let mut src = small_chunks(b"one\ntwo\n", 3);
        let lines: Vec<String> = (&mut src).lines().map(Result::unwrap).collect();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn close_discards_and_rejects() {
        let mut src = source(b"data");
        src.read_byte().unwrap();
        src.close().unwrap();
        assert!(src.buffer().is_empty());
        assert!(src.read_byte().unwrap_err().is_closed());
        assert!(src.close().is_ok());
    }
}
