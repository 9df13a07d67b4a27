//! Write-behind buffering over a store.

use crate::buffer::Buffer;
use crate::config::DEFAULT_SEGMENT_SIZE;
use crate::error::{BufferError, BufferResult};
use bistore_storage::{Store, StoreError};
use std::io;

/// A store writer with a write-behind buffer.
///
/// Writes land in the buffer. After every write, whole segments of
/// `segment_size` bytes are written through to the store; the remainder
/// waits for [`BufferedSink::emit`], [`BufferedSink::flush`] or
/// [`BufferedSink::close`]. The caller's position is therefore the store
/// cursor plus `buffer().len()`.
#[derive(Debug)]
pub struct BufferedSink<S> {
    store: S,
    buffer: Buffer,
    segment_size: usize,
    closed: bool,
}

impl<S: Store> BufferedSink<S> {
    /// Creates a sink with the default segment size.
    pub fn new(store: S) -> Self {
        Self::with_segment_size(store, DEFAULT_SEGMENT_SIZE)
    }

    /// Creates a sink that emits in segments of `segment_size` bytes.
    pub fn with_segment_size(store: S, segment_size: usize) -> Self {
        let segment_size = segment_size.max(1);
        Self {
            store,
            buffer: Buffer::with_capacity(segment_size),
            segment_size,
            closed: false,
        }
    }

    /// Returns the accepted-but-unwritten bytes.
    #[must_use]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Returns the wrapped store.
    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.store
    }

    /// Returns the wrapped store mutably.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn ensure_open(&self) -> BufferResult<()> {
        if self.closed {
            return Err(StoreError::Closed.into());
        }
        Ok(())
    }

    /// Writes the first `count` buffered bytes to the store.
    ///
    /// Bytes leave the buffer only once the store accepted them.
    fn write_through(&mut self, count: usize) -> BufferResult<()> {
        if count == 0 {
            return Ok(());
        }
        self.store.write(&self.buffer.as_slice()[..count])?;
        self.buffer.consume(count);
        Ok(())
    }

    /// Buffers `data`.
    pub fn write(&mut self, data: &[u8]) -> BufferResult<()> {
        self.ensure_open()?;
        self.buffer.extend_from_slice(data);
        self.emit_complete_segments()
    }

    /// Buffers exactly `count` bytes taken from `reader`.
    pub fn write_from<R: io::Read + ?Sized>(&mut self, reader: &mut R, count: u64) -> BufferResult<()> {
        self.ensure_open()?;

        let mut remaining = count;
        while remaining > 0 {
            let want = remaining.min(self.segment_size as u64) as usize;
            let read = self.fill_from(reader, want)?;
            if read == 0 {
                return Err(BufferError::eof(count, count - remaining));
            }
            remaining -= read as u64;
            self.emit_complete_segments()?;
        }
        Ok(())
    }

    /// Buffers everything `reader` yields until its end.
    ///
    /// Returns the number of bytes taken.
    pub fn write_all_from<R: io::Read + ?Sized>(&mut self, reader: &mut R) -> BufferResult<u64> {
        self.ensure_open()?;

        let mut total = 0u64;
        loop {
            let read = self.fill_from(reader, self.segment_size)?;
            if read == 0 {
                return Ok(total);
            }
            total += read as u64;
            self.emit_complete_segments()?;
        }
    }

    fn fill_from<R: io::Read + ?Sized>(&mut self, reader: &mut R, want: usize) -> BufferResult<usize> {
        let start = self.buffer.len();
        let spare = self.buffer.spare(want);
        let result = loop {
            match reader.read(spare) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };
        match result {
            Ok(read) => {
                self.buffer.truncate(start + read);
                Ok(read)
            }
            Err(err) => {
                self.buffer.truncate(start);
                Err(err.into())
            }
        }
    }

    /// Buffers the UTF-8 bytes of `text`.
    pub fn write_utf8(&mut self, text: &str) -> BufferResult<()> {
        self.write(text.as_bytes())
    }

    /// Buffers the UTF-8 encoding of `code_point`.
    pub fn write_utf8_code_point(&mut self, code_point: char) -> BufferResult<()> {
        let mut encoded = [0u8; 4];
        self.write(code_point.encode_utf8(&mut encoded).as_bytes())
    }

    /// Buffers one byte.
    pub fn write_byte(&mut self, byte: u8) -> BufferResult<()> {
        self.write(&[byte])
    }

    /// Buffers a big-endian `i16`.
    pub fn write_i16(&mut self, value: i16) -> BufferResult<()> {
        self.write(&value.to_be_bytes())
    }

    /// Buffers a little-endian `i16`.
    pub fn write_i16_le(&mut self, value: i16) -> BufferResult<()> {
        self.write(&value.to_le_bytes())
    }

    /// Buffers a big-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> BufferResult<()> {
        self.write(&value.to_be_bytes())
    }

    /// Buffers a little-endian `i32`.
    pub fn write_i32_le(&mut self, value: i32) -> BufferResult<()> {
        self.write(&value.to_le_bytes())
    }

    /// Buffers a big-endian `i64`.
    pub fn write_i64(&mut self, value: i64) -> BufferResult<()> {
        self.write(&value.to_be_bytes())
    }

    /// Buffers a little-endian `i64`.
    pub fn write_i64_le(&mut self, value: i64) -> BufferResult<()> {
        self.write(&value.to_le_bytes())
    }

    /// Buffers `value` as decimal text.
    pub fn write_decimal_i64(&mut self, value: i64) -> BufferResult<()> {
        self.write(value.to_string().as_bytes())
    }

    /// Buffers `value` as lowercase hexadecimal text without leading zeros.
    pub fn write_hex_u64(&mut self, value: u64) -> BufferResult<()> {
        self.write(format!("{value:x}").as_bytes())
    }

    /// Writes all complete segments to the store, keeping the remainder.
    pub fn emit_complete_segments(&mut self) -> BufferResult<()> {
        self.ensure_open()?;
        let complete = self.buffer.len() / self.segment_size * self.segment_size;
        self.write_through(complete)
    }

    /// Writes the whole buffer to the store without flushing the store.
    pub fn emit(&mut self) -> BufferResult<()> {
        self.ensure_open()?;
        self.write_through(self.buffer.len())
    }

    /// Writes the whole buffer to the store and flushes the store.
    pub fn flush(&mut self) -> BufferResult<()> {
        self.emit()?;
        self.store.flush()?;
        Ok(())
    }

    /// Writes the buffer out, then closes the store.
    ///
    /// Both steps are attempted; the first failure is returned. Closing
    /// twice is a no-op.
    pub fn close(&mut self) -> BufferResult<()> {
        if self.closed {
            return Ok(());
        }

        let emitted = self.write_through(self.buffer.len());
        self.closed = true;
        self.buffer.clear();
        let closed = self.store.close().map_err(BufferError::from);
        emitted.and(closed)
    }
}

impl<S: Store> io::Write for BufferedSink<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BufferedSink::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        BufferedSink::flush(self).map_err(Into::into)
    }
}
