//! Mode-switching buffered store.

use crate::buffer::Buffer;
use crate::config::StoreConfig;
use crate::error::{BufferError, BufferResult};
use crate::handle::StoreHandle;
use crate::mode::Mode;
use crate::options::Options;
use crate::sink::BufferedSink;
use crate::source::BufferedSource;
use crate::stream::{StoreReader, StoreWriter};
use bistore_storage::{resolve_seek, Store, StoreError};
use bytes::Bytes;
use std::cell::RefCell;
use std::fmt;
use std::io::{self, SeekFrom};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, trace, warn};

type Source<S> = BufferedSource<StoreHandle<S>>;
type Sink<S> = BufferedSink<StoreHandle<S>>;

/// Buffered reads, writes and seeks over one store.
///
/// A `BufferedStore` owns a read-ahead [`BufferedSource`] and a
/// write-behind [`BufferedSink`], both wrapping the same store. Only one
/// of them is active at a time (see [`Mode`]). Before any operation the
/// store switches to the mode the operation needs:
///
/// - **to write**: unread read-ahead bytes are dropped and the store is
///   rewound by their count, so the write lands at the caller's position
/// - **to read**: buffered writes are emitted to the store first, so the
///   read observes them
///
/// # Position
///
/// [`tell`](Self::tell) reports the caller's (logical) position: the
/// store cursor minus unread bytes in read mode, plus unwritten bytes in
/// write mode.
///
/// # Closing
///
/// [`close`](Self::close) closes the active adapter, then the other one,
/// then the store, attempting every step and reporting the first failure.
/// Buffered writes are therefore on the store before it closes. Dropping
/// an unclosed store closes it.
///
/// # Thread Safety
///
/// None. The store is `!Send`; callers must not share it.
///
/// # Example
///
/// ```rust
/// use bistore_core::BufferedStore;
/// use bistore_storage::MemoryStore;
///
/// let mut store = BufferedStore::new(MemoryStore::new());
/// store.write_utf8("ABC").unwrap();
/// assert_eq!(store.size().unwrap(), 3);
///
/// store.seek(0).unwrap();
/// assert_eq!(store.read_byte().unwrap(), b'A');
/// assert_eq!(store.tell().unwrap(), 1);
/// ```
pub struct BufferedStore<S: Store> {
    store: Rc<RefCell<S>>,
    source: Source<S>,
    sink: Sink<S>,
    mode: Mode,
    closed: bool,
}

impl<S: Store> BufferedStore<S> {
    /// Wraps `store` with default buffer sizes.
    pub fn new(store: S) -> Self {
        Self::with_config(store, StoreConfig::default())
    }

    /// Wraps `store` with the given buffer sizes.
    pub fn with_config(store: S, config: StoreConfig) -> Self {
        let store = Rc::new(RefCell::new(store));
        let source = BufferedSource::with_chunk_size(
            StoreHandle::new(Rc::clone(&store)),
            config.read_chunk_size,
        );
        let sink =
            BufferedSink::with_segment_size(StoreHandle::new(Rc::clone(&store)), config.segment_size);

        Self {
            store,
            source,
            sink,
            mode: Mode::Read,
            closed: false,
        }
    }

    /// Returns the current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns true once [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the active buffer without switching modes.
    ///
    /// In read mode these are fetched-but-unread bytes, in write mode
    /// accepted-but-unwritten bytes.
    #[must_use]
    pub fn buffer(&self) -> &Buffer {
        match self.mode {
            Mode::Read => self.source.buffer(),
            Mode::Write => self.sink.buffer(),
        }
    }

    /// Timeouts are not supported; always `None`.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Runs `f` against the wrapped store, without switching modes.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside `f`.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.store.borrow())
    }

    pub(crate) fn ensure_open(&self) -> BufferResult<()> {
        if self.closed {
            return Err(StoreError::Closed.into());
        }
        Ok(())
    }

    /// Emits pending writes and enters read mode.
    pub(crate) fn switch_to_read(&mut self) -> BufferResult<()> {
        if self.mode == Mode::Write {
            self.sink.emit()?;
            self.mode = Mode::Read;
            trace!("switched to read mode");
        }
        Ok(())
    }

    /// Drops unread bytes, rewinds the store over them and enters write mode.
    pub(crate) fn switch_to_write(&mut self) -> BufferResult<()> {
        if self.mode == Mode::Read {
            let unread = self.source.buffer().len() as u64;
            if unread > 0 {
                let physical = self.source.get_ref().tell()?;
                let logical = Mode::Read.logical_position(physical, unread);
                self.source.get_mut().seek(logical)?;
                self.source.buffer_mut().clear();
            }
            self.mode = Mode::Write;
            trace!(rewound = unread, "switched to write mode");
        }
        Ok(())
    }

    /// Switches to read mode, then runs `op` on the read adapter.
    pub(crate) fn reading<T>(
        &mut self,
        op: impl FnOnce(&mut Source<S>) -> BufferResult<T>,
    ) -> BufferResult<T> {
        self.ensure_open()?;
        self.switch_to_read()?;
        op(&mut self.source)
    }

    /// Switches to write mode, then runs `op` on the write adapter.
    pub(crate) fn writing<T>(
        &mut self,
        op: impl FnOnce(&mut Sink<S>) -> BufferResult<T>,
    ) -> BufferResult<T> {
        self.ensure_open()?;
        self.switch_to_write()?;
        op(&mut self.sink)
    }

    pub(crate) fn source_mut(&mut self) -> &mut Source<S> {
        &mut self.source
    }

    // Reads

    /// Returns true if no more bytes can be read.
    pub fn exhausted(&mut self) -> BufferResult<bool> {
        self.reading(BufferedSource::exhausted)
    }

    /// Buffers at least `count` bytes if available; false if not.
    pub fn request(&mut self, count: u64) -> BufferResult<bool> {
        self.reading(|source| source.request(count))
    }

    /// Buffers at least `count` bytes or fails.
    pub fn require(&mut self, count: u64) -> BufferResult<()> {
        self.reading(|source| source.require(count))
    }

    /// Discards `count` bytes.
    pub fn skip(&mut self, count: u64) -> BufferResult<()> {
        self.reading(|source| source.skip(count))
    }

    /// Reads one byte.
    pub fn read_byte(&mut self) -> BufferResult<u8> {
        self.reading(BufferedSource::read_byte)
    }

    /// Reads a big-endian `i16`.
    pub fn read_i16(&mut self) -> BufferResult<i16> {
        self.reading(BufferedSource::read_i16)
    }

    /// Reads a little-endian `i16`.
    pub fn read_i16_le(&mut self) -> BufferResult<i16> {
        self.reading(BufferedSource::read_i16_le)
    }

    /// Reads a big-endian `i32`.
    pub fn read_i32(&mut self) -> BufferResult<i32> {
        self.reading(BufferedSource::read_i32)
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32_le(&mut self) -> BufferResult<i32> {
        self.reading(BufferedSource::read_i32_le)
    }

    /// Reads a big-endian `i64`.
    pub fn read_i64(&mut self) -> BufferResult<i64> {
        self.reading(BufferedSource::read_i64)
    }

    /// Reads a little-endian `i64`.
    pub fn read_i64_le(&mut self) -> BufferResult<i64> {
        self.reading(BufferedSource::read_i64_le)
    }

    /// Reads a signed decimal number.
    pub fn read_decimal_i64(&mut self) -> BufferResult<i64> {
        self.reading(BufferedSource::read_decimal_i64)
    }

    /// Reads an unsigned hexadecimal number.
    pub fn read_hex_u64(&mut self) -> BufferResult<u64> {
        self.reading(BufferedSource::read_hex_u64)
    }

    /// Reads everything up to the end of the store.
    pub fn read_byte_string(&mut self) -> BufferResult<Bytes> {
        self.reading(BufferedSource::read_byte_string)
    }

    /// Reads exactly `count` bytes.
    pub fn read_byte_string_n(&mut self, count: u64) -> BufferResult<Bytes> {
        self.reading(|source| source.read_byte_string_n(count))
    }

    /// Reads everything up to the end of the store into a vector.
    pub fn read_to_vec(&mut self) -> BufferResult<Vec<u8>> {
        self.reading(BufferedSource::read_to_vec)
    }

    /// Reads exactly `count` bytes into a vector.
    pub fn read_vec(&mut self, count: u64) -> BufferResult<Vec<u8>> {
        self.reading(|source| source.read_vec(count))
    }

    /// Reads up to `buf.len()` bytes; `0` at the end of the store.
    pub fn read(&mut self, buf: &mut [u8]) -> BufferResult<usize> {
        self.reading(|source| source.read(buf))
    }

    /// Fills `buf` completely.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> BufferResult<()> {
        self.reading(|source| source.read_exact(buf))
    }

    /// Copies everything up to the end of the store into `sink`.
    pub fn read_all<W: io::Write + ?Sized>(&mut self, sink: &mut W) -> BufferResult<u64> {
        self.reading(|source| source.read_all(sink))
    }

    /// Reads everything up to the end of the store as UTF-8.
    pub fn read_utf8(&mut self) -> BufferResult<String> {
        self.reading(BufferedSource::read_utf8)
    }

    /// Reads exactly `count` bytes as UTF-8.
    pub fn read_utf8_n(&mut self, count: u64) -> BufferResult<String> {
        self.reading(|source| source.read_utf8_n(count))
    }

    /// Reads a line; `None` at the end of the store.
    pub fn read_utf8_line(&mut self) -> BufferResult<Option<String>> {
        self.reading(BufferedSource::read_utf8_line)
    }

    /// Reads a line that must be terminated.
    pub fn read_utf8_line_strict(&mut self) -> BufferResult<String> {
        self.reading(BufferedSource::read_utf8_line_strict)
    }

    /// Reads a terminated line of at most `limit` bytes.
    pub fn read_utf8_line_strict_limit(&mut self, limit: u64) -> BufferResult<String> {
        self.reading(|source| source.read_utf8_line_strict_limit(limit))
    }

    /// Reads one UTF-8 code point.
    pub fn read_utf8_code_point(&mut self) -> BufferResult<char> {
        self.reading(BufferedSource::read_utf8_code_point)
    }

    /// Finds the first `byte` ahead of the current position.
    pub fn index_of(&mut self, byte: u8) -> BufferResult<Option<u64>> {
        self.reading(|source| source.index_of(byte))
    }

    /// Finds the first `byte` at or after relative offset `from`.
    pub fn index_of_from(&mut self, byte: u8, from: u64) -> BufferResult<Option<u64>> {
        self.reading(|source| source.index_of_from(byte, from))
    }

    /// Finds the first `byte` in the relative range `[from, to)`.
    pub fn index_of_range(&mut self, byte: u8, from: u64, to: u64) -> BufferResult<Option<u64>> {
        self.reading(|source| source.index_of_range(byte, from, to))
    }

    /// Finds `pattern` at or after relative offset `from`.
    pub fn index_of_bytes(&mut self, pattern: &[u8], from: u64) -> BufferResult<Option<u64>> {
        self.reading(|source| source.index_of_bytes(pattern, from))
    }

    /// Finds the first of `targets` at or after relative offset `from`.
    pub fn index_of_element(&mut self, targets: &[u8], from: u64) -> BufferResult<Option<u64>> {
        self.reading(|source| source.index_of_element(targets, from))
    }

    /// Returns true if the bytes at relative `offset` equal `bytes`.
    pub fn range_equals(&mut self, offset: u64, bytes: &[u8]) -> BufferResult<bool> {
        self.reading(|source| source.range_equals(offset, bytes))
    }

    /// Consumes the first of `options` that prefixes the unread data.
    pub fn select(&mut self, options: &Options) -> BufferResult<Option<usize>> {
        self.reading(|source| source.select(options))
    }

    /// Returns a readable stream view. Closing the view closes this store.
    pub fn reader(&mut self) -> StoreReader<'_, S> {
        StoreReader::new(self)
    }

    // Writes

    /// Writes `data`.
    pub fn write(&mut self, data: &[u8]) -> BufferResult<()> {
        self.writing(|sink| sink.write(data))
    }

    /// Writes exactly `count` bytes taken from `reader`.
    pub fn write_from<R: io::Read + ?Sized>(&mut self, reader: &mut R, count: u64) -> BufferResult<()> {
        self.writing(|sink| sink.write_from(reader, count))
    }

    /// Writes everything `reader` yields; returns the byte count.
    pub fn write_all_from<R: io::Read + ?Sized>(&mut self, reader: &mut R) -> BufferResult<u64> {
        self.writing(|sink| sink.write_all_from(reader))
    }

    /// Writes `text` as UTF-8.
    pub fn write_utf8(&mut self, text: &str) -> BufferResult<()> {
        self.writing(|sink| sink.write_utf8(text))
    }

    /// Writes one code point as UTF-8.
    pub fn write_utf8_code_point(&mut self, code_point: char) -> BufferResult<()> {
        self.writing(|sink| sink.write_utf8_code_point(code_point))
    }

    /// Writes one byte.
    pub fn write_byte(&mut self, byte: u8) -> BufferResult<()> {
        self.writing(|sink| sink.write_byte(byte))
    }

    /// Writes a big-endian `i16`.
    pub fn write_i16(&mut self, value: i16) -> BufferResult<()> {
        self.writing(|sink| sink.write_i16(value))
    }

    /// Writes a little-endian `i16`.
    pub fn write_i16_le(&mut self, value: i16) -> BufferResult<()> {
        self.writing(|sink| sink.write_i16_le(value))
    }

    /// Writes a big-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> BufferResult<()> {
        self.writing(|sink| sink.write_i32(value))
    }

    /// Writes a little-endian `i32`.
    pub fn write_i32_le(&mut self, value: i32) -> BufferResult<()> {
        self.writing(|sink| sink.write_i32_le(value))
    }

    /// Writes a big-endian `i64`.
    pub fn write_i64(&mut self, value: i64) -> BufferResult<()> {
        self.writing(|sink| sink.write_i64(value))
    }

    /// Writes a little-endian `i64`.
    pub fn write_i64_le(&mut self, value: i64) -> BufferResult<()> {
        self.writing(|sink| sink.write_i64_le(value))
    }

    /// Writes `value` as decimal text.
    pub fn write_decimal_i64(&mut self, value: i64) -> BufferResult<()> {
        self.writing(|sink| sink.write_decimal_i64(value))
    }

    /// Writes `value` as lowercase hexadecimal text.
    pub fn write_hex_u64(&mut self, value: u64) -> BufferResult<()> {
        self.writing(|sink| sink.write_hex_u64(value))
    }

    /// Writes buffered bytes to the store, without flushing it.
    pub fn emit(&mut self) -> BufferResult<()> {
        self.writing(BufferedSink::emit)
    }

    /// Writes complete buffered segments to the store.
    pub fn emit_complete_segments(&mut self) -> BufferResult<()> {
        self.writing(BufferedSink::emit_complete_segments)
    }

    /// Writes buffered bytes to the store and flushes it.
    pub fn flush(&mut self) -> BufferResult<()> {
        self.writing(BufferedSink::flush)
    }

    /// Returns a writable stream view. Closing the view closes this store.
    pub fn writer(&mut self) -> StoreWriter<'_, S> {
        StoreWriter::new(self)
    }

    // Positioning

    /// Moves the logical position to `position`.
    ///
    /// Pending writes are emitted before the store seeks; unread bytes are
    /// dropped once it has. The mode does not change, and a failed store
    /// seek leaves the logical position where it was.
    ///
    /// # Errors
    ///
    /// Fails with whatever the store reports, e.g.
    /// [`StoreError::SeekPastEnd`] on media that cannot grow sparsely.
    pub fn seek(&mut self, position: u64) -> BufferResult<()> {
        self.ensure_open()?;

        if self.mode == Mode::Write {
            self.sink.emit()?;
        }
        self.source.get_mut().seek(position)?;
        if self.mode == Mode::Read {
            self.source.buffer_mut().clear();
        }
        debug!(position, mode = %self.mode, "seek");
        Ok(())
    }

    /// Moves the logical position by a [`SeekFrom`] and returns it.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::NegativeSeek`] if the target is before the
    /// start of the store.
    pub fn seek_from(&mut self, from: SeekFrom) -> BufferResult<u64> {
        let target = match from {
            SeekFrom::Start(position) => position,
            SeekFrom::Current(_) => resolve_seek(from, self.tell()?, 0)?,
            SeekFrom::End(_) => resolve_seek(from, 0, self.size()?)?,
        };
        self.seek(target)?;
        Ok(target)
    }

    /// Returns the logical position. Has no side effects.
    pub fn tell(&self) -> BufferResult<u64> {
        self.ensure_open()?;

        let physical = self.source.get_ref().tell()?;
        Ok(self
            .mode
            .logical_position(physical, self.buffer().len() as u64))
    }

    /// Returns the store size, counting pending writes.
    pub fn size(&mut self) -> BufferResult<u64> {
        self.ensure_open()?;

        if self.mode == Mode::Write {
            self.sink.emit()?;
        }
        Ok(self.source.get_ref().size()?)
    }

    /// Closes both adapters, current mode first, then the store.
    ///
    /// Every step runs even if an earlier one failed; the first failure is
    /// returned and later ones are logged. Closing twice is a no-op.
    ///
    /// Both adapters sit on a [`StoreHandle`](crate::StoreHandle) whose
    /// `close` does nothing, so from the store's side the order shows only
    /// as pending writes being emitted before the one real close.
    pub fn close(&mut self) -> BufferResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let adapters = match self.mode {
            Mode::Read => [self.source.close(), self.sink.close()],
            Mode::Write => [self.sink.close(), self.source.close()],
        };
        let store = self.store.borrow_mut().close().map_err(BufferError::from);

        let mut first = None;
        for result in adapters.into_iter().chain(std::iter::once(store)) {
            if let Err(err) = result {
                if first.is_none() {
                    first = Some(err);
                } else {
                    warn!(error = %err, "suppressed failure while closing buffered store");
                }
            }
        }

        debug!(mode = %self.mode, failed = first.is_some(), "closed buffered store");
        first.map_or(Ok(()), Err)
    }
}

impl<S: Store> io::Seek for BufferedStore<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seek_from(pos).map_err(Into::into)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        self.tell().map_err(Into::into)
    }
}

impl<S: Store> Drop for BufferedStore<S> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(err) = self.close() {
                warn!(error = %err, "failed to close buffered store on drop");
            }
        }
    }
}

impl<S: Store> fmt::Debug for BufferedStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedStore")
            .field("mode", &self.mode)
            .field("read_buffered", &self.source.buffer().len())
            .field("write_buffered", &self.sink.buffer().len())
            .field("closed", &self.closed)
            .finish()
    }
}
