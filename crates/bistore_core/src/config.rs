//! Buffered store configuration.

/// Default number of bytes fetched per read-ahead fill.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8192;

/// Default write segment size; complete segments are emitted eagerly.
pub const DEFAULT_SEGMENT_SIZE: usize = 8192;

/// Configuration for a buffered store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Bytes requested from the store per read-ahead fill.
    pub read_chunk_size: usize,

    /// Size of a complete write segment. Whenever the write buffer holds at
    /// least one complete segment after a write, those segments are written
    /// to the store.
    pub segment_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            segment_size: DEFAULT_SEGMENT_SIZE,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read-ahead chunk size (at least 1).
    #[must_use]
    pub const fn read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = if size == 0 { 1 } else { size };
        self
    }

    /// Sets the write segment size (at least 1).
    #[must_use]
    pub const fn segment_size(mut self, size: usize) -> Self {
        self.segment_size = if size == 0 { 1 } else { size };
        self
    }
}
