//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A relative seek resolved to a position before the start of the store.
    #[error("seek before start of store: base {base}, offset {offset}")]
    NegativeSeek {
        /// The position the offset was applied to.
        base: u64,
        /// The requested relative offset.
        offset: i64,
    },

    /// The medium cannot address positions past its current length.
    #[error("seek past end of store: position {position}, size {size}")]
    SeekPastEnd {
        /// The requested position.
        position: u64,
        /// The current store size.
        size: u64,
    },

    /// A write would extend the medium past what it can hold.
    #[error("write too large for store: position {position}, length {len}")]
    TooLarge {
        /// The position the write started at.
        position: u64,
        /// The number of bytes in the write.
        len: usize,
    },

    /// The store is closed.
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    /// Returns true for bounds violations, which are never worth retrying.
    #[must_use]
    pub fn is_bounds(&self) -> bool {
        matches!(
            self,
            Self::NegativeSeek { .. } | Self::SeekPastEnd { .. } | Self::TooLarge { .. }
        )
    }
}

impl From<StoreError> for io::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => e,
            StoreError::NegativeSeek { .. }
            | StoreError::SeekPastEnd { .. }
            | StoreError::TooLarge { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            StoreError::Closed => io::Error::new(io::ErrorKind::NotConnected, err),
        }
    }
}
