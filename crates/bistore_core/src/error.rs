//! Error types for buffered store operations.

use bistore_storage::StoreError;
use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Result type for buffered operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur in buffered read/write operations.
///
/// Failures of the underlying store are carried unchanged in
/// [`BufferError::Store`].
#[derive(Debug, Error)]
pub enum BufferError {
    /// Store error, passed through as-is.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store ran out of data before the requested amount was available.
    #[error("unexpected end of store: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        /// Bytes the operation required.
        needed: u64,
        /// Bytes that could be buffered.
        available: u64,
    },

    /// Text could not be parsed as a number.
    #[error("number format: {message}")]
    NumberFormat {
        /// Description of the problem.
        message: String,
    },

    /// No line terminator within the permitted length, or before the end
    /// of the store.
    #[error("\\n not found: limit={limit} content={content}")]
    MissingNewline {
        /// Bytes scanned before giving up.
        limit: u64,
        /// Hex of the scanned prefix (at most 32 bytes).
        content: String,
    },

    /// Bytes were not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// I/O error from a caller-supplied reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BufferError {
    /// Creates an end-of-store error.
    pub fn eof(needed: u64, available: u64) -> Self {
        Self::UnexpectedEof { needed, available }
    }

    /// Creates a number format error.
    pub fn number_format(message: impl Into<String>) -> Self {
        Self::NumberFormat {
            message: message.into(),
        }
    }

    /// Returns true if the error means the store is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Store(StoreError::Closed))
    }
}

impl From<BufferError> for io::Error {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::Store(e) => e.into(),
            BufferError::Io(e) => e,
            BufferError::UnexpectedEof { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            BufferError::NumberFormat { .. }
            | BufferError::MissingNewline { .. }
            | BufferError::InvalidUtf8(_) => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_display_unchanged() {
        let inner = StoreError::SeekPastEnd {
            position: 9,
            size: 3,
        };
        let expected = inner.to_string();
        let err = BufferError::from(inner);
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn closed_is_detected_through_wrapper() {
        assert!(BufferError::from(StoreError::Closed).is_closed());
        assert!(!BufferError::eof(1, 0).is_closed());
    }

    #[test]
    fn eof_maps_to_io_unexpected_eof() {
        let io_err: io::Error = BufferError::eof(4, 1).into();
        assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn store_io_error_survives_round_trip_to_io() {
        let err = BufferError::from(StoreError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "gone",
        )));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
    }
}
