//! Buffering mode of a [`crate::BufferedStore`].

use std::fmt;

/// Which buffer currently owns the store's cursor.
///
/// Exactly one is active; the other buffer is always empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Read-ahead buffering. The store cursor is ahead of the caller.
    #[default]
    Read,
    /// Write-behind buffering. The store cursor is behind the caller.
    Write,
}

impl Mode {
    /// Returns the logical position for physical cursor `physical` and
    /// `buffered` bytes in the active buffer.
    #[must_use]
    pub fn logical_position(self, physical: u64, buffered: u64) -> u64 {
        match self {
            Self::Read => physical.saturating_sub(buffered),
            Self::Write => physical.saturating_add(buffered),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}
