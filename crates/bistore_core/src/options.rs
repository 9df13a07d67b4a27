//! Byte-string options for prefix selection.

use bytes::Bytes;

/// An ordered set of byte strings to match against the head of a source.
///
/// See [`crate::BufferedSource::select`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    entries: Vec<Bytes>,
}

impl Options {
    /// Creates options from byte strings, keeping their order.
    pub fn new<I, B>(entries: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates options from UTF-8 strings.
    pub fn from_strs(entries: &[&str]) -> Self {
        Self::new(entries.iter().map(|s| Bytes::copy_from_slice(s.as_bytes())))
    }

    /// Returns the number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the option at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.entries.get(index).map(|b| &b[..])
    }

    /// Iterates over the options in order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|b| &b[..])
    }
}
