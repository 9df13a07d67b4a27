//! # bistore core
//!
//! Buffered, bidirectional access to a seekable store.
//!
//! [`BufferedStore`] lets one handle mix buffered reads, buffered writes
//! and seeks over a single [`bistore_storage::Store`]. It owns a read-ahead
//! adapter ([`BufferedSource`]) and a write-behind adapter
//! ([`BufferedSink`]) that share the store's one cursor, and keeps them
//! consistent by switching [`Mode`] before every operation:
//!
//! - entering write mode drops unread read-ahead bytes and rewinds the
//!   store over them
//! - entering read mode emits pending writes
//!
//! The adapters are usable on their own over any store.
//!
//! ## Example
//!
//! ```rust
//! use bistore_core::BufferedStore;
//! use bistore_storage::MemoryStore;
//!
//! let mut store = BufferedStore::new(MemoryStore::with_data(b"0123456789".to_vec()));
//!
//! // Reading fetches ahead...
//! assert_eq!(store.read_vec(3).unwrap(), b"012");
//! // ...but a write still lands right after what was read.
//! store.write(b"ab").unwrap();
//! assert_eq!(store.tell().unwrap(), 5);
//!
//! store.seek(0).unwrap();
//! assert_eq!(store.read_utf8().unwrap(), "012ab56789");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod config;
mod error;
mod handle;
mod mode;
mod options;
mod sink;
mod source;
mod store;
mod stream;

pub use buffer::Buffer;
pub use config::{StoreConfig, DEFAULT_READ_CHUNK_SIZE, DEFAULT_SEGMENT_SIZE};
pub use error::{BufferError, BufferResult};
pub use handle::StoreHandle;
pub use mode::Mode;
pub use options::Options;
pub use sink::BufferedSink;
pub use source::BufferedSource;
pub use store::BufferedStore;
pub use stream::{StoreReader, StoreWriter};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
