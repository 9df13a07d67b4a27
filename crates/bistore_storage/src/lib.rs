//! # bistore storage
//!
//! Store trait and implementations for bistore.
//!
//! A store is the lowest layer of the stack: a random-access byte
//! resource with a single physical cursor. Stores are **unbuffered** -
//! every call goes straight to the medium. Buffering, and the bookkeeping
//! needed to keep a buffered cursor honest, lives in `bistore_core`.
//!
//! ## Design Principles
//!
//! - One cursor shared by reads and writes
//! - Absolute seeks only; relative seeks are resolved with [`resolve_seek`]
//! - Writes overwrite in place and grow the store at the tail
//! - `close` is idempotent; everything else fails once closed
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral data
//! - [`FileStore`] - For persistent data using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use bistore_storage::{MemoryStore, Store};
//!
//! let mut store = MemoryStore::new();
//! store.write(b"hello world").unwrap();
//! store.seek(6).unwrap();
//!
//! let mut buf = [0u8; 5];
//! let n = store.read(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{resolve_seek, Store};
