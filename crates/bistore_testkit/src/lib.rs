//! # bistore testkit
//!
//! Test utilities for bistore.
//!
//! This crate provides:
//! - Fixtures for buffered stores over memory and temporary files
//! - [`ProbeStore`], a store that records calls and injects failures
//! - Property-based test generators using proptest
//! - [`ModelChecker`], which replays operations against a reference model
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bistore_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_probe() {
//!     let (probe, handle) = ProbeStore::new();
//!     let mut store = BufferedStore::new(probe);
//!     store.write(b"abc").unwrap();
//!     store.close().unwrap();
//!     assert_eq!(handle.contents(), b"abc");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod model;
pub mod probe;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::model::*;
    pub use crate::probe::*;
    pub use bistore_core::{BufferError, BufferedStore, Mode, StoreConfig};
    pub use bistore_storage::{FileStore, MemoryStore, Store, StoreError};
}

pub use fixtures::*;
pub use generators::*;
pub use model::*;
pub use probe::*;
