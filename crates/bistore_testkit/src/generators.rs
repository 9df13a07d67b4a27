//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random store contents and operation
//! sequences against a buffered store.

use bistore_core::StoreConfig;
use proptest::prelude::*;

/// One operation against a buffered store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Read up to this many bytes.
    Read(usize),
    /// Read one byte.
    ReadByte,
    /// Skip up to this many bytes.
    Skip(u64),
    /// Write these bytes.
    Write(Vec<u8>),
    /// Seek to this position, clamped to the current size.
    Seek(u64),
    /// Emit pending writes and flush the store.
    Flush,
    /// Query the logical position.
    Tell,
    /// Query the size.
    Size,
}

/// Strategy for generating store contents.
pub fn data_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max_len)
}

/// Strategy for generating non-empty payloads for writes.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..48)
}

/// Strategy for generating a single operation.
pub fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..40).prop_map(Op::Read),
        2 => Just(Op::ReadByte),
        1 => (0u64..24).prop_map(Op::Skip),
        3 => payload_strategy().prop_map(Op::Write),
        2 => (0u64..256).prop_map(Op::Seek),
        1 => Just(Op::Flush),
        1 => Just(Op::Tell),
        1 => Just(Op::Size),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn op_sequence_strategy(min_ops: usize, max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), min_ops..max_ops)
}

/// Strategy for a buffer size, biased towards tiny values.
pub fn buffer_size_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![3 => 1usize..8, 1 => 8usize..64, 1 => Just(8192usize)]
}

/// Strategy for store configurations with independent buffer sizes.
pub fn config_strategy() -> impl Strategy<Value = StoreConfig> {
    (buffer_size_strategy(), buffer_size_strategy()).prop_map(|(chunk, segment)| {
        StoreConfig::new()
            .read_chunk_size(chunk)
            .segment_size(segment)
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
