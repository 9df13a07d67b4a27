//! Reference-model checking for buffered stores.
//!
//! [`ModelChecker`] drives a [`BufferedStore`] and a plain byte vector with
//! a cursor through the same operations, asserting after every step that
//! the two agree.

use crate::generators::Op;
use bistore_core::{BufferError, BufferedStore, StoreConfig};
use bistore_storage::{MemoryStore, Store};

/// Runs operations against a buffered store and a trivial model.
pub struct ModelChecker<S: Store> {
    /// The store under test.
    pub store: BufferedStore<S>,
    data: Vec<u8>,
    cursor: usize,
    steps: usize,
}

impl ModelChecker<MemoryStore> {
    /// Creates a checker over a memory store holding `data`.
    pub fn memory(data: &[u8], config: StoreConfig) -> Self {
        Self::new(
            BufferedStore::with_config(MemoryStore::with_data(data.to_vec()), config),
            data,
        )
    }
}

impl<S: Store> ModelChecker<S> {
    /// Creates a checker over `store`, whose medium must hold exactly
    /// `data` with the cursor at 0.
    pub fn new(store: BufferedStore<S>, data: &[u8]) -> Self {
        Self {
            store,
            data: data.to_vec(),
            cursor: 0,
            steps: 0,
        }
    }

    /// Returns the bytes the store is expected to hold.
    pub fn expected(&self) -> &[u8] {
        &self.data
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Applies `op` to both sides and asserts they agree.
    ///
    /// # Panics
    ///
    /// Panics on the first divergence.
    pub fn apply(&mut self, op: &Op) {
        self.steps += 1;
        let step = self.steps;

        match op {
            Op::Read(count) => {
                let count = (*count).min(self.remaining());
                let actual = self
                    .store
                    .read_vec(count as u64)
                    .unwrap_or_else(|e| panic!("step {step}: {op:?} failed: {e}"));
                assert_eq!(
                    actual,
                    &self.data[self.cursor..self.cursor + count],
                    "step {step}: {op:?} returned wrong bytes"
                );
                self.cursor += count;
            }
            Op::ReadByte => {
                let result = self.store.read_byte();
                if self.remaining() == 0 {
                    assert!(
                        matches!(result, Err(BufferError::UnexpectedEof { .. })),
                        "step {step}: read_byte at end gave {result:?}"
                    );
                } else {
                    let byte = result.unwrap_or_else(|e| panic!("step {step}: {op:?} failed: {e}"));
                    assert_eq!(byte, self.data[self.cursor], "step {step}: wrong byte");
                    self.cursor += 1;
                }
            }
            Op::Skip(count) => {
                let count = (*count as usize).min(self.remaining());
                self.store
                    .skip(count as u64)
                    .unwrap_or_else(|e| panic!("step {step}: {op:?} failed: {e}"));
                self.cursor += count;
            }
            Op::Write(bytes) => {
                self.store
                    .write(bytes)
                    .unwrap_or_else(|e| panic!("step {step}: {op:?} failed: {e}"));
                let end = self.cursor + bytes.len();
                if self.data.len() < end {
                    self.data.resize(end, 0);
                }
                self.data[self.cursor..end].copy_from_slice(bytes);
                self.cursor = end;
            }
            Op::Seek(position) => {
                let position = (*position as usize).min(self.data.len());
                self.store
                    .seek(position as u64)
                    .unwrap_or_else(|e| panic!("step {step}: {op:?} failed: {e}"));
                self.cursor = position;
            }
            Op::Flush => {
                self.store
                    .flush()
                    .unwrap_or_else(|e| panic!("step {step}: {op:?} failed: {e}"));
            }
            Op::Tell => {}
            Op::Size => {
                let size = self
                    .store
                    .size()
                    .unwrap_or_else(|e| panic!("step {step}: {op:?} failed: {e}"));
                assert_eq!(size, self.data.len() as u64, "step {step}: wrong size");
            }
        }

        let tell = self
            .store
            .tell()
            .unwrap_or_else(|e| panic!("step {step}: tell failed: {e}"));
        assert_eq!(
            tell, self.cursor as u64,
            "step {step}: position diverged after {op:?}"
        );
    }

    /// Applies every operation in order.
    pub fn run(&mut self, ops: &[Op]) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Reads the whole store back from the start and compares it with the
    /// model, leaving the cursor at the end.
    pub fn verify_contents(&mut self) {
        self.store.seek(0).expect("seek to start failed");
        let actual = self.store.read_to_vec().expect("read back failed");
        assert_eq!(actual, self.data, "store contents diverged from model");
        self.cursor = self.data.len();
    }

    /// Closes the store and returns it with the expected contents.
    pub fn finish(mut self) -> (BufferedStore<S>, Vec<u8>) {
        self.store.close().expect("close failed");
        (self.store, self.data)
    }
}
