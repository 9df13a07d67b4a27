//! An instrumented store that records calls and injects failures.
//!
//! [`ProbeStore`] keeps its data in a [`MemoryStore`] behind shared state,
//! so a [`ProbeHandle`] can inspect the call log and the data even after
//! the store itself was moved into (and dropped with) a buffered store.

use bistore_storage::{MemoryStore, Store, StoreError, StoreResult};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io;
use std::sync::Arc;

/// One recorded call on a [`ProbeStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// A read that asked for `requested` bytes and got `returned`.
    Read {
        /// Size of the caller's buffer.
        requested: usize,
        /// Bytes actually returned.
        returned: usize,
    },
    /// A write of these bytes at `position`.
    Write {
        /// Store cursor before the write.
        position: u64,
        /// The bytes written.
        data: Vec<u8>,
    },
    /// A seek to this position.
    Seek(u64),
    /// A flush.
    Flush,
    /// A close.
    Close,
}

/// A store operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// `read` fails.
    Read,
    /// `write` fails.
    Write,
    /// `seek` fails.
    Seek,
    /// `flush` fails.
    Flush,
    /// `close` fails.
    Close,
}

impl Fault {
    fn error(self) -> StoreError {
        StoreError::Io(io::Error::other(format!("injected {self:?} failure")))
    }
}

#[derive(Debug)]
struct ProbeState {
    store: MemoryStore,
    events: Vec<ProbeEvent>,
    faults: HashSet<Fault>,
}

impl ProbeState {
    fn check(&self, fault: Fault) -> StoreResult<()> {
        if self.faults.contains(&fault) {
            return Err(fault.error());
        }
        Ok(())
    }
}

/// A memory-backed store that records every mutating call.
///
/// Failed writes, seeks and flushes are recorded too, as is every close.
#[derive(Debug)]
pub struct ProbeStore {
    state: Arc<Mutex<ProbeState>>,
}

impl ProbeStore {
    /// Creates an empty probe and a handle onto it.
    pub fn new() -> (Self, ProbeHandle) {
        Self::with_data(Vec::new())
    }

    /// Creates a probe holding `data` and a handle onto it.
    pub fn with_data(data: Vec<u8>) -> (Self, ProbeHandle) {
        let state = Arc::new(Mutex::new(ProbeState {
            store: MemoryStore::with_data(data),
            events: Vec::new(),
            faults: HashSet::new(),
        }));
        let handle = ProbeHandle {
            state: Arc::clone(&state),
        };
        (Self { state }, handle)
    }
}

impl Store for ProbeStore {
    fn read(&mut self, buf: &mut [u8]) -> StoreResult<usize> {
        let mut state = self.state.lock();
        state.check(Fault::Read)?;
        let returned = state.store.read(buf)?;
        state.events.push(ProbeEvent::Read {
            requested: buf.len(),
            returned,
        });
        Ok(returned)
    }

    fn write(&mut self, data: &[u8]) -> StoreResult<()> {
        let mut state = self.state.lock();
        let position = state.store.tell()?;
        state.events.push(ProbeEvent::Write {
            position,
            data: data.to_vec(),
        });
        state.check(Fault::Write)?;
        state.store.write(data)
    }

    fn flush(&mut self) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.events.push(ProbeEvent::Flush);
        state.check(Fault::Flush)?;
        state.store.flush()
    }

    fn seek(&mut self, position: u64) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.events.push(ProbeEvent::Seek(position));
        state.check(Fault::Seek)?;
        state.store.seek(position)
    }

    fn tell(&self) -> StoreResult<u64> {
        self.state.lock().store.tell()
    }

    fn size(&self) -> StoreResult<u64> {
        self.state.lock().store.size()
    }

    fn close(&mut self) -> StoreResult<()> {
        let mut state = self.state.lock();
        state.events.push(ProbeEvent::Close);
        let result = state.check(Fault::Close);
        // The medium is released even when close reports a failure.
        state.store.close()?;
        result
    }
}

/// Inspects and steers a [`ProbeStore`] from the outside.
#[derive(Debug, Clone)]
pub struct ProbeHandle {
    state: Arc<Mutex<ProbeState>>,
}

impl ProbeHandle {
    /// Returns every recorded call, oldest first.
    pub fn events(&self) -> Vec<ProbeEvent> {
        self.state.lock().events.clone()
    }

    /// Returns the recorded writes as `(position, data)` pairs.
    pub fn writes(&self) -> Vec<(u64, Vec<u8>)> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                ProbeEvent::Write { position, data } => Some((*position, data.clone())),
                _ => None,
            })
            .collect()
    }

    /// Returns how many times `close` was called.
    pub fn close_count(&self) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|event| **event == ProbeEvent::Close)
            .count()
    }

    /// Forgets the recorded calls.
    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    /// Makes `fault` fail from now on.
    pub fn fail(&self, fault: Fault) {
        self.state.lock().faults.insert(fault);
    }

    /// Stops `fault` from failing.
    pub fn heal(&self, fault: Fault) {
        self.state.lock().faults.remove(&fault);
    }

    /// Returns a copy of the stored data.
    pub fn contents(&self) -> Vec<u8> {
        self.state.lock().store.contents()
    }

    /// Returns true once the probe was closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().store.is_closed()
    }
}
