//! Shared, non-owning store handle.

use bistore_storage::{Store, StoreResult};
use std::cell::RefCell;
use std::rc::Rc;

/// A handle onto a store shared by several adapters.
///
/// Every call is forwarded to the shared store except [`Store::close`],
/// which does nothing: the handle does not own the medium, whoever created
/// the shared cell closes it. Handles are single-threaded (`!Send`).
#[derive(Debug)]
pub struct StoreHandle<S> {
    inner: Rc<RefCell<S>>,
}

impl<S> StoreHandle<S> {
    /// Creates a handle onto `inner`.
    pub fn new(inner: Rc<RefCell<S>>) -> Self {
        Self { inner }
    }
}

impl<S> Clone for StoreHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Store> Store for StoreHandle<S> {
    fn read(&mut self, buf: &mut [u8]) -> StoreResult<usize> {
        self.inner.borrow_mut().read(buf)
    }

    fn write(&mut self, data: &[u8]) -> StoreResult<()> {
        self.inner.borrow_mut().write(data)
    }

    fn flush(&mut self) -> StoreResult<()> {
        self.inner.borrow_mut().flush()
    }

    fn seek(&mut self, position: u64) -> StoreResult<()> {
        self.inner.borrow_mut().seek(position)
    }

    fn tell(&self) -> StoreResult<u64> {
        self.inner.borrow().tell()
    }

    fn size(&self) -> StoreResult<u64> {
        self.inner.borrow().size()
    }

    fn close(&mut self) -> StoreResult<()> {
        Ok(())
    }
}
