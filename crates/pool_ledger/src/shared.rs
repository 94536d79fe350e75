//! Mutex-guarded pool handle
//!
//! Operations are applied one at a time under the lock, so callers on
//! different threads observe each transaction whole or not at all.

use std::sync::{Arc, Mutex, PoisonError};

use crate::{InMemoryBank, PauseSwitch, Pool};

pub struct SharedPool<B = InMemoryBank, G = PauseSwitch> {
    inner: Arc<Mutex<Pool<B, G>>>,
}

impl<B, G> SharedPool<B, G> {
    pub fn new(pool: Pool<B, G>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Apply `op` to the pool while holding the lock
    ///
    /// A poisoned lock is recovered. Each pool operation either commits
    /// whole or rolls back before returning, but if `op` panics between two
    /// of its own calls, the ones that already committed stay applied.
    pub fn with<T>(&self, op: impl FnOnce(&mut Pool<B, G>) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        op(&mut guard)
    }
}

impl<B, G> Clone for SharedPool<B, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
