//! Cursor Pool
//!
//! Thread-safe cache of reusable objects, used to share a bounded set of read
//! cursors between threads without per-read allocation.
//!
//! ## Contract
//! - `acquire()` never blocks: it pops an idle instance or builds a new one
//!   with the factory
//! - `release(item)` parks the instance for reuse; if the pool is full the
//!   instance is dropped
//! - `drain()` discards every parked instance (store teardown)
//!
//! Ownership of an instance moves through the pool, so the instance itself
//! never needs to be `Sync`.

use crossbeam::queue::ArrayQueue;

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Bounded lock-free object pool with a construction fallback
pub struct CursorPool<T> {
    idle: ArrayQueue<T>,
    factory: Factory<T>,
}

impl<T> CursorPool<T> {
    /// Create a pool holding at most `capacity` idle instances
    ///
    /// # Panics
    /// Panics if `capacity` is zero (rejected earlier by `Config::validate`).
    pub fn new(capacity: usize, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            idle: ArrayQueue::new(capacity),
            factory: Box::new(factory),
        }
    }

    /// Take an idle instance, or build a fresh one
    pub fn acquire(&self) -> T {
        self.idle.pop().unwrap_or_else(|| (self.factory)())
    }

    /// Hand an instance back for reuse
    pub fn release(&self, item: T) {
        if self.idle.push(item).is_err() {
            tracing::trace!("cursor pool full, dropping instance");
        }
    }

    /// Drop every idle instance, returning how many were discarded
    pub fn drain(&self) -> usize {
        let mut drained = 0;
        while self.idle.pop().is_some() {
            drained += 1;
        }
        drained
    }

    /// Number of idle instances currently parked
    pub fn idle(&self) -> usize {
        self.idle.len()
    }

    pub fn capacity(&self) -> usize {
        self.idle.capacity()
    }
}

impl<T> std::fmt::Debug for CursorPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorPool")
            .field("idle", &self.idle())
            .field("capacity", &self.capacity())
            .finish()
    }
}
