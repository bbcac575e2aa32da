//! # Shared Pool
//!
//! A [`Pool`] behind one mutex, for hosts that acquire from several threads.
//!
//! Acquire and return are the only operations that mutate the pool, and
//! each holds the lock for its whole duration. Hooks run under the lock;
//! they only ever see the entity, never the pool, so they cannot deadlock
//! by re-entering it.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::entity::{EntityHandle, Poolable};
use crate::error::PoolResult;
use crate::pool::{Pool, PoolStats};

/// Cloneable, thread-safe handle to a pool.
pub struct SharedPool<T> {
    inner: Arc<Mutex<Pool<T>>>,
}

impl<T> Clone for SharedPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Poolable> SharedPool<T> {
    /// Wraps an already populated pool.
    #[must_use]
    pub fn new(pool: Pool<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// See [`Pool::acquire`].
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`](crate::PoolError::Exhausted) when a capped
    /// pool is full. Never waits for an entity to come back.
    pub fn acquire(&self) -> PoolResult<EntityHandle> {
        self.inner.lock().acquire()
    }

    /// See [`Pool::return_to_pool`].
    ///
    /// # Errors
    ///
    /// Ownership errors from [`Pool::return_to_pool`].
    pub fn return_to_pool(&self, handle: EntityHandle) -> PoolResult<()> {
        self.inner.lock().return_to_pool(handle)
    }

    /// See [`Pool::release`].
    ///
    /// # Errors
    ///
    /// Ownership errors from [`Pool::release`].
    pub fn release(&self, handle: EntityHandle) -> PoolResult<()> {
        self.inner.lock().release(handle)
    }

    /// Runs `f` on a pooled value while holding the lock.
    ///
    /// # Errors
    ///
    /// Ownership errors from [`Pool::get_mut`].
    pub fn with<R>(&self, handle: EntityHandle, f: impl FnOnce(&mut T) -> R) -> PoolResult<R> {
        let mut pool = self.inner.lock();
        Ok(f(pool.get_mut(handle)?))
    }

    /// Snapshot of the pool's counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }

    /// Locks the pool for a batch of operations.
    pub fn lock(&self) -> MutexGuard<'_, Pool<T>> {
        self.inner.lock()
    }
}
