//! # Entity Protocol
//!
//! A pooled entity is a slot inside its pool, addressed by an
//! [`EntityHandle`]. Each slot carries a [`PoolLink`] with three flags:
//! - which pool it is bound to (set once, never changed)
//! - whether it is currently active (handed out to a caller)
//! - whether it has ever been activated before
//!
//! The pool owns the entity. The entity only knows its pool by [`PoolId`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next identity handed to a pool. Process-wide, never reused.
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a pool, unique for the whole process.
///
/// Only the crate mints these, one per [`Pool`](crate::Pool), so two
/// pools never share an identity and a handle can only ever pass the
/// ownership check of the pool that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PoolId(u64);

impl PoolId {
    /// Mints a fresh identity.
    pub(crate) fn next() -> Self {
        Self(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a pooled entity.
///
/// Handles stay valid for the lifetime of the pool: entities are recycled,
/// never freed, so an index is never reused for a different entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    pool: PoolId,
    index: u32,
}

impl EntityHandle {
    /// Creates a handle from its parts.
    ///
    /// Pools hand these out from `acquire`; building one by hand is only
    /// useful for hosts that serialize handles. The pool still checks the
    /// index on every use.
    #[inline]
    #[must_use]
    pub const fn new(pool: PoolId, index: u32) -> Self {
        Self { pool, index }
    }

    /// The pool this entity is bound to.
    #[inline]
    #[must_use]
    pub const fn pool(self) -> PoolId {
        self.pool
    }

    /// Slot index inside the owning pool.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

/// Lifecycle hooks of a poolable object.
///
/// Both hooks default to no-ops. They receive the object only, never the
/// pool, so a hook cannot re-enter the pool that is running it.
pub trait Poolable {
    /// Fires right before the entity goes back into the available set.
    ///
    /// The entity is still active while this runs.
    fn on_return_to_pool(&mut self) {}

    /// Fires when a previously used entity is handed out again.
    ///
    /// Never fires on an entity's first activation.
    fn on_return_from_pool(&mut self) {}
}

/// Pooling state of one entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolLink {
    owning_pool: Option<PoolId>,
    active: bool,
    spawned_before: bool,
}

impl PoolLink {
    /// Creates an unbound, inactive link.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            owning_pool: None,
            active: false,
            spawned_before: false,
        }
    }

    /// Binds this entity to `pool`.
    ///
    /// Only the first call takes effect; later calls are ignored.
    /// Returns whether this call performed the binding.
    pub fn bind_to_pool(&mut self, pool: PoolId) -> bool {
        if self.owning_pool.is_some() {
            return false;
        }
        self.owning_pool = Some(pool);
        true
    }

    /// The pool this entity is bound to, if any.
    #[inline]
    #[must_use]
    pub const fn owning_pool(&self) -> Option<PoolId> {
        self.owning_pool
    }

    /// Whether the entity is currently handed out.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the entity has been activated at least once.
    #[inline]
    #[must_use]
    pub const fn spawned_before(&self) -> bool {
        self.spawned_before
    }

    /// Marks the entity active, firing [`Poolable::on_return_from_pool`]
    /// on every activation except the first.
    pub fn reactivate_from_pool<T: Poolable>(&mut self, value: &mut T) {
        if self.spawned_before {
            value.on_return_from_pool();
        } else {
            self.spawned_before = true;
        }
        self.active = true;
    }

    /// Runs the "about to be pooled" hook if the entity is active.
    ///
    /// Returns `false` (and does nothing) for an inactive entity.
    pub(crate) fn prepare_return<T: Poolable>(&mut self, value: &mut T) -> bool {
        if !self.active {
            return false;
        }
        value.on_return_to_pool();
        true
    }

    #[inline]
    pub(crate) fn mark_pooled(&mut self) {
        self.active = false;
    }
}
