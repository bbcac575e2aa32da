//! # Entity Pool
//!
//! Free-list pool for entities that are spawned and despawned all the time.

use std::fmt;

use crate::entity::{EntityHandle, PoolId, PoolLink, Poolable};
use crate::error::{PoolError, PoolResult};
use crate::math::Transform;

/// One pooled entity: the user value plus its pooling state and placement.
struct Slot<T> {
    value: T,
    link: PoolLink,
    transform: Transform,
}

/// Snapshot of a pool's bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Entities ever created by the pool, active or not.
    pub live: usize,
    /// Entities waiting in the available set.
    pub available: usize,
    /// Entities currently handed out.
    pub active: usize,
    /// The cap, if the pool is bounded.
    pub max_capacity: Option<usize>,
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "live={} available={} active={}", self.live, self.available, self.active)?;
        match self.max_capacity {
            Some(max) => write!(f, " max={max}"),
            None => write!(f, " max=unbounded"),
        }
    }
}

/// A pool of recyclable entities of one prototype.
///
/// Entities are created by the pool's factory, either eagerly by
/// [`populate`](Self::populate) or on demand by [`acquire`](Self::acquire)
/// while the pool is below its cap. They are never freed until the pool
/// itself is dropped.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use [`SharedPool`](crate::SharedPool)
/// when several threads acquire from the same pool.
pub struct Pool<T> {
    id: PoolId,
    prototype: String,
    factory: Box<dyn FnMut() -> T + Send>,
    slots: Vec<Slot<T>>,
    /// Indices of inactive slots. Order is irrelevant.
    available: Vec<u32>,
    max_capacity: Option<usize>,
    spawn_transform: Transform,
}

impl<T: Poolable> Pool<T> {
    /// Creates an empty, unbounded pool.
    ///
    /// Nothing is allocated until [`populate`](Self::populate) or the first
    /// [`acquire`](Self::acquire).
    ///
    /// Every pool gets a fresh, process-wide unique [`PoolId`].
    ///
    /// # Arguments
    ///
    /// * `prototype` - Name of the kind of entity this pool produces
    /// * `factory` - Creates a fresh entity
    #[must_use]
    pub fn new<F>(prototype: impl Into<String>, factory: F) -> Self
    where
        F: FnMut() -> T + Send + 'static,
    {
        Self {
            id: PoolId::next(),
            prototype: prototype.into(),
            factory: Box::new(factory),
            slots: Vec::new(),
            available: Vec::new(),
            max_capacity: None,
            spawn_transform: Transform::IDENTITY,
        }
    }

    /// Sets the placement every entity receives on acquisition.
    #[must_use]
    pub fn with_spawn_transform(mut self, transform: Transform) -> Self {
        self.spawn_transform = transform;
        self
    }

    /// Eagerly creates `start_count` inactive entities.
    ///
    /// # Errors
    ///
    /// [`PoolError::SlotOverflow`] if the pool would outgrow the `u32`
    /// handle index. Entities created before the overflow stay available.
    pub fn populate(&mut self, start_count: usize) -> PoolResult<()> {
        self.slots.reserve(start_count);
        self.available.reserve(start_count);

        for _ in 0..start_count {
            let index = self.spawn_entity()?;
            self.available.push(index);
        }

        tracing::info!(
            "Pool '{}' ({}) populated with {} entities",
            self.prototype,
            self.id,
            start_count
        );
        Ok(())
    }

    /// Eagerly creates `start_count` entities and caps the pool at
    /// `max_capacity` live entities.
    ///
    /// `start_count <= max_capacity` is the caller's contract; configuration
    /// validation enforces it before this is reached.
    ///
    /// # Errors
    ///
    /// Same as [`populate`](Self::populate).
    pub fn populate_with_cap(&mut self, start_count: usize, max_capacity: usize) -> PoolResult<()> {
        debug_assert!(
            start_count <= max_capacity,
            "start count {start_count} exceeds max capacity {max_capacity}"
        );
        self.max_capacity = Some(max_capacity);
        self.populate(start_count)
    }

    /// Hands out an entity.
    ///
    /// Reuses a free entity when there is one, otherwise creates a new one
    /// if the pool is unbounded or below its cap. The entity is activated
    /// and reset to the spawn transform.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] if the pool is capped, full, and has no
    /// free entity. [`PoolError::SlotOverflow`] if an unbounded pool has
    /// run out of addressable slots.
    pub fn acquire(&mut self) -> PoolResult<EntityHandle> {
        let index = match self.available.pop() {
            Some(index) => index,
            None => {
                if let Some(max) = self.max_capacity {
                    if self.slots.len() >= max {
                        tracing::warn!("Pool '{}' exhausted at {} entities", self.prototype, max);
                        return Err(PoolError::Exhausted {
                            prototype: self.prototype.clone(),
                            max_capacity: max,
                        });
                    }
                }
                let index = self.spawn_entity()?;
                tracing::debug!(
                    "Pool '{}' grew to {} entities",
                    self.prototype,
                    self.slots.len()
                );
                index
            }
        };

        let spawn = self.spawn_transform;
        let slot = &mut self.slots[index as usize];
        slot.link.reactivate_from_pool(&mut slot.value);
        slot.transform = spawn;

        Ok(EntityHandle::new(self.id, index))
    }

    /// Returns an entity to the pool: the caller-facing path.
    ///
    /// Does nothing if the entity is already pooled. Otherwise fires
    /// [`Poolable::on_return_to_pool`] while the entity is still active,
    /// then releases it.
    ///
    /// # Errors
    ///
    /// [`PoolError::Mismatch`] if the entity belongs to another pool,
    /// [`PoolError::UnknownEntity`] if this pool never created it.
    pub fn return_to_pool(&mut self, handle: EntityHandle) -> PoolResult<()> {
        let slot = self.slot_mut(handle)?;
        if !slot.link.prepare_return(&mut slot.value) {
            return Ok(());
        }
        self.release(handle)
    }

    /// Puts an entity back in the available set: the pool-side half of
    /// [`return_to_pool`](Self::return_to_pool). No hook fires.
    ///
    /// Releasing an entity that is already available is a no-op.
    ///
    /// # Errors
    ///
    /// [`PoolError::Mismatch`] if the entity belongs to another pool,
    /// [`PoolError::UnknownEntity`] if this pool never created it.
    pub fn release(&mut self, handle: EntityHandle) -> PoolResult<()> {
        let slot = self.slot_mut(handle)?;
        if !slot.link.is_active() {
            return Ok(());
        }
        slot.link.mark_pooled();
        self.available.push(handle.index());
        Ok(())
    }

    /// Returns every active entity to the pool, firing hooks.
    ///
    /// Returns the number of entities returned.
    pub fn return_all(&mut self) -> usize {
        let mut returned = 0;
        for (index, slot) in (0_u32..).zip(self.slots.iter_mut()) {
            if slot.link.prepare_return(&mut slot.value) {
                slot.link.mark_pooled();
                self.available.push(index);
                returned += 1;
            }
        }
        returned
    }
}

impl<T> Pool<T> {
    /// Identifier of this pool.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Name of the kind of entity this pool produces.
    #[inline]
    #[must_use]
    pub fn prototype(&self) -> &str {
        &self.prototype
    }

    /// The cap, if the pool is bounded.
    #[inline]
    #[must_use]
    pub const fn max_capacity(&self) -> Option<usize> {
        self.max_capacity
    }

    /// Number of entities ever created by this pool.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of entities waiting to be acquired.
    #[inline]
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Number of entities currently handed out.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.len() - self.available.len()
    }

    /// The placement applied on acquisition.
    #[inline]
    #[must_use]
    pub const fn spawn_transform(&self) -> Transform {
        self.spawn_transform
    }

    /// Snapshot of the pool's counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            live: self.live_count(),
            available: self.available_count(),
            active: self.active_count(),
            max_capacity: self.max_capacity,
        }
    }

    /// Whether the entity is currently handed out.
    ///
    /// # Errors
    ///
    /// Same ownership errors as [`get`](Self::get).
    pub fn is_active(&self, handle: EntityHandle) -> PoolResult<bool> {
        Ok(self.slot(handle)?.link.is_active())
    }

    /// The pooling state of an entity.
    ///
    /// # Errors
    ///
    /// Same ownership errors as [`get`](Self::get).
    pub fn link(&self, handle: EntityHandle) -> PoolResult<PoolLink> {
        Ok(self.slot(handle)?.link)
    }

    /// Gets a reference to a pooled value.
    ///
    /// # Errors
    ///
    /// [`PoolError::Mismatch`] if the entity belongs to another pool,
    /// [`PoolError::UnknownEntity`] if this pool never created it.
    pub fn get(&self, handle: EntityHandle) -> PoolResult<&T> {
        Ok(&self.slot(handle)?.value)
    }

    /// Gets a mutable reference to a pooled value.
    ///
    /// # Errors
    ///
    /// Same ownership errors as [`get`](Self::get).
    pub fn get_mut(&mut self, handle: EntityHandle) -> PoolResult<&mut T> {
        Ok(&mut self.slot_mut(handle)?.value)
    }

    /// Placement of an entity.
    ///
    /// # Errors
    ///
    /// Same ownership errors as [`get`](Self::get).
    pub fn transform(&self, handle: EntityHandle) -> PoolResult<Transform> {
        Ok(self.slot(handle)?.transform)
    }

    /// Mutable placement of an entity.
    ///
    /// # Errors
    ///
    /// Same ownership errors as [`get`](Self::get).
    pub fn transform_mut(&mut self, handle: EntityHandle) -> PoolResult<&mut Transform> {
        Ok(&mut self.slot_mut(handle)?.transform)
    }

    /// Iterates over the handles of all active entities.
    pub fn active_handles(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        let id = self.id;
        (0_u32..)
            .zip(self.slots.iter())
            .filter(|(_, slot)| slot.link.is_active())
            .map(move |(index, _)| EntityHandle::new(id, index))
    }

    /// Creates and binds a new inactive entity, returning its index.
    fn spawn_entity(&mut self) -> PoolResult<u32> {
        let index = u32::try_from(self.slots.len()).map_err(|_| PoolError::SlotOverflow {
            prototype: self.prototype.clone(),
        })?;

        let mut link = PoolLink::new();
        link.bind_to_pool(self.id);

        self.slots.push(Slot {
            value: (self.factory)(),
            link,
            transform: self.spawn_transform,
        });
        Ok(index)
    }

    fn check_owner(&self, handle: EntityHandle) -> PoolResult<usize> {
        if handle.pool() != self.id {
            tracing::warn!(
                "Pool '{}' ({}) refused entity {} bound to pool {}",
                self.prototype,
                self.id,
                handle.index(),
                handle.pool()
            );
            return Err(PoolError::Mismatch {
                expected: self.id,
                found: handle.pool(),
            });
        }
        let index = handle.index() as usize;
        if index >= self.slots.len() {
            return Err(PoolError::UnknownEntity {
                pool: self.id,
                index: handle.index(),
            });
        }
        Ok(index)
    }

    fn slot(&self, handle: EntityHandle) -> PoolResult<&Slot<T>> {
        let index = self.check_owner(handle)?;
        Ok(&self.slots[index])
    }

    fn slot_mut(&mut self, handle: EntityHandle) -> PoolResult<&mut Slot<T>> {
        let index = self.check_owner(handle)?;
        Ok(&mut self.slots[index])
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id)
            .field("prototype", &self.prototype)
            .field("stats", &self.stats())
            .field("spawn_transform", &self.spawn_transform)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug)]
    struct Shell {
        pooled: u32,
        unpooled: u32,
    }

    impl Poolable for Shell {
        fn on_return_to_pool(&mut self) {
            self.pooled += 1;
        }

        fn on_return_from_pool(&mut self) {
            self.unpooled += 1;
        }
    }

    fn pool() -> Pool<Shell> {
        Pool::new("shell", Shell::default)
    }

    #[test]
    fn test_populate_parks_inactive_entities() {
        let mut pool = pool();
        pool.populate(4).unwrap();

        assert_eq!(pool.live_count(), 4);
        assert_eq!(pool.available_count(), 4);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.max_capacity(), None);
    }

    #[test]
    fn test_acquire_reuses_before_growing() {
        let mut pool = pool();
        pool.populate(1).unwrap();

        let h1 = pool.acquire().unwrap();
        pool.return_to_pool(h1).unwrap();
        let h2 = pool.acquire().unwrap();

        assert_eq!(h1, h2); // Same slot reused
        assert_eq!(pool.live_count(), 1);
    }

    #[test]
    fn test_capped_pool_exhausts() {
        let mut pool = pool();
        pool.populate_with_cap(1, 2).unwrap();

        let _first = pool.acquire().unwrap();
        let _second = pool.acquire().unwrap();
        let err = pool.acquire().unwrap_err();

        assert_eq!(
            err,
            PoolError::Exhausted {
                prototype: "shell".to_string(),
                max_capacity: 2,
            }
        );
        assert_eq!(pool.live_count(), 2);
    }

    #[test]
    fn test_double_return_is_noop() {
        let mut pool = pool();
        pool.populate(2).unwrap();

        let handle = pool.acquire().unwrap();
        pool.return_to_pool(handle).unwrap();
        pool.return_to_pool(handle).unwrap();

        assert_eq!(pool.available_count(), 2);
        assert_eq!(pool.get(handle).unwrap().pooled, 1);
    }

    #[test]
    fn test_hooks_follow_activation_history() {
        let mut pool = pool();
        pool.populate(1).unwrap();

        let handle = pool.acquire().unwrap();
        assert_eq!(pool.get(handle).unwrap().unpooled, 0);

        pool.return_to_pool(handle).unwrap();
        let again = pool.acquire().unwrap();
        assert_eq!(again, handle);
        assert_eq!(pool.get(handle).unwrap().unpooled, 1);
        assert_eq!(pool.get(handle).unwrap().pooled, 1);
    }

    #[test]
    fn test_release_skips_hook() {
        let mut pool = pool();
        pool.populate(1).unwrap();

        let handle = pool.acquire().unwrap();
        pool.release(handle).unwrap();

        assert!(!pool.is_active(handle).unwrap());
        assert_eq!(pool.available_count(), 1);
        assert_eq!(pool.get(handle).unwrap().pooled, 0);
    }

    #[test]
    fn test_foreign_handle_is_mismatch() {
        let mut a = pool();
        let mut b = pool();
        a.populate(1).unwrap();
        b.populate(1).unwrap();

        let handle = a.acquire().unwrap();
        let err = b.return_to_pool(handle).unwrap_err();

        assert_eq!(
            err,
            PoolError::Mismatch {
                expected: b.id(),
                found: a.id(),
            }
        );
        assert_eq!(b.available_count(), 1);
        assert!(a.is_active(handle).unwrap());
    }

    #[test]
    fn test_identical_pools_keep_entities_apart() {
        let mut a = pool();
        let mut b = pool();
        a.populate(1).unwrap();
        b.populate(1).unwrap();
        assert_ne!(a.id(), b.id());

        let from_a = a.acquire().unwrap();
        let from_b = b.acquire().unwrap();
        assert_eq!(from_a.index(), from_b.index());

        assert!(matches!(b.return_to_pool(from_a), Err(PoolError::Mismatch { .. })));
        assert!(matches!(b.release(from_a), Err(PoolError::Mismatch { .. })));

        // b's own entity in the same slot is untouched.
        assert!(b.is_active(from_b).unwrap());
        assert_eq!(b.available_count(), 0);
        assert_eq!(b.get(from_b).unwrap().pooled, 0);
    }

    #[test]
    fn test_unknown_index() {
        let mut pool = pool();
        pool.populate(1).unwrap();

        let err = pool.get(EntityHandle::new(pool.id(), 9)).unwrap_err();
        assert_eq!(err, PoolError::UnknownEntity { pool: pool.id(), index: 9 });
    }

    #[test]
    fn test_slot_overflow_message() {
        let err = PoolError::SlotOverflow {
            prototype: "shell".to_string(),
        };
        assert_eq!(
            err.to_string(),
            format!("pool 'shell' cannot address more than {} entities", u32::MAX)
        );
    }

    #[test]
    fn test_acquire_resets_transform() {
        use crate::math::Vec3;

        let spawn = Transform::from_position(Vec3::new(0.0, 5.0, 0.0));
        let mut pool = pool().with_spawn_transform(spawn);
        pool.populate(1).unwrap();

        let handle = pool.acquire().unwrap();
        pool.transform_mut(handle).unwrap().position = Vec3::new(9.0, 9.0, 9.0);
        pool.return_to_pool(handle).unwrap();

        let handle = pool.acquire().unwrap();
        assert_eq!(pool.transform(handle).unwrap(), spawn);
    }

    #[test]
    fn test_return_all() {
        let mut pool = pool();
        pool.populate(2).unwrap();

        let _a = pool.acquire().unwrap();
        let _b = pool.acquire().unwrap();
        let _c = pool.acquire().unwrap();
        assert_eq!(pool.active_handles().count(), 3);

        assert_eq!(pool.return_all(), 3);
        assert_eq!(pool.available_count(), 3);
        assert_eq!(pool.active_handles().count(), 0);
    }

    #[test]
    fn test_stats_display() {
        let mut pool = pool();
        pool.populate_with_cap(2, 4).unwrap();
        let _ = pool.acquire().unwrap();

        let stats = pool.stats();
        assert_eq!(stats.active, 1);
        assert_eq!(stats.to_string(), "live=2 available=1 active=1 max=4");
    }
}
