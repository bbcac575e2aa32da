//! # Pool Registry
//!
//! Holds one pool per configured prototype. The installer must run before
//! anything acquires: a registry only knows the pools it was built with.
//!
//! Handles carry their [`PoolId`], so returning an entity never needs its
//! prototype name. A handle minted by a pool outside this registry is
//! rejected as [`InstallError::UnknownPool`].

use std::collections::HashMap;
use std::fmt;

use reclaim_core::{EntityHandle, Pool, PoolId, PoolStats, Poolable, Transform};

use crate::catalog::PrototypeCatalog;
use crate::config::{InstallerConfig, PoolSpec};
use crate::error::{InstallError, InstallResult};

/// Named pools built from configuration.
pub struct PoolRegistry<T> {
    pools: Vec<Pool<T>>,
    by_prototype: HashMap<String, usize>,
    by_id: HashMap<PoolId, usize>,
}

impl<T: Poolable + 'static> PoolRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: Vec::new(),
            by_prototype: HashMap::new(),
            by_id: HashMap::new(),
        }
    }

    /// Builds and populates every configured pool.
    ///
    /// The whole configuration is validated first; on any error nothing
    /// is populated.
    ///
    /// # Errors
    ///
    /// - [`InstallError::InvalidConfig`] for bad counts
    /// - [`InstallError::DuplicatePrototype`] for a prototype listed twice
    /// - [`InstallError::UnknownPrototype`] for a name missing from `catalog`
    pub fn install(config: &InstallerConfig, catalog: &PrototypeCatalog<T>) -> InstallResult<Self> {
        let specs = config.validate()?;
        if let Some(missing) = specs.iter().find(|spec| !catalog.contains(&spec.prototype)) {
            return Err(InstallError::UnknownPrototype(missing.prototype.clone()));
        }

        let mut registry = Self::new();
        for spec in &specs {
            registry.install_pool(spec, catalog)?;
        }

        tracing::info!(
            "Pool registry installed: {} pools, {} entities",
            registry.pools.len(),
            registry.pools.iter().map(Pool::live_count).sum::<usize>()
        );
        Ok(registry)
    }

    /// Builds and populates a single pool.
    ///
    /// # Errors
    ///
    /// [`InstallError::DuplicatePrototype`] if the prototype already has a
    /// pool, [`InstallError::UnknownPrototype`] if `catalog` lacks it, or
    /// the pool's own [`PoolError::SlotOverflow`](reclaim_core::PoolError::SlotOverflow).
    pub fn install_pool(
        &mut self,
        spec: &PoolSpec,
        catalog: &PrototypeCatalog<T>,
    ) -> InstallResult<PoolId> {
        if self.by_prototype.contains_key(&spec.prototype) {
            return Err(InstallError::DuplicatePrototype(spec.prototype.clone()));
        }
        let factory = catalog
            .factory(&spec.prototype)
            .ok_or_else(|| InstallError::UnknownPrototype(spec.prototype.clone()))?;

        let mut pool =
            Pool::new(spec.prototype.clone(), move || factory()).with_spawn_transform(spec.spawn);
        match spec.max_capacity {
            Some(max) => pool.populate_with_cap(spec.start_count.get(), max.get())?,
            None => pool.populate(spec.start_count.get())?,
        }

        let id = pool.id();
        let slot = self.pools.len();
        self.pools.push(pool);
        self.by_prototype.insert(spec.prototype.clone(), slot);
        self.by_id.insert(id, slot);
        Ok(id)
    }

    /// Acquires an entity from the pool of `prototype`.
    ///
    /// # Errors
    ///
    /// [`InstallError::UnknownPrototype`] if no such pool exists, or the
    /// pool's own [`PoolError::Exhausted`](reclaim_core::PoolError::Exhausted).
    pub fn acquire(&mut self, prototype: &str) -> InstallResult<EntityHandle> {
        let pool = self
            .pool_mut(prototype)
            .ok_or_else(|| InstallError::UnknownPrototype(prototype.to_string()))?;
        Ok(pool.acquire()?)
    }

    /// Returns an entity to the pool it is bound to.
    ///
    /// Returning an already pooled entity is a no-op.
    ///
    /// # Errors
    ///
    /// [`InstallError::UnknownPool`] if the handle's pool is not in this
    /// registry. Nothing in the registry changes in that case.
    pub fn return_to_pool(&mut self, handle: EntityHandle) -> InstallResult<()> {
        Ok(self.owning_pool_mut(handle)?.return_to_pool(handle)?)
    }

    /// Returns every active entity of every pool. Returns how many came back.
    pub fn return_all(&mut self) -> usize {
        self.pools.iter_mut().map(Pool::return_all).sum()
    }
}

impl<T> PoolRegistry<T> {
    /// The pool for `prototype`.
    #[must_use]
    pub fn pool(&self, prototype: &str) -> Option<&Pool<T>> {
        self.pools.get(*self.by_prototype.get(prototype)?)
    }

    /// Mutable access to the pool for `prototype`.
    pub fn pool_mut(&mut self, prototype: &str) -> Option<&mut Pool<T>> {
        let slot = *self.by_prototype.get(prototype)?;
        self.pools.get_mut(slot)
    }

    /// The pool with `id`.
    #[must_use]
    pub fn pool_by_id(&self, id: PoolId) -> Option<&Pool<T>> {
        self.pools.get(*self.by_id.get(&id)?)
    }

    /// Gets a reference to a pooled value.
    ///
    /// # Errors
    ///
    /// [`InstallError::UnknownPool`] or the pool's ownership errors.
    pub fn get(&self, handle: EntityHandle) -> InstallResult<&T> {
        let pool = self
            .pool_by_id(handle.pool())
            .ok_or(InstallError::UnknownPool(handle.pool()))?;
        Ok(pool.get(handle)?)
    }

    /// Gets a mutable reference to a pooled value.
    ///
    /// # Errors
    ///
    /// [`InstallError::UnknownPool`] or the pool's ownership errors.
    pub fn get_mut(&mut self, handle: EntityHandle) -> InstallResult<&mut T> {
        Ok(self.owning_pool_mut(handle)?.get_mut(handle)?)
    }

    /// Placement of a pooled entity.
    ///
    /// # Errors
    ///
    /// [`InstallError::UnknownPool`] or the pool's ownership errors.
    pub fn transform(&self, handle: EntityHandle) -> InstallResult<Transform> {
        let pool = self
            .pool_by_id(handle.pool())
            .ok_or(InstallError::UnknownPool(handle.pool()))?;
        Ok(pool.transform(handle)?)
    }

    /// Mutable placement of a pooled entity.
    ///
    /// # Errors
    ///
    /// [`InstallError::UnknownPool`] or the pool's ownership errors.
    pub fn transform_mut(&mut self, handle: EntityHandle) -> InstallResult<&mut Transform> {
        Ok(self.owning_pool_mut(handle)?.transform_mut(handle)?)
    }

    /// Counters of every pool, in installation order.
    pub fn stats(&self) -> impl Iterator<Item = (&str, PoolStats)> + '_ {
        self.pools.iter().map(|pool| (pool.prototype(), pool.stats()))
    }

    /// Prototype names, in installation order.
    pub fn prototypes(&self) -> impl Iterator<Item = &str> + '_ {
        self.pools.iter().map(Pool::prototype)
    }

    /// Number of pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether the registry holds no pool.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Tears down every pool, freeing all entities.
    ///
    /// Returns the number of entities freed.
    pub fn shutdown(self) -> usize {
        let mut freed = 0;
        for pool in &self.pools {
            let stats = pool.stats();
            if stats.active > 0 {
                tracing::warn!(
                    "Pool '{}' shut down with {} entities still active",
                    pool.prototype(),
                    stats.active
                );
            }
            tracing::info!("Pool '{}' shut down: {}", pool.prototype(), stats);
            freed += stats.live;
        }
        freed
    }

    fn owning_pool_mut(&mut self, handle: EntityHandle) -> InstallResult<&mut Pool<T>> {
        self.by_id
            .get(&handle.pool())
            .and_then(|slot| self.pools.get_mut(*slot))
            .ok_or(InstallError::UnknownPool(handle.pool()))
    }
}

impl<T> fmt::Debug for PoolRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.pools.iter()).finish()
    }
}

impl<T: Poolable + 'static> Default for PoolRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
