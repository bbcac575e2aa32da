//! # Pool Lifecycle Verification
//!
//! End-to-end checks of the pooling protocol:
//!
//! 1. **Capacity**: capped pools never exceed their cap and fail fast when full
//! 2. **Hooks**: first activation is silent, every reuse fires the hook
//! 3. **State exclusion**: an entity is either available or active, never both
//!
//! Run with: cargo test --package reclaim_core --test pool_lifecycle

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reclaim_core::{EntityHandle, Pool, PoolError, Poolable};

#[derive(Default)]
struct Enemy {
    returned_to_pool: u32,
    returned_from_pool: u32,
}

impl Poolable for Enemy {
    fn on_return_to_pool(&mut self) {
        self.returned_to_pool += 1;
    }

    fn on_return_from_pool(&mut self) {
        self.returned_from_pool += 1;
    }
}

fn enemy_pool() -> Pool<Enemy> {
    Pool::new("enemy", Enemy::default)
}

/// Every slot is counted exactly once across the available set and the
/// active set.
fn assert_state_exclusion(pool: &Pool<Enemy>) {
    let active: Vec<EntityHandle> = pool.active_handles().collect();
    assert_eq!(active.len(), pool.active_count());
    assert_eq!(active.len() + pool.available_count(), pool.live_count());
    for handle in active {
        assert!(pool.is_active(handle).unwrap());
    }
}

// ============================================================================
// SCENARIO: start 3, cap 5
// ============================================================================

#[test]
fn capped_pool_scenario() {
    let mut pool = enemy_pool();
    pool.populate_with_cap(3, 5).unwrap();
    assert_eq!(pool.available_count(), 3);
    assert_eq!(pool.live_count(), 3);

    let mut handles = Vec::new();
    for _ in 0..3 {
        handles.push(pool.acquire().unwrap());
    }
    assert_eq!(pool.available_count(), 0);
    assert_eq!(pool.live_count(), 3);
    for handle in &handles {
        assert!(pool.is_active(*handle).unwrap());
    }

    for _ in 0..2 {
        handles.push(pool.acquire().unwrap());
    }
    assert_eq!(pool.live_count(), 5);
    assert_eq!(pool.available_count(), 0);

    let err = pool.acquire().unwrap_err();
    assert!(matches!(err, PoolError::Exhausted { max_capacity: 5, .. }));
    assert_eq!(pool.live_count(), 5);

    let released = handles[1];
    pool.release(released).unwrap();
    assert_eq!(pool.available_count(), 1);

    let reused = pool.acquire().unwrap();
    assert_eq!(reused, released);
    assert_eq!(pool.get(reused).unwrap().returned_from_pool, 1);
    assert_state_exclusion(&pool);
}

// ============================================================================
// SCENARIO: unbounded, start 1
// ============================================================================

#[test]
fn unbounded_pool_grows_without_limit() {
    let mut pool = enemy_pool();
    pool.populate(1).unwrap();

    for _ in 0..100 {
        pool.acquire().unwrap();
    }

    assert_eq!(pool.live_count(), 100);
    assert_eq!(pool.active_count(), 100);
    assert_eq!(pool.available_count(), 0);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn return_twice_equals_return_once() {
    let mut pool = enemy_pool();
    pool.populate(3).unwrap();

    let handle = pool.acquire().unwrap();
    pool.return_to_pool(handle).unwrap();
    let after_first = pool.stats();

    pool.return_to_pool(handle).unwrap();
    assert_eq!(pool.stats(), after_first);
    assert_eq!(pool.get(handle).unwrap().returned_to_pool, 1);
}

#[test]
fn first_activation_is_silent_reuse_is_not() {
    let mut pool = enemy_pool();
    pool.populate(1).unwrap();

    let handle = pool.acquire().unwrap();
    assert_eq!(pool.get(handle).unwrap().returned_from_pool, 0);

    for round in 1..=5 {
        pool.return_to_pool(handle).unwrap();
        let again = pool.acquire().unwrap();
        assert_eq!(again, handle);
        assert_eq!(pool.get(handle).unwrap().returned_from_pool, round);
    }
}

#[test]
fn entity_stays_bound_to_creating_pool() {
    let mut a = enemy_pool();
    let mut b = enemy_pool();
    a.populate(1).unwrap();
    b.populate(1).unwrap();

    let handle = a.acquire().unwrap();
    let mut link = a.link(handle).unwrap();
    assert_eq!(link.owning_pool(), Some(a.id()));

    assert!(!link.bind_to_pool(b.id()));
    assert_eq!(link.owning_pool(), Some(a.id()));

    assert!(matches!(b.release(handle), Err(PoolError::Mismatch { .. })));
    assert_eq!(b.available_count(), 1);
}

#[test]
fn identically_built_pools_reject_each_others_entities() {
    let mut a = enemy_pool();
    let mut b = enemy_pool();
    a.populate_with_cap(2, 2).unwrap();
    b.populate_with_cap(2, 2).unwrap();

    let from_a = a.acquire().unwrap();
    let from_b = b.acquire().unwrap();
    assert_eq!(from_a.index(), from_b.index());

    let err = b.return_to_pool(from_a).unwrap_err();
    assert_eq!(
        err,
        PoolError::Mismatch {
            expected: b.id(),
            found: a.id(),
        }
    );

    // Neither pool moved: no hook, no double listing.
    assert!(b.is_active(from_b).unwrap());
    assert_eq!(b.get(from_b).unwrap().returned_to_pool, 0);
    assert_eq!(b.available_count(), 1);
    assert!(a.is_active(from_a).unwrap());
    assert_eq!(a.get(from_a).unwrap().returned_to_pool, 0);
    assert_state_exclusion(&a);
    assert_state_exclusion(&b);
}

#[test]
fn random_sequences_keep_invariants() {
    const MAX: usize = 16;

    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut pool = enemy_pool();
    pool.populate_with_cap(4, MAX).unwrap();
    let mut held: Vec<EntityHandle> = Vec::new();

    for _ in 0..10_000 {
        if rng.gen_bool(0.55) {
            match pool.acquire() {
                Ok(handle) => held.push(handle),
                Err(PoolError::Exhausted { .. }) => {
                    assert_eq!(held.len(), MAX);
                    assert_eq!(pool.available_count(), 0);
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        } else if !held.is_empty() {
            let handle = held.swap_remove(rng.gen_range(0..held.len()));
            pool.return_to_pool(handle).unwrap();
            // A stale duplicate return must change nothing.
            pool.return_to_pool(handle).unwrap();
        }

        assert!(pool.live_count() <= MAX);
        assert_eq!(pool.active_count(), held.len());
    }

    assert_state_exclusion(&pool);
}

#[test]
fn hook_observes_entity_before_it_is_available() {
    #[derive(Default)]
    struct Torch {
        lit: bool,
        was_lit_when_pooled: bool,
    }

    impl Poolable for Torch {
        fn on_return_to_pool(&mut self) {
            self.was_lit_when_pooled = self.lit;
            self.lit = false;
        }
    }

    let mut pool = Pool::new("torch", Torch::default);
    pool.populate(1).unwrap();

    let handle = pool.acquire().unwrap();
    pool.get_mut(handle).unwrap().lit = true;
    pool.return_to_pool(handle).unwrap();

    let torch = pool.get(handle).unwrap();
    assert!(torch.was_lit_when_pooled);
    assert!(!torch.lit);
}
