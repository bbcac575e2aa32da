//! # Pool Error Types
//!
//! Everything that can go wrong while acquiring or returning entities.
//! Double-bind and double-return are not errors: both are no-ops.

use thiserror::Error;

use crate::entity::PoolId;

/// Errors that can occur in pool operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A capped pool has no free entity and no room to grow.
    #[error("pool '{prototype}' exhausted: all {max_capacity} entities are in use")]
    Exhausted {
        /// Prototype name of the exhausted pool.
        prototype: String,
        /// The configured cap.
        max_capacity: usize,
    },

    /// An entity was handed to a pool it is not bound to.
    #[error("pool mismatch: entity belongs to pool {found}, asked to return it to pool {expected}")]
    Mismatch {
        /// The pool that was asked to reclaim the entity.
        expected: PoolId,
        /// The pool the entity is actually bound to.
        found: PoolId,
    },

    /// The pool already holds as many entities as a handle can address.
    #[error("pool '{prototype}' cannot address more than {} entities", u32::MAX)]
    SlotOverflow {
        /// Prototype name of the full pool.
        prototype: String,
    },

    /// The handle names a slot this pool never created.
    #[error("unknown entity {index} in pool {pool}")]
    UnknownEntity {
        /// The pool that was queried.
        pool: PoolId,
        /// The slot index carried by the handle.
        index: u32,
    },
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
