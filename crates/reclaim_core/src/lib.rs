//! # RECLAIM Core
//!
//! Object pooling for spawnable game entities:
//! - Entities are recycled instead of destroyed
//! - Pools are pre-populated at startup and may grow up to a cap
//! - Two lifecycle hooks let game logic reset state on the way in and out
//!
//! ## Lifecycle
//!
//! ```text
//!   populate ──► [available] ──acquire──► [active]
//!                     ▲                      │
//!                     └────return_to_pool────┘
//! ```
//!
//! An entity is always in exactly one of the two states. The first
//! activation of a freshly created entity does not fire
//! [`Poolable::on_return_from_pool`]; every later one does.
//!
//! ## Example
//!
//! ```rust
//! use reclaim_core::{Pool, Poolable};
//!
//! #[derive(Default)]
//! struct Bullet { damage: u32 }
//!
//! impl Poolable for Bullet {
//!     fn on_return_to_pool(&mut self) {
//!         self.damage = 0;
//!     }
//! }
//!
//! let mut pool = Pool::new("bullet", Bullet::default);
//! pool.populate_with_cap(3, 5)?;
//!
//! let handle = pool.acquire()?;
//! pool.get_mut(handle)?.damage = 10;
//! pool.return_to_pool(handle)?;
//! assert_eq!(pool.available_count(), 3);
//! # Ok::<(), reclaim_core::PoolError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod entity;
pub mod error;
pub mod math;
pub mod pool;
pub mod shared;

pub use entity::{EntityHandle, PoolId, PoolLink, Poolable};
pub use error::{PoolError, PoolResult};
pub use math::{Quaternion, Transform, Vec3};
pub use pool::{Pool, PoolStats};
pub use shared::SharedPool;
