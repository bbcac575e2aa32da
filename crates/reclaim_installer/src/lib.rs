//! # RECLAIM Installer
//!
//! Startup bootstrap for entity pools:
//! 1. Load the pool list from TOML ([`InstallerConfig`])
//! 2. Validate every entry before touching anything
//! 3. Build one pre-populated [`Pool`](reclaim_core::Pool) per prototype
//!    ([`PoolRegistry::install`])
//!
//! The installer must run before any system calls `acquire`. That
//! ordering is the host's scheduling contract.
//!
//! ## Example
//!
//! ```rust,ignore
//! let config = InstallerConfig::from_toml_file("data/pools.toml")?;
//! let catalog = PrototypeCatalog::new()
//!     .with("bullet", Bullet::default)
//!     .with("explosion", Explosion::default);
//!
//! let mut pools = PoolRegistry::install(&config, &catalog)?;
//! let bullet = pools.acquire("bullet")?;
//! // ...
//! pools.return_to_pool(bullet)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod registry;

pub use catalog::{Factory, PrototypeCatalog};
pub use config::{InstallerConfig, PoolEntry, PoolSpec};
pub use error::{InstallError, InstallResult};
pub use registry::PoolRegistry;
