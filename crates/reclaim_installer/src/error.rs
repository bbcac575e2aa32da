//! # Installer Error Types

use reclaim_core::{PoolError, PoolId};
use thiserror::Error;

/// Errors that can occur while installing or using a pool registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration names a prototype the catalog does not know.
    #[error("unknown prototype: {0}")]
    UnknownPrototype(String),

    /// Two configuration entries name the same prototype.
    #[error("prototype configured twice: {0}")]
    DuplicatePrototype(String),

    /// A handle names a pool this registry does not hold.
    #[error("unknown pool: {0}")]
    UnknownPool(PoolId),

    /// A pool operation failed.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Result type for installer operations.
pub type InstallResult<T> = Result<T, InstallError>;
