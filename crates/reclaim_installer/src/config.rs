//! # Pool Configuration
//!
//! The installer reads an ordered list of pools from TOML:
//!
//! ```toml
//! [[pool]]
//! prototype = "bullet"
//! start_count = 32
//! max_capacity = 128
//!
//! [[pool]]
//! prototype = "explosion"
//! start_count = 4
//! has_max_capacity = false
//! spawn_position = [0.0, -100.0, 0.0]
//! ```
//!
//! ## Capacity fields
//!
//! - `has_max_capacity` omitted: the pool is capped iff `max_capacity` is set
//! - `has_max_capacity = false`: unbounded, `max_capacity` is ignored
//! - `has_max_capacity = true`: `max_capacity` is required

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::Path;

use reclaim_core::{Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{InstallError, InstallResult};

/// Root of a pool configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerConfig {
    /// Pools in declaration order.
    #[serde(default, rename = "pool")]
    pub pools: Vec<PoolEntry>,
}

/// One `[[pool]]` entry as written in the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolEntry {
    /// Name of the prototype in the catalog.
    pub prototype: String,
    /// Entities created at startup. Must be at least 1.
    pub start_count: usize,
    /// Explicit cap toggle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_max_capacity: Option<bool>,
    /// Maximum live entities. Must be at least 1 and `>= start_count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<usize>,
    /// Where acquired entities are placed. Defaults to the origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_position: Option<[f32; 3]>,
}

/// A validated pool description, ready to install.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolSpec {
    /// Name of the prototype in the catalog.
    pub prototype: String,
    /// Entities created at startup.
    pub start_count: NonZeroUsize,
    /// The cap, if the pool is bounded.
    pub max_capacity: Option<NonZeroUsize>,
    /// Placement applied on every acquisition.
    pub spawn: Transform,
}

impl InstallerConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`InstallError::InvalidConfig`] on malformed TOML or unknown fields.
    pub fn from_toml_str(text: &str) -> InstallResult<Self> {
        toml::from_str(text).map_err(|e| InstallError::InvalidConfig(format!("Failed to parse: {e}")))
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// [`InstallError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> InstallResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            InstallError::InvalidConfig(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates every entry, in order.
    ///
    /// # Errors
    ///
    /// The first invalid entry's error, or
    /// [`InstallError::DuplicatePrototype`] if a prototype appears twice.
    pub fn validate(&self) -> InstallResult<Vec<PoolSpec>> {
        let mut seen = HashSet::with_capacity(self.pools.len());
        self.pools
            .iter()
            .map(|entry| {
                if !seen.insert(entry.prototype.as_str()) {
                    return Err(InstallError::DuplicatePrototype(entry.prototype.clone()));
                }
                entry.validate()
            })
            .collect()
    }
}

impl PoolEntry {
    /// Creates an unbounded entry.
    #[must_use]
    pub fn new(prototype: impl Into<String>, start_count: usize) -> Self {
        Self {
            prototype: prototype.into(),
            start_count,
            has_max_capacity: None,
            max_capacity: None,
            spawn_position: None,
        }
    }

    /// Caps the entry at `max_capacity`.
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.has_max_capacity = Some(true);
        self.max_capacity = Some(max_capacity);
        self
    }

    /// The cap this entry asks for, after applying the toggle.
    #[must_use]
    pub fn effective_max_capacity(&self) -> Option<usize> {
        match self.has_max_capacity {
            Some(false) => None,
            _ => self.max_capacity,
        }
    }

    /// Checks counts and resolves the capacity fields.
    ///
    /// # Errors
    ///
    /// [`InstallError::InvalidConfig`] naming the offending prototype.
    pub fn validate(&self) -> InstallResult<PoolSpec> {
        let invalid = |reason: String| {
            InstallError::InvalidConfig(format!("pool '{}': {reason}", self.prototype))
        };

        if self.prototype.trim().is_empty() {
            return Err(InstallError::InvalidConfig("pool with empty prototype name".to_string()));
        }

        let start_count = NonZeroUsize::new(self.start_count)
            .ok_or_else(|| invalid("start_count must be at least 1".to_string()))?;

        if self.has_max_capacity == Some(true) && self.max_capacity.is_none() {
            return Err(invalid("has_max_capacity is set but max_capacity is missing".to_string()));
        }

        let max_capacity = match self.effective_max_capacity() {
            None => None,
            Some(max) => {
                let max = NonZeroUsize::new(max)
                    .ok_or_else(|| invalid("max_capacity must be at least 1".to_string()))?;
                if start_count > max {
                    return Err(invalid(format!(
                        "start_count {start_count} exceeds max_capacity {max}"
                    )));
                }
                Some(max)
            }
        };

        let spawn = self
            .spawn_position
            .map_or(Transform::IDENTITY, |p| Transform::from_position(Vec3::from_array(p)));

        Ok(PoolSpec {
            prototype: self.prototype.clone(),
            start_count,
            max_capacity,
            spawn,
        })
    }
}
