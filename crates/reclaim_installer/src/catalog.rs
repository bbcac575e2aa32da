//! # Prototype Catalog
//!
//! Maps the prototype names used in configuration to factories that build
//! fresh entities.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Shared factory for one prototype.
pub type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Named factories for spawnable objects.
pub struct PrototypeCatalog<T> {
    factories: HashMap<String, Factory<T>>,
}

impl<T> PrototypeCatalog<T> {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers `factory` under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Whether a prototype is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// The factory for `name`.
    #[must_use]
    pub fn factory(&self, name: &str) -> Option<Factory<T>> {
        self.factories.get(name).map(Arc::clone)
    }

    /// Number of registered prototypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether no prototype is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<T> Default for PrototypeCatalog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PrototypeCatalog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("PrototypeCatalog").field("prototypes", &names).finish()
    }
}
