//! Backend factories by configuration key

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::backend::StorageBackend;
use super::config::StorageConfig;
use super::errors::{ConfigError, ConfigResult};
use super::memory::MemoryStorage;
use crate::observability::{log_event_with_fields, Event};

/// Builds a backend from its configuration
pub type BackendFactory = fn(&StorageConfig) -> ConfigResult<Arc<dyn StorageBackend>>;

/// Maps `StorageConfig::backend` keys to constructors
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

fn memory_factory(config: &StorageConfig) -> ConfigResult<Arc<dyn StorageBackend>> {
    Ok(Arc::new(MemoryStorage::from_config(config)?))
}

impl BackendRegistry {
    /// Registry with no backend
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in backends
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("memory", memory_factory);
        registry
    }

    /// Adds or replaces a factory
    pub fn register(&mut self, key: impl Into<String>, factory: BackendFactory) {
        self.factories.insert(key.into(), factory);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Sorted backend keys
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Builds the backend named by `config.backend`
    pub fn load(&self, config: &StorageConfig) -> ConfigResult<Arc<dyn StorageBackend>> {
        let factory = self
            .factories
            .get(&config.backend)
            .ok_or_else(|| ConfigError::UnknownBackend(config.backend.clone()))?;
        let backend = factory(config)?;
        log_event_with_fields(
            Event::BackendLoaded,
            &[
                ("backend", config.backend.as_str()),
                ("readonly", if config.readonly { "true" } else { "false" }),
            ],
        );
        Ok(backend)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.keys())
            .finish()
    }
}

/// Builds a backend with the built-in registry
pub fn load_from_config(config: &StorageConfig) -> ConfigResult<Arc<dyn StorageBackend>> {
    BackendRegistry::new().load(config)
}
