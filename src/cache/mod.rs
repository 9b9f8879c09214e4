//! Key/value cache subsystem
//!
//! Same lifecycle contract as storage (`initialize_schema`, `flush`) with
//! simple keyed operations and per-key expiry instead of queries.

mod heartbeat;
mod memory;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::{ConfigError, ConfigResult, StorageResult};

pub use heartbeat::{CacheHeartbeat, HEARTBEAT_KEY, HEARTBEAT_TTL};
pub use memory::MemoryCache;

/// Backend trait for caches
///
/// Keys are given unprefixed; backends apply their configured prefix.
pub trait CacheBackend: Send + Sync + fmt::Debug {
    fn initialize_schema(&self, dry_run: bool) -> StorageResult<()>;

    /// Drops every entry
    fn flush(&self) -> StorageResult<()>;

    /// Remaining lifetime; `None` if the key is unknown or never expires
    fn ttl(&self, key: &str) -> StorageResult<Option<Duration>>;

    /// Sets the lifetime of an existing key
    fn expire(&self, key: &str, ttl: Duration) -> StorageResult<()>;

    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> StorageResult<()>;

    fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Removes a key and returns its value
    fn delete(&self, key: &str) -> StorageResult<Option<Value>>;
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Backend key (default: "memory")
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Prepended to every key
    #[serde(default)]
    pub prefix: String,
}

fn default_backend() -> String {
    "memory".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            prefix: String::new(),
        }
    }
}

impl CacheConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the configured cache
    pub fn load(&self) -> ConfigResult<Box<dyn CacheBackend>> {
        match self.backend.as_str() {
            "memory" => Ok(Box::new(MemoryCache::new(self.prefix.clone()))),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}
