//! Storage configuration

use serde::{Deserialize, Serialize};

use super::backend::FieldNames;
use super::errors::ConfigResult;
use super::heartbeat::DEFAULT_DELETE_RATE;
use crate::query::{DEFAULT_DELETED_FIELD, DEFAULT_ID_FIELD, DEFAULT_MODIFIED_FIELD};

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Registry key of the backend (default: "memory")
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Forbid initialising timestamps and mutating from the heartbeat
    #[serde(default)]
    pub readonly: bool,

    /// "uuid4" or "alphanumeric" (default: "uuid4")
    #[serde(default = "default_id_generator")]
    pub id_generator: String,

    #[serde(default = "default_id_field")]
    pub id_field: String,

    #[serde(default = "default_modified_field")]
    pub modified_field: String,

    #[serde(default = "default_deleted_field")]
    pub deleted_field: String,

    /// Probability that a heartbeat deletes instead of creating (default: 0.6)
    #[serde(default = "default_heartbeat_delete_rate")]
    pub heartbeat_delete_rate: f64,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_id_generator() -> String {
    "uuid4".to_string()
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

fn default_modified_field() -> String {
    DEFAULT_MODIFIED_FIELD.to_string()
}

fn default_deleted_field() -> String {
    DEFAULT_DELETED_FIELD.to_string()
}

fn default_heartbeat_delete_rate() -> f64 {
    DEFAULT_DELETE_RATE
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            readonly: false,
            id_generator: default_id_generator(),
            id_field: default_id_field(),
            modified_field: default_modified_field(),
            deleted_field: default_deleted_field(),
            heartbeat_delete_rate: default_heartbeat_delete_rate(),
        }
    }
}

impl StorageConfig {
    /// Parses a JSON document; absent keys take their defaults
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn readonly() -> Self {
        Self {
            readonly: true,
            ..Default::default()
        }
    }

    pub fn field_names(&self) -> FieldNames {
        FieldNames {
            id_field: self.id_field.clone(),
            modified_field: self.modified_field.clone(),
            deleted_field: self.deleted_field.clone(),
        }
    }
}
