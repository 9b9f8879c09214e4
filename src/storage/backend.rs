//! # Storage Backend Trait
//!
//! Every backend implements the same contract; the memory backend is the
//! reference the others are measured against.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::StorageResult;
use super::generators::IdGenerator;
use crate::query::{
    Filter, Object, QueryOptions, DEFAULT_DELETED_FIELD, DEFAULT_ID_FIELD, DEFAULT_MODIFIED_FIELD,
};

/// Names of the fields with a special meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    pub id_field: String,
    pub modified_field: String,
    pub deleted_field: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            modified_field: DEFAULT_MODIFIED_FIELD.to_string(),
            deleted_field: DEFAULT_DELETED_FIELD.to_string(),
        }
    }
}

/// Optional parameters of `create`
#[derive(Clone, Default)]
pub struct CreateOptions {
    /// Overrides the backend's generator for objects without an id
    pub id_generator: Option<Arc<dyn IdGenerator>>,
    /// Fields whose value must be unique among live objects
    pub unique_fields: Vec<String>,
}

impl fmt::Debug for CreateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateOptions")
            .field("id_generator", &self.id_generator.as_ref().map(|g| g.regexp().as_str()))
            .field("unique_fields", &self.unique_fields)
            .finish()
    }
}

/// Optional parameters of `delete`
#[derive(Debug, Clone, Copy)]
pub struct DeleteOptions {
    /// Keep a tombstone
    pub with_deleted: bool,
    /// Timestamp requested for the tombstone
    pub last_modified: Option<i64>,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            with_deleted: true,
            last_modified: None,
        }
    }
}

/// Backend trait for object storage
///
/// Every operation is scoped by `(resource_name, parent_id)`. Bulk operations
/// accept `*` wildcards in `parent_id`.
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Creates backing structures. Idempotent.
    fn initialize_schema(&self, dry_run: bool) -> StorageResult<()>;

    /// Drops every object, tombstone and timestamp
    fn flush(&self) -> StorageResult<()>;

    /// Highest timestamp of the namespace, initialised on first read
    fn resource_timestamp(&self, resource_name: &str, parent_id: &str) -> StorageResult<i64>;

    /// Former name of `resource_timestamp`
    fn collection_timestamp(&self, resource_name: &str, parent_id: &str) -> StorageResult<i64> {
        self.resource_timestamp(resource_name, parent_id)
    }

    fn create_with(
        &self,
        resource_name: &str,
        parent_id: &str,
        object: Object,
        options: CreateOptions,
    ) -> StorageResult<Object>;

    /// Stores a new object, generating its id if absent
    fn create(&self, resource_name: &str, parent_id: &str, object: Object) -> StorageResult<Object> {
        self.create_with(resource_name, parent_id, object, CreateOptions::default())
    }

    /// Live object by id
    fn get(&self, resource_name: &str, parent_id: &str, object_id: &str) -> StorageResult<Object>;

    fn update_with(
        &self,
        resource_name: &str,
        parent_id: &str,
        object_id: &str,
        object: Object,
        unique_fields: &[String],
    ) -> StorageResult<Object>;

    /// Replaces (or creates) the object stored under `object_id`
    fn update(
        &self,
        resource_name: &str,
        parent_id: &str,
        object_id: &str,
        object: Object,
    ) -> StorageResult<Object> {
        self.update_with(resource_name, parent_id, object_id, object, &[])
    }

    fn delete_with(
        &self,
        resource_name: &str,
        parent_id: &str,
        object_id: &str,
        options: DeleteOptions,
    ) -> StorageResult<Object>;

    /// Deletes a live object and returns its tombstone
    fn delete(&self, resource_name: &str, parent_id: &str, object_id: &str) -> StorageResult<Object> {
        self.delete_with(resource_name, parent_id, object_id, DeleteOptions::default())
    }

    /// Deletes the live objects selected by `query` and returns their
    /// tombstones. `include_deleted` is ignored.
    fn delete_all(
        &self,
        resource_name: Option<&str>,
        parent_id: &str,
        query: &QueryOptions,
        with_deleted: bool,
    ) -> StorageResult<Vec<Object>>;

    /// Drops tombstones older than `before`, or all of them. Returns how
    /// many were dropped.
    fn purge_deleted(
        &self,
        resource_name: Option<&str>,
        parent_id: &str,
        before: Option<i64>,
    ) -> StorageResult<usize>;

    fn list_all(
        &self,
        resource_name: &str,
        parent_id: &str,
        query: &QueryOptions,
    ) -> StorageResult<Vec<Object>>;

    /// Number of live objects matching `filters`
    fn count_all(&self, resource_name: &str, parent_id: &str, filters: &[Filter]) -> StorageResult<usize>;

    fn field_names(&self) -> &FieldNames;

    fn is_readonly(&self) -> bool;
}
