//! In-memory storage backend
//!
//! Reference implementation of [`StorageBackend`]. Data lives for the
//! lifetime of the instance. One mutex guards all state, so every operation
//! is serialised and observes a consistent store.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use super::backend::{CreateOptions, DeleteOptions, FieldNames, StorageBackend};
use super::config::StorageConfig;
use super::errors::{ConfigResult, StorageError, StorageResult};
use super::generators::{self, IdGenerator};
use super::namespace::{Namespace, NamespaceSelector};
use super::timestamps::{Clock, ResourceTimestamps, SystemClock};
use super::tombstone::{strip_deleted_object, Cemetery};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::query::{extract_record_set, Filter, Object, QueryOptions};

const BACKEND_NAME: &str = "memory";

/// Live objects by namespace and id
type Store = BTreeMap<Namespace, BTreeMap<String, Object>>;

#[derive(Debug, Default)]
struct MemoryState {
    store: Store,
    cemetery: Cemetery,
    timestamps: ResourceTimestamps,
}

impl MemoryState {
    fn live(&self, namespace: &Namespace, object_id: &str) -> Option<&Object> {
        self.store.get(namespace)?.get(object_id)
    }

    fn live_objects<'a>(
        &'a self,
        selector: &'a NamespaceSelector,
    ) -> impl Iterator<Item = (&'a Namespace, &'a String, &'a Object)> + 'a {
        self.store
            .iter()
            .filter(move |(namespace, _)| selector.matches(namespace))
            .flat_map(|(namespace, objects)| {
                objects.iter().map(move |(id, object)| (namespace, id, object))
            })
    }
}

/// A live object together with where it is stored
struct Located {
    namespace: Namespace,
    id: String,
    object: Object,
}

impl Borrow<Object> for Located {
    fn borrow(&self) -> &Object {
        &self.object
    }
}

/// Object storage held in process memory
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
    fields: FieldNames,
    readonly: bool,
    id_generator: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    metrics: MetricsRegistry,
}

impl MemoryStorage {
    pub fn new(id_generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            fields: FieldNames::default(),
            readonly: false,
            id_generator,
            clock: Arc::new(SystemClock),
            metrics: MetricsRegistry::new(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> ConfigResult<Self> {
        let id_generator = generators::from_name(&config.id_generator)?;
        Ok(Self::new(id_generator)
            .with_field_names(config.field_names())
            .with_readonly(config.readonly))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_field_names(mut self, fields: FieldNames) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StorageError::backend("memory storage lock poisoned"))
    }

    /// Fails if a live object other than `object_id` holds the same value
    /// for one of `unique_fields`
    fn check_unique_fields(
        &self,
        state: &MemoryState,
        namespace: &Namespace,
        object_id: &str,
        object: &Object,
        unique_fields: &[String],
    ) -> StorageResult<()> {
        let objects = match state.store.get(namespace) {
            Some(objects) => objects,
            None => return Ok(()),
        };
        for field in unique_fields {
            if *field == self.fields.id_field {
                continue;
            }
            let value = match object.get(field) {
                Some(value) => value,
                None => continue,
            };
            let conflict = objects
                .iter()
                .find(|(id, other)| id.as_str() != object_id && other.get(field) == Some(value));
            if let Some((_, existing)) = conflict {
                return Err(StorageError::unicity(field.clone(), existing.clone()));
            }
        }
        Ok(())
    }

    /// Stamps the object, stores it live and clears any tombstone for its id
    fn store_locked(
        &self,
        state: &mut MemoryState,
        namespace: &Namespace,
        object_id: String,
        mut object: Object,
    ) -> StorageResult<Object> {
        let modified_field = &self.fields.modified_field;
        let supplied = object.get(modified_field).and_then(Value::as_i64);
        let timestamp = state.timestamps.bump(namespace, supplied, self.clock.now_ms())?;
        object.insert(modified_field.clone(), Value::from(timestamp));

        state.cemetery.exhume(namespace, &object_id);
        state
            .store
            .entry(namespace.clone())
            .or_default()
            .insert(object_id, object.clone());
        Ok(object)
    }

    fn delete_locked(
        &self,
        state: &mut MemoryState,
        namespace: &Namespace,
        object_id: &str,
        options: DeleteOptions,
    ) -> StorageResult<Object> {
        let exists = state
            .store
            .get(namespace)
            .is_some_and(|objects| objects.contains_key(object_id));
        if !exists {
            return Err(StorageError::not_found(object_id));
        }
        let timestamp = state
            .timestamps
            .bump(namespace, options.last_modified, self.clock.now_ms())?;

        let objects = state
            .store
            .get_mut(namespace)
            .ok_or_else(|| StorageError::not_found(object_id))?;
        let mut existing = objects
            .remove(object_id)
            .ok_or_else(|| StorageError::not_found(object_id))?;
        if objects.is_empty() {
            state.store.remove(namespace);
        }

        // The tombstone gets a fresh timestamp, not the object's last one
        existing.insert(self.fields.modified_field.clone(), Value::from(timestamp));

        let tombstone = strip_deleted_object(&existing, &self.fields);
        if options.with_deleted {
            state.cemetery.bury(namespace, object_id, tombstone.clone());
        }
        self.metrics.increment_objects_deleted();
        Ok(tombstone)
    }
}

/// Ids are strings; other JSON values are stored by their JSON text
fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl StorageBackend for MemoryStorage {
    fn initialize_schema(&self, dry_run: bool) -> StorageResult<()> {
        log_event_with_fields(
            Event::SchemaInitialized,
            &[("backend", BACKEND_NAME), ("dry_run", if dry_run { "true" } else { "false" })],
        );
        Ok(())
    }

    fn flush(&self) -> StorageResult<()> {
        let mut state = self.lock()?;
        *state = MemoryState::default();
        log_event_with_fields(Event::StorageFlushed, &[("backend", BACKEND_NAME)]);
        Ok(())
    }

    fn resource_timestamp(&self, resource_name: &str, parent_id: &str) -> StorageResult<i64> {
        let namespace = Namespace::new(resource_name, parent_id);
        let mut state = self.lock()?;
        if let Some(timestamp) = state.timestamps.get(&namespace) {
            return Ok(timestamp);
        }
        if self.readonly {
            return Err(StorageError::readonly(
                "Cannot initialize empty resource timestamp when running in readonly.",
            ));
        }
        state.timestamps.bump(&namespace, None, self.clock.now_ms())
    }

    fn create_with(
        &self,
        resource_name: &str,
        parent_id: &str,
        mut object: Object,
        options: CreateOptions,
    ) -> StorageResult<Object> {
        let namespace = Namespace::new(resource_name, parent_id);
        let id_field = &self.fields.id_field;
        let mut state = self.lock()?;

        let object_id = match object.get(id_field) {
            Some(value) => {
                let object_id = id_string(value);
                if let Some(existing) = state.live(&namespace, &object_id) {
                    return Err(StorageError::unicity(id_field.clone(), existing.clone()));
                }
                object_id
            }
            None => options
                .id_generator
                .as_ref()
                .unwrap_or(&self.id_generator)
                .generate(),
        };
        object.insert(id_field.clone(), Value::String(object_id.clone()));
        self.check_unique_fields(&state, &namespace, &object_id, &object, &options.unique_fields)?;

        let created = self.store_locked(&mut state, &namespace, object_id, object)?;
        self.metrics.increment_objects_created();
        Ok(created)
    }

    fn get(&self, resource_name: &str, parent_id: &str, object_id: &str) -> StorageResult<Object> {
        let namespace = Namespace::new(resource_name, parent_id);
        let state = self.lock()?;
        state
            .live(&namespace, object_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(object_id))
    }

    fn update_with(
        &self,
        resource_name: &str,
        parent_id: &str,
        object_id: &str,
        mut object: Object,
        unique_fields: &[String],
    ) -> StorageResult<Object> {
        let namespace = Namespace::new(resource_name, parent_id);
        let mut state = self.lock()?;

        object.insert(self.fields.id_field.clone(), Value::String(object_id.to_string()));
        self.check_unique_fields(&state, &namespace, object_id, &object, unique_fields)?;

        let updated = self.store_locked(&mut state, &namespace, object_id.to_string(), object)?;
        self.metrics.increment_objects_updated();
        Ok(updated)
    }

    fn delete_with(
        &self,
        resource_name: &str,
        parent_id: &str,
        object_id: &str,
        options: DeleteOptions,
    ) -> StorageResult<Object> {
        let namespace = Namespace::new(resource_name, parent_id);
        let mut state = self.lock()?;
        self.delete_locked(&mut state, &namespace, object_id, options)
    }

    fn delete_all(
        &self,
        resource_name: Option<&str>,
        parent_id: &str,
        query: &QueryOptions,
        with_deleted: bool,
    ) -> StorageResult<Vec<Object>> {
        let selector = NamespaceSelector::new(resource_name, parent_id)?;
        let mut state = self.lock()?;

        let candidates: Vec<Located> = state
            .live_objects(&selector)
            .map(|(namespace, id, object)| Located {
                namespace: namespace.clone(),
                id: id.clone(),
                object: object.clone(),
            })
            .collect();
        let (selected, _) = extract_record_set(
            candidates,
            &query.filters,
            &query.sorting,
            &query.pagination_rules,
            query.limit,
            &self.fields.deleted_field,
        );

        let options = DeleteOptions {
            with_deleted,
            last_modified: None,
        };
        let mut deleted = Vec::with_capacity(selected.len());
        for located in selected {
            deleted.push(self.delete_locked(&mut state, &located.namespace, &located.id, options)?);
        }
        Ok(deleted)
    }

    fn purge_deleted(
        &self,
        resource_name: Option<&str>,
        parent_id: &str,
        before: Option<i64>,
    ) -> StorageResult<usize> {
        let selector = NamespaceSelector::new(resource_name, parent_id)?;
        let mut state = self.lock()?;
        let purged = state
            .cemetery
            .purge(&selector, before, &self.fields.modified_field);

        self.metrics.add_tombstones_purged(purged as u64);
        let count = purged.to_string();
        log_event_with_fields(
            Event::TombstonesPurged,
            &[("count", count.as_str()), ("parent_id", parent_id)],
        );
        Ok(purged)
    }

    fn list_all(
        &self,
        resource_name: &str,
        parent_id: &str,
        query: &QueryOptions,
    ) -> StorageResult<Vec<Object>> {
        let selector = NamespaceSelector::new(Some(resource_name), parent_id)?;
        let state = self.lock()?;

        let mut candidates: Vec<&Object> = state
            .live_objects(&selector)
            .map(|(_, _, object)| object)
            .collect();
        if query.include_deleted {
            candidates.extend(state.cemetery.tombstones(&selector));
        }

        let (objects, _) = extract_record_set(
            candidates,
            &query.filters,
            &query.sorting,
            &query.pagination_rules,
            query.limit,
            &self.fields.deleted_field,
        );
        Ok(objects.into_iter().cloned().collect())
    }

    fn count_all(&self, resource_name: &str, parent_id: &str, filters: &[Filter]) -> StorageResult<usize> {
        let selector = NamespaceSelector::new(Some(resource_name), parent_id)?;
        let state = self.lock()?;

        let candidates: Vec<&Object> = state
            .live_objects(&selector)
            .map(|(_, _, object)| object)
            .collect();
        let (_, count) =
            extract_record_set(candidates, filters, &[], &[], None, &self.fields.deleted_field);
        Ok(count)
    }

    fn field_names(&self) -> &FieldNames {
        &self.fields
    }

    fn is_readonly(&self) -> bool {
        self.readonly
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("fields", &self.fields)
            .field("readonly", &self.readonly)
            .finish()
    }
}
