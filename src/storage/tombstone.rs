//! Tombstones and the cemetery that keeps them

use std::collections::BTreeMap;

use serde_json::Value;

use super::backend::FieldNames;
use super::namespace::{Namespace, NamespaceSelector};
use crate::query::Object;

/// Reduces an object to its id and timestamp, flagged as deleted
pub fn strip_deleted_object(object: &Object, fields: &FieldNames) -> Object {
    let mut tombstone = Object::new();
    for field in [&fields.id_field, &fields.modified_field] {
        if let Some(value) = object.get(field.as_str()) {
            tombstone.insert(field.clone(), value.clone());
        }
    }
    tombstone.insert(fields.deleted_field.clone(), Value::Bool(true));
    tombstone
}

/// Tombstones by namespace and object id
#[derive(Debug, Default)]
pub struct Cemetery {
    graves: BTreeMap<Namespace, BTreeMap<String, Object>>,
}

impl Cemetery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bury(&mut self, namespace: &Namespace, object_id: &str, tombstone: Object) {
        self.graves
            .entry(namespace.clone())
            .or_default()
            .insert(object_id.to_string(), tombstone);
    }

    /// Removes the tombstone of a re-created object
    pub fn exhume(&mut self, namespace: &Namespace, object_id: &str) -> Option<Object> {
        self.graves.get_mut(namespace)?.remove(object_id)
    }

    /// Tombstones in every selected namespace
    pub fn tombstones<'a>(
        &'a self,
        selector: &'a NamespaceSelector,
    ) -> impl Iterator<Item = &'a Object> + 'a {
        self.graves
            .iter()
            .filter(move |(namespace, _)| selector.matches(namespace))
            .flat_map(|(_, graves)| graves.values())
    }

    /// Drops the selected tombstones whose timestamp is lower than `before`,
    /// or all of them. Returns how many were dropped.
    pub fn purge(
        &mut self,
        selector: &NamespaceSelector,
        before: Option<i64>,
        modified_field: &str,
    ) -> usize {
        let mut purged = 0;
        for (namespace, graves) in self.graves.iter_mut() {
            if !selector.matches(namespace) {
                continue;
            }
            let initial = graves.len();
            match before {
                None => graves.clear(),
                Some(before) => graves.retain(|_, tombstone| {
                    tombstone
                        .get(modified_field)
                        .and_then(Value::as_i64)
                        .map_or(false, |ts| ts >= before)
                }),
            }
            purged += initial - graves.len();
        }
        self.graves.retain(|_, graves| !graves.is_empty());
        purged
    }

    pub fn clear(&mut self) {
        self.graves.clear();
    }
}
