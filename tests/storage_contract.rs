//! Storage Contract Tests
//!
//! Behaviour every backend must share, checked against the memory backend:
//! - CRUD and unicity
//! - Resource timestamp bumping
//! - Tombstones and purge
//! - Bulk operations over parent id globs
//! - Listing through the query evaluator

use std::collections::HashSet;
use std::sync::Arc;

use kinto_core::query::{Comparison, Filter, Object, QueryOptions, Sort};
use kinto_core::storage::{
    DeleteOptions, ManualClock, MemoryStorage, StorageBackend, StorageConfig, StorageError,
};
use serde_json::{json, Value};

// =============================================================================
// Test Utilities
// =============================================================================

const RESOURCE: &str = "test";
const PARENT: &str = "1234";

fn storage() -> MemoryStorage {
    MemoryStorage::from_config(&StorageConfig::default()).expect("memory storage")
}

fn storage_at(clock: &ManualClock) -> MemoryStorage {
    storage().with_clock(Arc::new(clock.clone()))
}

fn obj(value: Value) -> Object {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {}", other),
    }
}

fn id_of(object: &Object) -> String {
    object["id"].as_str().expect("string id").to_string()
}

fn ts_of(object: &Object) -> i64 {
    object["last_modified"].as_i64().expect("integer timestamp")
}

fn ids(objects: &[Object]) -> Vec<String> {
    objects.iter().map(id_of).collect()
}

fn all() -> QueryOptions {
    QueryOptions::default()
}

// =============================================================================
// CRUD
// =============================================================================

#[test]
fn test_create_adds_id_and_timestamp() {
    let storage = storage();
    let created = storage.create(RESOURCE, PARENT, obj(json!({"foo": "bar"}))).unwrap();
    assert_eq!(created["foo"], json!("bar"));
    assert_eq!(id_of(&created).len(), 36);
    assert!(ts_of(&created) > 0);

    let fetched = storage.get(RESOURCE, PARENT, &id_of(&created)).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn test_create_with_live_id_raises_unicity_with_existing() {
    let storage = storage();
    let first = storage.create(RESOURCE, PARENT, obj(json!({"id": "abc", "n": 1}))).unwrap();
    let err = storage
        .create(RESOURCE, PARENT, obj(json!({"id": "abc", "n": 2})))
        .unwrap_err();

    assert_eq!(err.status_code(), 412);
    assert_eq!(err.existing(), Some(&first));
}

#[test]
fn test_same_id_in_other_namespaces_is_allowed() {
    let storage = storage();
    storage.create(RESOURCE, PARENT, obj(json!({"id": "abc"}))).unwrap();
    assert!(storage.create(RESOURCE, "5678", obj(json!({"id": "abc"}))).is_ok());
    assert!(storage.create("other", PARENT, obj(json!({"id": "abc"}))).is_ok());
}

#[test]
fn test_get_unknown_raises_not_found() {
    let storage = storage();
    let err = storage.get(RESOURCE, PARENT, "missing").unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound { ref id } if id == "missing"));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_get_returns_a_copy() {
    let storage = storage();
    let created = storage.create(RESOURCE, PARENT, obj(json!({"n": 1}))).unwrap();
    let mut fetched = storage.get(RESOURCE, PARENT, &id_of(&created)).unwrap();
    fetched.insert("n".into(), json!(2));
    let again = storage.get(RESOURCE, PARENT, &id_of(&created)).unwrap();
    assert_eq!(again["n"], json!(1));
}

#[test]
fn test_update_creates_when_missing() {
    let storage = storage();
    let updated = storage
        .update(RESOURCE, PARENT, "new-id", obj(json!({"foo": "bar"})))
        .unwrap();
    assert_eq!(updated["id"], json!("new-id"));
    assert_eq!(storage.get(RESOURCE, PARENT, "new-id").unwrap(), updated);
}

#[test]
fn test_update_overwrites_id_from_payload() {
    let storage = storage();
    let updated = storage
        .update(RESOURCE, PARENT, "abc", obj(json!({"id": "other", "foo": 1})))
        .unwrap();
    assert_eq!(updated["id"], json!("abc"));
    assert!(storage.get(RESOURCE, PARENT, "other").is_err());
}

#[test]
fn test_update_replaces_the_whole_object() {
    let storage = storage();
    storage.update(RESOURCE, PARENT, "abc", obj(json!({"a": 1, "b": 2}))).unwrap();
    let updated = storage.update(RESOURCE, PARENT, "abc", obj(json!({"c": 3}))).unwrap();
    assert!(!updated.contains_key("a"));
    assert_eq!(updated["c"], json!(3));
}

#[test]
fn test_delete_unknown_raises_not_found() {
    let storage = storage();
    let err = storage.delete(RESOURCE, PARENT, "missing").unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound { .. }));
}

// =============================================================================
// Timestamps
// =============================================================================

#[test]
fn test_empty_resource_timestamp_is_clock_initialised() {
    let clock = ManualClock::at_ms(5_000);
    let storage = storage_at(&clock);
    assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), 5_000);

    // Stable once initialised
    clock.advance_ms(100);
    assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), 5_000);
    assert_eq!(storage.collection_timestamp(RESOURCE, PARENT).unwrap(), 5_000);
}

#[test]
fn test_fresh_namespace_and_created_object_look_alike() {
    let clock = ManualClock::at_ms(5_000);
    let storage = storage_at(&clock);
    let created = storage.create(RESOURCE, PARENT, Object::new()).unwrap();
    assert_eq!(ts_of(&created), 5_000);
    assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), 5_000);
}

#[test]
fn test_readonly_empty_timestamp_is_an_error() {
    let storage = MemoryStorage::from_config(&StorageConfig::readonly()).unwrap();
    let err = storage.resource_timestamp(RESOURCE, PARENT).unwrap_err();
    assert!(matches!(err, StorageError::Readonly { .. }));
    assert!(err.is_backend_error());
    assert_eq!(err.status_code(), 503);
}

#[test]
fn test_readonly_returns_known_timestamp() {
    let storage = MemoryStorage::from_config(&StorageConfig::readonly()).unwrap();
    let created = storage.create(RESOURCE, PARENT, Object::new()).unwrap();
    assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), ts_of(&created));
}

#[test]
fn test_timestamps_strictly_increase_under_frozen_clock() {
    let clock = ManualClock::at_ms(1_000);
    let storage = storage_at(&clock);

    let mut previous = 0;
    for _ in 0..20 {
        let created = storage.create(RESOURCE, PARENT, Object::new()).unwrap();
        let ts = ts_of(&created);
        assert!(ts > previous);
        assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), ts);
        previous = ts;
    }
}

#[test]
fn test_clock_going_backwards_still_bumps() {
    let clock = ManualClock::at_ms(10_000);
    let storage = storage_at(&clock);
    let first = storage.create(RESOURCE, PARENT, Object::new()).unwrap();
    clock.set_ms(10);
    let second = storage.create(RESOURCE, PARENT, Object::new()).unwrap();
    assert_eq!(ts_of(&second), ts_of(&first) + 1);
}

#[test]
fn test_future_timestamp_is_adopted() {
    let clock = ManualClock::at_ms(1_000);
    let storage = storage_at(&clock);
    storage.create(RESOURCE, PARENT, Object::new()).unwrap();

    let future = 9_999_999;
    let created = storage
        .create(RESOURCE, PARENT, obj(json!({"id": "x", "last_modified": future})))
        .unwrap();
    assert_eq!(ts_of(&created), future);
    assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), future);
}

#[test]
fn test_timestamp_equal_to_resource_is_bumped() {
    let clock = ManualClock::at_ms(1_000);
    let storage = storage_at(&clock);
    let first = storage.create(RESOURCE, PARENT, Object::new()).unwrap();
    let second = storage
        .create(RESOURCE, PARENT, obj(json!({"last_modified": ts_of(&first)})))
        .unwrap();
    assert_eq!(ts_of(&second), ts_of(&first) + 1);
    assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), ts_of(&second));
}

#[test]
fn test_past_timestamp_is_kept_and_resource_unchanged() {
    let clock = ManualClock::at_ms(1_000);
    let storage = storage_at(&clock);
    storage.create(RESOURCE, PARENT, Object::new()).unwrap();

    let imported = storage
        .update(RESOURCE, PARENT, "old", obj(json!({"last_modified": 42})))
        .unwrap();
    assert_eq!(ts_of(&imported), 42);
    assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), 1_000);
}

#[test]
fn test_non_integer_timestamp_is_ignored() {
    let clock = ManualClock::at_ms(1_000);
    let storage = storage_at(&clock);
    let created = storage
        .create(RESOURCE, PARENT, obj(json!({"last_modified": "yesterday"})))
        .unwrap();
    assert_eq!(ts_of(&created), 1_000);
}

#[test]
fn test_update_and_delete_bump_timestamp() {
    let storage = storage();
    let created = storage.create(RESOURCE, PARENT, Object::new()).unwrap();
    let id = id_of(&created);

    let updated = storage.update(RESOURCE, PARENT, &id, Object::new()).unwrap();
    assert!(ts_of(&updated) > ts_of(&created));

    let tombstone = storage.delete(RESOURCE, PARENT, &id).unwrap();
    assert!(ts_of(&tombstone) > ts_of(&updated));
    assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), ts_of(&tombstone));
}

#[test]
fn test_timestamp_at_range_limit_never_wraps() {
    let storage = storage();
    let top = storage
        .create(RESOURCE, PARENT, obj(json!({"id": "top", "last_modified": i64::MAX})))
        .unwrap();
    assert_eq!(ts_of(&top), i64::MAX);

    let err = storage.create(RESOURCE, PARENT, Object::new()).unwrap_err();
    assert!(err.is_backend_error());
    let err = storage.delete(RESOURCE, PARENT, "top").unwrap_err();
    assert!(err.is_backend_error());

    // Nothing changed, and the backend is still usable
    assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), i64::MAX);
    assert_eq!(storage.count_all(RESOURCE, PARENT, &[]).unwrap(), 1);
    assert_eq!(ts_of(&storage.get(RESOURCE, PARENT, "top").unwrap()), i64::MAX);
}

#[test]
fn test_timestamps_are_per_namespace() {
    let clock = ManualClock::at_ms(1_000);
    let storage = storage_at(&clock);
    storage
        .create(RESOURCE, PARENT, obj(json!({"last_modified": 50_000})))
        .unwrap();
    assert_eq!(storage.resource_timestamp(RESOURCE, "5678").unwrap(), 1_000);
    assert_eq!(storage.resource_timestamp("other", PARENT).unwrap(), 1_000);
}

// =============================================================================
// Tombstones
// =============================================================================

#[test]
fn test_tombstone_round_trip() {
    let storage = storage();
    let created = storage
        .create(RESOURCE, PARENT, obj(json!({"title": "secret", "tags": ["a"]})))
        .unwrap();
    let id = id_of(&created);
    let tombstone = storage.delete(RESOURCE, PARENT, &id).unwrap();

    assert!(matches!(
        storage.get(RESOURCE, PARENT, &id),
        Err(StorageError::ObjectNotFound { .. })
    ));

    let listed = storage
        .list_all(RESOURCE, PARENT, &all().including_deleted())
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], tombstone);
    assert_eq!(
        Value::Object(listed[0].clone()),
        json!({"id": id, "last_modified": ts_of(&tombstone), "deleted": true})
    );
}

#[test]
fn test_recreation_clears_tombstone() {
    let storage = storage();
    storage.create(RESOURCE, PARENT, obj(json!({"id": "abc"}))).unwrap();
    storage.delete(RESOURCE, PARENT, "abc").unwrap();
    storage.create(RESOURCE, PARENT, obj(json!({"id": "abc", "v": 2}))).unwrap();

    let listed = storage
        .list_all(RESOURCE, PARENT, &all().including_deleted())
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].contains_key("deleted"));
    assert_eq!(listed[0]["v"], json!(2));
}

#[test]
fn test_update_of_deleted_id_clears_tombstone() {
    let storage = storage();
    storage.create(RESOURCE, PARENT, obj(json!({"id": "abc"}))).unwrap();
    storage.delete(RESOURCE, PARENT, "abc").unwrap();
    storage.update(RESOURCE, PARENT, "abc", Object::new()).unwrap();

    let listed = storage
        .list_all(RESOURCE, PARENT, &all().including_deleted())
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].contains_key("deleted"));
}

#[test]
fn test_delete_without_tombstone() {
    let storage = storage();
    let created = storage.create(RESOURCE, PARENT, Object::new()).unwrap();
    let options = DeleteOptions {
        with_deleted: false,
        ..Default::default()
    };
    let tombstone = storage
        .delete_with(RESOURCE, PARENT, &id_of(&created), options)
        .unwrap();
    assert_eq!(tombstone["deleted"], json!(true));

    let listed = storage
        .list_all(RESOURCE, PARENT, &all().including_deleted())
        .unwrap();
    assert!(listed.is_empty());
}

#[test]
fn test_delete_with_explicit_timestamp() {
    let clock = ManualClock::at_ms(1_000);
    let storage = storage_at(&clock);
    let created = storage.create(RESOURCE, PARENT, Object::new()).unwrap();
    let options = DeleteOptions {
        last_modified: Some(123_456),
        ..Default::default()
    };
    let tombstone = storage
        .delete_with(RESOURCE, PARENT, &id_of(&created), options)
        .unwrap();
    assert_eq!(ts_of(&tombstone), 123_456);
}

#[test]
fn test_widgets_scenario() {
    let storage = storage();
    storage
        .create("widgets", "p1", obj(json!({"id": "a", "status": 0})))
        .unwrap();
    storage
        .create("widgets", "p1", obj(json!({"id": "b", "status": 1})))
        .unwrap();
    assert_eq!(storage.count_all("widgets", "p1", &[]).unwrap(), 2);

    storage.delete("widgets", "p1", "a").unwrap();
    assert_eq!(storage.count_all("widgets", "p1", &[]).unwrap(), 1);

    let listed = storage
        .list_all("widgets", "p1", &all().including_deleted().with_sort(Sort::asc("id")))
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], json!("a"));
    assert_eq!(listed[0]["deleted"], json!(true));
    assert_eq!(listed[1]["id"], json!("b"));
    assert!(!listed[1].contains_key("deleted"));
}

#[test]
fn test_tombstones_are_filtered_and_sorted_with_live_objects() {
    let storage = storage();
    for n in 0..4 {
        storage
            .create(RESOURCE, PARENT, obj(json!({"id": format!("r{}", n)})))
            .unwrap();
    }
    storage.delete(RESOURCE, PARENT, "r1").unwrap();
    storage.delete(RESOURCE, PARENT, "r3").unwrap();

    let deleted_only = all()
        .including_deleted()
        .with_filter(Filter::eq("deleted", json!(true)))
        .with_sort(Sort::desc("last_modified"));
    let listed = storage.list_all(RESOURCE, PARENT, &deleted_only).unwrap();
    assert_eq!(ids(&listed), vec!["r3", "r1"]);

    let newest = all().including_deleted().with_sort(Sort::desc("last_modified")).with_limit(1);
    let listed = storage.list_all(RESOURCE, PARENT, &newest).unwrap();
    assert_eq!(ids(&listed), vec!["r3"]);
}

#[test]
fn test_purge_deleted_before_is_exclusive() {
    let clock = ManualClock::at_ms(1_000);
    let storage = storage_at(&clock);
    for id in ["a", "b", "c"] {
        storage.create(RESOURCE, PARENT, obj(json!({"id": id}))).unwrap();
    }
    let mut stamps = Vec::new();
    for id in ["a", "b", "c"] {
        stamps.push(ts_of(&storage.delete(RESOURCE, PARENT, id).unwrap()));
    }
    storage.create(RESOURCE, PARENT, obj(json!({"id": "live"}))).unwrap();

    let purged = storage
        .purge_deleted(Some(RESOURCE), PARENT, Some(stamps[1]))
        .unwrap();
    assert_eq!(purged, 1);

    let listed = storage
        .list_all(RESOURCE, PARENT, &all().including_deleted().with_sort(Sort::asc("id")))
        .unwrap();
    assert_eq!(ids(&listed), vec!["b", "c", "live"]);
}

#[test]
fn test_purge_deleted_everything_across_parents() {
    let storage = storage();
    for parent in ["/buckets/a", "/buckets/b", "/groups/a"] {
        for resource in ["records", "history"] {
            storage.create(resource, parent, obj(json!({"id": "x"}))).unwrap();
            storage.delete(resource, parent, "x").unwrap();
        }
    }

    assert_eq!(storage.purge_deleted(None, "/buckets/*", None).unwrap(), 4);
    let remaining = storage
        .list_all("records", "*", &all().including_deleted())
        .unwrap();
    assert_eq!(remaining.len(), 1);
}

// =============================================================================
// Bulk Operations
// =============================================================================

#[test]
fn test_delete_all_with_parent_glob() {
    let storage = storage();
    storage.create(RESOURCE, "/buckets/a", Object::new()).unwrap();
    storage.create(RESOURCE, "/buckets/b", Object::new()).unwrap();
    storage.create(RESOURCE, "/groups/a", Object::new()).unwrap();

    let deleted = storage
        .delete_all(Some(RESOURCE), "/buckets/*", &all(), true)
        .unwrap();
    assert_eq!(deleted.len(), 2);
    assert!(deleted.iter().all(|t| t["deleted"] == json!(true)));

    assert_eq!(storage.count_all(RESOURCE, "/buckets/*", &[]).unwrap(), 0);
    assert_eq!(storage.count_all(RESOURCE, "/groups/a", &[]).unwrap(), 1);
    let tombstones = storage
        .list_all(RESOURCE, "/buckets/a", &all().including_deleted())
        .unwrap();
    assert_eq!(tombstones.len(), 1);
}

#[test]
fn test_parent_glob_is_anchored() {
    let storage = storage();
    storage.create(RESOURCE, "abc", Object::new()).unwrap();
    storage.create(RESOURCE, "xabc", Object::new()).unwrap();
    storage.create(RESOURCE, "abcx", Object::new()).unwrap();
    assert_eq!(storage.list_all(RESOURCE, "abc", &all()).unwrap().len(), 1);
    assert_eq!(storage.list_all(RESOURCE, "abc*", &all()).unwrap().len(), 2);
}

#[test]
fn test_delete_all_respects_filters_sorting_and_limit() {
    let storage = storage();
    for n in 0..6 {
        storage
            .create(RESOURCE, PARENT, obj(json!({"id": format!("r{}", n), "n": n})))
            .unwrap();
    }
    let query = all()
        .with_filter(Filter::new("n", json!(1), Comparison::Min))
        .with_sort(Sort::desc("n"))
        .with_limit(2);
    let deleted = storage.delete_all(Some(RESOURCE), PARENT, &query, true).unwrap();
    assert_eq!(ids(&deleted), vec!["r5", "r4"]);

    let remaining = storage
        .list_all(RESOURCE, PARENT, &all().with_sort(Sort::asc("n")))
        .unwrap();
    assert_eq!(ids(&remaining), vec!["r0", "r1", "r2", "r3"]);
}

#[test]
fn test_delete_all_every_resource() {
    let storage = storage();
    storage.create("a", PARENT, Object::new()).unwrap();
    storage.create("b", PARENT, Object::new()).unwrap();
    storage.create("a", "other", Object::new()).unwrap();

    let deleted = storage.delete_all(None, PARENT, &all(), false).unwrap();
    assert_eq!(deleted.len(), 2);
    assert_eq!(storage.count_all("a", "other", &[]).unwrap(), 1);
    assert!(storage
        .list_all("a", PARENT, &all().including_deleted())
        .unwrap()
        .is_empty());
}

#[test]
fn test_flush_drops_everything() {
    let clock = ManualClock::at_ms(1_000);
    let storage = storage_at(&clock);
    storage
        .create(RESOURCE, PARENT, obj(json!({"last_modified": 90_000})))
        .unwrap();
    let created = storage.create(RESOURCE, PARENT, Object::new()).unwrap();
    storage.delete(RESOURCE, PARENT, &id_of(&created)).unwrap();

    storage.flush().unwrap();
    assert!(storage
        .list_all(RESOURCE, PARENT, &all().including_deleted())
        .unwrap()
        .is_empty());
    assert_eq!(storage.resource_timestamp(RESOURCE, PARENT).unwrap(), 1_000);
}

#[test]
fn test_initialize_schema_is_idempotent() {
    let storage = storage();
    storage.initialize_schema(false).unwrap();
    storage.initialize_schema(false).unwrap();
    storage.initialize_schema(true).unwrap();
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn test_list_all_filters_sorts_and_limits() {
    let storage = storage();
    for (id, status, age) in [("a", 1, 30), ("b", 0, 20), ("c", 1, 10), ("d", 1, 40)] {
        storage
            .create(RESOURCE, PARENT, obj(json!({"id": id, "status": status, "person": {"age": age}})))
            .unwrap();
    }
    let query = all()
        .with_filter(Filter::eq("status", json!(1)))
        .with_sort(Sort::asc("person.age"))
        .with_limit(2);
    let listed = storage.list_all(RESOURCE, PARENT, &query).unwrap();
    assert_eq!(ids(&listed), vec!["c", "a"]);

    let count = storage
        .count_all(RESOURCE, PARENT, &[Filter::eq("status", json!(1))])
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn test_contains_and_contains_any() {
    let storage = storage();
    storage.create(RESOURCE, PARENT, obj(json!({"id": "ab", "tags": ["a", "b", "c"]}))).unwrap();
    storage.create(RESOURCE, PARENT, obj(json!({"id": "a", "tags": ["a"]}))).unwrap();
    storage.create(RESOURCE, PARENT, obj(json!({"id": "none", "tags": []}))).unwrap();
    storage.create(RESOURCE, PARENT, obj(json!({"id": "str", "tags": "a b"}))).unwrap();

    let contains = all()
        .with_filter(Filter::new("tags", json!(["a", "b"]), Comparison::Contains))
        .with_sort(Sort::asc("id"));
    assert_eq!(ids(&storage.list_all(RESOURCE, PARENT, &contains).unwrap()), vec!["ab"]);

    let any = all()
        .with_filter(Filter::new("tags", json!(["b", "a"]), Comparison::ContainsAny))
        .with_sort(Sort::asc("id"));
    assert_eq!(ids(&storage.list_all(RESOURCE, PARENT, &any).unwrap()), vec!["a", "ab"]);
}

#[test]
fn test_numeric_id_filter() {
    let storage = storage();
    storage.create(RESOURCE, PARENT, obj(json!({"id": "12"}))).unwrap();
    storage.create(RESOURCE, PARENT, obj(json!({"id": "13"}))).unwrap();
    let query = all().with_filter(Filter::eq("id", json!(12)));
    assert_eq!(ids(&storage.list_all(RESOURCE, PARENT, &query).unwrap()), vec!["12"]);
}

#[test]
fn test_pagination_covers_every_object_once() {
    let storage = storage();
    for n in 0..11 {
        storage
            .create(RESOURCE, PARENT, obj(json!({"id": format!("r{:02}", n), "group": n % 4})))
            .unwrap();
    }
    let sorting = vec![Sort::asc("group"), Sort::asc("id")];
    let full: Vec<String> = {
        let query = QueryOptions {
            sorting: sorting.clone(),
            ..Default::default()
        };
        ids(&storage.list_all(RESOURCE, PARENT, &query).unwrap())
    };
    assert_eq!(full.len(), 11);

    for page_size in 1..=full.len() {
        let mut seen: Vec<String> = Vec::new();
        let mut rules: Vec<Vec<Filter>> = Vec::new();
        loop {
            let query = QueryOptions {
                sorting: sorting.clone(),
                pagination_rules: rules.clone(),
                limit: Some(page_size),
                ..Default::default()
            };
            let page = storage.list_all(RESOURCE, PARENT, &query).unwrap();
            if page.is_empty() {
                break;
            }
            let last = &page[page.len() - 1];
            rules = vec![
                vec![Filter::gt("group", last["group"].clone())],
                vec![
                    Filter::eq("group", last["group"].clone()),
                    Filter::gt("id", last["id"].clone()),
                ],
            ];
            seen.extend(ids(&page));
        }
        assert_eq!(seen, full, "page size {}", page_size);
        let unique: HashSet<&String> = seen.iter().collect();
        assert_eq!(unique.len(), seen.len());
    }
}
