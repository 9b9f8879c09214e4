//! Operation counters
//!
//! Counters only, monotonic, reset with the process. Relaxed ordering:
//! the values are exact once writers are done, nothing synchronises on them.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    objects_created: AtomicU64,
    objects_updated: AtomicU64,
    objects_deleted: AtomicU64,
    tombstones_purged: AtomicU64,
    heartbeat_runs: AtomicU64,
    heartbeat_failures: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_objects_created(&self) {
        self.objects_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_objects_updated(&self) {
        self.objects_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_objects_deleted(&self) {
        self.objects_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_tombstones_purged(&self, count: u64) {
        self.tombstones_purged.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_heartbeat_runs(&self) {
        self.heartbeat_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_heartbeat_failures(&self) {
        self.heartbeat_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            objects_created: self.objects_created.load(Ordering::Relaxed),
            objects_updated: self.objects_updated.load(Ordering::Relaxed),
            objects_deleted: self.objects_deleted.load(Ordering::Relaxed),
            tombstones_purged: self.tombstones_purged.load(Ordering::Relaxed),
            heartbeat_runs: self.heartbeat_runs.load(Ordering::Relaxed),
            heartbeat_failures: self.heartbeat_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub objects_created: u64,
    pub objects_updated: u64,
    pub objects_deleted: u64,
    pub tombstones_purged: u64,
    pub heartbeat_runs: u64,
    pub heartbeat_failures: u64,
}

impl MetricsSnapshot {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
