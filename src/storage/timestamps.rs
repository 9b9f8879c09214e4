//! Resource timestamps
//!
//! Each namespace carries one integer timestamp (milliseconds) that never
//! decreases. Writes bump it; records are stamped with the bumped value,
//! which behaves like a revision number rather than a wall-clock reading.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::errors::{StorageError, StorageResult};
use super::namespace::Namespace;

/// Source of the current time in milliseconds since epoch
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock. Clones share the same time.
///
/// Unlike the wall clock it can be moved backwards, which is how skew is
/// simulated in tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    current_ms: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn at_ms(start_ms: i64) -> Self {
        Self {
            current_ms: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set_ms(&self, ms: i64) {
        self.current_ms.store(ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: i64) -> i64 {
        self.current_ms.fetch_add(ms, Ordering::SeqCst) + ms
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

/// Outcome of a timestamp bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bump {
    /// Value stamped on the record
    pub record: i64,
    /// New resource timestamp
    pub resource: i64,
}

/// Computes the next record and resource timestamps.
///
/// With a supplied value:
/// - equal to the resource timestamp: both become `resource + 1`
/// - greater: both become the supplied value
/// - lower: the record keeps the supplied value, the resource is unchanged
///
/// Without one, `now` is used, or `resource + 1` if `now` is not ahead.
///
/// Fails when `resource + 1` does not fit in an `i64`; the resource
/// timestamp never wraps around.
pub fn bump_timestamp(resource: i64, supplied: Option<i64>, now: i64) -> StorageResult<Bump> {
    let bump = match supplied {
        Some(value) if value == resource => {
            let next = successor(resource)?;
            Bump {
                record: next,
                resource: next,
            }
        }
        Some(value) if value > resource => Bump {
            record: value,
            resource: value,
        },
        Some(value) => Bump {
            record: value,
            resource,
        },
        None => {
            let current = if now <= resource { successor(resource)? } else { now };
            Bump {
                record: current,
                resource: current,
            }
        }
    };
    Ok(bump)
}

fn successor(resource: i64) -> StorageResult<i64> {
    resource
        .checked_add(1)
        .ok_or_else(|| StorageError::backend(format!("Resource timestamp {} cannot be bumped", resource)))
}

/// Per-namespace resource timestamps
#[derive(Debug, Default)]
pub struct ResourceTimestamps {
    timestamps: BTreeMap<Namespace, i64>,
}

impl ResourceTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored timestamp, if the namespace was ever touched
    pub fn get(&self, namespace: &Namespace) -> Option<i64> {
        self.timestamps.get(namespace).copied()
    }

    /// Bumps the namespace timestamp (starting from 0) and returns the
    /// value to stamp on the record. Nothing is stored on failure.
    pub fn bump(&mut self, namespace: &Namespace, supplied: Option<i64>, now: i64) -> StorageResult<i64> {
        let current = self.get(namespace).unwrap_or(0);
        let bump = bump_timestamp(current, supplied, now)?;
        self.timestamps.insert(namespace.clone(), bump.resource);
        Ok(bump.record)
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
    }
}
