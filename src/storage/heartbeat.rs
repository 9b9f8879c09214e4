//! Storage health probe
//!
//! Exercises the write path in its own namespace. Failures are logged and
//! reported as `false`, never propagated.

use serde_json::Value;

use super::backend::StorageBackend;
use super::config::StorageConfig;
use super::errors::StorageResult;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::query::{Object, QueryOptions};

pub const HEARTBEAT_RESOURCE_NAME: &str = "__heartbeat__";
pub const HEARTBEAT_PARENT_ID: &str = "__heartbeat__";
pub const HEARTBEAT_FIELD: &str = "__heartbeat__";

/// Default probability of the delete branch
pub const DEFAULT_DELETE_RATE: f64 = 0.6;

/// Probes a storage backend
pub struct StorageHeartbeat<'a> {
    backend: &'a dyn StorageBackend,
    delete_rate: f64,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> StorageHeartbeat<'a> {
    pub fn new(backend: &'a dyn StorageBackend) -> Self {
        Self {
            backend,
            delete_rate: DEFAULT_DELETE_RATE,
            metrics: None,
        }
    }

    /// Probe using the configured `heartbeat_delete_rate`
    pub fn from_config(backend: &'a dyn StorageBackend, config: &StorageConfig) -> Self {
        Self::new(backend).with_delete_rate(config.heartbeat_delete_rate)
    }

    pub fn with_delete_rate(mut self, delete_rate: f64) -> Self {
        self.delete_rate = delete_rate;
        self
    }

    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Runs one probe with a random draw
    pub fn ping(&self) -> bool {
        self.ping_with_roll(rand::random::<f64>())
    }

    /// Runs one probe; `roll` below the delete rate selects the delete branch
    pub fn ping_with_roll(&self, roll: f64) -> bool {
        if let Some(metrics) = self.metrics {
            metrics.increment_heartbeat_runs();
        }
        match self.probe(roll) {
            Ok(()) => true,
            Err(err) => {
                if let Some(metrics) = self.metrics {
                    metrics.increment_heartbeat_failures();
                }
                let error = err.to_string();
                log_event_with_fields(
                    Event::HeartbeatFailed,
                    &[("component", "storage"), ("error", error.as_str())],
                );
                false
            }
        }
    }

    fn probe(&self, roll: f64) -> StorageResult<()> {
        let backend = self.backend;
        if backend.is_readonly() {
            backend.list_all(HEARTBEAT_RESOURCE_NAME, HEARTBEAT_PARENT_ID, &QueryOptions::default())?;
            return Ok(());
        }

        if roll < self.delete_rate {
            backend.delete_all(
                Some(HEARTBEAT_RESOURCE_NAME),
                HEARTBEAT_PARENT_ID,
                &QueryOptions::default(),
                true,
            )?;
            backend.purge_deleted(Some(HEARTBEAT_RESOURCE_NAME), HEARTBEAT_PARENT_ID, None)?;
        } else {
            let mut object = Object::new();
            object.insert(HEARTBEAT_FIELD.to_string(), Value::Bool(true));
            backend.create(HEARTBEAT_RESOURCE_NAME, HEARTBEAT_PARENT_ID, object)?;
        }
        Ok(())
    }
}

/// Probes `backend` with the default delete rate
pub fn heartbeat(backend: &dyn StorageBackend) -> bool {
    StorageHeartbeat::new(backend).ping()
}
