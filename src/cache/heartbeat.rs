//! Cache health probe

use std::time::Duration;

use serde_json::Value;

use super::CacheBackend;
use crate::observability::{log_event_with_fields, Event};
use crate::storage::{StorageResult, DEFAULT_DELETE_RATE};

pub const HEARTBEAT_KEY: &str = "__heartbeat__";
pub const HEARTBEAT_TTL: Duration = Duration::from_secs(3600);

/// Probes a cache backend by writing or deleting a probe key
pub struct CacheHeartbeat<'a> {
    backend: &'a dyn CacheBackend,
    delete_rate: f64,
}

impl<'a> CacheHeartbeat<'a> {
    pub fn new(backend: &'a dyn CacheBackend) -> Self {
        Self {
            backend,
            delete_rate: DEFAULT_DELETE_RATE,
        }
    }

    pub fn ping(&self) -> bool {
        self.ping_with_roll(rand::random::<f64>())
    }

    pub fn ping_with_roll(&self, roll: f64) -> bool {
        match self.probe(roll) {
            Ok(()) => true,
            Err(err) => {
                let error = err.to_string();
                log_event_with_fields(
                    Event::HeartbeatFailed,
                    &[("component", "cache"), ("error", error.as_str())],
                );
                false
            }
        }
    }

    fn probe(&self, roll: f64) -> StorageResult<()> {
        if roll < self.delete_rate {
            self.backend.delete(HEARTBEAT_KEY)?;
        } else {
            self.backend
                .set(HEARTBEAT_KEY, Value::from("alive"), Some(HEARTBEAT_TTL))?;
        }
        Ok(())
    }
}
