//! Observable lifecycle events

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A backend was built from configuration
    BackendLoaded,
    /// Backing structures created (or checked, on dry run)
    SchemaInitialized,
    /// All storage data dropped
    StorageFlushed,
    /// Tombstones removed by `purge_deleted`
    TombstonesPurged,
    /// All cache entries dropped
    CacheFlushed,
    /// A health probe swallowed an error
    HeartbeatFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BackendLoaded => "BACKEND_LOADED",
            Event::SchemaInitialized => "SCHEMA_INITIALIZED",
            Event::StorageFlushed => "STORAGE_FLUSHED",
            Event::TombstonesPurged => "TOMBSTONES_PURGED",
            Event::CacheFlushed => "CACHE_FLUSHED",
            Event::HeartbeatFailed => "HEARTBEAT_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::HeartbeatFailed => Severity::Error,
            Event::TombstonesPurged => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
