//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Atomic operation counters
//!
//! Observability never changes the outcome of an operation: logging errors
//! are ignored and counters cannot fail.
//!
//! ```ignore
//! use kinto_core::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::StorageFlushed, &[("backend", "memory")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_objects_created();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::SchemaInitialized);
        log_event_with_fields(Event::BackendLoaded, &[("backend", "memory")]);
    }
}
