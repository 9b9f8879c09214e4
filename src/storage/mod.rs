//! Object storage subsystem
//!
//! Objects are JSON maps stored per namespace `(resource_name, parent_id)`.
//!
//! # Guarantees
//!
//! - Every write bumps the namespace's resource timestamp, which never
//!   decreases
//! - Records written without an explicit timestamp get distinct timestamps
//! - Deleting leaves a tombstone (id, timestamp, `deleted: true`) unless
//!   asked not to; re-creating the id removes it
//! - Tombstones are never counted in totals

mod backend;
mod config;
mod errors;
pub mod generators;
mod heartbeat;
mod memory;
mod namespace;
mod registry;
mod timestamps;
mod tombstone;

pub use backend::{CreateOptions, DeleteOptions, FieldNames, StorageBackend};
pub use config::StorageConfig;
pub use errors::{
    BoxedSource, ConfigError, ConfigResult, GeneratorError, GeneratorResult, StorageError,
    StorageResult,
};
pub use generators::{Alphanumeric, FnGenerator, IdGenerator, Uuid4};
pub use heartbeat::{
    heartbeat, StorageHeartbeat, DEFAULT_DELETE_RATE, HEARTBEAT_FIELD, HEARTBEAT_PARENT_ID,
    HEARTBEAT_RESOURCE_NAME,
};
pub use memory::MemoryStorage;
pub use namespace::{Namespace, NamespaceSelector};
pub use registry::{load_from_config, BackendFactory, BackendRegistry};
pub use timestamps::{bump_timestamp, Bump, Clock, ManualClock, ResourceTimestamps, SystemClock};
pub use tombstone::{strip_deleted_object, Cemetery};
