//! Storage error types
//!
//! Error codes:
//! - STORAGE_OBJECT_NOT_FOUND (404)
//! - STORAGE_UNICITY_VIOLATED (412)
//! - STORAGE_BACKEND_ERROR (503)
//! - STORAGE_READONLY (503)
//! - GENERATOR_INVALID_PATTERN, GENERATOR_MISMATCH
//! - CONFIG_UNKNOWN_BACKEND, CONFIG_UNKNOWN_ID_GENERATOR, CONFIG_MALFORMED

use std::error::Error as StdError;

use thiserror::Error;

use crate::query::Object;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for id generator construction
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Result type for configuration handling
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Boxed underlying driver or transport error
pub type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// No live object with this id (never existed, or only a tombstone)
    #[error("Object not found: {id}")]
    ObjectNotFound { id: String },

    /// A live object already holds this id or unique field value
    #[error("Unicity constraint violated on field {field}")]
    Unicity {
        /// Field that collided
        field: String,
        /// The live object holding the value
        existing: Box<Object>,
    },

    /// Underlying backend failure
    #[error("Backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Operation not permitted in read-only mode
    #[error("Readonly: {message}")]
    Readonly { message: String },
}

impl StorageError {
    /// Create a not-found error
    pub fn not_found(id: impl Into<String>) -> Self {
        StorageError::ObjectNotFound { id: id.into() }
    }

    /// Create a unicity error carrying the conflicting object
    pub fn unicity(field: impl Into<String>, existing: Object) -> Self {
        StorageError::Unicity {
            field: field.into(),
            existing: Box::new(existing),
        }
    }

    /// Create a backend error without an underlying cause
    pub fn backend(message: impl Into<String>) -> Self {
        StorageError::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error
    pub fn backend_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        StorageError::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a read-only error
    pub fn readonly(message: impl Into<String>) -> Self {
        StorageError::Readonly {
            message: message.into(),
        }
    }

    /// Returns true for errors of the backend family (including read-only)
    pub fn is_backend_error(&self) -> bool {
        matches!(self, StorageError::Backend { .. } | StorageError::Readonly { .. })
    }

    /// Returns the conflicting object of a unicity error
    pub fn existing(&self) -> Option<&Object> {
        match self {
            StorageError::Unicity { existing, .. } => Some(existing),
            _ => None,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::ObjectNotFound { .. } => "STORAGE_OBJECT_NOT_FOUND",
            StorageError::Unicity { .. } => "STORAGE_UNICITY_VIOLATED",
            StorageError::Backend { .. } => "STORAGE_BACKEND_ERROR",
            StorageError::Readonly { .. } => "STORAGE_READONLY",
        }
    }

    /// HTTP status a view layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            StorageError::ObjectNotFound { .. } => 404,
            StorageError::Unicity { .. } => 412,
            StorageError::Backend { .. } => 503,
            StorageError::Readonly { .. } => 503,
        }
    }
}

/// Id generator construction errors
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Invalid id pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The generator produced an id its own pattern rejects
    #[error("Generated id {id} does not match {pattern}")]
    Mismatch { id: String, pattern: String },
}

impl GeneratorError {
    pub fn code(&self) -> &'static str {
        match self {
            GeneratorError::InvalidPattern { .. } => "GENERATOR_INVALID_PATTERN",
            GeneratorError::Mismatch { .. } => "GENERATOR_MISMATCH",
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown storage backend: {0}")]
    UnknownBackend(String),

    #[error("Unknown id generator: {0}")]
    UnknownIdGenerator(String),

    #[error("Malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// The backend constructor itself failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::UnknownBackend(_) => "CONFIG_UNKNOWN_BACKEND",
            ConfigError::UnknownIdGenerator(_) => "CONFIG_UNKNOWN_ID_GENERATOR",
            ConfigError::Malformed(_) => "CONFIG_MALFORMED",
            ConfigError::Generator(err) => err.code(),
            ConfigError::Storage(err) => err.code(),
        }
    }
}
