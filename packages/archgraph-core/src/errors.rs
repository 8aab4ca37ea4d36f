//! Error types for archgraph-core
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for archgraph-core operations
#[derive(Debug, Error)]
pub enum EngineError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoding error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Two entities share one id.
    ///
    /// Entity ids are namespaced by the raw-fact producer, so a collision
    /// means the upstream id contract was violated.
    #[error("Duplicate entity id '{id}' (first declared in {first_file}, again in {second_file})")]
    DuplicateEntityId {
        id: String,
        first_file: String,
        second_file: String,
    },

    /// Raw input record that could not be decoded at all
    #[error("Malformed raw record: {0}")]
    MalformedRecord(String),
}

impl EngineError {
    /// Create a malformed-record error
    pub fn malformed(msg: impl Into<String>) -> Self {
        EngineError::MalformedRecord(msg.into())
    }

    /// True for the error classes that indicate a programming error upstream
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, EngineError::DuplicateEntityId { .. })
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
