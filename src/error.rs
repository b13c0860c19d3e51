//! Error types for schema import and resource generation.

use crate::types::ResourceCategory;
use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a category generator.
///
/// Opaque to the orchestrator: it is surfaced as-is, never retried or merged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{category} generation failed: {message}")]
pub struct GenerationError {
    pub category: ResourceCategory,
    pub message: String,
}

impl GenerationError {
    pub fn new(category: ResourceCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Import state persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("State I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("State serialization failed: {0}")]
    Serialization(String),

    #[error("Unsupported import state version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Errors surfaced to callers of the import pipeline
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    GenerationFailed(#[from] GenerationError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid resource snapshot: {0}")]
    InvalidResource(String),

    #[error("Failed to prepare project layout at {path:?}: {source}")]
    ProjectLayout {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Generation worker aborted: {0}")]
    WorkerAborted(String),

    #[error("State reconciler stopped before reporting a result")]
    ReconcilerStopped,
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
