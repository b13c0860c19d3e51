//! Configuration System
//!
//! Layered configuration for import runs: merge-policy defaults, the global
//! user file, project files and `SCHEMAFORGE__` environment overrides.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Carried into generated RPC headers
    pub project_name: String,

    #[serde(default)]
    pub state: StateConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Import state file; relative paths resolve against the project root
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

fn default_state_path() -> PathBuf {
    PathBuf::from(".schemaforge/import_state.json")
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Capacity of the decision channel between trackers and the reconciler
    #[serde(default = "default_decision_buffer")]
    pub decision_buffer: usize,

    /// Root of generated sources, relative to the project
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_decision_buffer() -> usize {
    64
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("internal")
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            decision_buffer: default_decision_buffer(),
            output_dir: default_output_dir(),
        }
    }
}

impl ImportConfig {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            state: StateConfig::default(),
            generation: GenerationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Collects every violation instead of stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.project_name.trim().is_empty() {
            errors.push(ValidationError::Project(
                "project_name cannot be empty".to_string(),
            ));
        }
        if self.state.path.as_os_str().is_empty() {
            errors.push(ValidationError::State("state path cannot be empty".to_string()));
        }
        if self.generation.decision_buffer == 0 {
            errors.push(ValidationError::Generation(
                "decision_buffer must be at least 1".to_string(),
            ));
        }
        if self.generation.output_dir.as_os_str().is_empty() {
            errors.push(ValidationError::Generation(
                "output_dir cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn state_path(&self, project_root: &Path) -> PathBuf {
        if self.state.path.is_absolute() {
            self.state.path.clone()
        } else {
            project_root.join(&self.state.path)
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Project(String),
    State(String),
    Generation(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Project(msg) => write!(f, "Project: {}", msg),
            ValidationError::State(msg) => write!(f, "State: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}
