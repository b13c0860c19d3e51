//! Single entry point for building an [`ImportConfig`] from all sources.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::ImportConfig;
use crate::error::ApiError;
use config::{Environment, File};
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// defaults < global file < project files < `SCHEMAFORGE__*` environment.
    pub fn load(project_root: &Path) -> Result<ImportConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults(&default_project_name(project_root))?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, project_root)?;
        let config = builder
            .add_source(environment())
            .build()?
            .try_deserialize::<ImportConfig>()?;

        debug!(
            project = %config.project_name,
            root = %project_root.display(),
            "Loaded configuration"
        );
        Self::validated(config)
    }

    /// One explicit file over the defaults; the environment still wins.
    pub fn load_from_file(path: &Path) -> Result<ImportConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let project_root = path
            .parent()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."));
        let config = merge_policy::builder_with_defaults(&default_project_name(project_root))?
            .add_source(File::from(path))
            .add_source(environment())
            .build()?
            .try_deserialize::<ImportConfig>()?;
        Self::validated(config)
    }

    fn validated(config: ImportConfig) -> Result<ImportConfig, ApiError> {
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        Ok(config)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("SCHEMAFORGE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn default_project_name(project_root: &Path) -> String {
    project_root
        .canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| project_root.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}
