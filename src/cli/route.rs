//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_generate_summary, format_relations_json, format_relations_text, format_state_json,
    format_state_text, GenerateSummary,
};
use crate::config::{ConfigLoader, ImportConfig};
use crate::error::ApiError;
use crate::orchestrator::{generate_resources, preview_resources};
use crate::relation::{build_relation_map, table_map};
use crate::resource::Resource;
use crate::state::{FileStateStore, ImportStateHandle, MemoryStateStore, StateStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Runtime context for CLI execution: project root and its loaded configuration.
pub struct RunContext {
    project_root: PathBuf,
    config: ImportConfig,
}

impl RunContext {
    /// Explicit config file wins over layered loading.
    pub fn new(project_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(&path)?,
            None => ConfigLoader::load(&project_root)?,
        };
        Ok(Self::with_config(project_root, config))
    }

    pub fn with_config(project_root: PathBuf, config: ImportConfig) -> Self {
        Self {
            project_root,
            config,
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Generate { resources, dry_run } => self.handle_generate(resources, *dry_run),
            Commands::State { format } => self.handle_state(format),
            Commands::Relations { resources, format } => self.handle_relations(resources, format),
        }
    }

    fn handle_generate(&self, resources: &Path, dry_run: bool) -> Result<String, ApiError> {
        let resource = Resource::load_from_file(resources)?;
        let state_path = self.config.state_path(&self.project_root);

        let file_store = Arc::new(FileStateStore::new(&state_path));
        let store: Arc<dyn StateStore> = if dry_run {
            Arc::new(MemoryStateStore::new(file_store.load()?))
        } else {
            file_store
        };
        let handle = ImportStateHandle::load(Arc::clone(&store))?;

        let mut summary = GenerateSummary::from_resource(&resource);
        summary.project_name = self.config.project_name.clone();
        summary.output_dir = self.project_root.join(&self.config.generation.output_dir);

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;
        rt.block_on(async {
            if dry_run {
                preview_resources(&self.config, handle, &self.project_root, resource).await
            } else {
                generate_resources(&self.config, handle, &self.project_root, resource).await
            }
        })?;

        summary.state_entries = store.load()?.len();
        if !dry_run {
            summary.state_path = Some(state_path);
        }
        info!(
            project = %summary.project_name,
            dry_run,
            entries = summary.state_entries,
            "Generate command finished"
        );
        Ok(format_generate_summary(&summary))
    }

    fn handle_state(&self, format: &str) -> Result<String, ApiError> {
        let state = FileStateStore::new(self.config.state_path(&self.project_root)).load()?;
        match format {
            "json" => format_state_json(&state),
            "text" => Ok(format_state_text(&state)),
            other => Err(unknown_format(other)),
        }
    }

    fn handle_relations(&self, resources: &Path, format: &str) -> Result<String, ApiError> {
        let resource = Resource::load_from_file(resources)?;
        let relations = build_relation_map(&table_map(&resource.tables));
        match format {
            "json" => format_relations_json(&relations),
            "text" => Ok(format_relations_text(&relations)),
            other => Err(unknown_format(other)),
        }
    }
}

fn unknown_format(format: &str) -> ApiError {
    ApiError::ConfigError(format!(
        "Unknown output format '{}' (expected 'text' or 'json')",
        format
    ))
}
