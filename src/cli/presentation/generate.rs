//! Generate command summary.

use crate::resource::Resource;
use std::path::PathBuf;

/// What a finished `generate` run reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub project_name: String,
    pub output_dir: PathBuf,
    pub models: usize,
    pub roles: usize,
    pub functions: usize,
    pub storages: usize,
    /// None for dry runs
    pub state_path: Option<PathBuf>,
    pub state_entries: usize,
}

impl GenerateSummary {
    pub fn from_resource(resource: &Resource) -> Self {
        Self {
            project_name: String::new(),
            output_dir: PathBuf::new(),
            models: resource.tables.len(),
            roles: resource.roles.len(),
            functions: resource.functions.len(),
            storages: resource.storages.len(),
            state_path: None,
            state_entries: 0,
        }
    }
}

pub fn format_generate_summary(summary: &GenerateSummary) -> String {
    let mut lines = vec![
        super::heading(&format!("Generated {}", summary.project_name)),
        format!("  Output:    {}", summary.output_dir.display()),
        format!("  Models:    {}", summary.models),
        format!("  Roles:     {}", summary.roles),
        format!("  Rpc:       {}", summary.functions),
        format!("  Storages:  {}", summary.storages),
    ];
    match &summary.state_path {
        Some(path) => lines.push(format!(
            "  State:     {} ({} entries)",
            path.display(),
            summary.state_entries
        )),
        None => lines.push(format!(
            "  State:     dry run, not saved ({} entries)",
            summary.state_entries
        )),
    }
    lines.join("\n")
}
