//! Merge rules: defaults first, later sources override earlier ones.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder with every defaulted key set. `project_name` falls back to the
/// project directory name.
pub fn builder_with_defaults(
    project_name: &str,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("project_name", project_name)?
        .set_default("state.path", ".schemaforge/import_state.json")?
        .set_default("generation.decision_buffer", 64)?
        .set_default("generation.output_dir", "internal")
}
