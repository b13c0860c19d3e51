//! CLI presentation: text and json formatters per command.

mod generate;
mod relations;
mod state;

pub use generate::{format_generate_summary, GenerateSummary};
pub use relations::{format_relations_json, format_relations_text};
pub use state::{format_state_json, format_state_text};

use crate::error::{ApiError, StorageError};
use owo_colors::OwoColorize;

fn heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::StorageError(StorageError::Serialization(e.to_string())))
}
