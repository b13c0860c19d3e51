//! Import state listing.

use crate::error::ApiError;
use crate::state::ImportState;
use comfy_table::Table;
use serde_json::json;

pub fn format_state_text(state: &ImportState) -> String {
    if state.is_empty() {
        return "No items imported yet.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Category", "Identity", "Output", "Generated At"]);
    for record in state.records() {
        table.add_row(vec![
            record.category.to_string(),
            record.identity.clone(),
            record.output_path.display().to_string(),
            record.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    format!(
        "{}\n{}\n{} items",
        super::heading("Import state"),
        table,
        state.len()
    )
}

pub fn format_state_json(state: &ImportState) -> Result<String, ApiError> {
    let records: Vec<_> = state.records().collect();
    super::to_json(&json!({ "count": records.len(), "items": records }))
}
