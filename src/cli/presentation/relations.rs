//! Inferred relation listing.

use crate::error::ApiError;
use crate::relation::{RelationKind, RelationMap};
use comfy_table::Table;
use serde_json::json;

pub fn format_relations_text(relations: &RelationMap) -> String {
    if relations.is_empty() {
        return "No relations inferred.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Table", "Kind", "Target", "Type", "Keys", "Through"]);
    let mut count = 0;
    for (key, entries) in relations {
        for relation in entries {
            count += 1;
            let through = match (&relation.kind, &relation.join) {
                (RelationKind::ManyToMany, Some(join)) => format!(
                    "{} ({} -> {})",
                    join.through, join.join_source_foreign_key, join.join_target_foreign_key
                ),
                _ => "-".to_string(),
            };
            table.add_row(vec![
                key.to_string(),
                relation.kind.as_str().to_string(),
                relation.target_key().to_string(),
                relation.type_ref.clone(),
                format!("{} <- {}", relation.primary_key, relation.foreign_key),
                through,
            ]);
        }
    }
    format!(
        "{}\n{}\n{} relations on {} tables",
        super::heading("Relations"),
        table,
        count,
        relations.len()
    )
}

pub fn format_relations_json(relations: &RelationMap) -> Result<String, ApiError> {
    let tables: Vec<_> = relations
        .iter()
        .map(|(key, entries)| json!({ "table": key.to_string(), "relations": entries }))
        .collect();
    super::to_json(&tables)
}
