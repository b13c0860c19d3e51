//! Model input assembly: one [`ModelInput`] per table, carrying its policies
//! and resolved relations.

use crate::relation::{build_relation_map, table_map, Relation, RelationMap, TableMap};
use crate::resource::{Policies, Policy, Table};
use crate::types::TableKey;

/// Everything the model generator needs for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInput {
    pub table: Table,
    pub policies: Vec<Policy>,
    pub relations: Vec<Relation>,
}

impl ModelInput {
    pub fn key(&self) -> TableKey {
        self.table.key()
    }
}

/// Tables + policies -> model inputs, relations inferred along the way.
pub fn build_model_inputs(tables: &[Table], policies: &Policies) -> Vec<ModelInput> {
    let tables = table_map(tables);
    let relations = build_relation_map(&tables);
    assemble_model_inputs(&tables, &relations, policies)
}

/// Iterates the table map, not the relation map, so tables without
/// relations still get an input. Output follows table key order.
pub fn assemble_model_inputs(
    tables: &TableMap,
    relations: &RelationMap,
    policies: &Policies,
) -> Vec<ModelInput> {
    tables
        .iter()
        .map(|(key, table)| ModelInput {
            table: table.clone(),
            policies: policies.filter_by_table(&table.name),
            relations: relations.get(key).cloned().unwrap_or_default(),
        })
        .collect()
}
