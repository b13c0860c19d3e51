//! Relation graph builder: raw tables + foreign-key edges -> [`RelationMap`].
//!
//! Direction is derived per owning table: an edge whose source is the table
//! itself is a has-one (the table holds the foreign key), any other edge is a
//! has-many seen from the referenced side. Every has-one edge is also a
//! provisional pivot leg; two legs of the same pivot pair up into a
//! many-to-many relation between their targets.

use crate::relation::{JoinSpec, ManyToManyCandidate, Relation, RelationKind, RelationMap};
use crate::resource::Table;
use crate::types::TableKey;
use std::collections::BTreeMap;
use tracing::debug;

/// Tables keyed by identity. A later duplicate of the same key replaces the
/// earlier one.
pub type TableMap = BTreeMap<TableKey, Table>;

pub fn table_map(tables: &[Table]) -> TableMap {
    tables.iter().map(|t| (t.key(), t.clone())).collect()
}

/// Build the relation map for every table.
///
/// Relation order inside an entry is processing order: table key order, then
/// relationship order within each table.
pub fn build_relation_map(tables: &TableMap) -> RelationMap {
    let mut relations = RelationMap::new();
    for table in tables.values() {
        let (direct, candidates) = scan_table_relations(table);
        if direct.is_empty() {
            continue;
        }

        merge_relations(table, direct, &mut relations);
        merge_many_to_many_candidates(&candidates, &mut relations);
    }

    debug!(
        tables = tables.len(),
        related_tables = relations.len(),
        "Built relation map"
    );
    relations
}

fn scan_table_relations(table: &Table) -> (Vec<Relation>, Vec<ManyToManyCandidate>) {
    let mut relations = Vec::with_capacity(table.relationships.len());
    let mut candidates = Vec::new();
    let owner = table.key();

    for r in &table.relationships {
        let relation = if r.source_key() == owner {
            candidates.push(ManyToManyCandidate {
                table: r.target_table.clone(),
                schema: r.target_schema.clone(),
                pivot_table: table.name.clone(),
                primary_key: r.target_column.clone(),
                foreign_key: r.source_column.clone(),
            });
            Relation::new(
                &r.target_key(),
                RelationKind::HasOne,
                &r.target_column,
                &r.source_column,
            )
        } else {
            Relation::new(
                &r.source_key(),
                RelationKind::HasMany,
                &r.target_column,
                &r.source_column,
            )
        };
        relations.push(relation);
    }

    (relations, candidates)
}

fn merge_relations(table: &Table, relations: Vec<Relation>, map: &mut RelationMap) {
    map.entry(table.key()).or_default().extend(relations);
}

/// Pair every two legs of the same pivot, in both directions.
///
/// Two legs pointing at the same table would describe a relation of a table
/// to itself through the pivot; those pairs are skipped.
fn merge_many_to_many_candidates(candidates: &[ManyToManyCandidate], map: &mut RelationMap) {
    for (source_index, source) in candidates.iter().enumerate() {
        for (target_index, target) in candidates.iter().enumerate() {
            if source_index == target_index {
                continue;
            }
            let source_key = source.key();
            let target_key = target.key();
            if source_key == target_key {
                continue;
            }

            let mut relation = Relation::new(
                &target_key,
                RelationKind::ManyToMany,
                &source.primary_key,
                &source.foreign_key,
            );
            relation.join = Some(JoinSpec {
                through: source.pivot_table.clone(),
                source_primary_key: source.primary_key.clone(),
                join_source_foreign_key: source.foreign_key.clone(),
                target_primary_key: target.primary_key.clone(),
                join_target_foreign_key: target.foreign_key.clone(),
            });
            map.entry(source_key).or_default().push(relation);
        }
    }
}
