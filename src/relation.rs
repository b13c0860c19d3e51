//! Derived Relations
//!
//! Semantic relations reconstructed from raw foreign-key edges. A relation
//! belongs to one table (its key in the [`RelationMap`]) and points at a
//! target table.

pub mod graph;

pub use graph::{build_relation_map, table_map, TableMap};

use crate::naming::snake_to_pascal;
use crate::types::TableKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relation kind relative to the owning table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    HasOne,
    HasMany,
    ManyToMany,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::HasOne => "has_one",
            RelationKind::HasMany => "has_many",
            RelationKind::ManyToMany => "many_to_many",
        }
    }

    fn is_collection(&self) -> bool {
        !matches!(self, RelationKind::HasOne)
    }
}

/// Pivot description for a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSpec {
    /// Pivot table name
    pub through: String,
    pub source_primary_key: String,
    pub join_source_foreign_key: String,
    pub target_primary_key: String,
    pub join_target_foreign_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Target table name
    pub table: String,
    pub schema: String,
    /// Type reference used by generated code: `Users` or `Vec<Users>`
    pub type_ref: String,
    pub kind: RelationKind,
    pub primary_key: String,
    pub foreign_key: String,
    pub join: Option<JoinSpec>,
}

impl Relation {
    pub fn new(
        target: &TableKey,
        kind: RelationKind,
        primary_key: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            table: target.name.clone(),
            schema: target.schema.clone(),
            type_ref: type_ref(&target.name, kind),
            kind,
            primary_key: primary_key.into(),
            foreign_key: foreign_key.into(),
            join: None,
        }
    }

    pub fn target_key(&self) -> TableKey {
        TableKey::new(&self.schema, &self.table)
    }
}

fn type_ref(table: &str, kind: RelationKind) -> String {
    let name = snake_to_pascal(table);
    if kind.is_collection() {
        format!("Vec<{}>", name)
    } else {
        name
    }
}

/// Pivot leg recorded for every has-one edge while scanning a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManyToManyCandidate {
    /// Table the pivot points at
    pub table: String,
    pub schema: String,
    pub pivot_table: String,
    pub primary_key: String,
    pub foreign_key: String,
}

impl ManyToManyCandidate {
    pub fn key(&self) -> TableKey {
        TableKey::new(&self.schema, &self.table)
    }
}

/// Table identity -> relations in discovery order.
///
/// Tables without relations have no entry.
pub type RelationMap = BTreeMap<TableKey, Vec<Relation>>;
