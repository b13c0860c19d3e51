//! Shared identity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite table identity: (schema, name).
///
/// Ordered by schema then name, which is the iteration order of every
/// table-keyed map in the crate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableKey {
    pub schema: String,
    pub name: String,
}

impl TableKey {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Resource categories, in the order the generation worker processes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Model,
    Role,
    Rpc,
    Storage,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 4] = [
        ResourceCategory::Model,
        ResourceCategory::Role,
        ResourceCategory::Rpc,
        ResourceCategory::Storage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Model => "model",
            ResourceCategory::Role => "role",
            ResourceCategory::Rpc => "rpc",
            ResourceCategory::Storage => "storage",
        }
    }

    /// Output sub-directory for generated files of this category.
    pub fn output_dir(&self) -> &'static str {
        match self {
            ResourceCategory::Model => "models",
            ResourceCategory::Role => "roles",
            ResourceCategory::Rpc => "rpc",
            ResourceCategory::Storage => "storages",
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
