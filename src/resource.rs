//! Remote Schema Snapshot
//!
//! Objects fetched from the remote backend (tables with their foreign-key
//! relationships, access policies, roles, functions and storage buckets).
//! Field aliases accept the naming used by the remote metadata API.

use crate::error::ApiError;
use crate::types::TableKey;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(alias = "format")]
    pub data_type: String,
    #[serde(default)]
    pub is_nullable: bool,
}

/// Directionless foreign-key fact as reported by the source schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub constraint_name: String,
    #[serde(alias = "source_table_schema")]
    pub source_schema: String,
    #[serde(alias = "source_table_name")]
    pub source_table: String,
    #[serde(alias = "source_column_name")]
    pub source_column: String,
    #[serde(alias = "target_table_schema")]
    pub target_schema: String,
    #[serde(alias = "target_table_name")]
    pub target_table: String,
    #[serde(alias = "target_column_name")]
    pub target_column: String,
}

impl Relationship {
    pub fn source_key(&self) -> TableKey {
        TableKey::new(&self.source_schema, &self.source_table)
    }

    pub fn target_key(&self) -> TableKey {
        TableKey::new(&self.target_schema, &self.target_table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_keys: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Table {
    pub fn key(&self) -> TableKey {
        TableKey::new(&self.schema, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    #[serde(default)]
    pub schema: String,
    pub table: String,
    /// SELECT, INSERT, UPDATE, DELETE or ALL
    pub command: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub check: Option<String>,
}

/// Policy collection with table filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Policies(pub Vec<Policy>);

impl Policies {
    pub fn new(policies: Vec<Policy>) -> Self {
        Self(policies)
    }

    /// Policies whose target table name is `table_name`.
    pub fn filter_by_table(&self, table_name: &str) -> Vec<Policy> {
        self.0
            .iter()
            .filter(|p| p.table == table_name)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub can_login: bool,
    #[serde(default = "default_inherit_role")]
    pub inherit_role: bool,
    #[serde(default = "default_connection_limit")]
    pub connection_limit: i32,
    #[serde(default)]
    pub valid_until: Option<String>,
}

fn default_inherit_role() -> bool {
    true
}

fn default_connection_limit() -> i32 {
    -1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionArg {
    pub name: String,
    #[serde(alias = "type")]
    pub data_type: String,
    #[serde(default)]
    pub has_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub args: Vec<FunctionArg>,
    #[serde(default = "default_return_type")]
    pub return_type: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub definition: String,
}

fn default_return_type() -> String {
    "void".to_string()
}

/// Storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub file_size_limit: Option<u64>,
    #[serde(default)]
    pub allowed_mime_types: Vec<String>,
}

/// Everything fetched from the remote schema source for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub policies: Policies,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub storages: Vec<Bucket>,
}

impl Resource {
    /// Load a snapshot previously exported as JSON.
    pub fn load_from_file(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ApiError::InvalidResource(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ApiError> {
        let resource: Resource = serde_json::from_str(raw)
            .map_err(|e| ApiError::InvalidResource(format!("Malformed snapshot: {}", e)))?;
        resource.validate()?;
        Ok(resource)
    }

    /// Rejects items whose identity would be empty.
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(table) = self.tables.iter().find(|t| t.name.trim().is_empty()) {
            return Err(ApiError::InvalidResource(format!(
                "Table in schema '{}' has an empty name",
                table.schema
            )));
        }
        if self.roles.iter().any(|r| r.name.trim().is_empty()) {
            return Err(ApiError::InvalidResource("Role with an empty name".to_string()));
        }
        if self.functions.iter().any(|f| f.name.trim().is_empty()) {
            return Err(ApiError::InvalidResource("Function with an empty name".to_string()));
        }
        if self.storages.iter().any(|b| b.name.trim().is_empty()) {
            return Err(ApiError::InvalidResource("Storage bucket with an empty name".to_string()));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
            && self.roles.is_empty()
            && self.functions.is_empty()
            && self.storages.is_empty()
    }
}
