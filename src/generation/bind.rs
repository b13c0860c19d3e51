//! Binding data a generator reports for each item it emits or skips.

use crate::types::ResourceCategory;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBind {
    pub struct_name: String,
    pub schema: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBind {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcBind {
    pub name: String,
    pub schema: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageBind {
    pub name: String,
}

/// One variant per resource category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindData {
    Model(ModelBind),
    Role(RoleBind),
    Rpc(RpcBind),
    Storage(StorageBind),
}

impl BindData {
    pub fn category(&self) -> ResourceCategory {
        match self {
            BindData::Model(_) => ResourceCategory::Model,
            BindData::Role(_) => ResourceCategory::Role,
            BindData::Rpc(_) => ResourceCategory::Rpc,
            BindData::Storage(_) => ResourceCategory::Storage,
        }
    }
}

/// What the generator is about to write, handed to the decision callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateInput {
    pub bind_data: BindData,
    pub output_path: PathBuf,
}

impl GenerateInput {
    pub fn new(bind_data: BindData, output_path: impl Into<PathBuf>) -> Self {
        Self {
            bind_data,
            output_path: output_path.into(),
        }
    }
}
