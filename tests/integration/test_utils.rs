//! Shared test utilities for integration tests
//!
//! Snapshot builders, a scripted generator, a recording state store and
//! environment isolation for configuration tests.

use parking_lot::Mutex;
use schemaforge::error::{GenerationError, StorageError};
use schemaforge::generation::{
    BindData, DecisionFn, GenerateInput, ModelBind, ModelInput, ResourceGenerator, RoleBind,
    RpcBind, StorageBind,
};
use schemaforge::naming::snake_to_pascal;
use schemaforge::resource::{Bucket, Function, Relationship, Resource, Role, Table};
use schemaforge::state::{ImportState, StateStore};
use schemaforge::types::ResourceCategory;
use std::path::Path;
use tempfile::TempDir;

/// Serializes environment variable access across tests in this binary
static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Run `f` with HOME pointed into `test_dir` and no SCHEMAFORGE_* overrides.
/// `vars` are set for the duration of the call.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(String, Option<String>)> = std::env::vars()
        .filter(|(k, _)| k == "HOME" || k.starts_with("SCHEMAFORGE"))
        .map(|(k, v)| (k, Some(v)))
        .chain(vars.iter().map(|(k, _)| (k.to_string(), std::env::var(k).ok())))
        .collect();

    for (key, _) in &saved {
        std::env::remove_var(key);
    }
    let home = test_dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    std::env::set_var("HOME", &home);
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = f();

    for (key, _) in vars {
        std::env::remove_var(key);
    }
    std::env::remove_var("HOME");
    for (key, value) in saved {
        if let Some(value) = value {
            std::env::set_var(key, value);
        }
    }
    result
}

pub fn fk(source: &str, source_column: &str, target: &str, target_column: &str) -> Relationship {
    Relationship {
        constraint_name: format!("{}_{}_fkey", source, source_column),
        source_schema: "public".to_string(),
        source_table: source.to_string(),
        source_column: source_column.to_string(),
        target_schema: "public".to_string(),
        target_table: target.to_string(),
        target_column: target_column.to_string(),
    }
}

pub fn table(name: &str, relationships: Vec<Relationship>) -> Table {
    Table {
        schema: "public".to_string(),
        name: name.to_string(),
        columns: vec![],
        primary_keys: vec!["id".to_string()],
        relationships,
    }
}

pub fn role(name: &str) -> Role {
    Role {
        name: name.to_string(),
        can_login: false,
        inherit_role: true,
        connection_limit: -1,
        valid_until: None,
    }
}

pub fn function(name: &str) -> Function {
    Function {
        schema: "public".to_string(),
        name: name.to_string(),
        args: vec![],
        return_type: "void".to_string(),
        language: "sql".to_string(),
        definition: String::new(),
    }
}

pub fn bucket(name: &str) -> Bucket {
    Bucket {
        id: name.to_string(),
        name: name.to_string(),
        public: false,
        file_size_limit: None,
        allowed_mime_types: vec![],
    }
}

/// One item in every category.
pub fn full_resource() -> Resource {
    Resource {
        tables: vec![
            table("users", vec![fk("posts", "author_id", "users", "id")]),
            table("posts", vec![fk("posts", "author_id", "users", "id")]),
        ],
        roles: vec![role("editor")],
        functions: vec![function("get_feed")],
        storages: vec![bucket("avatars")],
        ..Resource::default()
    }
}

/// Generator double: reports every item to the decision callback with the
/// bind data a real generator would use, records what it saw and fails or
/// panics on request.
#[derive(Default)]
pub struct ScriptedGenerator {
    pub fail: Option<ResourceCategory>,
    pub panic_in: Option<ResourceCategory>,
    pub prepare_error: bool,
    pub(crate) calls: Mutex<Vec<ResourceCategory>>,
    pub(crate) flags: Mutex<Vec<(ResourceCategory, String, bool)>>,
}

impl ScriptedGenerator {
    pub fn failing(category: ResourceCategory) -> Self {
        Self {
            fail: Some(category),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ResourceCategory> {
        self.calls.lock().clone()
    }

    pub fn flags(&self) -> Vec<(ResourceCategory, String, bool)> {
        self.flags.lock().clone()
    }

    fn report(
        &self,
        category: ResourceCategory,
        items: Vec<(String, BindData)>,
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError> {
        self.calls.lock().push(category);
        if self.panic_in == Some(category) {
            panic!("scripted panic in {}", category);
        }
        for (name, bind) in items {
            let existing = decide(&GenerateInput::new(bind, format!("{}.rs", name)));
            self.flags.lock().push((category, name, existing));
        }
        match self.fail {
            Some(failing) if failing == category => {
                Err(GenerationError::new(category, "scripted failure"))
            }
            _ => Ok(()),
        }
    }
}

impl ResourceGenerator for ScriptedGenerator {
    fn prepare(&self, _project_path: &Path) -> std::io::Result<()> {
        if self.prepare_error {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only project",
            ));
        }
        Ok(())
    }

    fn generate_models(
        &self,
        _project_path: &Path,
        inputs: &[ModelInput],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError> {
        let items = inputs
            .iter()
            .map(|m| {
                (
                    m.table.name.clone(),
                    BindData::Model(ModelBind {
                        struct_name: snake_to_pascal(&m.table.name),
                        schema: m.table.schema.clone(),
                    }),
                )
            })
            .collect();
        self.report(ResourceCategory::Model, items, decide)
    }

    fn generate_roles(
        &self,
        _project_path: &Path,
        roles: &[Role],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError> {
        let items = roles
            .iter()
            .map(|r| (r.name.clone(), BindData::Role(RoleBind { name: r.name.clone() })))
            .collect();
        self.report(ResourceCategory::Role, items, decide)
    }

    fn generate_rpc(
        &self,
        _project_path: &Path,
        _project_name: &str,
        functions: &[Function],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError> {
        let items = functions
            .iter()
            .map(|f| {
                (
                    f.name.clone(),
                    BindData::Rpc(RpcBind {
                        name: snake_to_pascal(&f.name),
                        schema: f.schema.clone(),
                    }),
                )
            })
            .collect();
        self.report(ResourceCategory::Rpc, items, decide)
    }

    fn generate_storages(
        &self,
        _project_path: &Path,
        buckets: &[Bucket],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError> {
        let items = buckets
            .iter()
            .map(|b| {
                (
                    b.name.clone(),
                    BindData::Storage(StorageBind {
                        name: snake_to_pascal(&b.name),
                    }),
                )
            })
            .collect();
        self.report(ResourceCategory::Storage, items, decide)
    }
}

/// In-memory store counting saves; optionally fails every save.
#[derive(Default)]
pub struct RecordingStore {
    pub fail_save: bool,
    state: Mutex<ImportState>,
    saves: Mutex<usize>,
}

impl RecordingStore {
    pub fn with_state(state: ImportState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_save: true,
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    pub fn current(&self) -> ImportState {
        self.state.lock().clone()
    }
}

impl StateStore for RecordingStore {
    fn load(&self) -> Result<ImportState, StorageError> {
        Ok(self.state.lock().clone())
    }

    fn save(&self, state: &ImportState) -> Result<(), StorageError> {
        *self.saves.lock() += 1;
        if self.fail_save {
            return Err(StorageError::Serialization("disk full".to_string()));
        }
        *self.state.lock() = state.clone();
        Ok(())
    }
}
