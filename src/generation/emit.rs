//! File generator: renders one Rust source file per imported item under
//! `<project>/<output_dir>/<category>/`.

use crate::error::GenerationError;
use crate::generation::bind::{BindData, GenerateInput, ModelBind, RoleBind, RpcBind, StorageBind};
use crate::generation::generator::{DecisionFn, ResourceGenerator};
use crate::generation::input::ModelInput;
use crate::naming::{snake_to_pascal, to_snake};
use crate::relation::{Relation, RelationKind};
use crate::resource::{Bucket, Column, Function, Role};
use crate::types::ResourceCategory;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HEADER: &str = "// Code generated by schemaforge. DO NOT EDIT.\n";

pub struct FileGenerator {
    output_dir: PathBuf,
    dry_run: bool,
}

impl Default for FileGenerator {
    fn default() -> Self {
        Self::new("internal")
    }
}

impl FileGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            dry_run: false,
        }
    }

    /// Render and report every item without touching the filesystem.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn category_dir(&self, project_path: &Path, category: ResourceCategory) -> PathBuf {
        project_path.join(&self.output_dir).join(category.output_dir())
    }

    fn emit(
        &self,
        category: ResourceCategory,
        input: &GenerateInput,
        existing: bool,
        content: &str,
    ) -> Result<(), GenerationError> {
        if self.dry_run {
            debug!(
                category = %category,
                path = %input.output_path.display(),
                bytes = content.len(),
                "Dry run, file not written"
            );
            return Ok(());
        }
        fs::write(&input.output_path, content).map_err(|e| {
            GenerationError::new(
                category,
                format!("failed to write {}: {}", input.output_path.display(), e),
            )
        })?;
        debug!(
            category = %category,
            path = %input.output_path.display(),
            action = if existing { "regenerate" } else { "create" },
            "Wrote generated file"
        );
        Ok(())
    }
}

impl ResourceGenerator for FileGenerator {
    fn prepare(&self, project_path: &Path) -> std::io::Result<()> {
        if self.dry_run {
            return Ok(());
        }
        for category in ResourceCategory::ALL {
            fs::create_dir_all(self.category_dir(project_path, category))?;
        }
        Ok(())
    }

    fn generate_models(
        &self,
        project_path: &Path,
        inputs: &[ModelInput],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError> {
        let dir = self.category_dir(project_path, ResourceCategory::Model);
        for model in inputs {
            let table = &model.table;
            let file_name = if table.schema == "public" || table.schema.is_empty() {
                format!("{}.rs", to_snake(&table.name))
            } else {
                format!("{}_{}.rs", to_snake(&table.schema), to_snake(&table.name))
            };
            let input = GenerateInput::new(
                BindData::Model(ModelBind {
                    struct_name: snake_to_pascal(&table.name),
                    schema: table.schema.clone(),
                }),
                dir.join(file_name),
            );
            let existing = decide(&input);
            self.emit(ResourceCategory::Model, &input, existing, &render_model(model))?;
        }
        info!(count = inputs.len(), "Generated models");
        Ok(())
    }

    fn generate_roles(
        &self,
        project_path: &Path,
        roles: &[Role],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError> {
        let dir = self.category_dir(project_path, ResourceCategory::Role);
        for role in roles {
            let input = GenerateInput::new(
                BindData::Role(RoleBind {
                    name: role.name.clone(),
                }),
                dir.join(format!("{}.rs", to_snake(&role.name))),
            );
            let existing = decide(&input);
            self.emit(ResourceCategory::Role, &input, existing, &render_role(role))?;
        }
        info!(count = roles.len(), "Generated roles");
        Ok(())
    }

    fn generate_rpc(
        &self,
        project_path: &Path,
        project_name: &str,
        functions: &[Function],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError> {
        let dir = self.category_dir(project_path, ResourceCategory::Rpc);
        for function in functions {
            let input = GenerateInput::new(
                BindData::Rpc(RpcBind {
                    name: snake_to_pascal(&function.name),
                    schema: function.schema.clone(),
                }),
                dir.join(format!("{}.rs", to_snake(&function.name))),
            );
            let existing = decide(&input);
            let content = render_rpc(project_name, function);
            self.emit(ResourceCategory::Rpc, &input, existing, &content)?;
        }
        info!(count = functions.len(), "Generated rpc bindings");
        Ok(())
    }

    fn generate_storages(
        &self,
        project_path: &Path,
        buckets: &[Bucket],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError> {
        let dir = self.category_dir(project_path, ResourceCategory::Storage);
        for bucket in buckets {
            let input = GenerateInput::new(
                BindData::Storage(StorageBind {
                    name: snake_to_pascal(&to_snake(&bucket.name)),
                }),
                dir.join(format!("{}.rs", to_snake(&bucket.name))),
            );
            let existing = decide(&input);
            self.emit(ResourceCategory::Storage, &input, existing, &render_storage(bucket))?;
        }
        info!(count = buckets.len(), "Generated storages");
        Ok(())
    }
}

fn rust_type(column: &Column) -> String {
    let base = match column.data_type.to_ascii_lowercase().as_str() {
        "int2" | "smallint" => "i16",
        "int4" | "integer" | "serial" => "i32",
        "int8" | "bigint" | "bigserial" => "i64",
        "float4" | "real" => "f32",
        "float8" | "double precision" | "numeric" | "decimal" => "f64",
        "bool" | "boolean" => "bool",
        "json" | "jsonb" => "serde_json::Value",
        "bytea" => "Vec<u8>",
        _ => "String",
    };
    if column.is_nullable {
        format!("Option<{}>", base)
    } else {
        base.to_string()
    }
}

fn relation_doc(relation: &Relation) -> String {
    match (&relation.kind, &relation.join) {
        (RelationKind::ManyToMany, Some(join)) => format!(
            "many_to_many {} through {} ({} <- {}, {} <- {})",
            relation.table,
            join.through,
            join.source_primary_key,
            join.join_source_foreign_key,
            join.target_primary_key,
            join.join_target_foreign_key
        ),
        (kind, _) => format!(
            "{} {} ({} <- {})",
            kind.as_str(),
            relation.table,
            relation.primary_key,
            relation.foreign_key
        ),
    }
}

fn render_model(model: &ModelInput) -> String {
    let table = &model.table;
    let struct_name = snake_to_pascal(&table.name);
    let mut out = String::from(HEADER);
    let _ = writeln!(out, "//\n// Table: {}", table.key());
    if !model.policies.is_empty() {
        out.push_str("// Policies:\n");
        for policy in &model.policies {
            let _ = writeln!(
                out,
                "//   - {} ({}) to {}",
                policy.name,
                policy.command,
                if policy.roles.is_empty() {
                    "public".to_string()
                } else {
                    policy.roles.join(", ")
                }
            );
        }
    }

    let _ = writeln!(out, "\npub struct {} {{", struct_name);
    let mut fields: HashSet<String> = HashSet::new();
    for column in &table.columns {
        let field = to_snake(&column.name);
        let _ = writeln!(out, "    pub {}: {},", field, rust_type(column));
        fields.insert(field);
    }
    for relation in &model.relations {
        let mut field = to_snake(&relation.table);
        if !fields.insert(field.clone()) {
            field = format!("{}_by_{}", field, to_snake(&relation.foreign_key));
            fields.insert(field.clone());
        }
        let ty = match relation.kind {
            RelationKind::HasOne => format!("Option<Box<{}>>", relation.type_ref),
            RelationKind::HasMany | RelationKind::ManyToMany => relation.type_ref.clone(),
        };
        let _ = writeln!(out, "    /// {}", relation_doc(relation));
        let _ = writeln!(out, "    pub {}: {},", field, ty);
    }
    out.push_str("}\n\n");

    let _ = writeln!(out, "impl {} {{", struct_name);
    let _ = writeln!(out, "    pub const SCHEMA: &'static str = {:?};", table.schema);
    let _ = writeln!(out, "    pub const TABLE: &'static str = {:?};", table.name);
    let _ = writeln!(
        out,
        "    pub const PRIMARY_KEYS: &'static [&'static str] = &{:?};",
        table.primary_keys
    );
    out.push_str("}\n");
    out
}

fn render_role(role: &Role) -> String {
    let name = snake_to_pascal(&role.name);
    let mut out = String::from(HEADER);
    let _ = writeln!(out, "\npub struct {};\n", name);
    let _ = writeln!(out, "impl {} {{", name);
    let _ = writeln!(out, "    pub const NAME: &'static str = {:?};", role.name);
    let _ = writeln!(out, "    pub const CAN_LOGIN: bool = {};", role.can_login);
    let _ = writeln!(out, "    pub const INHERIT_ROLE: bool = {};", role.inherit_role);
    let _ = writeln!(
        out,
        "    pub const CONNECTION_LIMIT: i32 = {};",
        role.connection_limit
    );
    let _ = writeln!(
        out,
        "    pub const VALID_UNTIL: Option<&'static str> = {:?};",
        role.valid_until
    );
    out.push_str("}\n");
    out
}

fn render_rpc(project_name: &str, function: &Function) -> String {
    let name = snake_to_pascal(&function.name);
    let mut out = String::from(HEADER);
    let _ = writeln!(out, "//\n// Project: {}", project_name);
    let _ = writeln!(out, "\npub struct {}Params {{", name);
    for arg in &function.args {
        let column = Column {
            name: arg.name.clone(),
            data_type: arg.data_type.clone(),
            is_nullable: arg.has_default,
        };
        let _ = writeln!(out, "    pub {}: {},", to_snake(&arg.name), rust_type(&column));
    }
    out.push_str("}\n\n");
    let _ = writeln!(out, "pub struct {};\n", name);
    let _ = writeln!(out, "impl {} {{", name);
    let _ = writeln!(out, "    pub const SCHEMA: &'static str = {:?};", function.schema);
    let _ = writeln!(out, "    pub const NAME: &'static str = {:?};", function.name);
    let _ = writeln!(
        out,
        "    pub const RETURN_TYPE: &'static str = {:?};",
        function.return_type
    );
    out.push_str("}\n");
    out
}

fn render_storage(bucket: &Bucket) -> String {
    let name = snake_to_pascal(&to_snake(&bucket.name));
    let mut out = String::from(HEADER);
    let _ = writeln!(out, "\npub struct {};\n", name);
    let _ = writeln!(out, "impl {} {{", name);
    let _ = writeln!(out, "    pub const ID: &'static str = {:?};", bucket.id);
    let _ = writeln!(out, "    pub const NAME: &'static str = {:?};", bucket.name);
    let _ = writeln!(out, "    pub const PUBLIC: bool = {};", bucket.public);
    let _ = writeln!(
        out,
        "    pub const FILE_SIZE_LIMIT: Option<u64> = {:?};",
        bucket.file_size_limit
    );
    let _ = writeln!(
        out,
        "    pub const ALLOWED_MIME_TYPES: &'static [&'static str] = &{:?};",
        bucket.allowed_mime_types
    );
    out.push_str("}\n");
    out
}
