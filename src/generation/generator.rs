//! Generator contract used by the orchestrator.
//!
//! A generator walks its items in order and, for every item it emits or
//! skips, calls the decision callback once with the item's [`GenerateInput`].
//! Callbacks are never invoked concurrently: generators must not fan out
//! internally.

use crate::error::GenerationError;
use crate::generation::bind::GenerateInput;
use crate::generation::input::ModelInput;
use crate::resource::{Bucket, Function, Role};
use std::path::Path;

/// Decision callback. Returns true when the item is already recorded in the
/// prior import state.
pub type DecisionFn<'a> = dyn FnMut(&GenerateInput) -> bool + 'a;

pub trait ResourceGenerator: Send + Sync {
    /// Create whatever folder layout the generator writes into.
    fn prepare(&self, _project_path: &Path) -> std::io::Result<()> {
        Ok(())
    }

    fn generate_models(
        &self,
        project_path: &Path,
        inputs: &[ModelInput],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError>;

    fn generate_roles(
        &self,
        project_path: &Path,
        roles: &[Role],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError>;

    fn generate_rpc(
        &self,
        project_path: &Path,
        project_name: &str,
        functions: &[Function],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError>;

    fn generate_storages(
        &self,
        project_path: &Path,
        buckets: &[Bucket],
        decide: &mut DecisionFn<'_>,
    ) -> Result<(), GenerationError>;
}
