//! Resource generation: model inputs, generator contract, decision capture.
//! The orchestrator drives these; emission itself stays behind [`ResourceGenerator`].

pub mod bind;
pub mod emit;
pub mod generator;
pub mod input;
pub mod tracker;

pub use bind::{BindData, GenerateInput, ModelBind, RoleBind, RpcBind, StorageBind};
pub use emit::FileGenerator;
pub use generator::{DecisionFn, ResourceGenerator};
pub use input::{assemble_model_inputs, build_model_inputs, ModelInput};
pub use tracker::{ImportDecisionTracker, ImportItem};
