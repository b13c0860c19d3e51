//! schemaforge: Relation-Aware Resource Generation
//!
//! Turns a snapshot of remote database schema objects (tables, foreign keys,
//! policies, roles, functions, storage buckets) into generated project
//! sources. Relations are inferred from raw foreign-key edges, including
//! many-to-many relations implied by pivot tables, and every run is
//! reconciled against the persisted import state.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod naming;
pub mod orchestrator;
pub mod relation;
pub mod resource;
pub mod state;
pub mod types;

pub use error::ApiError;
pub use orchestrator::{generate_resources, GenerationOrchestrator};
