//! Integration tests for schema import and resource generation

mod relation_inference;
mod state_persistence;
mod test_utils;
