//! Import State
//!
//! Record of previously generated items, keyed by resource category and item
//! identity. Generation runs read the prior snapshot; only the reconciler
//! produces the next one.

pub mod persistence;
pub mod reconciler;

pub use persistence::{FileStateStore, MemoryStateStore, StateStore};
pub use reconciler::{ReconcileResult, ReconcileSummary, StateReconciler};

use crate::error::StorageError;
use crate::types::ResourceCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub category: ResourceCategory,
    pub identity: String,
}

impl ItemKey {
    pub fn new(category: ResourceCategory, identity: impl Into<String>) -> Self {
        Self {
            category,
            identity: identity.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub category: ResourceCategory,
    pub identity: String,
    pub name: String,
    pub output_path: PathBuf,
    pub generated_at: DateTime<Utc>,
}

impl ItemRecord {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.category, &self.identity)
    }
}

/// One per-item decision published by a tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecision {
    pub key: ItemKey,
    pub name: String,
    pub output_path: PathBuf,
    /// Item was already recorded in the prior import state
    pub existing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportState {
    records: BTreeMap<ItemKey, ItemRecord>,
}

impl ImportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = ItemRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.key(), r)).collect(),
        }
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &ItemKey) -> Option<&ItemRecord> {
        self.records.get(key)
    }

    /// Insert or replace the record under its key; returns the previous one.
    pub fn upsert(&mut self, record: ItemRecord) -> Option<ItemRecord> {
        self.records.insert(record.key(), record)
    }

    pub fn records(&self) -> impl Iterator<Item = &ItemRecord> {
        self.records.values()
    }

    pub fn records_for(&self, category: ResourceCategory) -> impl Iterator<Item = &ItemRecord> {
        self.records.values().filter(move |r| r.category == category)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Prior import state plus the store it was loaded from and is saved back to.
#[derive(Clone)]
pub struct ImportStateHandle {
    snapshot: ImportState,
    store: Arc<dyn StateStore>,
}

impl ImportStateHandle {
    pub fn new(snapshot: ImportState, store: Arc<dyn StateStore>) -> Self {
        Self { snapshot, store }
    }

    pub fn load(store: Arc<dyn StateStore>) -> Result<Self, StorageError> {
        let snapshot = store.load()?;
        Ok(Self { snapshot, store })
    }

    pub fn snapshot(&self) -> &ImportState {
        &self.snapshot
    }

    pub fn into_parts(self) -> (ImportState, Arc<dyn StateStore>) {
        (self.snapshot, self.store)
    }
}
