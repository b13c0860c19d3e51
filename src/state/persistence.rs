//! Import state persistence.

use crate::error::StorageError;
use crate::state::{ImportState, ItemRecord};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const IMPORT_STATE_VERSION: u32 = 1;

/// Load/save contract for the import state. `save` is called exactly once
/// per generation run.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<ImportState, StorageError>;
    fn save(&self, state: &ImportState) -> Result<(), StorageError>;
}

/// Versioned JSON file, written atomically.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// On-disk format
#[derive(Debug, Serialize, Deserialize)]
struct ImportStatePersistence {
    version: u32,
    entries: Vec<ItemRecord>,
}

impl StateStore for FileStateStore {
    /// Missing file means nothing was imported yet.
    fn load(&self) -> Result<ImportState, StorageError> {
        if !self.path.exists() {
            return Ok(ImportState::new());
        }

        let bytes = fs::read(&self.path)?;
        let persistence: ImportStatePersistence = serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::Serialization(format!(
                "Failed to parse import state {:?}: {}",
                self.path, e
            ))
        })?;

        if persistence.version != IMPORT_STATE_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: persistence.version,
                expected: IMPORT_STATE_VERSION,
            });
        }

        Ok(ImportState::from_records(persistence.entries))
    }

    /// Temp file + rename.
    fn save(&self, state: &ImportState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let persistence = ImportStatePersistence {
            version: IMPORT_STATE_VERSION,
            entries: state.records().cloned().collect(),
        };
        let serialized = serde_json::to_vec_pretty(&persistence)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &serialized)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::IoError(e));
        }

        debug!(
            path = %self.path.display(),
            entries = persistence.entries.len(),
            "Saved import state"
        );
        Ok(())
    }
}

/// Keeps the state in memory; used for dry runs.
#[derive(Default)]
pub struct MemoryStateStore {
    state: Mutex<ImportState>,
    saves: Mutex<usize>,
}

impl MemoryStateStore {
    pub fn new(initial: ImportState) -> Self {
        Self {
            state: Mutex::new(initial),
            saves: Mutex::new(0),
        }
    }

    pub fn current(&self) -> ImportState {
        self.state.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<ImportState, StorageError> {
        Ok(self.state.lock().clone())
    }

    fn save(&self, state: &ImportState) -> Result<(), StorageError> {
        *self.state.lock() = state.clone();
        *self.saves.lock() += 1;
        Ok(())
    }
}
