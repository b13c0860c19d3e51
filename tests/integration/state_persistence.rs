//! Integration tests for import state persistence through the reconciler

use schemaforge::error::StorageError;
use schemaforge::state::{
    FileStateStore, ImportDecision, ImportState, ImportStateHandle, ItemKey, StateReconciler,
    StateStore,
};
use schemaforge::types::ResourceCategory;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn decision(category: ResourceCategory, identity: &str, existing: bool) -> ImportDecision {
    ImportDecision {
        key: ItemKey::new(category, identity),
        name: identity.to_string(),
        output_path: PathBuf::from(format!("internal/{}.rs", identity)),
        existing,
    }
}

#[tokio::test]
async fn test_reconciled_state_survives_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".schemaforge").join("import_state.json");
    let store: Arc<dyn StateStore> = Arc::new(FileStateStore::new(&path));

    let handle = ImportStateHandle::load(Arc::clone(&store)).unwrap();
    assert!(handle.snapshot().is_empty());

    let (prior, store_for_run) = handle.into_parts();
    let (tx, rx) = mpsc::channel(2);
    let done = StateReconciler::new(prior, store_for_run).listen(rx);
    tx.send(decision(ResourceCategory::Model, "public.users", false))
        .await
        .unwrap();
    tx.send(decision(ResourceCategory::Storage, "avatars", false))
        .await
        .unwrap();
    drop(tx);
    let summary = done.await.unwrap().unwrap();
    assert_eq!(summary.decisions, 2);
    assert_eq!(summary.existing, 0);

    let reloaded = ImportStateHandle::load(store).unwrap();
    let snapshot = reloaded.snapshot();
    assert_eq!(snapshot.len(), 2);
    let users = snapshot
        .get(&ItemKey::new(ResourceCategory::Model, "public.users"))
        .unwrap();
    assert_eq!(users.output_path, PathBuf::from("internal/public.users.rs"));
}

#[test]
fn test_persisted_format_is_versioned_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    FileStateStore::new(&path).save(&ImportState::new()).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["version"], 1);
    assert!(raw["entries"].as_array().unwrap().is_empty());
}

#[test]
fn test_save_into_unwritable_location_fails() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file, not a directory").unwrap();

    let store = FileStateStore::new(blocker.join("state.json"));
    assert!(matches!(
        store.save(&ImportState::new()),
        Err(StorageError::IoError(_))
    ));
}
