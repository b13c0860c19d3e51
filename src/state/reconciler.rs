//! State reconciler: sole writer of the next import state.
//!
//! Consumes the decision stream produced by the trackers, folds every decision
//! into a copy of the prior snapshot and persists the result exactly once,
//! after the stream closes.

use crate::error::StorageError;
use crate::state::{ImportDecision, ImportState, ItemRecord, StateStore};
use crate::types::ResourceCategory;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn, Instrument, Span};

/// Counts reported once the stream is drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Decisions folded into the next state
    pub decisions: usize,
    /// Decisions for items already present in the prior state
    pub existing: usize,
}

pub type ReconcileResult = Result<ReconcileSummary, StorageError>;

pub struct StateReconciler {
    prior: ImportState,
    store: Arc<dyn StateStore>,
}

impl StateReconciler {
    pub fn new(prior: ImportState, store: Arc<dyn StateStore>) -> Self {
        Self { prior, store }
    }

    /// Spawn the listener on the current runtime, inside the current span.
    /// The returned receiver resolves after the decision stream closes and
    /// the save has run.
    pub fn listen(
        self,
        decisions: mpsc::Receiver<ImportDecision>,
    ) -> oneshot::Receiver<ReconcileResult> {
        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(
            async move {
                let result = self.run(decisions).await;
                if done_tx.send(result).is_err() {
                    debug!("Reconcile result receiver dropped");
                }
            }
            .instrument(Span::current()),
        );
        done_rx
    }

    /// Drain the stream, then save once.
    pub async fn run(self, mut decisions: mpsc::Receiver<ImportDecision>) -> ReconcileResult {
        let mut next = self.prior.clone();
        let mut summary = ReconcileSummary::default();

        while let Some(decision) = decisions.recv().await {
            if decision.existing {
                summary.existing += 1;
            }
            summary.decisions += 1;
            next.upsert(ItemRecord {
                category: decision.key.category,
                identity: decision.key.identity,
                name: decision.name,
                output_path: decision.output_path,
                generated_at: Utc::now(),
            });
        }

        for category in ResourceCategory::ALL {
            debug!(
                category = %category,
                entries = next.records_for(category).count(),
                "Reconciled category"
            );
        }

        let store = Arc::clone(&self.store);
        let saved = tokio::task::spawn_blocking(move || store.save(&next).map(|_| next.len()))
            .await
            .map_err(|e| {
                StorageError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
            })?;

        match saved {
            Ok(entries) => {
                info!(
                    decisions = summary.decisions,
                    existing = summary.existing,
                    entries,
                    "Import state reconciled"
                );
                Ok(summary)
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist import state");
                Err(e)
            }
        }
    }
}
