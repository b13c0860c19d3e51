//! Generation Orchestrator
//!
//! Drives one import run. A single blocking worker calls the category
//! generators back to back (models, roles, rpc, storages), each wrapped in an
//! [`ImportDecisionTracker`]. Decisions stream to the [`StateReconciler`];
//! category failures go to a small error channel. A supervisor task closes
//! both channels once the worker is done, so the reconciler always sees the
//! end of the stream and saves exactly once.
//!
//! The caller returns once the reconciler has reported. The first category
//! error, if any, is returned in place of the reconciler's result.

use crate::config::ImportConfig;
use crate::error::{ApiError, GenerationError};
use crate::generation::{
    build_model_inputs, FileGenerator, GenerateInput, ImportDecisionTracker, ModelInput,
    ResourceGenerator,
};
use crate::resource::{Bucket, Function, Resource, Role};
use crate::state::{ImportDecision, ImportState, ImportStateHandle, StateReconciler};
use crate::types::ResourceCategory;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument, Span};

/// One slot per category; the worker never sends more than that.
const ERROR_BUFFER: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorPhase {
    Idle,
    Running,
    Draining,
    Done,
}

impl fmt::Display for OrchestratorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrchestratorPhase::Idle => "idle",
            OrchestratorPhase::Running => "running",
            OrchestratorPhase::Draining => "draining",
            OrchestratorPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Per-category inputs, read-only once built.
struct CategoryWork {
    models: Vec<ModelInput>,
    roles: Vec<Role>,
    functions: Vec<Function>,
    storages: Vec<Bucket>,
}

impl CategoryWork {
    fn from_resource(resource: Resource) -> Self {
        Self {
            models: build_model_inputs(&resource.tables, &resource.policies),
            roles: resource.roles,
            functions: resource.functions,
            storages: resource.storages,
        }
    }
}

pub struct GenerationOrchestrator<G> {
    generator: Arc<G>,
    span: Span,
    decision_buffer: Option<usize>,
}

impl<G> GenerationOrchestrator<G>
where
    G: ResourceGenerator + 'static,
{
    pub fn new(generator: Arc<G>) -> Self {
        Self {
            generator,
            span: Span::none(),
            decision_buffer: None,
        }
    }

    /// Span every event of the run is recorded under, worker and reconciler
    /// included.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Overrides `generation.decision_buffer` from the config.
    pub fn with_decision_buffer(mut self, capacity: usize) -> Self {
        self.decision_buffer = Some(capacity);
        self
    }

    pub async fn run(
        &self,
        config: &ImportConfig,
        import_state: ImportStateHandle,
        project_path: &Path,
        resource: Resource,
    ) -> Result<(), ApiError> {
        let span = self.span.clone();
        self.run_inner(config, import_state, project_path, resource)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        config: &ImportConfig,
        import_state: ImportStateHandle,
        project_path: &Path,
        resource: Resource,
    ) -> Result<(), ApiError> {
        let mut phase = OrchestratorPhase::Idle;
        resource.validate()?;

        self.generator
            .prepare(project_path)
            .map_err(|source| ApiError::ProjectLayout {
                path: project_path.to_path_buf(),
                source,
            })?;

        transition(&mut phase, OrchestratorPhase::Running);
        let (prior, store) = import_state.into_parts();
        let capacity = self
            .decision_buffer
            .unwrap_or(config.generation.decision_buffer)
            .max(1);
        let (decision_tx, decision_rx) = mpsc::channel::<ImportDecision>(capacity);
        let (error_tx, mut error_rx) = mpsc::channel::<ApiError>(ERROR_BUFFER);

        let mut done = StateReconciler::new(prior.clone(), store).listen(decision_rx);

        let worker = {
            let generator = Arc::clone(&self.generator);
            let work = CategoryWork::from_resource(resource);
            let prior = Arc::new(prior);
            let project_path = project_path.to_path_buf();
            let project_name = config.project_name.clone();
            let decisions = decision_tx.clone();
            let errors = error_tx.clone();
            let span = Span::current();
            tokio::task::spawn_blocking(move || {
                span.in_scope(|| {
                    run_worker(
                        generator.as_ref(),
                        &project_path,
                        &project_name,
                        &work,
                        &prior,
                        &decisions,
                        &errors,
                    )
                })
            })
        };

        // Supervisor: holds the original senders until the worker is gone.
        tokio::spawn(
            async move {
                if let Err(e) = worker.await {
                    warn!(error = %e, "Generation worker aborted");
                    if error_tx
                        .send(ApiError::WorkerAborted(e.to_string()))
                        .await
                        .is_err()
                    {
                        debug!("Error receiver dropped before worker abort was reported");
                    }
                }
                drop(decision_tx);
                drop(error_tx);
            }
            .instrument(Span::current()),
        );

        // The first category error is returned, but never before the
        // reconciler has reported.
        let mut first_error: Option<ApiError> = None;
        let mut errors_open = true;
        loop {
            tokio::select! {
                biased;

                received = error_rx.recv(), if errors_open => match received {
                    Some(err) => {
                        warn!(error = %err, "Import run failed");
                        if first_error.is_none() {
                            first_error = Some(err);
                        } else {
                            debug!(error = %err, "Further category error after the first");
                        }
                    }
                    None => {
                        errors_open = false;
                        transition(&mut phase, OrchestratorPhase::Draining);
                    }
                },

                result = &mut done => {
                    transition(&mut phase, OrchestratorPhase::Done);
                    let reconciled = match result {
                        Ok(Ok(summary)) => {
                            info!(
                                decisions = summary.decisions,
                                existing = summary.existing,
                                "Import run finished"
                            );
                            Ok(())
                        }
                        Ok(Err(e)) => Err(ApiError::StorageError(e)),
                        Err(_) => Err(ApiError::ReconcilerStopped),
                    };
                    return match first_error {
                        Some(err) => {
                            if let Err(e) = reconciled {
                                warn!(error = %e, "Import state not saved after failed run");
                            }
                            Err(err)
                        }
                        None => reconciled,
                    };
                }
            }
        }
    }
}

fn transition(phase: &mut OrchestratorPhase, next: OrchestratorPhase) {
    debug!(from = %phase, to = %next, "Orchestrator phase");
    *phase = next;
}

fn run_worker<G: ResourceGenerator + ?Sized>(
    generator: &G,
    project_path: &Path,
    project_name: &str,
    work: &CategoryWork,
    prior: &Arc<ImportState>,
    decisions: &mpsc::Sender<ImportDecision>,
    errors: &mpsc::Sender<ApiError>,
) {
    run_category(ResourceCategory::Model, work.models.len(), errors, || {
        let mut tracker =
            ImportDecisionTracker::new(&work.models, Arc::clone(prior), decisions.clone());
        let result =
            generator.generate_models(project_path, &work.models, &mut |input: &GenerateInput| {
                tracker.capture(input)
            });
        report_published(ResourceCategory::Model, tracker.published());
        result
    });

    run_category(ResourceCategory::Role, work.roles.len(), errors, || {
        let mut tracker =
            ImportDecisionTracker::new(&work.roles, Arc::clone(prior), decisions.clone());
        let result =
            generator.generate_roles(project_path, &work.roles, &mut |input: &GenerateInput| {
                tracker.capture(input)
            });
        report_published(ResourceCategory::Role, tracker.published());
        result
    });

    run_category(ResourceCategory::Rpc, work.functions.len(), errors, || {
        let mut tracker =
            ImportDecisionTracker::new(&work.functions, Arc::clone(prior), decisions.clone());
        let result = generator.generate_rpc(
            project_path,
            project_name,
            &work.functions,
            &mut |input: &GenerateInput| tracker.capture(input),
        );
        report_published(ResourceCategory::Rpc, tracker.published());
        result
    });

    run_category(ResourceCategory::Storage, work.storages.len(), errors, || {
        let mut tracker =
            ImportDecisionTracker::new(&work.storages, Arc::clone(prior), decisions.clone());
        let result = generator.generate_storages(
            project_path,
            &work.storages,
            &mut |input: &GenerateInput| tracker.capture(input),
        );
        report_published(ResourceCategory::Storage, tracker.published());
        result
    });
}

fn report_published(category: ResourceCategory, decisions: usize) {
    debug!(category = %category, decisions, "Decisions published");
}

/// Empty categories are skipped. A failure is reported and the next category
/// still runs.
fn run_category<F>(
    category: ResourceCategory,
    items: usize,
    errors: &mpsc::Sender<ApiError>,
    generate: F,
) where
    F: FnOnce() -> Result<(), GenerationError>,
{
    if items == 0 {
        debug!(category = %category, "skip - generate, no items");
        return;
    }

    info!(category = %category, items, "start - generate");
    match generate() {
        Ok(()) => info!(category = %category, "finish - generate"),
        Err(e) => {
            warn!(category = %category, error = %e, "failed - generate");
            if errors.blocking_send(ApiError::GenerationFailed(e)).is_err() {
                debug!(category = %category, "Error receiver dropped");
            }
        }
    }
}

/// Entry point used by the CLI: file generator under the configured output
/// directory, import state from `import_state`.
pub async fn generate_resources(
    config: &ImportConfig,
    import_state: ImportStateHandle,
    project_path: impl AsRef<Path>,
    resource: Resource,
) -> Result<(), ApiError> {
    let generator = FileGenerator::new(&config.generation.output_dir);
    run_file_generator(generator, config, import_state, project_path.as_ref(), resource).await
}

/// Same run as [`generate_resources`] with no files written. Decisions are
/// still reconciled and saved to the store behind `import_state`.
pub async fn preview_resources(
    config: &ImportConfig,
    import_state: ImportStateHandle,
    project_path: impl AsRef<Path>,
    resource: Resource,
) -> Result<(), ApiError> {
    let generator = FileGenerator::new(&config.generation.output_dir).with_dry_run(true);
    run_file_generator(generator, config, import_state, project_path.as_ref(), resource).await
}

async fn run_file_generator(
    generator: FileGenerator,
    config: &ImportConfig,
    import_state: ImportStateHandle,
    project_path: &Path,
    resource: Resource,
) -> Result<(), ApiError> {
    let project_path: PathBuf = project_path.to_path_buf();
    GenerationOrchestrator::new(Arc::new(generator))
        .with_span(info_span!(
            "generate_resources",
            project = %config.project_name,
            path = %project_path.display()
        ))
        .run(config, import_state, &project_path, resource)
        .await
}
