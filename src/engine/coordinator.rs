// src/engine/coordinator.rs

//! Run-level orchestration: filter the configured projects, run them
//! sequentially or with bounded parallelism, and aggregate everything into a
//! single [`RunResult`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ProjectSpec;
use crate::engine::events::{EventSink, RunEvent};
use crate::engine::filter::select_projects;
use crate::engine::project::ProjectRunner;
use crate::exec::CommandInvoker;
use crate::results::{ProjectResult, ProjectStatus, RunResult, RunSummary};
use crate::types::ExecutionPolicy;

pub struct Coordinator {
    invoker: Arc<dyn CommandInvoker>,
    events: EventSink,
    policy: ExecutionPolicy,
}

impl Coordinator {
    pub fn new(invoker: Arc<dyn CommandInvoker>, events: EventSink, policy: ExecutionPolicy) -> Self {
        Self {
            invoker,
            events,
            policy,
        }
    }

    /// Execute a whole run. Never discards partial progress: cancellation or
    /// per-project faults still yield a RunResult with whatever results were
    /// collected, plus a summary computed from them.
    pub async fn run(
        &self,
        projects: Vec<ProjectSpec>,
        names: &[String],
        tags: &[String],
        cancel: CancellationToken,
    ) -> RunResult {
        let started_at = SystemTime::now();

        let selected = select_projects(projects, names, tags);
        info!(
            selected = selected.len(),
            parallel = self.policy.parallel,
            max_parallel = self.policy.max_parallel,
            "run starting"
        );

        let results = if selected.is_empty() {
            Vec::new()
        } else if self.policy.parallel {
            self.run_parallel(selected, cancel).await
        } else {
            self.run_sequential(selected, cancel).await
        };

        // Single aggregation step over the final list; the summary is never
        // maintained incrementally.
        let summary = RunSummary::compute(&results);
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            errors = summary.errors,
            skipped = summary.skipped,
            "run finished"
        );
        self.events.emit(RunEvent::RunCompleted {
            summary: summary.clone(),
        });

        RunResult {
            started_at,
            finished_at: SystemTime::now(),
            projects: results,
            summary,
        }
    }

    /// Configuration order, one project at a time. With
    /// `stop_on_first_failure`, projects after the first Failed/Error are
    /// never attempted and do not appear in the result list at all.
    async fn run_sequential(
        &self,
        selected: Vec<ProjectSpec>,
        cancel: CancellationToken,
    ) -> Vec<ProjectResult> {
        let runner = ProjectRunner::new(self.invoker.clone(), self.events.clone());
        let mut results = Vec::with_capacity(selected.len());

        for spec in &selected {
            let result = runner.run(spec, &cancel).await;
            let stop = self.policy.stop_on_first_failure && is_failure(&result);
            results.push(result);
            if stop {
                warn!("failure observed; stopping before remaining projects");
                break;
            }
        }

        results
    }

    /// Bounded fan-out: a semaphore permit is the admission ticket for one
    /// running project. With `stop_on_first_failure`, the guarantee is "no
    /// *new* project starts after a failure was observed" — projects already
    /// in flight run to completion. Results arrive in completion order.
    async fn run_parallel(
        &self,
        selected: Vec<ProjectSpec>,
        cancel: CancellationToken,
    ) -> Vec<ProjectResult> {
        let semaphore = Arc::new(Semaphore::new(self.policy.max_parallel.max(1)));
        let failure_observed = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handles = Vec::with_capacity(selected.len());

        for spec in selected {
            let semaphore = Arc::clone(&semaphore);
            let failure_observed = Arc::clone(&failure_observed);
            let tx = tx.clone();
            let cancel = cancel.clone();
            let runner = ProjectRunner::new(self.invoker.clone(), self.events.clone());
            let stop_on_first_failure = self.policy.stop_on_first_failure;
            let spec_for_fault = spec.clone();

            let handle = tokio::spawn(async move {
                // Held for the project's whole lifetime and released by drop
                // on every exit path, so a fault can never leak a permit and
                // silently shrink the effective parallelism.
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    // The semaphore is never closed; treat this as "don't start".
                    Err(_) => return,
                };

                if stop_on_first_failure && failure_observed.load(Ordering::SeqCst) {
                    debug!(project = %spec.name, "failure already observed; not starting");
                    return;
                }

                let result = runner.run(&spec, &cancel).await;
                if is_failure(&result) {
                    failure_observed.store(true, Ordering::SeqCst);
                }
                let _ = tx.send(result);
            });

            handles.push((spec_for_fault, handle));
        }
        drop(tx);

        let mut results = Vec::new();
        while let Some(result) = rx.recv().await {
            results.push(result);
        }

        // A panicking project task is an orchestration fault; surface it as
        // an Error result for that project instead of aborting the run.
        for (spec, handle) in handles {
            if let Err(err) = handle.await {
                warn!(project = %spec.name, error = %err, "project task faulted");
                results.push(ProjectResult::orchestration_error(
                    &spec,
                    format!("project task faulted: {err}"),
                ));
            }
        }

        results
    }
}

/// Failed and Error trigger fail-fast; Skipped and Passed do not.
fn is_failure(result: &ProjectResult) -> bool {
    matches!(
        result.status,
        ProjectStatus::Failed | ProjectStatus::Error
    )
}
