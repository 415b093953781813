// src/results.rs

//! Result types produced by the execution engine.
//!
//! These flow one direction: the invoker produces [`CommandResult`]s, the
//! project runner aggregates them into a [`ProjectResult`], and the
//! coordinator aggregates those into a single [`RunResult`] per run. All four
//! are created fresh per run and never mutated once the run has finished.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Serialize, Serializer};

use crate::config::ProjectSpec;

/// Terminal (and transient) states of one project within a run.
///
/// `NotRun` and `Running` are transient; a finished run only ever contains
/// `Passed`, `Failed`, `Error` or `Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    NotRun,
    Running,
    Passed,
    Failed,
    Error,
    Skipped,
}

/// Outcome of one command invocation.
///
/// `exit_code == -1` is reserved for "did not complete": timeout,
/// cancellation, or failure to even start the process. In those cases `error`
/// carries a message distinguishing the cause; for ordinary non-zero exits it
/// stays `None`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    /// The literal command string that was executed.
    pub command: String,
    pub exit_code: i32,
    /// Captured stdout, line-buffered, capped (see `exec::MAX_CAPTURED_BYTES`).
    pub stdout: String,
    /// Captured stderr, kept separate from stdout.
    pub stderr: String,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
    /// Set when the command did not complete (timeout / cancel / spawn
    /// failure); distinguishes those causes in all observable output.
    pub error: Option<String>,
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
}

impl CommandResult {
    /// Literal success check: exit code zero. Policy adjustments such as
    /// `ignore_exit_codes` are applied by the project runner, not here.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn duration(&self) -> Duration {
        self.finished_at
            .duration_since(self.started_at)
            .unwrap_or(Duration::ZERO)
    }

    /// Whether this command was cut off by its timeout (as opposed to the
    /// other did-not-complete causes).
    pub fn timed_out(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|e| e.starts_with("timed out"))
    }

    /// Result for a command that never produced a process exit.
    pub(crate) fn not_completed(
        command: &str,
        error: impl Into<String>,
        started_at: SystemTime,
    ) -> Self {
        Self {
            command: command.to_string(),
            exit_code: -1,
            stdout: String::new(),
            stderr: String::new(),
            stdout_truncated: false,
            stderr_truncated: false,
            error: Some(error.into()),
            started_at,
            finished_at: SystemTime::now(),
        }
    }
}

/// Aggregated outcome of one project: identity fields copied from the spec,
/// the terminal status, and every command result in execution order
/// (pre, then main, then post).
#[derive(Debug, Clone, Serialize)]
pub struct ProjectResult {
    pub name: String,
    pub path: PathBuf,
    pub tags: Vec<String>,
    pub status: ProjectStatus,
    /// Set on the Error and short-circuit Failed paths.
    pub error: Option<String>,
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
    pub commands: Vec<CommandResult>,
}

impl ProjectResult {
    pub fn is_success(&self) -> bool {
        self.status == ProjectStatus::Passed
    }

    pub fn duration(&self) -> Duration {
        self.finished_at
            .duration_since(self.started_at)
            .unwrap_or(Duration::ZERO)
    }

    /// Result for a project whose task faulted at the orchestration level
    /// (e.g. a panicking worker task) without producing a normal result.
    pub(crate) fn orchestration_error(spec: &ProjectSpec, message: impl Into<String>) -> Self {
        let now = SystemTime::now();
        Self {
            name: spec.name.clone(),
            path: spec.path.clone(),
            tags: spec.tags.clone(),
            status: ProjectStatus::Error,
            error: Some(message.into()),
            started_at: now,
            finished_at: now,
            commands: Vec::new(),
        }
    }
}

/// Per-run statistics, computed exactly once from the final result list
/// (never maintained incrementally, so the counts cannot drift).
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    /// passed / total × 100; 0.0 for an empty run.
    pub success_rate: f64,
    #[serde(serialize_with = "duration_secs")]
    pub average_duration: Duration,
}

impl RunSummary {
    pub fn compute(projects: &[ProjectResult]) -> Self {
        let total = projects.len();
        let mut passed = 0;
        let mut failed = 0;
        let mut errors = 0;
        let mut skipped = 0;

        for project in projects {
            match project.status {
                ProjectStatus::Passed => passed += 1,
                ProjectStatus::Failed => failed += 1,
                ProjectStatus::Skipped => skipped += 1,
                // NotRun/Running never appear in a finished run; counting
                // them as errors keeps the counts summing to `total` even if
                // a transient status ever leaks through.
                ProjectStatus::Error | ProjectStatus::NotRun | ProjectStatus::Running => {
                    errors += 1
                }
            }
        }

        let success_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };

        let average_duration = if total == 0 {
            Duration::ZERO
        } else {
            let sum: Duration = projects.iter().map(ProjectResult::duration).sum();
            sum / total as u32
        };

        Self {
            total,
            passed,
            failed,
            errors,
            skipped,
            success_rate,
            average_duration,
        }
    }
}

/// The single value a run produces: every project result plus the computed
/// summary. Fully populated; consumers only need to format it.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
    pub projects: Vec<ProjectResult>,
    pub summary: RunSummary,
}

impl RunResult {
    /// True iff every project passed; vacuously true for an empty run.
    pub fn is_success(&self) -> bool {
        self.projects.iter().all(ProjectResult::is_success)
    }

    pub fn duration(&self) -> Duration {
        self.finished_at
            .duration_since(self.started_at)
            .unwrap_or(Duration::ZERO)
    }
}

fn duration_secs<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}
