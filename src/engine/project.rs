// src/engine/project.rs

//! Single-project execution: pre-commands → main commands → post-commands.
//!
//! Status transitions for one run of one project:
//!
//! ```text
//! NotRun → Running → { Skipped | Error | Failed | Passed }
//! ```
//!
//! - Skipped: project disabled, or no main commands configured.
//! - Error: missing working directory, cancellation, orchestration fault.
//! - Failed: a pre-command failed (short-circuit: main and post never run),
//!   or at least one main command failed.
//! - Passed: every main command passed.
//!
//! Main commands never short-circuit each other — every configured main
//! command runs even when an earlier one failed, so one run reports all
//! failures at once. Post-commands run unconditionally once the pre-command
//! gate was passed, and never change the already-decided status.

use std::sync::Arc;
use std::time::SystemTime;

use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ProjectSpec;
use crate::engine::events::{EventSink, RunEvent};
use crate::exec::{CommandInvoker, CommandRequest};
use crate::results::{CommandResult, ProjectResult, ProjectStatus};

pub struct ProjectRunner {
    invoker: Arc<dyn CommandInvoker>,
    events: EventSink,
}

impl ProjectRunner {
    pub fn new(invoker: Arc<dyn CommandInvoker>, events: EventSink) -> Self {
        Self { invoker, events }
    }

    /// Run one project to a terminal status. Infallible by contract: every
    /// failure mode is folded into the returned [`ProjectResult`].
    pub async fn run(&self, spec: &ProjectSpec, cancel: &CancellationToken) -> ProjectResult {
        let started_at = SystemTime::now();
        info!(project = %spec.name, "project starting");
        self.events.emit(RunEvent::ProjectStarted {
            project: spec.name.clone(),
        });

        let mut commands = Vec::new();
        let (status, error) = self.execute(spec, cancel, &mut commands).await;

        let result = ProjectResult {
            name: spec.name.clone(),
            path: spec.path.clone(),
            tags: spec.tags.clone(),
            status,
            error,
            started_at,
            finished_at: SystemTime::now(),
            commands,
        };

        info!(
            project = %spec.name,
            status = ?result.status,
            commands = result.commands.len(),
            "project finished"
        );
        self.events.emit(RunEvent::ProjectCompleted {
            project: spec.name.clone(),
            status: result.status,
            duration: result.duration(),
        });

        result
    }

    async fn execute(
        &self,
        spec: &ProjectSpec,
        cancel: &CancellationToken,
        commands: &mut Vec<CommandResult>,
    ) -> (ProjectStatus, Option<String>) {
        if !spec.enabled {
            debug!(project = %spec.name, "project disabled; skipping");
            return (ProjectStatus::Skipped, None);
        }

        // No main commands means nothing can pass or fail; pre/post are not
        // run either.
        if spec.commands.is_empty() {
            debug!(project = %spec.name, "no main commands configured; skipping");
            return (ProjectStatus::Skipped, None);
        }

        if !spec.working_dir.is_dir() {
            return (
                ProjectStatus::Error,
                Some(format!(
                    "working directory does not exist: {}",
                    spec.working_dir.display()
                )),
            );
        }

        if cancel.is_cancelled() {
            return (ProjectStatus::Error, Some("cancelled".to_string()));
        }

        // Pre-commands gate everything: the first failure fails the project
        // and neither main nor post commands run. A broken setup is reported
        // as such instead of producing misleading main-command failures.
        for command in &spec.pre_commands {
            if cancel.is_cancelled() {
                return (ProjectStatus::Error, Some("cancelled".to_string()));
            }
            let result = self.invoke_once(spec, command, cancel).await;
            let passed = command_passed(spec, &result);
            commands.push(result);
            // A pre-command cut short by cancellation is not a setup failure.
            if cancel.is_cancelled() {
                return (ProjectStatus::Error, Some("cancelled".to_string()));
            }
            if !passed {
                warn!(project = %spec.name, command = %command, "pre-command failed");
                return (
                    ProjectStatus::Failed,
                    Some(format!("pre-command failed: {command}")),
                );
            }
        }

        let mut all_passed = true;
        for command in &spec.commands {
            if cancel.is_cancelled() {
                return (ProjectStatus::Error, Some("cancelled".to_string()));
            }
            let result = self.invoke_with_retry(spec, command, cancel).await;
            if !command_passed(spec, &result) {
                all_passed = false;
            }
            commands.push(result);
        }

        // Post-commands (cleanup) run regardless of the main outcome; their
        // results are recorded but never flip the decided status.
        for command in &spec.post_commands {
            if cancel.is_cancelled() {
                return (ProjectStatus::Error, Some("cancelled".to_string()));
            }
            let result = self.invoke_once(spec, command, cancel).await;
            commands.push(result);
        }

        // A run cut short by cancellation is an Error, not a Failed: the
        // project was not given the chance to finish.
        if cancel.is_cancelled() {
            return (ProjectStatus::Error, Some("cancelled".to_string()));
        }

        if all_passed {
            (ProjectStatus::Passed, None)
        } else {
            (ProjectStatus::Failed, None)
        }
    }

    /// Run one main command with the project's retry policy. Only the final
    /// attempt's result is kept; earlier failed attempts are log-only, so the
    /// result list represents what ultimately happened.
    async fn invoke_with_retry(
        &self,
        spec: &ProjectSpec,
        command: &str,
        cancel: &CancellationToken,
    ) -> CommandResult {
        let mut result = self.invoke_once(spec, command, cancel).await;

        for attempt in 1..=spec.retry_count {
            if command_passed(spec, &result) || cancel.is_cancelled() {
                break;
            }
            warn!(
                project = %spec.name,
                command = %command,
                exit_code = result.exit_code,
                attempt,
                retries = spec.retry_count,
                "command failed; retrying after delay"
            );
            tokio::select! {
                _ = tokio::time::sleep(spec.retry_delay) => {}
                _ = cancel.cancelled() => break,
            }
            result = self.invoke_once(spec, command, cancel).await;
        }

        result
    }

    async fn invoke_once(
        &self,
        spec: &ProjectSpec,
        command: &str,
        cancel: &CancellationToken,
    ) -> CommandResult {
        self.events.emit(RunEvent::CommandStarted {
            project: spec.name.clone(),
            command: command.to_string(),
        });

        let request = CommandRequest {
            command: command.to_string(),
            working_dir: spec.working_dir.clone(),
            env: spec.env.clone(),
            timeout: spec.timeout,
        };
        let result = self.invoker.invoke(request, cancel.clone()).await;

        self.events.emit(RunEvent::CommandCompleted {
            project: spec.name.clone(),
            command: command.to_string(),
            exit_code: result.exit_code,
            duration: result.duration(),
        });

        result
    }
}

/// Whether a command's result counts as success for the project aggregate.
///
/// `CommandResult::is_success` stays literal (exit code zero); this is where
/// policy comes in: exit codes listed in `ignore_exit_codes` count as
/// success, and output pattern checks can downgrade an otherwise-successful
/// command.
pub fn command_passed(spec: &ProjectSpec, result: &CommandResult) -> bool {
    let exit_ok = result.is_success() || spec.ignore_exit_codes.contains(&result.exit_code);
    if !exit_ok {
        return false;
    }
    output_patterns_ok(spec, result)
}

/// Check captured output (stdout + stderr combined) against the project's
/// expected and forbidden patterns. Patterns are validated to compile at
/// config time; one slipping through uncompiled is treated as a failure.
fn output_patterns_ok(spec: &ProjectSpec, result: &CommandResult) -> bool {
    if spec.expected_output_patterns.is_empty() && spec.forbidden_output_patterns.is_empty() {
        return true;
    }

    let combined = format!("{}\n{}", result.stdout, result.stderr);

    for pattern in &spec.expected_output_patterns {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(&combined) => {}
            _ => {
                debug!(command = %result.command, pattern = %pattern, "expected output pattern missing");
                return false;
            }
        }
    }

    for pattern in &spec.forbidden_output_patterns {
        if let Ok(re) = Regex::new(pattern)
            && re.is_match(&combined)
        {
            debug!(command = %result.command, pattern = %pattern, "forbidden output pattern matched");
            return false;
        }
    }

    true
}
