// src/report.rs

//! Rendering of a finished [`RunResult`].
//!
//! The engine hands the reporting layer a fully populated value; nothing
//! here computes new facts, it only formats.

use std::fmt::Write as _;

use crate::errors::Result;
use crate::results::{CommandResult, ProjectResult, ProjectStatus, RunResult};

/// Human-readable run report.
pub fn render_console(run: &RunResult) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "runfleet: {} project(s) in {:.1}s",
        run.summary.total,
        run.duration().as_secs_f64()
    );

    for project in &run.projects {
        // A timed-out project would otherwise read as a plain FAIL.
        let timed_out = project.commands.iter().any(CommandResult::timed_out);
        let _ = writeln!(
            out,
            "  {}  {} ({:.1}s, {} command(s)){}",
            status_label(project.status),
            project.name,
            project.duration().as_secs_f64(),
            project.commands.len(),
            if timed_out { " [timeout]" } else { "" }
        );
        render_project_detail(&mut out, project);
    }

    let _ = writeln!(
        out,
        "summary: {} passed, {} failed, {} errors, {} skipped ({:.1}% success)",
        run.summary.passed,
        run.summary.failed,
        run.summary.errors,
        run.summary.skipped,
        run.summary.success_rate
    );

    out
}

/// Machine-readable run report: the full `RunResult` as pretty JSON.
pub fn render_json(run: &RunResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(run)?)
}

fn render_project_detail(out: &mut String, project: &ProjectResult) {
    if let Some(error) = &project.error {
        let _ = writeln!(out, "        {error}");
    }

    // Only spell out the commands that went wrong; passing output is noise
    // at this level (it's all in the JSON report).
    for command in &project.commands {
        if command.is_success() {
            continue;
        }
        match &command.error {
            Some(error) => {
                let _ = writeln!(out, "        $ {} -> {}", command.command, error);
            }
            None => {
                let _ = writeln!(
                    out,
                    "        $ {} -> exit {}",
                    command.command, command.exit_code
                );
            }
        }
    }
}

fn status_label(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Passed => "PASS ",
        ProjectStatus::Failed => "FAIL ",
        ProjectStatus::Error => "ERROR",
        ProjectStatus::Skipped => "SKIP ",
        ProjectStatus::NotRun => "--   ",
        ProjectStatus::Running => "RUN  ",
    }
}
