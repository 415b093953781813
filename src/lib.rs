// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod report;
pub mod results;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{CliArgs, ReportFormat};
use crate::config::loader::load_and_validate;
use crate::config::ProjectSpec;
use crate::engine::{Coordinator, EventSink};
use crate::exec::{CommandInvoker, ProcessInvoker};
use crate::types::ExecutionPolicy;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - CLI overrides on the execution policy
/// - Ctrl-C → cancellation token
/// - the coordinator (with the real process invoker)
/// - report rendering
///
/// Returns whether the run was fully successful; the binary maps that to the
/// process exit code.
pub async fn run(args: CliArgs) -> Result<bool> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let mut policy = cfg.policy();
    if args.sequential {
        policy.parallel = false;
    }
    if let Some(n) = args.max_parallel {
        policy.max_parallel = n.max(1);
    }
    if args.fail_fast {
        policy.stop_on_first_failure = true;
    }

    let specs = cfg.project_specs();

    if args.dry_run {
        print_dry_run(&specs, &policy);
        return Ok(true);
    }

    // Ctrl-C → cancel everything in flight; in-progress commands are killed,
    // nothing new starts.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            cancel.cancel();
        });
    }

    let invoker: Arc<dyn CommandInvoker> = Arc::new(ProcessInvoker::new());
    let coordinator = Coordinator::new(invoker, EventSink::disabled(), policy);
    let run = coordinator
        .run(specs, &args.projects, &args.tags, cancel)
        .await;

    match args.report {
        ReportFormat::Console => print!("{}", report::render_console(&run)),
        ReportFormat::Json => println!("{}", report::render_json(&run)?),
    }

    Ok(run.is_success())
}

/// Simple dry-run output: print projects, commands and policy.
fn print_dry_run(specs: &[ProjectSpec], policy: &ExecutionPolicy) {
    println!("runfleet dry-run");
    println!("  settings.parallel = {}", policy.parallel);
    println!("  settings.max_parallel = {}", policy.max_parallel);
    println!(
        "  settings.stop_on_first_failure = {}",
        policy.stop_on_first_failure
    );
    println!();

    println!("projects ({}):", specs.len());
    for spec in specs {
        println!("  - {}", spec.name);
        println!("      path: {}", spec.path.display());
        if spec.working_dir != spec.path {
            println!("      working_dir: {}", spec.working_dir.display());
        }
        if !spec.enabled {
            println!("      enabled: false");
        }
        for cmd in &spec.pre_commands {
            println!("      pre: {cmd}");
        }
        for cmd in &spec.commands {
            println!("      cmd: {cmd}");
        }
        for cmd in &spec.post_commands {
            println!("      post: {cmd}");
        }
        if !spec.tags.is_empty() {
            println!("      tags: {:?}", spec.tags);
        }
        if spec.retry_count > 0 {
            println!(
                "      retry: {} attempt(s), {:.0}s delay",
                spec.retry_count,
                spec.retry_delay.as_secs_f64()
            );
        }
        if !spec.ignore_exit_codes.is_empty() {
            println!("      ignore_exit_codes: {:?}", spec.ignore_exit_codes);
        }
    }

    debug!("dry-run complete (no execution)");
}
