// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `runfleet`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "runfleet",
    version,
    about = "Run configured commands across a fleet of project directories.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `runfleet.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "runfleet.toml")]
    pub config: String,

    /// Run only the named project(s). Repeatable; case-insensitive.
    #[arg(long = "project", value_name = "NAME")]
    pub projects: Vec<String>,

    /// Run only projects carrying at least one of these tags. Repeatable.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Force sequential execution regardless of the config file.
    #[arg(long)]
    pub sequential: bool,

    /// Override the configured parallelism bound.
    #[arg(long, value_name = "N")]
    pub max_parallel: Option<usize>,

    /// Stop dispatching new projects after the first failure.
    #[arg(long)]
    pub fail_fast: bool,

    /// Report format for the run result, printed to stdout.
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = ReportFormat::Console)]
    pub report: ReportFormat,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RUNFLEET_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate the config and print the selected projects, but
    /// don't execute any commands.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Report format as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
