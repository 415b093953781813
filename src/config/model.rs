// src/config/model.rs

//! Configuration model as read from `runfleet.toml`.
//!
//! ```toml
//! [settings]
//! parallel = true
//! max_parallel = 4
//! stop_on_first_failure = false
//!
//! [project.api]
//! path = "services/api"
//! commands = ["cargo test"]
//! pre_commands = ["cargo fetch"]
//! tags = ["backend"]
//! timeout_minutes = 10
//!
//! [project.web]
//! path = "web"
//! commands = ["npm test"]
//! env = { CI = "1" }
//! retry_count = 2
//! retry_delay_secs = 5
//! ```
//!
//! All sections are optional except that at least one project must exist and
//! each project needs a `path`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::ExecutionPolicy;

/// Top-level configuration straight out of TOML deserialization, before
/// semantic validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Global execution policy from `[settings]`.
    #[serde(default)]
    pub settings: SettingsSection,

    /// All projects from `[project.<name>]`. Keys are the project names and
    /// are therefore unique by construction.
    #[serde(default)]
    pub project: BTreeMap<String, ProjectConfig>,
}

/// `[settings]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsSection {
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Upper bound on simultaneously running projects (parallel mode only).
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Stop dispatching new projects after the first Failed/Error result.
    #[serde(default)]
    pub stop_on_first_failure: bool,
}

fn default_parallel() -> bool {
    true
}

fn default_max_parallel() -> usize {
    4
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            max_parallel: default_max_parallel(),
            stop_on_first_failure: false,
        }
    }
}

/// `[project.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Filesystem location of the project.
    pub path: String,

    /// Working directory for the project's commands; defaults to `path`.
    #[serde(default)]
    pub working_dir: Option<String>,

    /// Disabled projects are kept in the run (and reported as Skipped) but
    /// never invoke anything.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Main commands; their aggregate success decides Passed/Failed.
    #[serde(default)]
    pub commands: Vec<String>,

    /// Setup commands; the first failure short-circuits the project.
    #[serde(default)]
    pub pre_commands: Vec<String>,

    /// Cleanup commands; always run once the pre-command gate was passed.
    #[serde(default)]
    pub post_commands: Vec<String>,

    /// Extra environment variables, overlaid on the inherited environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Per-command timeout (not per-project).
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u64,

    /// Tags for `--tag` filtering.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Extra attempts for a failing main command (pre/post never retry).
    #[serde(default)]
    pub retry_count: u32,

    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Non-zero exit codes treated as success for the project aggregate.
    #[serde(default)]
    pub ignore_exit_codes: Vec<i32>,

    /// Regexes that must all match the captured output for a command to
    /// count as passed.
    #[serde(default)]
    pub expected_output_patterns: Vec<String>,

    /// Regexes that must not match; any match downgrades the command.
    #[serde(default)]
    pub forbidden_output_patterns: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_minutes() -> u64 {
    10
}

fn default_retry_delay_secs() -> u64 {
    5
}

/// A validated configuration. Constructed only through
/// `ConfigFile::try_from(raw)` (see [`super::validate`]).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub settings: SettingsSection,
    pub project: BTreeMap<String, ProjectConfig>,
}

impl ConfigFile {
    /// Internal constructor used after validation has passed.
    pub(crate) fn new_unchecked(
        settings: SettingsSection,
        project: BTreeMap<String, ProjectConfig>,
    ) -> Self {
        Self { settings, project }
    }

    pub fn policy(&self) -> ExecutionPolicy {
        ExecutionPolicy {
            parallel: self.settings.parallel,
            max_parallel: self.settings.max_parallel,
            stop_on_first_failure: self.settings.stop_on_first_failure,
        }
    }

    /// Materialize the engine-facing project specs, in configuration order.
    pub fn project_specs(&self) -> Vec<ProjectSpec> {
        self.project
            .iter()
            .map(|(name, cfg)| ProjectSpec::from_config(name, cfg))
            .collect()
    }
}

/// A fully validated, immutable project description — the engine's input.
#[derive(Debug, Clone)]
pub struct ProjectSpec {
    pub name: String,
    pub path: PathBuf,
    pub working_dir: PathBuf,
    pub enabled: bool,
    pub pre_commands: Vec<String>,
    pub commands: Vec<String>,
    pub post_commands: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub timeout: Duration,
    pub tags: Vec<String>,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub ignore_exit_codes: Vec<i32>,
    pub expected_output_patterns: Vec<String>,
    pub forbidden_output_patterns: Vec<String>,
}

impl ProjectSpec {
    fn from_config(name: &str, cfg: &ProjectConfig) -> Self {
        let path = PathBuf::from(&cfg.path);
        let working_dir = cfg
            .working_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.clone());

        Self {
            name: name.to_string(),
            path,
            working_dir,
            enabled: cfg.enabled,
            pre_commands: cfg.pre_commands.clone(),
            commands: cfg.commands.clone(),
            post_commands: cfg.post_commands.clone(),
            env: cfg.env.clone(),
            timeout: Duration::from_secs(cfg.timeout_minutes * 60),
            tags: cfg.tags.clone(),
            retry_count: cfg.retry_count,
            retry_delay: Duration::from_secs(cfg.retry_delay_secs),
            ignore_exit_codes: cfg.ignore_exit_codes.clone(),
            expected_output_patterns: cfg.expected_output_patterns.clone(),
            forbidden_output_patterns: cfg.forbidden_output_patterns.clone(),
        }
    }
}
