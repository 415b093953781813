// src/config/validate.rs

use regex::Regex;

use crate::config::model::{ConfigFile, ProjectConfig, RawConfigFile};
use crate::errors::{Result, RunfleetError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RunfleetError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.settings, raw.project))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_projects(cfg)?;
    validate_settings(cfg)?;
    for (name, project) in cfg.project.iter() {
        validate_project(name, project)?;
    }
    Ok(())
}

fn ensure_has_projects(cfg: &RawConfigFile) -> Result<()> {
    if cfg.project.is_empty() {
        return Err(RunfleetError::ConfigError(
            "config must contain at least one [project.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_settings(cfg: &RawConfigFile) -> Result<()> {
    if cfg.settings.max_parallel == 0 {
        return Err(RunfleetError::ConfigError(
            "[settings].max_parallel must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_project(name: &str, project: &ProjectConfig) -> Result<()> {
    if project.path.trim().is_empty() {
        return Err(RunfleetError::ConfigError(format!(
            "project '{name}' has an empty `path`"
        )));
    }

    if let Some(dir) = &project.working_dir
        && dir.trim().is_empty()
    {
        return Err(RunfleetError::ConfigError(format!(
            "project '{name}' has an empty `working_dir` (omit it to default to `path`)"
        )));
    }

    if project.timeout_minutes == 0 {
        return Err(RunfleetError::ConfigError(format!(
            "project '{name}' has `timeout_minutes` = 0 (must be >= 1)"
        )));
    }

    // Exit code 0 is success by definition; listing it would be confusing
    // rather than harmful, so reject it outright.
    if project.ignore_exit_codes.contains(&0) {
        return Err(RunfleetError::ConfigError(format!(
            "project '{name}' lists exit code 0 in `ignore_exit_codes`"
        )));
    }

    for command in project
        .pre_commands
        .iter()
        .chain(project.commands.iter())
        .chain(project.post_commands.iter())
    {
        if command.trim().is_empty() {
            return Err(RunfleetError::ConfigError(format!(
                "project '{name}' contains an empty command string"
            )));
        }
    }

    for pattern in project
        .expected_output_patterns
        .iter()
        .chain(project.forbidden_output_patterns.iter())
    {
        if let Err(err) = Regex::new(pattern) {
            return Err(RunfleetError::ConfigError(format!(
                "project '{name}' has an invalid output pattern '{pattern}': {err}"
            )));
        }
    }

    Ok(())
}
