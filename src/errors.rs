// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! The execution engine itself never returns these: every failure mode below
//! the coordinator is captured as a result value (`CommandResult` /
//! `ProjectResult`). The `Err` paths here belong to the layers around the
//! engine — config loading, validation, report serialization.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunfleetError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RunfleetError>;
