// src/config/mod.rs

//! Configuration layer: `runfleet.toml` loading, validation, and the
//! validated [`ProjectSpec`] values the engine consumes.
//!
//! The raw deserialization type ([`RawConfigFile`]) is kept separate from the
//! validated type ([`ConfigFile`]); conversion happens once via `TryFrom` in
//! [`validate`], so everything downstream of the loader can assume a sane
//! config.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ProjectConfig, ProjectSpec, RawConfigFile, SettingsSection};
