// src/engine/mod.rs

//! Orchestration engine for runfleet.
//!
//! This module ties together:
//! - the project filter (name/tag selection)
//! - the project runner (pre → main → post command sequencing for one
//!   project, retry and skip logic)
//! - the coordinator (sequential or bounded-parallel fan-out across
//!   projects, fail-fast policy, run-level aggregation)
//! - the progress event side channel
//!
//! The engine's entry point is [`Coordinator::run`]. It consumes validated
//! [`ProjectSpec`](crate::config::ProjectSpec)s, talks to processes only
//! through the [`CommandInvoker`](crate::exec::CommandInvoker) seam, and is
//! infallible at runtime: every failure mode comes back as data inside the
//! returned [`RunResult`](crate::results::RunResult).

pub mod coordinator;
pub mod events;
pub mod filter;
pub mod project;

pub use coordinator::Coordinator;
pub use events::{EventSink, RunEvent};
pub use filter::select_projects;
pub use project::{ProjectRunner, command_passed};
