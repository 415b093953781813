// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running a single command as a
//! child process, using `tokio::process::Command`, and handing a fully
//! populated [`CommandResult`](crate::results::CommandResult) back to the
//! engine.
//!
//! - [`shell`] holds the pure heuristics deciding direct vs. shell
//!   invocation.
//! - [`invoker`] provides the [`CommandInvoker`] trait the engine talks to,
//!   and the concrete [`ProcessInvoker`] used in production. Tests substitute
//!   their own implementation that doesn't spawn real processes.

pub mod invoker;
pub mod shell;

pub use invoker::{
    CommandInvoker, CommandRequest, MAX_CAPTURED_BYTES, ProcessInvoker, TRUNCATION_MARKER,
};
