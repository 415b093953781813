// src/engine/events.rs

//! Progress notifications (the side channel, not the return contract).
//!
//! A caller that wants live progress hands the coordinator an [`EventSink`]
//! wrapping an unbounded channel sender. Emission never blocks and never
//! awaits, so a slow (or vanished) consumer cannot affect the engine's
//! timing — in particular it stays off the timeout-racing critical path.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::results::{ProjectStatus, RunSummary};

#[derive(Debug, Clone)]
pub enum RunEvent {
    ProjectStarted {
        project: String,
    },
    CommandStarted {
        project: String,
        command: String,
    },
    CommandCompleted {
        project: String,
        command: String,
        exit_code: i32,
        duration: Duration,
    },
    ProjectCompleted {
        project: String,
        status: ProjectStatus,
        duration: Duration,
    },
    RunCompleted {
        summary: RunSummary,
    },
}

/// Best-effort event emitter shared by the coordinator and project runners.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that drops everything; for callers that don't want progress.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.tx {
            // A dropped receiver is fine; progress is best-effort.
            let _ = tx.send(event);
        }
    }
}
