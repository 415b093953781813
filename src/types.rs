// src/types.rs

use serde::Deserialize;

/// How the coordinator schedules projects within one run.
///
/// - `parallel = false`: projects run strictly in configuration order, one at
///   a time.
/// - `parallel = true`: up to `max_parallel` projects run at the same time;
///   result order then reflects completion order, not configuration order.
///
/// `stop_on_first_failure` stops dispatching new projects once a Failed or
/// Error result has been observed. Under parallel execution this is
/// best-effort: projects already in flight run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExecutionPolicy {
    pub parallel: bool,
    pub max_parallel: usize,
    pub stop_on_first_failure: bool,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            parallel: true,
            max_parallel: 4,
            stop_on_first_failure: false,
        }
    }
}
