use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tokio_util::sync::CancellationToken;

use runfleet::exec::{CommandInvoker, CommandRequest};
use runfleet::results::CommandResult;

/// Scripted outcome for one attempt of one command.
#[derive(Debug, Clone)]
pub struct FakeOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Simulated execution time; also what the timeout races against.
    pub delay: Duration,
}

impl FakeOutcome {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::success()
        }
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A fake invoker that never spawns real processes:
///
/// - records every invocation (command strings, in invocation order)
/// - pops scripted outcomes per command string, one per attempt (the last
///   scripted outcome repeats once the queue is empty)
/// - defaults to immediate success for unscripted commands
/// - honours the request timeout and the cancellation token against the
///   outcome's `delay`
/// - tracks peak concurrency, for parallelism-bound tests.
pub struct FakeInvoker {
    script: Mutex<HashMap<String, VecDeque<FakeOutcome>>>,
    invoked: Mutex<Vec<String>>,
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl FakeInvoker {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(HashMap::new()),
            invoked: Mutex::new(Vec::new()),
            current: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script the outcomes for successive attempts of `command`.
    pub fn on(self, command: &str, outcomes: Vec<FakeOutcome>) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(command.to_string(), outcomes.into());
        self
    }

    /// Every command string invoked so far, in order.
    pub fn invocations(&self) -> Vec<String> {
        self.invoked.lock().unwrap().clone()
    }

    pub fn invocation_count(&self, command: &str) -> usize {
        self.invoked
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == command)
            .count()
    }

    /// Highest number of simultaneously in-flight invocations observed.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn next_outcome(&self, command: &str) -> FakeOutcome {
        let mut script = self.script.lock().unwrap();
        match script.get_mut(command) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(FakeOutcome::success),
            Some(queue) => queue.front().cloned().unwrap_or_else(FakeOutcome::success),
            None => FakeOutcome::success(),
        }
    }
}

impl Default for FakeInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandInvoker for FakeInvoker {
    fn invoke(
        &self,
        request: CommandRequest,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + '_>> {
        self.invoked.lock().unwrap().push(request.command.clone());
        let outcome = self.next_outcome(&request.command);
        let current = Arc::clone(&self.current);
        let peak = Arc::clone(&self.peak);

        Box::pin(async move {
            let started_at = SystemTime::now();

            if cancel.is_cancelled() {
                return not_completed(&request.command, "cancelled", started_at);
            }

            let in_flight = current.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(in_flight, Ordering::SeqCst);

            let result = if outcome.delay > request.timeout {
                tokio::time::sleep(request.timeout).await;
                not_completed(
                    &request.command,
                    format!("timed out after {:.1}s", request.timeout.as_secs_f64()),
                    started_at,
                )
            } else {
                let finished = tokio::select! {
                    _ = tokio::time::sleep(outcome.delay) => true,
                    _ = cancel.cancelled() => false,
                };
                if finished {
                    CommandResult {
                        command: request.command.clone(),
                        exit_code: outcome.exit_code,
                        stdout: outcome.stdout.clone(),
                        stderr: outcome.stderr.clone(),
                        stdout_truncated: false,
                        stderr_truncated: false,
                        error: None,
                        started_at,
                        finished_at: SystemTime::now(),
                    }
                } else {
                    not_completed(&request.command, "cancelled", started_at)
                }
            };

            current.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}

fn not_completed(command: &str, error: impl Into<String>, started_at: SystemTime) -> CommandResult {
    CommandResult {
        command: command.to_string(),
        exit_code: -1,
        stdout: String::new(),
        stderr: String::new(),
        stdout_truncated: false,
        stderr_truncated: false,
        error: Some(error.into()),
        started_at,
        finished_at: SystemTime::now(),
    }
}
