// src/exec/invoker.rs

//! Command invocation: run one command as a child process, capture its
//! output, enforce a timeout, and always come back with a [`CommandResult`].
//!
//! The invoker's contract is "never fails": timeouts, cancellation, a missing
//! working directory, or a process that cannot be spawned all become a result
//! with `exit_code == -1` and a message in `error`. Nothing propagates past
//! this boundary as an `Err`.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::time::{Duration, SystemTime};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::exec::shell;
use crate::results::CommandResult;

/// Cap per captured stream. The original accumulated output without bound;
/// a runaway command could eat the host's memory. On overflow the stream
/// keeps being drained (so the child never blocks on a full pipe) but stops
/// being accumulated, and the result carries a truncated flag.
pub const MAX_CAPTURED_BYTES: usize = 1024 * 1024;

/// Marker line appended once when a stream hits [`MAX_CAPTURED_BYTES`].
pub const TRUNCATION_MARKER: &str = "[output truncated]";

/// Everything the invoker needs to run one command.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub command: String,
    pub working_dir: PathBuf,
    /// Additive overlay on the inherited environment — the child still sees
    /// PATH, HOME, etc. from the invoking process.
    pub env: BTreeMap<String, String>,
    pub timeout: Duration,
}

/// Seam between the engine and real processes.
///
/// Production code uses [`ProcessInvoker`]; tests substitute a scripted
/// implementation that never spawns anything.
pub trait CommandInvoker: Send + Sync {
    fn invoke(
        &self,
        request: CommandRequest,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + '_>>;
}

/// The real invoker, backed by `tokio::process`.
#[derive(Debug, Default)]
pub struct ProcessInvoker;

impl ProcessInvoker {
    pub fn new() -> Self {
        Self
    }
}

impl CommandInvoker for ProcessInvoker {
    fn invoke(
        &self,
        request: CommandRequest,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = CommandResult> + Send + '_>> {
        Box::pin(invoke_process(request, cancel))
    }
}

async fn invoke_process(request: CommandRequest, cancel: CancellationToken) -> CommandResult {
    let started_at = SystemTime::now();

    if cancel.is_cancelled() {
        return CommandResult::not_completed(&request.command, "cancelled", started_at);
    }

    if !request.working_dir.is_dir() {
        return CommandResult::not_completed(
            &request.command,
            format!(
                "invalid working directory: {}",
                request.working_dir.display()
            ),
            started_at,
        );
    }

    let Some(mut cmd) = build_command(&request.command) else {
        return CommandResult::not_completed(&request.command, "empty command", started_at);
    };

    cmd.current_dir(&request.working_dir)
        .envs(&request.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group, so timeout/cancel can take out descendants too.
    #[cfg(unix)]
    cmd.process_group(0);

    info!(command = %request.command, dir = %request.working_dir.display(), "starting command");

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(command = %request.command, error = %err, "failed to start process");
            return CommandResult::not_completed(
                &request.command,
                format!("failed to start process: {err}"),
                started_at,
            );
        }
    };

    let stdout_task = spawn_capture(child.stdout.take());
    let stderr_task = spawn_capture(child.stderr.take());

    // Race process exit against the timeout and the shared cancellation
    // signal. Child process APIs have no native timeout, and a runaway
    // command must not block the project runner indefinitely.
    let (exit_code, error) = tokio::select! {
        status = child.wait() => match status {
            Ok(status) => match status.code() {
                Some(code) => (code, None),
                // Killed by a signal from outside: there is no exit code,
                // and -1 alone is reserved for did-not-complete results.
                None => (-1, Some("terminated by signal".to_string())),
            },
            Err(err) => (-1, Some(format!("failed to wait for process: {err}"))),
        },
        _ = tokio::time::sleep(request.timeout) => {
            kill_process_tree(&mut child).await;
            (-1, Some(format!(
                "timed out after {:.1}s",
                request.timeout.as_secs_f64()
            )))
        }
        _ = cancel.cancelled() => {
            kill_process_tree(&mut child).await;
            (-1, Some("cancelled".to_string()))
        }
    };

    // The pipes are closed by now (exit or kill), so the readers finish on
    // their own; partial output is preserved on the timeout/cancel paths.
    let (stdout, stdout_truncated) = join_capture(stdout_task).await;
    let (stderr, stderr_truncated) = join_capture(stderr_task).await;

    debug!(
        command = %request.command,
        exit_code,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "command finished"
    );

    CommandResult {
        command: request.command,
        exit_code,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        error,
        started_at,
        finished_at: SystemTime::now(),
    }
}

/// Build the `Command` for a command string, choosing between direct
/// invocation and the platform shell (see [`shell`]).
///
/// On the shell path the raw string is handed over as one argv element, so
/// embedded quotes survive unmangled.
fn build_command(command: &str) -> Option<Command> {
    if shell::needs_shell(command) {
        let cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command);
            c
        };
        return Some(cmd);
    }

    let (program, args) = shell::split_command(command)?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Some(cmd)
}

/// Consume a stream line-by-line into a capped accumulator.
///
/// Lines keep being read after the cap is hit so the child can never block
/// on a full pipe; they are just no longer stored.
fn spawn_capture<R>(stream: Option<R>) -> JoinHandle<(String, bool)>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut captured = String::new();
        let mut truncated = false;

        let Some(stream) = stream else {
            return (captured, truncated);
        };

        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if truncated {
                continue;
            }
            if captured.len() + line.len() + 1 > MAX_CAPTURED_BYTES {
                truncated = true;
                captured.push_str(TRUNCATION_MARKER);
                captured.push('\n');
                continue;
            }
            captured.push_str(&line);
            captured.push('\n');
        }

        (captured, truncated)
    })
}

async fn join_capture(handle: JoinHandle<(String, bool)>) -> (String, bool) {
    match handle.await {
        Ok(capture) => capture,
        Err(err) => {
            debug!(error = %err, "output capture task did not finish cleanly");
            (String::new(), false)
        }
    }
}

/// Forcibly terminate the child and, on Unix, its whole process group.
async fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Err(err) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            debug!(pid, error = %err, "killpg failed (group may already be gone)");
        }
    }

    if let Err(err) = child.kill().await {
        debug!(error = %err, "child already exited while killing");
    }
}
