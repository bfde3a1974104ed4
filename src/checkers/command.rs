//! Shell command checker with a hard timeout

use serde_json::json;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

use super::{details, CheckContext, CheckOutcome};
use crate::cancel::CancelToken;
use crate::errors::CheckError;

/// Characters of stdout kept in `details.command_output`.
pub const OUTPUT_PREVIEW_CHARS: usize = 200;

/// How long to wait for the pipe readers once the process is gone.
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(2);

/// Granularity at which a running command notices cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Per-stream capture limit (1MB); the rest is drained and dropped.
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// What happened to a shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Exited {
        /// `None` when the process was ended by a signal.
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    },
    TimedOut {
        stdout: String,
        stderr: String,
        duration: Duration,
    },
    SpawnFailed {
        error: String,
    },
    Cancelled,
}

/// Run `command` and map its exit status onto an outcome.
///
/// `Completed` iff the exit code is 0. Timeouts and spawn failures are
/// `Failed`; only a cancelled run surfaces as an error.
pub fn check_command(command: &str, ctx: &CheckContext) -> Result<CheckOutcome, CheckError> {
    match run_shell_command(command, &ctx.base_dir, ctx.command_timeout, &ctx.cancel)? {
        CommandOutcome::Exited {
            exit_code,
            stdout,
            stderr,
            duration,
        } => {
            let success = exit_code == Some(0);
            tracing::debug!(command, ?exit_code, elapsed = ?duration, "command finished");
            if !success && !stderr.is_empty() {
                tracing::debug!(command, stderr = %preview(&stderr), "command stderr");
            }
            let mut details = details([
                ("exit_code", json!(exit_code)),
                ("command_output", json!(preview(&stdout))),
            ]);
            if exit_code.is_none() {
                details.insert("note".to_string(), json!("terminated by signal"));
            }
            Ok(CheckOutcome::from_bool(success, details))
        }
        CommandOutcome::TimedOut {
            stdout,
            stderr,
            duration,
        } => {
            tracing::warn!(command, timeout = ?ctx.command_timeout, elapsed = ?duration, "command timed out");
            if !stderr.is_empty() {
                tracing::debug!(command, stderr = %preview(&stderr), "command stderr");
            }
            Ok(CheckOutcome::Failed(details([
                ("note", json!("timeout")),
                ("timeout_secs", json!(ctx.command_timeout.as_secs_f64())),
                ("command_output", json!(preview(&stdout))),
            ])))
        }
        CommandOutcome::SpawnFailed { error } => Ok(CheckOutcome::Failed(details([
            ("note", json!("spawn failed")),
            ("error", json!(error)),
        ]))),
        CommandOutcome::Cancelled => Err(CheckError::Cancelled),
    }
}

/// Run a shell command in `working_dir`, bounded by `timeout`.
///
/// Output is drained on background threads while waiting so a chatty
/// command cannot deadlock on a full pipe. The wait is split into short
/// slices so `cancel` is honoured within [`POLL_INTERVAL`].
pub fn run_shell_command(
    command: &str,
    working_dir: &Path,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<CommandOutcome, CheckError> {
    let start = Instant::now();

    let mut child = match spawn_shell_command(command, working_dir) {
        Ok(child) => child,
        Err(e) => {
            return Ok(CommandOutcome::SpawnFailed {
                error: e.to_string(),
            })
        }
    };

    let stdout_rx = drain(child.stdout.take());
    let stderr_rx = drain(child.stderr.take());

    let deadline = start + timeout;
    let status = loop {
        if cancel.is_cancelled() {
            kill_child_process(&mut child);
            return Ok(CommandOutcome::Cancelled);
        }

        let now = Instant::now();
        if now >= deadline {
            break None;
        }

        let slice = (deadline - now).min(POLL_INTERVAL);
        match child.wait_timeout(slice) {
            Ok(Some(status)) => break Some(status),
            Ok(None) => continue,
            Err(source) => {
                kill_child_process(&mut child);
                return Err(CheckError::Wait {
                    command: command.to_string(),
                    source,
                });
            }
        }
    };

    if status.is_none() {
        kill_child_process(&mut child);
    }

    let stdout = stdout_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());
    let stderr = stderr_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());
    let duration = start.elapsed();

    Ok(match status {
        Some(status) => CommandOutcome::Exited {
            exit_code: status.code(),
            stdout,
            stderr,
            duration,
        },
        None => CommandOutcome::TimedOut {
            stdout,
            stderr,
            duration,
        },
    })
}

/// Spawn `command` through the platform shell.
///
/// On Unix the child leads its own process group so a timeout can take
/// down everything it started.
fn spawn_shell_command(command: &str, working_dir: &Path) -> std::io::Result<Child> {
    let mut cmd = if cfg!(target_family = "unix") {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    } else {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    };

    cmd.current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    cmd.spawn()
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(stream) => {
            thread::spawn(move || {
                let _ = tx.send(read_stream_to_string(stream));
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

/// Read a stream to string, capping what is kept at [`MAX_OUTPUT_SIZE`].
fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                buf.extend_from_slice(&chunk[..n.min(remaining)]);
                // Past the cap we keep reading so the child never blocks on a full pipe.
            }
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Kill the child (and on Unix its whole process group), then reap it.
fn kill_child_process(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Ok(pid) = i32::try_from(child.id()) {
            let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn preview(output: &str) -> String {
    output.chars().take(OUTPUT_PREVIEW_CHARS).collect()
}
