// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with timeout, soft-terminate/hard-kill escalation,
//! and bounded merged-output capture.

use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;

/// Grace period between soft terminate and hard kill when a step's timeout fires.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Upper bound on captured merged stdout+stderr, in bytes. Output beyond this
/// is truncated with a marker, not buffered.
const MAX_CAPTURED_OUTPUT: usize = 1 << 20; // 1 MiB

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("failed to spawn {description}: {source}")]
    Spawn {
        description: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error reading output of {description}: {source}")]
    Io {
        description: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of running one subprocess to completion, timeout, or cancellation.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub exit_status: Option<i32>,
    pub output: String,
    pub timed_out: bool,
    /// The global cancellation signal fired while this subprocess was
    /// in flight; it was terminated early rather than timing out.
    pub cancelled: bool,
}

/// Run `cmd` to completion, merging stdout+stderr (bounded), enforcing
/// `timeout`. On timeout, or on `cancel` firing first, the child is sent a
/// soft terminate signal, then killed outright if it has not exited after
/// `grace_period`.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    grace_period: Duration,
    description: &str,
    cancel: Option<watch::Receiver<bool>>,
) -> Result<CommandOutcome, SubprocessError> {
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| SubprocessError::Spawn {
        description: description.to_string(),
        source,
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let output_buf = std::sync::Arc::new(tokio::sync::Mutex::new(String::new()));

    let mut readers = Vec::new();
    if let Some(stdout) = stdout {
        readers.push(tokio::spawn(drain_stream(stdout, output_buf.clone())));
    }
    if let Some(stderr) = stderr {
        readers.push(tokio::spawn(drain_stream(stderr, output_buf.clone())));
    }

    tokio::select! {
        wait_result = tokio::time::timeout(timeout, child.wait()) => {
            match wait_result {
                Ok(Ok(status)) => {
                    for reader in readers {
                        let _ = reader.await;
                    }
                    Ok(CommandOutcome {
                        exit_status: status.code(),
                        output: take_output(&output_buf).await,
                        timed_out: false,
                        cancelled: false,
                    })
                }
                Ok(Err(source)) => Err(SubprocessError::Io {
                    description: description.to_string(),
                    source,
                }),
                Err(_elapsed) => {
                    escalate_to_kill(&mut child, grace_period).await;
                    for reader in readers {
                        let _ = reader.await;
                    }
                    Ok(CommandOutcome {
                        exit_status: None,
                        output: take_output(&output_buf).await,
                        timed_out: true,
                        cancelled: false,
                    })
                }
            }
        }
        _ = wait_for_cancel(cancel) => {
            escalate_to_kill(&mut child, grace_period).await;
            for reader in readers {
                let _ = reader.await;
            }
            Ok(CommandOutcome {
                exit_status: None,
                output: take_output(&output_buf).await,
                timed_out: false,
                cancelled: true,
            })
        }
    }
}

/// Resolves once `cancel` reports `true`; never resolves if no signal was given.
async fn wait_for_cancel(cancel: Option<watch::Receiver<bool>>) {
    match cancel {
        Some(mut rx) => {
            while !*rx.borrow() {
                if rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        }
        None => std::future::pending::<()>().await,
    }
}

async fn drain_stream(
    stream: impl tokio::io::AsyncRead + Unpin,
    buf: std::sync::Arc<tokio::sync::Mutex<String>>,
) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut guard = buf.lock().await;
        if guard.len() < MAX_CAPTURED_OUTPUT {
            guard.push_str(&line);
            guard.push('\n');
        }
    }
}

async fn take_output(buf: &std::sync::Arc<tokio::sync::Mutex<String>>) -> String {
    let mut guard = buf.lock().await;
    if guard.len() >= MAX_CAPTURED_OUTPUT {
        guard.push_str("\n... output truncated ...\n");
    }
    std::mem::take(&mut guard)
}

/// Soft terminate, then hard kill if the child is still alive after `grace_period`.
async fn escalate_to_kill(child: &mut Child, grace_period: Duration) {
    soft_terminate(child);
    if tokio::time::timeout(grace_period, child.wait()).await.is_err() {
        let _ = child.start_kill();
        let _ = child.wait().await;
    }
}

#[cfg(unix)]
fn soft_terminate(child: &mut Child) {
    if let Some(pid) = child.id() {
        let pid = nix::unistd::Pid::from_raw(pid as i32);
        let _ = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM);
    }
}

#[cfg(not(unix))]
fn soft_terminate(child: &mut Child) {
    let _ = child.start_kill();
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
