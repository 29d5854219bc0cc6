// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("{description} failed: {source}")]
    Io {
        description: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{description} timed out after {secs}s")]
    Timeout { description: String, secs: u64 },
}

impl SubprocessError {
    fn io(description: &str, source: std::io::Error) -> Self {
        SubprocessError::Io { description: description.to_string(), source }
    }

    fn timeout(description: &str, timeout: Duration) -> Self {
        SubprocessError::Timeout { description: description.to_string(), secs: timeout.as_secs() }
    }
}

/// Run a command to completion and capture its output.
///
/// The child is killed if the timeout elapses (tokio `Child` drop with
/// `kill_on_drop`). A non-zero exit is not an error here.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, SubprocessError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(SubprocessError::io(description, e)),
        Err(_elapsed) => Err(SubprocessError::timeout(description, timeout)),
    }
}

/// Like [`run_with_timeout`], but hands every stderr segment (split on
/// `\r` or `\n`) to `on_segment` as it arrives. Progress meters redraw
/// with `\r`, so this sees each update.
pub async fn run_streaming_stderr(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
    mut on_segment: impl FnMut(&str) + Send,
) -> Result<Output, SubprocessError> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
    let mut child = cmd.spawn().map_err(|e| SubprocessError::io(description, e))?;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let work = async {
        let stdout_task = tokio::spawn(read_all(stdout));
        let mut captured = Vec::new();
        if let Some(mut stderr) = stderr {
            let mut chunk = [0u8; 4096];
            let mut pending: Vec<u8> = Vec::new();
            loop {
                let n = stderr.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                captured.extend_from_slice(&chunk[..n]);
                for &byte in &chunk[..n] {
                    if byte == b'\r' || byte == b'\n' {
                        if !pending.is_empty() {
                            on_segment(&String::from_utf8_lossy(&pending));
                            pending.clear();
                        }
                    } else {
                        pending.push(byte);
                    }
                }
            }
            if !pending.is_empty() {
                on_segment(&String::from_utf8_lossy(&pending));
            }
        }
        let status = child.wait().await?;
        let stdout = stdout_task.await.unwrap_or_default();
        Ok::<_, std::io::Error>(Output { status, stdout, stderr: captured })
    };

    match tokio::time::timeout(timeout, work).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(SubprocessError::io(description, e)),
        Err(_elapsed) => Err(SubprocessError::timeout(description, timeout)),
    }
}

/// Run a command whose output only matters to the local log: every stdout
/// and stderr line is forwarded to `tracing` under the given label.
pub async fn run_logged(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<ExitStatus, SubprocessError> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
    let mut child = cmd.spawn().map_err(|e| SubprocessError::io(description, e))?;
    let label = description.to_string();
    let out = child.stdout.take().map(|s| tokio::spawn(log_lines(s, label.clone(), false)));
    let err = child.stderr.take().map(|s| tokio::spawn(log_lines(s, label, true)));

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => return Err(SubprocessError::io(description, e)),
        Err(_elapsed) => return Err(SubprocessError::timeout(description, timeout)),
    };
    for task in [out, err].into_iter().flatten() {
        let _ = task.await;
    }
    Ok(status)
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        let _ = reader.read_to_end(&mut buf).await;
    }
    buf
}

pub(crate) async fn log_lines<R: AsyncRead + Unpin>(reader: R, label: String, stderr: bool) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if stderr {
            tracing::debug!(target: "dock::child", process = %label, stream = "stderr", "{line}");
        } else {
            tracing::debug!(target: "dock::child", process = %label, stream = "stdout", "{line}");
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
