// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Long-lived child processes driven over channels

use std::path::PathBuf;
use std::process::ExitStatus;

use dock_core::codec::{encode_line, Envelope};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::sync::mpsc;

use crate::subprocess::log_lines;

/// Envelope announcing the server is listening.
pub const STARTED: &str = "patternplate:started";
pub const HEARTBEAT: &str = "heartbeat";
pub const HEARTBEAT_ACK: &str = "heartbeat:ack";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildEvent {
    Started { port: u16, cwd: PathBuf },
    HeartbeatAck,
    /// The process is gone. `code` is `None` when a signal ended it.
    Exited { code: Option<i32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildControl {
    Heartbeat,
    Kill,
}

/// Owner's end of a running child: send control, receive events.
/// Dropping the handle kills the child.
pub struct ChildHandle {
    label: String,
    control: mpsc::UnboundedSender<ChildControl>,
    events: mpsc::UnboundedReceiver<ChildEvent>,
}

/// The process side of a [`ChildHandle`].
pub struct ChildRemote {
    control: mpsc::UnboundedReceiver<ChildControl>,
    events: mpsc::UnboundedSender<ChildEvent>,
}

impl ChildHandle {
    pub fn pair(label: impl Into<String>) -> (ChildHandle, ChildRemote) {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            ChildHandle { label: label.into(), control: control_tx, events: events_rx },
            ChildRemote { control: control_rx, events: events_tx },
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// `None` once the process side is gone and every event was read.
    pub async fn next_event(&mut self) -> Option<ChildEvent> {
        self.events.recv().await
    }

    /// Returns `false` when the process side is gone.
    pub fn heartbeat(&self) -> bool {
        self.control.send(ChildControl::Heartbeat).is_ok()
    }

    pub fn kill(&self) {
        let _ = self.control.send(ChildControl::Kill);
    }

    /// A detached sender that can kill the child without owning the events.
    pub fn controller(&self) -> ChildController {
        ChildController { control: self.control.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct ChildController {
    control: mpsc::UnboundedSender<ChildControl>,
}

impl ChildController {
    pub fn kill(&self) {
        let _ = self.control.send(ChildControl::Kill);
    }

    pub fn is_closed(&self) -> bool {
        self.control.is_closed()
    }
}

impl std::fmt::Debug for ChildHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildHandle").field("label", &self.label).finish()
    }
}

impl ChildRemote {
    pub fn emit(&self, event: ChildEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// `None` once the handle was dropped.
    pub async fn next_control(&mut self) -> Option<ChildControl> {
        self.control.recv().await
    }
}

#[derive(Deserialize)]
struct StartedPayload {
    port: u16,
    cwd: PathBuf,
}

/// Classify one stdout line of the application server.
pub(crate) fn parse_event(line: &str) -> Option<ChildEvent> {
    let envelope = Envelope::parse_line(line)?;
    match envelope.kind.as_str() {
        STARTED => {
            let payload: StartedPayload = envelope.payload_as().ok()?;
            Some(ChildEvent::Started { port: payload.port, cwd: payload.cwd })
        }
        HEARTBEAT_ACK => Some(ChildEvent::HeartbeatAck),
        _ => None,
    }
}

enum Step {
    Line(Option<String>),
    Control(Option<ChildControl>),
    Exit(std::io::Result<ExitStatus>),
}

async fn next_line(lines: &mut Option<Lines<BufReader<ChildStdout>>>) -> Option<String> {
    match lines {
        Some(lines) => lines.next_line().await.ok().flatten(),
        None => std::future::pending().await,
    }
}

async fn send_heartbeat(stdin: &mut Option<ChildStdin>, label: &str) {
    let Some(pipe) = stdin.as_mut() else {
        return;
    };
    let Ok(frame) = encode_line(&Envelope::new(HEARTBEAT)) else {
        return;
    };
    if let Err(e) = pipe.write_all(frame.as_bytes()).await {
        tracing::debug!(process = label, error = %e, "heartbeat write failed");
        *stdin = None;
    }
}

/// Drive a spawned process: stdout envelopes become events, control
/// messages become heartbeats or a kill, and the exit is reported last.
pub(crate) fn drive(mut child: Child, mut remote: ChildRemote, label: String) {
    let mut stdout = child.stdout.take().map(|s| BufReader::new(s).lines());
    let mut stdin = child.stdin.take();
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(log_lines(stderr, label.clone(), true));
    }

    tokio::spawn(async move {
        loop {
            let step = tokio::select! {
                line = next_line(&mut stdout) => Step::Line(line),
                control = remote.control.recv() => Step::Control(control),
                status = child.wait() => Step::Exit(status),
            };
            match step {
                Step::Line(Some(line)) => match parse_event(&line) {
                    Some(event) => {
                        remote.emit(event);
                    }
                    None => tracing::debug!(target: "dock::child", process = %label, "{line}"),
                },
                Step::Line(None) => stdout = None,
                Step::Control(Some(ChildControl::Heartbeat)) => {
                    send_heartbeat(&mut stdin, &label).await;
                }
                Step::Control(Some(ChildControl::Kill) | None) => {
                    let _ = child.start_kill();
                    let code = child.wait().await.ok().and_then(|s| s.code());
                    tracing::info!(process = %label, ?code, "child killed");
                    remote.emit(ChildEvent::Exited { code });
                    break;
                }
                Step::Exit(status) => {
                    let code = status.ok().and_then(|s| s.code());
                    tracing::info!(process = %label, ?code, "child exited");
                    remote.emit(ChildEvent::Exited { code });
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;
