// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! What a subsystem sees of the project it works for

use std::path::{Path, PathBuf};

use dock_core::message::AppTaskDeferred;
use dock_core::{Channel, Message, ProjectId, ReadinessGate, Stream};

/// The owner of a subsystem: identity, locations and the channel the
/// subsystem listens on (`down`) and reports to (`up`).
pub trait Host: Send + Sync + 'static {
    fn id(&self) -> ProjectId;

    /// Working copy location, if known.
    fn path(&self) -> Option<PathBuf>;

    /// Root for generated artifacts.
    fn base_path(&self) -> PathBuf;

    fn url(&self) -> Option<String>;

    fn channel(&self) -> &Channel;
}

/// The host's path, unless it is unset or the process's own working
/// directory. Destructive and inspecting operations never touch those.
pub(crate) fn working_copy<H: Host + ?Sized>(host: &H) -> Option<PathBuf> {
    let path = host.path()?;
    if path.as_os_str().is_empty() || is_current_dir(&path) {
        return None;
    }
    Some(path)
}

fn is_current_dir(path: &Path) -> bool {
    let Ok(cwd) = std::env::current_dir() else {
        return false;
    };
    if path == cwd {
        return true;
    }
    match (path.canonicalize(), cwd.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Hold `cause` until the readiness gate opens, announcing the deferral
/// on `up` first. Returns at once when the gate is already open.
pub(crate) async fn defer_until_ready(gate: &ReadinessGate, up: &Stream, cause: &Message) {
    if gate.is_open() {
        return;
    }
    tracing::info!(task = %cause.log_summary(), "deferred until the runtime is ready");
    up.next(cause.reply(AppTaskDeferred { task: Box::new(cause.clone()) }));
    gate.opened().await;
    tracing::info!(task = %cause.log_summary(), "resuming deferred task");
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
