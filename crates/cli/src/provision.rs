// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime provisioning: make sure the executables projects are driven
//! with are reachable, then announce the outcome so deferred work can run.

use std::path::{Path, PathBuf};

use dock_core::message::{AppModulesUnpackError, AppModulesUnpackReady, AppModulesUnpackStarted};
use dock_core::{Message, Stream};

/// Executables every lifecycle command needs.
pub fn required() -> Vec<PathBuf> {
    vec![dock_adapters::env::git_bin(), dock_adapters::env::npm_bin()]
}

/// Resolve `bin` to an existing file. Bare names are searched on `PATH`.
pub fn locate(bin: &Path) -> Option<PathBuf> {
    if bin.components().count() > 1 || bin.is_absolute() {
        return bin.is_file().then(|| bin.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).map(|dir| dir.join(bin)).find(|candidate| candidate.is_file())
}

/// Check `bins` and publish started, then ready or error, on `stream`.
pub fn provision(stream: &Stream, bins: &[PathBuf]) -> Result<(), String> {
    stream.next(Message::fresh(AppModulesUnpackStarted {}));
    let missing: Vec<String> =
        bins.iter().filter(|b| locate(b).is_none()).map(|b| b.display().to_string()).collect();
    if missing.is_empty() {
        tracing::info!(count = bins.len(), "runtime ready");
        stream.next(Message::fresh(AppModulesUnpackReady {}));
        return Ok(());
    }
    let error = format!("missing executables: {}", missing.join(", "));
    tracing::warn!(%error, "runtime unavailable");
    stream.next(Message::fresh(AppModulesUnpackError { error: error.clone() }));
    Err(error)
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;
