// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the engine crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Resolve state directory: DOCK_STATE_DIR > XDG_STATE_HOME/dock > ~/.local/state/dock
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("DOCK_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("dock"));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoStateDir)?;
    Ok(home.join(".local/state/dock"))
}

/// Server heartbeat interval (default: 500ms)
pub fn heartbeat_interval() -> Duration {
    std::env::var("DOCK_HEARTBEAT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(500))
}

/// Unanswered heartbeats tolerated before a server counts as lost (default: 3)
pub fn liveness_max_missed() -> u32 {
    std::env::var("DOCK_LIVENESS_MISSED")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(3)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
