// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::path::PathBuf;
use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn bin(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Version control client (default: `git` on PATH).
pub fn git_bin() -> PathBuf {
    bin("DOCK_GIT_BIN", "git")
}

pub fn yarn_bin() -> PathBuf {
    bin("DOCK_YARN_BIN", "yarn")
}

pub fn npm_bin() -> PathBuf {
    bin("DOCK_NPM_BIN", "npm")
}

/// Application server executable (default: `patternplate` on PATH).
pub fn server_bin() -> PathBuf {
    bin("DOCK_SERVER_BIN", "patternplate")
}

/// Short git queries and fetches (default: 120s).
pub fn git_timeout() -> Duration {
    parse_duration_ms("DOCK_GIT_TIMEOUT_MS").unwrap_or(Duration::from_secs(120))
}

/// Clone and pull (default: 30min).
pub fn clone_timeout() -> Duration {
    parse_duration_ms("DOCK_CLONE_TIMEOUT_MS").unwrap_or(Duration::from_secs(1800))
}

/// Package installation and build scripts (default: 30min).
pub fn script_timeout() -> Duration {
    parse_duration_ms("DOCK_SCRIPT_TIMEOUT_MS").unwrap_or(Duration::from_secs(1800))
}

/// Access token handed to the terminal OAuth provider without prompting.
pub fn oauth_token() -> Option<String> {
    std::env::var("DOCK_OAUTH_TOKEN").ok().filter(|t| !t.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
