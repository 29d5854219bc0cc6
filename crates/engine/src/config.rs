// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State paths and the optional `config.toml`
//!
//! ```toml
//! auto_start = true
//! projects_dir = "/srv/patternplate"
//!
//! [[oauth]]
//! hostname = "github.com"
//! client_id = "..."
//! authorize_url = "https://github.com/login/oauth/authorize"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use dock_adapters::OAuthClient;
use serde::Deserialize;

use crate::env;
use crate::error::ConfigError;
use crate::modules::ModulesSettings;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    auto_start: bool,
    projects_dir: Option<PathBuf>,
    oauth: Vec<OAuthClient>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/dock)
    pub state_dir: PathBuf,
    pub store_path: PathBuf,
    pub log_path: PathBuf,
    /// Where managed checkouts are cloned to
    pub projects_dir: PathBuf,
    /// Default for projects added without an explicit choice
    pub auto_start: bool,
    pub oauth: Vec<OAuthClient>,
    pub heartbeat: Duration,
    pub max_missed: u32,
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from(env::state_dir()?)
    }

    pub fn load_from(state_dir: impl Into<PathBuf>) -> Result<Config, ConfigError> {
        let state_dir = state_dir.into();
        let file = read_config_file(&state_dir.join("config.toml"))?;
        Ok(Config {
            store_path: state_dir.join("store.json"),
            log_path: state_dir.join("dock.log"),
            projects_dir: file.projects_dir.unwrap_or_else(|| state_dir.join("projects")),
            auto_start: file.auto_start,
            oauth: file.oauth,
            heartbeat: env::heartbeat_interval(),
            max_missed: env::liveness_max_missed(),
            state_dir,
        })
    }

    pub fn modules_settings(&self) -> ModulesSettings {
        ModulesSettings { heartbeat: self.heartbeat, max_missed: self.max_missed }
    }

    pub fn oauth_client(&self, hostname: &str) -> Option<&OAuthClient> {
        self.oauth.iter().find(|c| c.hostname.eq_ignore_ascii_case(hostname))
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ConfigFile::default()),
        Err(source) => {
            return Err(ConfigError::Read { path: path.display().to_string(), source })
        }
    };
    toml::from_str(&text)
        .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
