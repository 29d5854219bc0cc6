// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Package manager, build scripts and the application server

mod child;
mod node;

pub use child::{ChildControl, ChildController, ChildEvent, ChildHandle, ChildRemote};
pub use node::NodeModules;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeModules, ModulesCall, ServerBehaviour};

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::env;

/// Errors from module tooling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModulesError {
    #[error("{what} exited with {}", describe_exit(.code))]
    Exit { what: String, code: Option<i32> },
    #[error("{0}")]
    Io(String),
    #[error("invalid manifest: {0}")]
    Manifest(String),
    #[error("configuration unavailable: {0}")]
    Config(String),
    #[error("no free port: {0}")]
    Port(String),
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("{0}")]
    Timeout(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Installer {
    Yarn,
    Npm,
}

impl Installer {
    /// yarn when the project carries a `yarn.lock`, npm otherwise.
    pub fn detect(path: &Path) -> Installer {
        if path.join("yarn.lock").is_file() {
            Installer::Yarn
        } else {
            Installer::Npm
        }
    }

    pub fn bin(self) -> PathBuf {
        match self {
            Installer::Yarn => env::yarn_bin(),
            Installer::Npm => env::npm_bin(),
        }
    }

    pub fn install_args(self) -> Vec<String> {
        let mut args = vec!["install".to_string(), "--verbose".to_string()];
        self.push_node_path_flag(&mut args);
        args
    }

    pub fn run_args(self, script: &str) -> Vec<String> {
        let mut args = vec!["run".to_string(), script.to_string()];
        self.push_node_path_flag(&mut args);
        args
    }

    fn push_node_path_flag(self, args: &mut Vec<String>) {
        if self == Installer::Npm {
            args.push("--scripts-prepend-node-path".to_string());
        }
    }
}

impl fmt::Display for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Installer::Yarn => f.write_str("yarn"),
            Installer::Npm => f.write_str("npm"),
        }
    }
}

/// Script lookup order: namespaced under the server tool, then plain.
pub const BUILD_SCRIPTS: &[&str] = &["patternplate:build", "build"];
pub const WATCH_SCRIPTS: &[&str] = &["patternplate:watch", "watch"];

/// The parts of `package.json` the module manager reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
    #[serde(default)]
    pub repository: Option<Repository>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Repository {
    Url(String),
    Detailed { url: String },
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Manifest, ModulesError> {
        serde_json::from_str(text).map_err(|e| ModulesError::Manifest(e.to_string()))
    }

    fn script(&self, candidates: &[&str]) -> Option<String> {
        candidates.iter().find(|s| self.scripts.contains_key(**s)).map(|s| s.to_string())
    }

    pub fn build_script(&self) -> Option<String> {
        self.script(BUILD_SCRIPTS)
    }

    pub fn watch_script(&self) -> Option<String> {
        self.script(WATCH_SCRIPTS)
    }

    pub fn repository_url(&self) -> Option<&str> {
        match self.repository.as_ref()? {
            Repository::Url(url) | Repository::Detailed { url } => Some(url),
        }
    }
}

/// Adapter for the project's module tooling
#[async_trait]
pub trait ModulesAdapter: Clone + Send + Sync + 'static {
    /// Package manager to use for the project at `path`.
    fn installer(&self, path: &Path) -> Installer {
        Installer::detect(path)
    }

    /// Whether dependencies are already present.
    fn is_installed(&self, path: &Path) -> bool {
        path.join("node_modules").is_dir()
    }

    /// Install dependencies. Output goes to the log only.
    async fn install(&self, path: &Path, installer: Installer) -> Result<(), ModulesError>;

    /// Run a declared script to completion.
    async fn run_script(
        &self,
        path: &Path,
        installer: Installer,
        script: &str,
    ) -> Result<(), ModulesError>;

    async fn manifest(&self, path: &Path) -> Result<Manifest, ModulesError>;

    /// Build configuration for the application server (opaque JSON).
    async fn load_config(&self, path: &Path) -> Result<serde_json::Value, ModulesError>;

    async fn free_port(&self) -> Result<u16, ModulesError>;

    /// Spawn the application server on `port` serving `path`.
    async fn spawn_server(&self, path: &Path, port: u16) -> Result<ChildHandle, ModulesError>;

    /// Spawn a long-lived watch script.
    async fn spawn_watch(
        &self,
        path: &Path,
        installer: Installer,
        script: &str,
    ) -> Result<ChildHandle, ModulesError>;
}

#[cfg(test)]
#[path = "modules_tests.rs"]
mod tests;
