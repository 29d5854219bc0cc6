// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node package managers and the patternplate server

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::child::{drive, ChildHandle};
use super::{Installer, Manifest, ModulesAdapter, ModulesError};
use crate::env;
use crate::subprocess::{run_logged, SubprocessError};

const CONFIG_FILE: &str = "patternplate.config.json";
const MANIFEST_FILE: &str = "package.json";
const CONFIG_KEY: &str = "patternplate";

#[derive(Debug, Clone)]
pub struct NodeModules {
    server_bin: PathBuf,
    timeout: Duration,
}

impl NodeModules {
    pub fn new() -> Self {
        NodeModules { server_bin: env::server_bin(), timeout: env::script_timeout() }
    }

    pub fn with_server_bin(bin: impl Into<PathBuf>) -> Self {
        NodeModules { server_bin: bin.into(), ..Self::new() }
    }

    async fn run(
        &self,
        path: &Path,
        installer: Installer,
        args: Vec<String>,
        what: String,
    ) -> Result<(), ModulesError> {
        let mut cmd = Command::new(installer.bin());
        cmd.args(&args).current_dir(path).stdin(Stdio::null());
        tracing::info!(path = %path.display(), %what, "running");
        let status = run_logged(cmd, self.timeout, &what).await.map_err(from_subprocess)?;
        if !status.success() {
            return Err(ModulesError::Exit { what, code: status.code() });
        }
        Ok(())
    }

    fn spawn(&self, mut cmd: Command, label: String) -> Result<ChildHandle, ModulesError> {
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
        let child = cmd.spawn().map_err(|e| ModulesError::Spawn(format!("{label}: {e}")))?;
        tracing::info!(process = %label, pid = ?child.id(), "spawned");
        let (handle, remote) = ChildHandle::pair(label.clone());
        drive(child, remote, label);
        Ok(handle)
    }
}

impl Default for NodeModules {
    fn default() -> Self {
        Self::new()
    }
}

fn from_subprocess(err: SubprocessError) -> ModulesError {
    match err {
        SubprocessError::Timeout { .. } => ModulesError::Timeout(err.to_string()),
        SubprocessError::Io { .. } => ModulesError::Io(err.to_string()),
    }
}

async fn read_manifest(path: &Path) -> Result<Manifest, ModulesError> {
    let file = path.join(MANIFEST_FILE);
    let text = tokio::fs::read_to_string(&file)
        .await
        .map_err(|e| ModulesError::Manifest(format!("{}: {e}", file.display())))?;
    Manifest::parse(&text)
}

#[async_trait]
impl ModulesAdapter for NodeModules {
    async fn install(&self, path: &Path, installer: Installer) -> Result<(), ModulesError> {
        self.run(path, installer, installer.install_args(), format!("{installer} install")).await
    }

    async fn run_script(
        &self,
        path: &Path,
        installer: Installer,
        script: &str,
    ) -> Result<(), ModulesError> {
        self.run(path, installer, installer.run_args(script), format!("{installer} run {script}"))
            .await
    }

    async fn manifest(&self, path: &Path) -> Result<Manifest, ModulesError> {
        read_manifest(path).await
    }

    async fn load_config(&self, path: &Path) -> Result<serde_json::Value, ModulesError> {
        let file = path.join(CONFIG_FILE);
        match tokio::fs::read_to_string(&file).await {
            Ok(text) => {
                return serde_json::from_str(&text)
                    .map_err(|e| ModulesError::Config(format!("{}: {e}", file.display())));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ModulesError::Config(format!("{}: {e}", file.display()))),
        }

        let text = tokio::fs::read_to_string(path.join(MANIFEST_FILE))
            .await
            .map_err(|e| ModulesError::Config(e.to_string()))?;
        let mut manifest: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ModulesError::Config(e.to_string()))?;
        match manifest.get_mut(CONFIG_KEY).map(serde_json::Value::take) {
            Some(config) if config.is_object() => Ok(config),
            _ => Err(ModulesError::Config(format!(
                "neither {CONFIG_FILE} nor a \"{CONFIG_KEY}\" key in {MANIFEST_FILE}"
            ))),
        }
    }

    async fn free_port(&self) -> Result<u16, ModulesError> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .map_err(|e| ModulesError::Port(e.to_string()))?;
        let addr = listener.local_addr().map_err(|e| ModulesError::Port(e.to_string()))?;
        Ok(addr.port())
    }

    async fn spawn_server(&self, path: &Path, port: u16) -> Result<ChildHandle, ModulesError> {
        let mut cmd = Command::new(&self.server_bin);
        cmd.arg("start").arg("--port").arg(port.to_string()).arg("--cwd").arg(path);
        cmd.current_dir(path);
        self.spawn(cmd, format!("server:{port}"))
    }

    async fn spawn_watch(
        &self,
        path: &Path,
        installer: Installer,
        script: &str,
    ) -> Result<ChildHandle, ModulesError> {
        let mut cmd = Command::new(installer.bin());
        cmd.args(installer.run_args(script)).current_dir(path);
        self.spawn(cmd, format!("{installer} run {script}"))
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
