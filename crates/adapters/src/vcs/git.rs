// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! git command line client

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use dock_core::diff::{attach_hunks, parse_raw_numstat};
use dock_core::{DiffFile, TransferProgress};
use tokio::process::Command;

use super::{ProgressTx, VcsClient, VcsError};
use crate::env;
use crate::subprocess::{run_streaming_stderr, run_with_timeout, SubprocessError};

/// Drives the `git` executable with credential helpers and terminal
/// prompting disabled, so missing credentials fail fast.
#[derive(Debug, Clone)]
pub struct GitCli {
    bin: PathBuf,
    timeout: Duration,
    clone_timeout: Duration,
}

impl GitCli {
    pub fn new() -> Self {
        GitCli { bin: env::git_bin(), timeout: env::git_timeout(), clone_timeout: env::clone_timeout() }
    }

    pub fn with_bin(bin: impl Into<PathBuf>) -> Self {
        GitCli { bin: bin.into(), ..Self::new() }
    }

    fn command(&self, cwd: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("-c").arg("credential.helper=");
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    async fn run(&self, path: &Path, args: &[&str], timeout: Duration) -> Result<String, VcsError> {
        let mut cmd = self.command(Some(path));
        cmd.args(args);
        let description = format!("git {}", args.first().copied().unwrap_or_default());
        let output = run_with_timeout(cmd, timeout, &description).await.map_err(from_subprocess)?;
        if !output.status.success() {
            return Err(VcsError::from_stderr(&String::from_utf8_lossy(&output.stderr)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

fn from_subprocess(err: SubprocessError) -> VcsError {
    match err {
        SubprocessError::Timeout { .. } => VcsError::Timeout(err.to_string()),
        SubprocessError::Io { .. } => VcsError::Failed(err.to_string()),
    }
}

/// Parse a `Receiving objects:  45% (450/1000)` progress segment.
pub fn parse_progress(segment: &str) -> Option<TransferProgress> {
    let rest = segment.split("Receiving objects:").nth(1)?;
    let open = rest.find('(')?;
    let close = rest[open..].find(')')? + open;
    let (received, total) = rest[open + 1..close].split_once('/')?;
    Some(TransferProgress {
        received_objects: received.trim().parse().ok()?,
        total_objects: total.trim().parse().ok()?,
    })
}

#[async_trait]
impl VcsClient for GitCli {
    async fn head(&self, path: &Path) -> Result<String, VcsError> {
        self.run(path, &["rev-parse", "HEAD"], self.timeout).await
    }

    async fn remote_url(&self, path: &Path) -> Result<Option<String>, VcsError> {
        let mut cmd = self.command(Some(path));
        cmd.args(["config", "--get", "remote.origin.url"]);
        let output =
            run_with_timeout(cmd, self.timeout, "git config").await.map_err(from_subprocess)?;
        // exit 1 means the key is unset
        match output.status.code() {
            Some(0) => {
                let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok(Some(url).filter(|u| !u.is_empty()))
            }
            Some(1) => Ok(None),
            _ => Err(VcsError::from_stderr(&String::from_utf8_lossy(&output.stderr))),
        }
    }

    async fn clone_repo(
        &self,
        url: &str,
        path: &Path,
        progress: Option<ProgressTx>,
    ) -> Result<(), VcsError> {
        let mut cmd = self.command(None);
        cmd.arg("clone").arg("--progress").arg(url).arg(path);
        let output = run_streaming_stderr(cmd, self.clone_timeout, "git clone", |segment| {
            if let (Some(tx), Some(p)) = (progress.as_ref(), parse_progress(segment)) {
                let _ = tx.send(p);
            }
        })
        .await
        .map_err(from_subprocess)?;
        if !output.status.success() {
            return Err(VcsError::from_stderr(&String::from_utf8_lossy(&output.stderr)));
        }
        Ok(())
    }

    async fn fetch_origin(&self, path: &Path) -> Result<(), VcsError> {
        self.run(path, &["fetch", "origin", "master", "--quiet"], self.timeout).await.map(drop)
    }

    async fn remote_update(&self, path: &Path) -> Result<(), VcsError> {
        self.run(path, &["remote", "update"], self.timeout).await.map(drop)
    }

    async fn upstream_commits(&self, path: &Path) -> Result<Vec<String>, VcsError> {
        let out = self
            .run(path, &["log", "master..origin/master", "--oneline", "--format=format:%H"], self.timeout)
            .await?;
        Ok(out.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect())
    }

    async fn changed_files(&self, path: &Path) -> Result<Vec<DiffFile>, VcsError> {
        let raw = self
            .run(path, &["diff", "--raw", "--numstat", "master", "origin/master"], self.timeout)
            .await?;
        let mut files = parse_raw_numstat(&raw);
        if !files.is_empty() {
            let patch = self.run(path, &["diff", "-U0", "master", "origin/master"], self.timeout).await?;
            attach_hunks(&mut files, &patch);
        }
        Ok(files)
    }

    async fn pull(&self, path: &Path) -> Result<(), VcsError> {
        self.run(path, &["pull"], self.clone_timeout).await.map(drop)
    }

    async fn remove(&self, path: &Path) -> Result<(), VcsError> {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VcsError::Failed(format!("remove {}: {e}", path.display()))),
        }
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
