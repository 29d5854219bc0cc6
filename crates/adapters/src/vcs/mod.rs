// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version control client adapters

mod git;

pub use git::{parse_progress, GitCli};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeVcs, VcsCall};

use std::path::Path;

use async_trait::async_trait;
use dock_core::{DiffFile, TransferProgress};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from version control operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VcsError {
    /// The client wanted to ask for credentials but prompting is disabled.
    #[error("terminal prompts disabled: {0}")]
    PromptDisabled(String),
    /// Credentials could not be retrieved (ssh agent, key permissions). Retryable.
    #[error("credentials unavailable: {0}")]
    Credentials(String),
    #[error("{0}")]
    Failed(String),
    #[error("{0}")]
    Timeout(String),
}

impl VcsError {
    /// Classify a failed invocation by its stderr.
    pub fn from_stderr(stderr: &str) -> VcsError {
        let text = stderr.trim().to_string();
        let lower = text.to_ascii_lowercase();
        if lower.contains("terminal prompts disabled") {
            VcsError::PromptDisabled(text)
        } else if lower.contains("permission denied (publickey")
            || lower.contains("could not read from remote repository")
            || lower.contains("agent refused operation")
            || lower.contains("error in libcrypto")
        {
            VcsError::Credentials(text)
        } else {
            VcsError::Failed(text)
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, VcsError::Credentials(_))
    }
}

/// Sender for clone progress updates.
pub type ProgressTx = mpsc::UnboundedSender<TransferProgress>;

/// Adapter for the external version control client
#[async_trait]
pub trait VcsClient: Clone + Send + Sync + 'static {
    /// Hash of the local HEAD commit.
    async fn head(&self, path: &Path) -> Result<String, VcsError>;

    /// `remote.origin.url`, if configured.
    async fn remote_url(&self, path: &Path) -> Result<Option<String>, VcsError>;

    /// Clone `url` into `path`. The parent directory must exist.
    async fn clone_repo(
        &self,
        url: &str,
        path: &Path,
        progress: Option<ProgressTx>,
    ) -> Result<(), VcsError>;

    /// `fetch origin master`, quietly.
    async fn fetch_origin(&self, path: &Path) -> Result<(), VcsError>;

    /// Update every remote.
    async fn remote_update(&self, path: &Path) -> Result<(), VcsError>;

    /// Commits on `origin/master` that are not on `master`, newest first.
    async fn upstream_commits(&self, path: &Path) -> Result<Vec<String>, VcsError>;

    /// Files that differ between `master` and `origin/master`.
    async fn changed_files(&self, path: &Path) -> Result<Vec<DiffFile>, VcsError>;

    async fn pull(&self, path: &Path) -> Result<(), VcsError>;

    /// Recursively delete a working copy.
    async fn remove(&self, path: &Path) -> Result<(), VcsError>;
}

#[cfg(test)]
#[path = "vcs_tests.rs"]
mod tests;
