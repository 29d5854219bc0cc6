// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake version control client for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dock_core::{DiffFile, TransferProgress};
use parking_lot::Mutex;

use super::{ProgressTx, VcsClient, VcsError};

/// Recorded VCS call
#[derive(Debug, Clone, PartialEq)]
pub enum VcsCall {
    Head { path: PathBuf },
    RemoteUrl { path: PathBuf },
    Clone { url: String, path: PathBuf },
    FetchOrigin { path: PathBuf },
    RemoteUpdate { path: PathBuf },
    UpstreamCommits { path: PathBuf },
    ChangedFiles { path: PathBuf },
    Pull { path: PathBuf },
    Remove { path: PathBuf },
}

struct FakeVcsState {
    calls: Vec<VcsCall>,
    clone_results: VecDeque<Result<(), VcsError>>,
    clone_progress: Vec<TransferProgress>,
    head: Result<String, VcsError>,
    remote_url: Option<String>,
    upstream: Vec<String>,
    changed: Vec<DiffFile>,
    fetch_error: Option<VcsError>,
    pull_error: Option<VcsError>,
}

/// Scripted [`VcsClient`]. Successful clones create the target directory,
/// pulls clear the upstream commits and removes delete the directory.
#[derive(Clone)]
pub struct FakeVcs {
    inner: Arc<Mutex<FakeVcsState>>,
}

impl Default for FakeVcs {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeVcsState {
                calls: Vec::new(),
                clone_results: VecDeque::new(),
                clone_progress: Vec::new(),
                head: Ok("0123456789abcdef0123456789abcdef01234567".to_string()),
                remote_url: None,
                upstream: Vec::new(),
                changed: Vec::new(),
                fetch_error: None,
                pull_error: None,
            })),
        }
    }
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<VcsCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clone_attempts(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, VcsCall::Clone { .. })).count()
    }

    /// Queue the outcome of the next clone. Unscripted clones succeed.
    pub fn push_clone_result(&self, result: Result<(), VcsError>) {
        self.inner.lock().clone_results.push_back(result);
    }

    /// Fail the next `n` clones with `err`.
    pub fn fail_clones(&self, n: usize, err: VcsError) {
        let mut state = self.inner.lock();
        for _ in 0..n {
            state.clone_results.push_back(Err(err.clone()));
        }
    }

    pub fn set_clone_progress(&self, progress: Vec<TransferProgress>) {
        self.inner.lock().clone_progress = progress;
    }

    pub fn set_head(&self, head: Result<String, VcsError>) {
        self.inner.lock().head = head;
    }

    pub fn set_remote_url(&self, url: Option<&str>) {
        self.inner.lock().remote_url = url.map(str::to_string);
    }

    /// Commits upstream that are not local, plus the files they touch.
    pub fn set_upstream(&self, commits: Vec<&str>, changed: Vec<DiffFile>) {
        let mut state = self.inner.lock();
        state.upstream = commits.into_iter().map(str::to_string).collect();
        state.changed = changed;
    }

    pub fn fail_fetch(&self, err: Option<VcsError>) {
        self.inner.lock().fetch_error = err;
    }

    pub fn fail_pull(&self, err: Option<VcsError>) {
        self.inner.lock().pull_error = err;
    }

    fn record(&self, call: VcsCall) {
        self.inner.lock().calls.push(call);
    }
}

#[async_trait]
impl VcsClient for FakeVcs {
    async fn head(&self, path: &Path) -> Result<String, VcsError> {
        self.record(VcsCall::Head { path: path.to_owned() });
        self.inner.lock().head.clone()
    }

    async fn remote_url(&self, path: &Path) -> Result<Option<String>, VcsError> {
        self.record(VcsCall::RemoteUrl { path: path.to_owned() });
        Ok(self.inner.lock().remote_url.clone())
    }

    async fn clone_repo(
        &self,
        url: &str,
        path: &Path,
        progress: Option<ProgressTx>,
    ) -> Result<(), VcsError> {
        self.record(VcsCall::Clone { url: url.to_string(), path: path.to_owned() });
        let (result, updates) = {
            let mut state = self.inner.lock();
            (state.clone_results.pop_front().unwrap_or(Ok(())), state.clone_progress.clone())
        };
        if result.is_ok() {
            if let Some(tx) = progress {
                for update in updates {
                    let _ = tx.send(update);
                }
            }
            std::fs::create_dir_all(path).map_err(|e| VcsError::Failed(e.to_string()))?;
        }
        result
    }

    async fn fetch_origin(&self, path: &Path) -> Result<(), VcsError> {
        self.record(VcsCall::FetchOrigin { path: path.to_owned() });
        self.inner.lock().fetch_error.clone().map_or(Ok(()), Err)
    }

    async fn remote_update(&self, path: &Path) -> Result<(), VcsError> {
        self.record(VcsCall::RemoteUpdate { path: path.to_owned() });
        self.inner.lock().fetch_error.clone().map_or(Ok(()), Err)
    }

    async fn upstream_commits(&self, path: &Path) -> Result<Vec<String>, VcsError> {
        self.record(VcsCall::UpstreamCommits { path: path.to_owned() });
        Ok(self.inner.lock().upstream.clone())
    }

    async fn changed_files(&self, path: &Path) -> Result<Vec<DiffFile>, VcsError> {
        self.record(VcsCall::ChangedFiles { path: path.to_owned() });
        Ok(self.inner.lock().changed.clone())
    }

    async fn pull(&self, path: &Path) -> Result<(), VcsError> {
        self.record(VcsCall::Pull { path: path.to_owned() });
        let mut state = self.inner.lock();
        if let Some(err) = state.pull_error.clone() {
            return Err(err);
        }
        state.upstream.clear();
        state.changed.clear();
        Ok(())
    }

    async fn remove(&self, path: &Path) -> Result<(), VcsError> {
        self.record(VcsCall::Remove { path: path.to_owned() });
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VcsError::Failed(e.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
