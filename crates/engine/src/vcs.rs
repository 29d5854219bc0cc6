// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version control subsystem
//!
//! Serves clone, fetch, analyse, remove and read requests from a host's
//! `down` stream and reports progress, results and errors on its `up`
//! stream. Every failure becomes exactly one `VcsErrorNotification`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use dock_adapters::{Manifest, VcsClient, VcsError};
use dock_core::git_url::{self, GitUrl};
use dock_core::message::{
    VcsAnalyseRequest, VcsAnalyseResponse, VcsCloneEndNotification, VcsCloneRequest,
    VcsCloneStartNotification, VcsCredentialAnswer, VcsCredentialChallenge, VcsErrorNotification,
    VcsFetchEndNotification, VcsFetchRequest, VcsFetchStartNotification, VcsProgressNotification,
    VcsReadRequest, VcsReadResponse, VcsRemoveEndNotification, VcsRemoveRequest,
    VcsRemoveResponse, VcsRemoveStartNotification, VcsRetryNotification,
};
use dock_core::{dispatch, Correlator, Message, ReadinessGate, Stream, Tid, TransferProgress};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::host::{defer_until_ready, working_copy, Host};

/// Clone attempts allowed while credentials keep failing.
pub const MAX_CLONE_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Clone,
    Fetch,
    Analyse,
    Remove,
    Read,
}

/// One per project. Clones share the pending credential challenges and
/// the token obtained for the project.
#[derive(Clone)]
pub struct VersionControl<V> {
    client: V,
    gate: ReadinessGate,
    answers: Correlator,
    challenges: Arc<Mutex<HashMap<Tid, String>>>,
    token: Arc<Mutex<Option<String>>>,
}

impl<V: VcsClient> VersionControl<V> {
    pub fn new(client: V, gate: ReadinessGate) -> Self {
        VersionControl {
            client,
            gate,
            answers: Correlator::new(),
            challenges: Arc::new(Mutex::new(HashMap::new())),
            token: Arc::new(Mutex::new(None)),
        }
    }

    /// Serve requests arriving on `host`'s `down` stream until the host is dropped.
    pub fn attach<H: Host>(&self, host: &Arc<H>) -> JoinHandle<()> {
        let mut requests = host.channel().down.subscribe();
        let weak = Arc::downgrade(host);
        let vcs = self.clone();
        tokio::spawn(async move {
            while let Some(message) = requests.recv().await {
                let Some(host) = weak.upgrade() else {
                    break;
                };
                vcs.handle(host, message);
            }
        })
    }

    /// Number of credential challenges still waiting for an answer.
    pub fn pending_challenges(&self) -> usize {
        self.answers.pending()
    }

    fn handle<H: Host>(&self, host: Arc<H>, message: Message) {
        let spawn = |task: Task| {
            let vcs = self.clone();
            let host = Arc::clone(&host);
            let cause = message.clone();
            let span = tracing::info_span!("vcs", project = %host.id().short(8), ?task);
            tokio::spawn(async move { vcs.run(task, host.as_ref(), &cause).await }.instrument(span));
        };
        dispatch(&message)
            .on::<VcsCloneRequest>(|_| spawn(Task::Clone))
            .on::<VcsFetchRequest>(|_| spawn(Task::Fetch))
            .on::<VcsAnalyseRequest>(|_| spawn(Task::Analyse))
            .on::<VcsRemoveRequest>(|_| spawn(Task::Remove))
            .on::<VcsReadRequest>(|_| spawn(Task::Read))
            .on::<VcsCredentialAnswer>(|answer| self.answer(&message, answer));
    }

    async fn run<H: Host>(&self, task: Task, host: &H, cause: &Message) {
        match task {
            Task::Clone => self.clone_repo(host, cause).await,
            Task::Fetch => self.fetch(host, cause).await,
            Task::Analyse => self.analyse(host, cause).await,
            Task::Remove => self.remove(host, cause).await,
            Task::Read => self.read(host, cause).await,
        }
    }

    fn answer(&self, message: &Message, answer: &VcsCredentialAnswer) {
        let expected = self.challenges.lock().get(&message.tid).cloned();
        let Some(expected) = expected else {
            tracing::trace!(tid = %message.tid, "credential answer without a pending challenge");
            return;
        };
        if !expected.eq_ignore_ascii_case(&answer.host) {
            tracing::warn!(
                expected = %expected,
                host = %answer.host,
                "credential answer for another host ignored"
            );
            return;
        }
        self.challenges.lock().remove(&message.tid);
        if self.answers.fulfill(message.clone()).is_err() {
            tracing::debug!(tid = %message.tid, "credential answer arrived after the clone gave up");
        }
    }

    async fn clone_repo<H: Host>(&self, host: &H, cause: &Message) {
        let up = &host.channel().up;
        let (Some(url), Some(path)) = (host.url(), host.path()) else {
            up.next(cause.reply(VcsErrorNotification {
                error: "cannot clone: project has no url or path".to_string(),
            }));
            return;
        };
        up.next(cause.reply(VcsCloneStartNotification { url: url.clone(), path: path.clone() }));

        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                up.next(cause.reply(VcsErrorNotification {
                    error: format!("cannot create {}: {e}", parent.display()),
                }));
                return;
            }
        }

        let https = GitUrl::parse(&url).is_some_and(|u| u.is_https());
        let mut token = self.token.lock().clone();
        let mut challenged = false;
        for attempt in 1..=MAX_CLONE_ATTEMPTS {
            let target = match &token {
                Some(token) => git_url::with_token(&url, token),
                None => url.clone(),
            };
            let (tx, rx) = mpsc::unbounded_channel();
            let forward = forward_progress(up.clone(), cause.clone(), rx);
            let result = self.client.clone_repo(&target, &path, Some(tx)).await;
            let _ = forward.await;

            match result {
                Ok(()) => {
                    up.next(cause.reply(VcsCloneEndNotification { url, path }));
                    return;
                }
                Err(VcsError::PromptDisabled(_)) if https && !challenged => {
                    challenged = true;
                    match self.challenge(up, cause, &url).await {
                        Some(answer) => {
                            *self.token.lock() = Some(answer.clone());
                            token = Some(answer);
                        }
                        None => {
                            up.next(cause.reply(VcsErrorNotification {
                                error: "credential challenge abandoned".to_string(),
                            }));
                            return;
                        }
                    }
                }
                Err(e) if e.is_retryable() && attempt < MAX_CLONE_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "clone failed, retrying");
                    up.next(cause.reply(VcsRetryNotification { count: attempt }));
                }
                Err(e) if e.is_retryable() => {
                    up.next(cause.reply(VcsErrorNotification {
                        error: format!("giving up after {MAX_CLONE_ATTEMPTS} attempts: {e}"),
                    }));
                    return;
                }
                Err(e) => {
                    up.next(cause.reply(VcsErrorNotification { error: e.to_string() }));
                    return;
                }
            }
        }
        up.next(cause.reply(VcsErrorNotification {
            error: format!("giving up after {MAX_CLONE_ATTEMPTS} attempts"),
        }));
    }

    /// Ask for a token for `url` and wait for the matching answer.
    async fn challenge(&self, up: &Stream, cause: &Message, url: &str) -> Option<String> {
        let host = git_url::host(url)?;
        let waiter = self.answers.register(cause.tid.clone());
        self.challenges.lock().insert(cause.tid.clone(), host);
        tracing::info!(url = %git_url::redact(url), "credentials required");
        up.next(cause.reply(VcsCredentialChallenge { url: git_url::redact(url) }));

        let answer = waiter.await.ok()?;
        answer.narrow::<VcsCredentialAnswer>().map(|a| a.token.clone())
    }

    async fn fetch<H: Host>(&self, host: &H, cause: &Message) {
        let up = &host.channel().up;
        let Some(path) = working_copy(host) else {
            tracing::debug!("fetch skipped: no working copy");
            return;
        };
        let url = host.url().unwrap_or_default();
        up.next(cause.reply(VcsFetchStartNotification { url: url.clone(), path: path.clone() }));

        match self.pull_upstream(&path).await {
            Ok(diff) => up.next(cause.reply(VcsFetchEndNotification { url, path, diff })),
            Err(e) => up.next(cause.reply(VcsErrorNotification { error: e.to_string() })),
        }
    }

    /// Update remotes and pull when upstream has new commits. Returns those commits.
    async fn pull_upstream(&self, path: &Path) -> Result<Vec<String>, VcsError> {
        self.client.remote_update(path).await?;
        let commits = self.client.upstream_commits(path).await?;
        if !commits.is_empty() {
            self.client.pull(path).await?;
        }
        Ok(commits)
    }

    async fn analyse<H: Host>(&self, host: &H, cause: &Message) {
        let up = &host.channel().up;
        let Some(path) = working_copy(host) else {
            tracing::debug!("analyse skipped: no working copy");
            return;
        };
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            up.next(cause.reply(VcsAnalyseResponse::missing()));
            return;
        }
        let hash = match self.client.head(&path).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::debug!(error = %e, "working copy has no readable head");
                up.next(cause.reply(VcsAnalyseResponse {
                    exists: true,
                    hash: None,
                    synced: None,
                    diff: Vec::new(),
                }));
                return;
            }
        };

        let diff = async {
            self.client.fetch_origin(&path).await?;
            let commits = self.client.upstream_commits(&path).await?;
            if commits.is_empty() {
                return Ok(Vec::new());
            }
            self.client.changed_files(&path).await
        }
        .await;
        match diff {
            Ok(diff) => up.next(cause.reply(VcsAnalyseResponse::present(Some(hash), diff))),
            Err(e) => up.next(cause.reply(VcsErrorNotification { error: e.to_string() })),
        }
    }

    async fn remove<H: Host>(&self, host: &H, cause: &Message) {
        let up = &host.channel().up;
        let id = host.id();
        up.next(cause.reply(VcsRemoveStartNotification { id: id.clone() }));
        defer_until_ready(&self.gate, up, cause).await;

        let Some(path) = working_copy(host) else {
            tracing::debug!("remove skipped: no working copy");
            up.next(cause.reply(VcsRemoveResponse { id }));
            return;
        };
        match self.client.remove(&path).await {
            Ok(()) => {
                up.next(cause.reply(VcsRemoveEndNotification { id: id.clone() }));
                up.next(cause.reply(VcsRemoveResponse { id }));
            }
            Err(e) => up.next(cause.reply(VcsErrorNotification { error: e.to_string() })),
        }
    }

    async fn read<H: Host>(&self, host: &H, cause: &Message) {
        let up = &host.channel().up;
        let Some(path) = working_copy(host) else {
            return;
        };
        match self.client.remote_url(&path).await {
            Ok(Some(url)) => {
                let name = GitUrl::parse(&url).map(|u| u.full_name());
                up.next(cause.reply(VcsReadResponse { name, url: Some(url) }));
            }
            Ok(None) | Err(_) => {
                let (name, url) = match read_manifest(&path).await {
                    Some(manifest) => {
                        let url = manifest.repository_url().map(str::to_string);
                        (manifest.name, url)
                    }
                    None => (path.file_name().map(|n| n.to_string_lossy().into_owned()), None),
                };
                up.next(cause.reply(VcsReadResponse { name, url }));
            }
        }
    }
}

async fn read_manifest(path: &Path) -> Option<Manifest> {
    let text = tokio::fs::read_to_string(path.join("package.json")).await.ok()?;
    Manifest::parse(&text).ok()
}

fn forward_progress(
    up: Stream,
    cause: Message,
    mut rx: mpsc::UnboundedReceiver<TransferProgress>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(transfer_progress) = rx.recv().await {
            up.next(cause.reply(VcsProgressNotification { transfer_progress }));
        }
    })
}

#[cfg(test)]
#[path = "vcs_tests.rs"]
mod tests;
