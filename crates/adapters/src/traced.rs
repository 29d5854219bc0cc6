// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::modules::{ChildHandle, Installer, Manifest, ModulesAdapter, ModulesError};
use crate::oauth::{OAuthAnswer, OAuthError, OAuthProvider, OAuthRequest};
use crate::vcs::{ProgressTx, VcsClient, VcsError};
use async_trait::async_trait;
use dock_core::git_url;
use dock_core::DiffFile;
use std::path::Path;
use tracing::Instrument;

/// Wrapper that adds tracing to any VcsClient
#[derive(Clone)]
pub struct TracedVcs<V> {
    inner: V,
}

impl<V> TracedVcs<V> {
    pub fn new(inner: V) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<V: VcsClient> VcsClient for TracedVcs<V> {
    async fn head(&self, path: &Path) -> Result<String, VcsError> {
        let result = self.inner.head(path).await;
        tracing::debug!(path = %path.display(), head = ?result.as_ref().ok(), "read head");
        result
    }

    async fn remote_url(&self, path: &Path) -> Result<Option<String>, VcsError> {
        let result = self.inner.remote_url(path).await;
        if let Err(ref e) = result {
            tracing::warn!(path = %path.display(), error = %e, "remote url unreadable");
        }
        result
    }

    async fn clone_repo(
        &self,
        url: &str,
        path: &Path,
        progress: Option<ProgressTx>,
    ) -> Result<(), VcsError> {
        let span = tracing::info_span!("vcs.clone", url = %git_url::redact(url), path = %path.display());
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.clone_repo(url, path, progress).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "cloned"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "clone failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn fetch_origin(&self, path: &Path) -> Result<(), VcsError> {
        let span = tracing::info_span!("vcs.fetch", path = %path.display());
        async {
            let start = std::time::Instant::now();
            let result = self.inner.fetch_origin(path).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "fetched"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "fetch failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn remote_update(&self, path: &Path) -> Result<(), VcsError> {
        let result = self.inner.remote_update(path).await;
        if let Err(ref e) = result {
            tracing::error!(path = %path.display(), error = %e, "remote update failed");
        }
        result
    }

    async fn upstream_commits(&self, path: &Path) -> Result<Vec<String>, VcsError> {
        let result = self.inner.upstream_commits(path).await;
        tracing::debug!(path = %path.display(), count = ?result.as_ref().map(Vec::len).ok(), "upstream commits");
        result
    }

    async fn changed_files(&self, path: &Path) -> Result<Vec<DiffFile>, VcsError> {
        let result = self.inner.changed_files(path).await;
        tracing::debug!(path = %path.display(), count = ?result.as_ref().map(Vec::len).ok(), "changed files");
        result
    }

    async fn pull(&self, path: &Path) -> Result<(), VcsError> {
        let span = tracing::info_span!("vcs.pull", path = %path.display());
        async {
            let start = std::time::Instant::now();
            let result = self.inner.pull(path).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "pulled"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "pull failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn remove(&self, path: &Path) -> Result<(), VcsError> {
        let result = self.inner.remove(path).await;
        tracing::info_span!("vcs.remove", path = %path.display()).in_scope(|| match &result {
            Ok(()) => tracing::info!("removed"),
            Err(e) => tracing::error!(error = %e, "remove failed"),
        });
        result
    }
}

/// Wrapper that adds tracing to any ModulesAdapter
#[derive(Clone)]
pub struct TracedModules<M> {
    inner: M,
}

impl<M> TracedModules<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<M: ModulesAdapter> ModulesAdapter for TracedModules<M> {
    fn installer(&self, path: &Path) -> Installer {
        self.inner.installer(path)
    }

    fn is_installed(&self, path: &Path) -> bool {
        self.inner.is_installed(path)
    }

    async fn install(&self, path: &Path, installer: Installer) -> Result<(), ModulesError> {
        let span = tracing::info_span!("modules.install", path = %path.display(), %installer);
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.install(path, installer).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "installed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "install failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_script(
        &self,
        path: &Path,
        installer: Installer,
        script: &str,
    ) -> Result<(), ModulesError> {
        let span = tracing::info_span!("modules.run", path = %path.display(), script);
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.run_script(path, installer, script).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "script finished"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "script failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn manifest(&self, path: &Path) -> Result<Manifest, ModulesError> {
        let result = self.inner.manifest(path).await;
        if let Err(ref e) = result {
            tracing::warn!(path = %path.display(), error = %e, "manifest unreadable");
        }
        result
    }

    async fn load_config(&self, path: &Path) -> Result<serde_json::Value, ModulesError> {
        let result = self.inner.load_config(path).await;
        if let Err(ref e) = result {
            tracing::warn!(path = %path.display(), error = %e, "config unavailable");
        }
        result
    }

    async fn free_port(&self) -> Result<u16, ModulesError> {
        let result = self.inner.free_port().await;
        tracing::debug!(port = ?result.as_ref().ok(), "free port");
        result
    }

    async fn spawn_server(&self, path: &Path, port: u16) -> Result<ChildHandle, ModulesError> {
        let result = self.inner.spawn_server(path, port).await;
        tracing::info_span!("modules.serve", path = %path.display(), port).in_scope(|| {
            match &result {
                Ok(h) => tracing::info!(process = h.label(), "server spawned"),
                Err(e) => tracing::error!(error = %e, "spawn failed"),
            }
        });
        result
    }

    async fn spawn_watch(
        &self,
        path: &Path,
        installer: Installer,
        script: &str,
    ) -> Result<ChildHandle, ModulesError> {
        let result = self.inner.spawn_watch(path, installer, script).await;
        tracing::info_span!("modules.watch", path = %path.display(), script).in_scope(|| {
            match &result {
                Ok(h) => tracing::info!(process = h.label(), "watch spawned"),
                Err(e) => tracing::error!(error = %e, "spawn failed"),
            }
        });
        result
    }
}

/// Wrapper that adds tracing to any OAuthProvider
#[derive(Clone)]
pub struct TracedOAuth<O> {
    inner: O,
}

impl<O> TracedOAuth<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<O: OAuthProvider> OAuthProvider for TracedOAuth<O> {
    async fn authorize(&self, request: &OAuthRequest) -> Result<OAuthAnswer, OAuthError> {
        let span = tracing::info_span!("oauth.authorize", host = %request.client.hostname);
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.authorize(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => tracing::info!(elapsed_ms, "authorized"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "authorization failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
