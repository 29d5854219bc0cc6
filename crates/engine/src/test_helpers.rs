// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dock_adapters::{FakeModules, FakeVcs};
use dock_core::{Channel, Message, ProjectId, ReadinessGate, Subscription};
use parking_lot::Mutex;

use crate::host::Host;
use crate::modules::ModulesSettings;
use crate::project::{Project, ProjectDeps};

/// Generous upper bound for anything a test waits on.
pub(crate) const WAIT: Duration = Duration::from_secs(2);

/// Window used to assert that nothing (more) happens.
pub(crate) const QUIET: Duration = Duration::from_millis(150);

/// Poll `check` until it holds or [`WAIT`] runs out.
pub(crate) async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// A bare [`Host`] for exercising one subsystem at a time.
pub(crate) struct TestHost {
    id: ProjectId,
    path: Mutex<Option<PathBuf>>,
    url: Mutex<Option<String>>,
    base: PathBuf,
    channel: Channel,
}

impl TestHost {
    pub(crate) fn new(id: &str, path: Option<PathBuf>) -> Self {
        let base = path.clone().unwrap_or_else(std::env::temp_dir);
        TestHost {
            id: ProjectId::new(id),
            path: Mutex::new(path),
            url: Mutex::new(None),
            base,
            channel: Channel::new(),
        }
    }

    pub(crate) fn with_url(self, url: &str) -> Self {
        *self.url.lock() = Some(url.to_string());
        self
    }

    pub(crate) fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Send `message` down to whatever is attached.
    pub(crate) fn send(&self, message: Message) {
        self.channel.down.next(message);
    }

    pub(crate) fn watch(&self) -> Subscription {
        self.channel.up.subscribe()
    }
}

impl Host for TestHost {
    fn id(&self) -> ProjectId {
        self.id.clone()
    }

    fn path(&self) -> Option<PathBuf> {
        self.path.lock().clone()
    }

    fn base_path(&self) -> PathBuf {
        self.base.clone()
    }

    fn url(&self) -> Option<String> {
        self.url.lock().clone()
    }

    fn channel(&self) -> &Channel {
        &self.channel
    }
}

/// Fast heartbeats so liveness tests finish quickly.
pub(crate) fn fast_settings() -> ModulesSettings {
    ModulesSettings { heartbeat: Duration::from_millis(20), max_missed: 2 }
}

/// Fakes plus the dependencies a [`Project`] is built from.
pub(crate) struct Fixture {
    pub vcs: FakeVcs,
    pub modules: FakeModules,
    pub gate: ReadinessGate,
    pub dir: tempfile::TempDir,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Fixture {
            vcs: FakeVcs::new(),
            modules: FakeModules::new(),
            gate: ReadinessGate::opened_now(),
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub(crate) fn with_closed_gate(mut self) -> Self {
        self.gate = ReadinessGate::new();
        self
    }

    pub(crate) fn projects_dir(&self) -> PathBuf {
        self.dir.path().join("projects")
    }

    pub(crate) fn deps(&self) -> ProjectDeps<FakeVcs, FakeModules> {
        ProjectDeps {
            vcs: self.vcs.clone(),
            modules: self.modules.clone(),
            gate: self.gate.clone(),
            settings: fast_settings(),
            projects_dir: self.projects_dir(),
            auto_start: false,
        }
    }

    pub(crate) fn managed(&self, url: &str, auto_start: bool) -> Project<FakeVcs, FakeModules> {
        Project::from_url(url, auto_start, self.deps())
    }
}
