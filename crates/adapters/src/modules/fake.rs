// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake module tooling for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::child::{ChildControl, ChildEvent, ChildHandle, ChildRemote};
use super::{Installer, Manifest, ModulesAdapter, ModulesError};

/// Recorded module tooling call
#[derive(Debug, Clone, PartialEq)]
pub enum ModulesCall {
    Install { path: PathBuf, installer: Installer },
    RunScript { path: PathBuf, script: String },
    Manifest { path: PathBuf },
    LoadConfig { path: PathBuf },
    SpawnServer { path: PathBuf, port: u16 },
    SpawnWatch { path: PathBuf, script: String },
    Kill { label: String },
}

/// How a fake server behaves once spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerBehaviour {
    /// Announce the port, then answer heartbeats if `ack_heartbeats`.
    Announce { ack_heartbeats: bool },
    /// Exit right away without announcing.
    ExitImmediately { code: Option<i32> },
    /// Announce, answer the first `acks` heartbeats, then hang.
    Hang { acks: u32 },
    /// Never announce and never answer.
    Silent,
}

struct FakeModulesState {
    calls: Vec<ModulesCall>,
    installed: bool,
    install_results: VecDeque<Result<(), ModulesError>>,
    script_results: VecDeque<Result<(), ModulesError>>,
    install_delay: Duration,
    manifest_delay: Duration,
    manifest: Result<Manifest, ModulesError>,
    config: Result<serde_json::Value, ModulesError>,
    next_port: u16,
    server: ServerBehaviour,
    spawn_error: Option<ModulesError>,
    crash: Vec<mpsc::UnboundedSender<Option<i32>>>,
}

/// Scripted [`ModulesAdapter`]. Installs mark the project installed,
/// spawned servers follow the configured [`ServerBehaviour`].
#[derive(Clone)]
pub struct FakeModules {
    inner: Arc<Mutex<FakeModulesState>>,
}

fn default_manifest() -> Manifest {
    let mut scripts = BTreeMap::new();
    scripts.insert("build".to_string(), "patternplate build".to_string());
    scripts.insert("watch".to_string(), "patternplate build --watch".to_string());
    Manifest { name: Some("fixture".to_string()), scripts, repository: None }
}

impl Default for FakeModules {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeModulesState {
                calls: Vec::new(),
                installed: false,
                install_results: VecDeque::new(),
                script_results: VecDeque::new(),
                install_delay: Duration::ZERO,
                manifest_delay: Duration::ZERO,
                manifest: Ok(default_manifest()),
                config: Ok(serde_json::json!({})),
                next_port: 4000,
                server: ServerBehaviour::Announce { ack_heartbeats: true },
                spawn_error: None,
                crash: Vec::new(),
            })),
        }
    }
}

impl FakeModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ModulesCall> {
        self.inner.lock().calls.clone()
    }

    pub fn kills(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, ModulesCall::Kill { .. })).count()
    }

    pub fn set_installed(&self, installed: bool) {
        self.inner.lock().installed = installed;
    }

    pub fn push_install_result(&self, result: Result<(), ModulesError>) {
        self.inner.lock().install_results.push_back(result);
    }

    pub fn push_script_result(&self, result: Result<(), ModulesError>) {
        self.inner.lock().script_results.push_back(result);
    }

    pub fn set_install_delay(&self, delay: Duration) {
        self.inner.lock().install_delay = delay;
    }

    pub fn set_manifest_delay(&self, delay: Duration) {
        self.inner.lock().manifest_delay = delay;
    }

    pub fn set_manifest(&self, manifest: Result<Manifest, ModulesError>) {
        self.inner.lock().manifest = manifest;
    }

    pub fn set_config(&self, config: Result<serde_json::Value, ModulesError>) {
        self.inner.lock().config = config;
    }

    pub fn set_server(&self, behaviour: ServerBehaviour) {
        self.inner.lock().server = behaviour;
    }

    pub fn fail_spawn(&self, err: Option<ModulesError>) {
        self.inner.lock().spawn_error = err;
    }

    /// Make every running fake process exit with `code`.
    pub fn crash_all(&self, code: Option<i32>) {
        let senders = std::mem::take(&mut self.inner.lock().crash);
        for tx in senders {
            let _ = tx.send(code);
        }
    }

    fn record(&self, call: ModulesCall) {
        self.inner.lock().calls.push(call);
    }

    fn start_process(&self, label: String, announce: Option<(u16, PathBuf)>) -> ChildHandle {
        let behaviour = self.inner.lock().server;
        let (handle, remote) = ChildHandle::pair(label.clone());
        let (crash_tx, crash_rx) = mpsc::unbounded_channel();
        self.inner.lock().crash.push(crash_tx);
        let fake = self.clone();
        tokio::spawn(async move {
            fake.run_process(remote, crash_rx, label, behaviour, announce).await;
        });
        handle
    }

    async fn run_process(
        &self,
        mut remote: ChildRemote,
        mut crash: mpsc::UnboundedReceiver<Option<i32>>,
        label: String,
        behaviour: ServerBehaviour,
        announce: Option<(u16, PathBuf)>,
    ) {
        let mut acks_left = 0u32;
        if let Some((port, cwd)) = announce {
            match behaviour {
                ServerBehaviour::Announce { ack_heartbeats } => {
                    acks_left = if ack_heartbeats { u32::MAX } else { 0 };
                    remote.emit(ChildEvent::Started { port, cwd });
                }
                ServerBehaviour::Hang { acks } => {
                    acks_left = acks;
                    remote.emit(ChildEvent::Started { port, cwd });
                }
                ServerBehaviour::ExitImmediately { code } => {
                    remote.emit(ChildEvent::Exited { code });
                    return;
                }
                ServerBehaviour::Silent => {}
            }
        }
        loop {
            tokio::select! {
                control = remote.next_control() => match control {
                    Some(ChildControl::Heartbeat) => {
                        if acks_left > 0 {
                            if acks_left != u32::MAX {
                                acks_left -= 1;
                            }
                            remote.emit(ChildEvent::HeartbeatAck);
                        }
                    }
                    Some(ChildControl::Kill) | None => {
                        self.record(ModulesCall::Kill { label });
                        remote.emit(ChildEvent::Exited { code: None });
                        return;
                    }
                },
                code = crash.recv() => {
                    remote.emit(ChildEvent::Exited { code: code.flatten() });
                    return;
                }
            }
        }
    }
}

#[async_trait]
impl ModulesAdapter for FakeModules {
    fn is_installed(&self, _path: &Path) -> bool {
        self.inner.lock().installed
    }

    async fn install(&self, path: &Path, installer: Installer) -> Result<(), ModulesError> {
        self.record(ModulesCall::Install { path: path.to_owned(), installer });
        let delay = self.inner.lock().install_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.inner.lock();
        let result = state.install_results.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            state.installed = true;
        }
        result
    }

    async fn run_script(
        &self,
        path: &Path,
        _installer: Installer,
        script: &str,
    ) -> Result<(), ModulesError> {
        self.record(ModulesCall::RunScript { path: path.to_owned(), script: script.to_string() });
        self.inner.lock().script_results.pop_front().unwrap_or(Ok(()))
    }

    async fn manifest(&self, path: &Path) -> Result<Manifest, ModulesError> {
        self.record(ModulesCall::Manifest { path: path.to_owned() });
        let delay = self.inner.lock().manifest_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.inner.lock().manifest.clone()
    }

    async fn load_config(&self, path: &Path) -> Result<serde_json::Value, ModulesError> {
        self.record(ModulesCall::LoadConfig { path: path.to_owned() });
        self.inner.lock().config.clone()
    }

    async fn free_port(&self) -> Result<u16, ModulesError> {
        let mut state = self.inner.lock();
        let port = state.next_port;
        state.next_port = state.next_port.wrapping_add(1);
        Ok(port)
    }

    async fn spawn_server(&self, path: &Path, port: u16) -> Result<ChildHandle, ModulesError> {
        self.record(ModulesCall::SpawnServer { path: path.to_owned(), port });
        if let Some(err) = self.inner.lock().spawn_error.clone() {
            return Err(err);
        }
        Ok(self.start_process(format!("server:{port}"), Some((port, path.to_owned()))))
    }

    async fn spawn_watch(
        &self,
        path: &Path,
        _installer: Installer,
        script: &str,
    ) -> Result<ChildHandle, ModulesError> {
        self.record(ModulesCall::SpawnWatch { path: path.to_owned(), script: script.to_string() });
        if let Some(err) = self.inner.lock().spawn_error.clone() {
            return Err(err);
        }
        Ok(self.start_process(format!("watch:{script}"), None))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
