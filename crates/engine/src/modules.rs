// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module manager subsystem
//!
//! Installs dependencies, runs the build script and supervises the
//! application server (plus an optional watch script) for one project.
//! Work that needs the provisioned runtime waits on the readiness gate.

use std::sync::{Arc, Weak};
use std::time::Duration;

use dock_adapters::{ChildController, ChildEvent, ChildHandle, ModulesAdapter};
use dock_core::message::{
    ModulesBuildEndNotification, ModulesBuildErrorNotification, ModulesBuildRequest,
    ModulesBuildStartNotification, ModulesConfigureRequest, ModulesConfigureResponse,
    ModulesInstallEndNotification, ModulesInstallErrorNotification, ModulesInstallRequest,
    ModulesInstallStartNotification, ModulesStartErrorNotification, ModulesStartPortNotification,
    ModulesStartRequest, ModulesStartStartNotification, ModulesStartStartedNotification,
    ModulesStopEndNotification, ModulesStopNotification, ModulesStopRequest,
};
use dock_core::{dispatch, Message, ModulesState, ReadinessGate, StartedInstance};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

use crate::host::{defer_until_ready, Host};
use crate::liveness::{Liveness, LivenessMonitor};

/// Heartbeat cadence and how many unanswered beats are tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModulesSettings {
    pub heartbeat: Duration,
    pub max_missed: u32,
}

impl Default for ModulesSettings {
    fn default() -> Self {
        ModulesSettings { heartbeat: Duration::from_millis(500), max_missed: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Install,
    Configure,
    Build,
    Start { open: bool, generation: u64 },
    Stop,
}

#[derive(Default)]
struct Inner {
    state: ModulesState,
    /// Bumped by every start and stop so monitors of replaced children
    /// stay quiet and superseded starts give up.
    generation: u64,
    stopped: bool,
    server: Option<ChildController>,
    watch: Option<ChildController>,
}

#[derive(Clone)]
pub struct ModuleManager<M> {
    adapter: M,
    gate: ReadinessGate,
    settings: ModulesSettings,
    inner: Arc<Mutex<Inner>>,
}

impl<M: ModulesAdapter> ModuleManager<M> {
    pub fn new(adapter: M, gate: ReadinessGate, settings: ModulesSettings) -> Self {
        ModuleManager { adapter, gate, settings, inner: Arc::new(Mutex::new(Inner::default())) }
    }

    pub fn state(&self) -> ModulesState {
        self.inner.lock().state
    }

    /// Whether a server child is currently held.
    pub fn is_serving(&self) -> bool {
        self.inner.lock().server.is_some()
    }

    /// Serve requests arriving on `host`'s `down` stream until the host is dropped.
    pub fn attach<H: Host>(&self, host: &Arc<H>) -> JoinHandle<()> {
        let mut requests = host.channel().down.subscribe();
        let weak = Arc::downgrade(host);
        let manager = self.clone();
        tokio::spawn(async move {
            while let Some(message) = requests.recv().await {
                let Some(host) = weak.upgrade() else {
                    break;
                };
                manager.handle(host, message);
            }
        })
    }

    fn handle<H: Host>(&self, host: Arc<H>, message: Message) {
        let mut task = None;
        dispatch(&message)
            .on::<ModulesInstallRequest>(|_| task = Some(Task::Install))
            .on::<ModulesConfigureRequest>(|_| task = Some(Task::Configure))
            .on::<ModulesBuildRequest>(|_| task = Some(Task::Build))
            .on::<ModulesStartRequest>(|r| {
                task = Some(Task::Start { open: r.open, generation: self.supersede() })
            })
            .on::<ModulesStopRequest>(|_| task = Some(Task::Stop));
        let Some(task) = task else {
            return;
        };
        self.advance(&message);

        let span = tracing::info_span!("modules", project = %host.id().short(8), ?task);
        if task == Task::Stop {
            // Inline: stops and starts must keep their arrival order.
            let _entered = span.enter();
            self.stop(host.as_ref(), &message);
            return;
        }
        let manager = self.clone();
        tokio::spawn(
            async move {
                match task {
                    Task::Install => manager.install(host.as_ref(), &message).await,
                    Task::Configure => manager.configure(host.as_ref(), &message).await,
                    Task::Build => manager.build(host.as_ref(), &message).await,
                    Task::Start { open, generation } => {
                        manager.start(&host, &message, open, generation).await
                    }
                    Task::Stop => {}
                }
            }
            .instrument(span),
        );
    }

    fn advance(&self, message: &Message) {
        let mut inner = self.inner.lock();
        inner.state = inner.state.advance(message);
    }

    /// Publish on `up` after folding the message into the local state.
    fn emit<H: Host + ?Sized>(&self, host: &H, message: Message) {
        self.advance(&message);
        host.channel().up.next(message);
    }

    fn is_current(&self, generation: u64) -> bool {
        let inner = self.inner.lock();
        !inner.stopped && inner.generation == generation
    }

    /// Kill whatever runs and open a new generation for the start that
    /// asked for it.
    fn supersede(&self) -> u64 {
        let mut inner = self.inner.lock();
        for child in [inner.server.take(), inner.watch.take()].into_iter().flatten() {
            child.kill();
        }
        inner.generation += 1;
        inner.stopped = false;
        inner.generation
    }

    /// Keep `child` in `slot` while `generation` is current. Otherwise the
    /// child is killed and false returned.
    fn hold(
        &self,
        generation: u64,
        child: &ChildHandle,
        slot: impl FnOnce(&mut Inner) -> &mut Option<ChildController>,
    ) -> bool {
        let mut inner = self.inner.lock();
        if inner.stopped || inner.generation != generation {
            drop(inner);
            tracing::info!(process = child.label(), "start superseded, dropping child");
            child.kill();
            return false;
        }
        *slot(&mut *inner) = Some(child.controller());
        true
    }

    async fn install<H: Host>(&self, host: &H, cause: &Message) {
        self.emit(host, cause.reply(ModulesInstallStartNotification {}));
        defer_until_ready(&self.gate, &host.channel().up, cause).await;

        let Some(path) = host.path() else {
            self.emit(host, cause.reply(ModulesInstallErrorNotification { error: no_path() }));
            return;
        };
        let installer = self.adapter.installer(&path);
        match self.adapter.install(&path, installer).await {
            Ok(()) => self.emit(host, cause.reply(ModulesInstallEndNotification {})),
            Err(e) => self.emit(
                host,
                cause.reply(ModulesInstallErrorNotification { error: e.to_string() }),
            ),
        }
    }

    /// Configuration is best effort: failures are logged, never reported.
    async fn configure<H: Host>(&self, host: &H, cause: &Message) {
        let Some(path) = host.path() else {
            tracing::warn!("configure skipped: project has no path");
            return;
        };
        match self.adapter.load_config(&path).await {
            Ok(config) => self.emit(
                host,
                cause.reply(ModulesConfigureResponse {
                    payload: serde_json::json!({ "config": config }),
                }),
            ),
            Err(e) => tracing::warn!(error = %e, "build configuration unavailable"),
        }
    }

    async fn build<H: Host>(&self, host: &H, cause: &Message) {
        self.emit(host, cause.reply(ModulesBuildStartNotification {}));
        defer_until_ready(&self.gate, &host.channel().up, cause).await;

        let Some(path) = host.path() else {
            self.emit(host, cause.reply(ModulesBuildErrorNotification { error: no_path() }));
            return;
        };
        let manifest = match self.adapter.manifest(&path).await {
            Ok(manifest) => manifest,
            Err(e) => {
                self.emit(host, cause.reply(ModulesBuildErrorNotification { error: e.to_string() }));
                return;
            }
        };
        let Some(script) = manifest.build_script() else {
            tracing::info!("no build script declared");
            self.emit(host, cause.reply(ModulesBuildEndNotification {}));
            return;
        };
        let installer = self.adapter.installer(&path);
        match self.adapter.run_script(&path, installer, &script).await {
            Ok(()) => self.emit(host, cause.reply(ModulesBuildEndNotification {})),
            Err(e) => {
                self.emit(host, cause.reply(ModulesBuildErrorNotification { error: e.to_string() }))
            }
        }
    }

    async fn start<H: Host>(&self, host: &Arc<H>, cause: &Message, open: bool, generation: u64) {
        self.emit(host.as_ref(), cause.reply(ModulesStartStartNotification {}));
        defer_until_ready(&self.gate, &host.channel().up, cause).await;
        if !self.is_current(generation) {
            tracing::info!("start superseded while deferred");
            return;
        }

        let fail = |error: String| {
            self.emit(host.as_ref(), cause.reply(ModulesStartErrorNotification { error }));
        };
        let Some(path) = host.path() else {
            fail(no_path());
            return;
        };

        let watch_script = match self.adapter.manifest(&path).await {
            Ok(manifest) => manifest.watch_script(),
            Err(e) => {
                tracing::warn!(error = %e, "manifest unreadable, starting without watch");
                None
            }
        };
        if !self.is_current(generation) {
            tracing::info!("start superseded before spawning");
            return;
        }
        if let Some(script) = watch_script {
            let installer = self.adapter.installer(&path);
            match self.adapter.spawn_watch(&path, installer, &script).await {
                Ok(child) => {
                    if !self.hold(generation, &child, |inner| &mut inner.watch) {
                        return;
                    }
                    let manager = self.clone();
                    let weak = Arc::downgrade(host);
                    let cause = cause.clone();
                    tokio::spawn(
                        async move {
                            manager.watch_monitor(weak, child, generation, cause, script).await
                        }
                        .in_current_span(),
                    );
                }
                Err(e) => {
                    fail(e.to_string());
                    return;
                }
            }
        }

        let port = match self.adapter.free_port().await {
            Ok(port) => port,
            Err(e) => {
                fail(e.to_string());
                return;
            }
        };
        if !self.is_current(generation) {
            tracing::info!(port, "start superseded before spawning the server");
            return;
        }
        self.emit(host.as_ref(), cause.reply(ModulesStartPortNotification { port }));

        let child = match self.adapter.spawn_server(&path, port).await {
            Ok(child) => child,
            Err(e) => {
                fail(e.to_string());
                return;
            }
        };
        if !self.hold(generation, &child, |inner| &mut inner.server) {
            return;
        }
        let manager = self.clone();
        let weak = Arc::downgrade(host);
        let cause = cause.clone();
        tokio::spawn(
            async move { manager.server_monitor(weak, child, generation, cause, open).await }
                .in_current_span(),
        );
    }

    /// Follow the server: announce it, keep it alive with heartbeats and
    /// report an unexpected exit or a lost heartbeat exactly once.
    async fn server_monitor<H: Host>(
        self,
        host: Weak<H>,
        mut child: ChildHandle,
        generation: u64,
        cause: Message,
        open: bool,
    ) {
        let interval = self.settings.heartbeat.max(Duration::from_millis(1));
        let mut liveness = LivenessMonitor::new(interval, self.settings.max_missed);
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = child.next_event() => {
                    let Some(host) = host.upgrade() else {
                        child.kill();
                        break;
                    };
                    match event {
                        Some(ChildEvent::Started { port, cwd }) => {
                            if self.is_current(generation) {
                                let instance = StartedInstance { port, cwd, open };
                                self.emit(
                                    host.as_ref(),
                                    cause.reply(ModulesStartStartedNotification { id: host.id(), instance }),
                                );
                            }
                        }
                        Some(ChildEvent::HeartbeatAck) => liveness.ack(),
                        Some(ChildEvent::Exited { code }) => {
                            self.server_gone(host.as_ref(), &cause, generation, code);
                            break;
                        }
                        None => {
                            self.server_gone(host.as_ref(), &cause, generation, None);
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    if !child.heartbeat() {
                        continue;
                    }
                    if let Liveness::Lost { missed } = liveness.beat() {
                        tracing::warn!(process = child.label(), missed, "server stopped answering heartbeats");
                        child.kill();
                        if let Some(host) = host.upgrade() {
                            if self.release_server(generation) {
                                self.emit(
                                    host.as_ref(),
                                    cause.reply(ModulesStartErrorNotification {
                                        error: format!("server stopped responding after {missed} missed heartbeats"),
                                    }),
                                );
                            }
                        }
                        break;
                    }
                }
            }
        }
    }

    fn server_gone<H: Host>(&self, host: &H, cause: &Message, generation: u64, code: Option<i32>) {
        if !self.release_server(generation) {
            tracing::debug!(?code, "replaced or stopped server exited");
            return;
        }
        if code == Some(0) {
            tracing::info!("server exited");
            return;
        }
        self.emit(
            host,
            cause.reply(ModulesStartErrorNotification { error: describe_exit("server", code) }),
        );
    }

    /// Forget the server of `generation`. False when it was already
    /// replaced or a stop is in progress.
    fn release_server(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.stopped || inner.generation != generation {
            return false;
        }
        inner.server = None;
        true
    }

    async fn watch_monitor<H: Host>(
        self,
        host: Weak<H>,
        mut child: ChildHandle,
        generation: u64,
        cause: Message,
        script: String,
    ) {
        let code = loop {
            match child.next_event().await {
                Some(ChildEvent::Exited { code }) => break code,
                Some(_) => continue,
                None => break None,
            }
        };
        let Some(host) = host.upgrade() else {
            return;
        };
        if !self.is_current(generation) || code == Some(0) {
            tracing::debug!(%script, ?code, "watch script ended");
            return;
        }
        self.inner.lock().watch = None;
        self.emit(
            host.as_ref(),
            cause.reply(ModulesStartErrorNotification {
                error: describe_exit(&format!("watch script {script}"), code),
            }),
        );
    }

    /// Safe to call with nothing running and to call repeatedly.
    fn stop<H: Host>(&self, host: &H, cause: &Message) {
        let (server, watch) = {
            let mut inner = self.inner.lock();
            inner.stopped = true;
            inner.generation += 1;
            (inner.server.take(), inner.watch.take())
        };
        self.emit(host, cause.reply(ModulesStopNotification {}));
        for child in [server, watch].into_iter().flatten() {
            child.kill();
        }
        self.emit(host, cause.reply(ModulesStopEndNotification {}));
    }
}

fn no_path() -> String {
    "project has no path".to_string()
}

fn describe_exit(what: &str, code: Option<i32>) -> String {
    match code {
        Some(code) => format!("{what} exited with code {code}"),
        None => format!("{what} was terminated"),
    }
}

/// Where a started server serves from, for display.
pub fn instance_url(instance: &StartedInstance) -> String {
    format!("http://localhost:{}", instance.port)
}

#[cfg(test)]
#[path = "modules_tests.rs"]
mod tests;
