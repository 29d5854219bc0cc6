// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The project entity
//!
//! A project owns one [`VersionControl`] and one [`ModuleManager`] that
//! share its channel. Requests arriving on `down` are routed to them;
//! notifications they publish on `up` are fed through the orchestration
//! [`policy`](crate::policy) to decide the next step.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use dock_adapters::{ModulesAdapter, VcsClient};
use dock_core::message::{
    ModulesBuildRequest, ModulesConfigureRequest, ModulesInstallRequest, ModulesStartRequest,
    ModulesStopRequest, ProjectAnalyseRequest, ProjectBuildRequest, ProjectConfigureRequest,
    ProjectInstallRequest, ProjectOpenNotification, ProjectOpenRequest, ProjectProcessRequest,
    ProjectRemoveRequest, ProjectSaveNotification, ProjectStartRequest, ProjectStopRequest,
    ProjectUrlRequest, ProjectUrlResponse, VcsAnalyseRequest, VcsCloneRequest,
    VcsRemoveEndNotification, VcsRemoveRequest, VcsRemoveResponse,
};
use dock_core::traced::TracedEffect;
use dock_core::{
    dispatch, Channel, Effect, GitUrl, Message, ModulesState, ProjectId, ProjectState,
    ReadinessGate,
};
use dock_storage::ProjectRecord;
use parking_lot::RwLock;

use crate::error::EngineError;
use crate::host::Host;
use crate::modules::{ModuleManager, ModulesSettings};
use crate::policy::{self, Facts};
use crate::vcs::VersionControl;

/// Collaborators and locations shared by every project of a collection.
#[derive(Clone)]
pub struct ProjectDeps<V, M> {
    pub vcs: V,
    pub modules: M,
    pub gate: ReadinessGate,
    pub settings: ModulesSettings,
    /// Managed checkouts live in `<projects_dir>/<id>`.
    pub projects_dir: PathBuf,
    /// Default for projects added without an explicit choice.
    pub auto_start: bool,
}

#[derive(Debug, Clone)]
struct ProjectData {
    url: Option<String>,
    name: Option<String>,
    path: Option<PathBuf>,
    base_path: PathBuf,
    config: Option<serde_json::Value>,
    auto_start: bool,
    managed: bool,
    state: ProjectState,
}

struct ProjectInner {
    id: ProjectId,
    channel: Channel,
    data: RwLock<ProjectData>,
}

impl Host for ProjectInner {
    fn id(&self) -> ProjectId {
        self.id.clone()
    }

    fn path(&self) -> Option<PathBuf> {
        self.data.read().path.clone()
    }

    fn base_path(&self) -> PathBuf {
        self.data.read().base_path.clone()
    }

    fn url(&self) -> Option<String> {
        self.data.read().url.clone()
    }

    fn channel(&self) -> &Channel {
        &self.channel
    }
}

/// Cheap to clone; clones share the same project.
pub struct Project<V, M> {
    inner: Arc<ProjectInner>,
    vcs: VersionControl<V>,
    modules: ModuleManager<M>,
}

impl<V: Clone, M: Clone> Clone for Project<V, M> {
    fn clone(&self) -> Self {
        Project {
            inner: Arc::clone(&self.inner),
            vcs: self.vcs.clone(),
            modules: self.modules.clone(),
        }
    }
}

impl<V: VcsClient, M: ModulesAdapter> Project<V, M> {
    /// A managed project with nothing known yet.
    pub fn create_empty(deps: ProjectDeps<V, M>) -> Self {
        let id = ProjectId::generate();
        let data = ProjectData {
            url: None,
            name: None,
            path: None,
            base_path: artifacts_dir(&deps.projects_dir, &id),
            config: None,
            auto_start: false,
            managed: true,
            state: ProjectState::Unknown,
        };
        Self::assemble(id, data, deps)
    }

    /// A managed project cloned from `url` into the projects directory.
    pub fn from_url(url: &str, auto_start: bool, deps: ProjectDeps<V, M>) -> Self {
        let id = ProjectId::generate();
        let name = GitUrl::parse(url).and_then(|u| u.repo_name());
        let data = ProjectData {
            url: Some(url.trim().to_string()),
            name,
            path: Some(deps.projects_dir.join(id.as_str())),
            base_path: artifacts_dir(&deps.projects_dir, &id),
            config: None,
            auto_start,
            managed: true,
            state: ProjectState::Unknown,
        };
        Self::assemble(id, data, deps)
    }

    /// An unmanaged project referencing an existing directory. It is never
    /// cloned into or deleted.
    pub fn from_path(path: &Path, deps: ProjectDeps<V, M>) -> Self {
        let id = ProjectId::generate();
        let data = ProjectData {
            url: None,
            name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            path: Some(path.to_path_buf()),
            base_path: artifacts_dir(&deps.projects_dir, &id),
            config: None,
            auto_start: false,
            managed: false,
            state: ProjectState::Unknown,
        };
        Self::assemble(id, data, deps)
    }

    /// Whatever the user typed: a remote url or an existing directory.
    pub fn from_input(
        input: &str,
        auto_start: bool,
        deps: ProjectDeps<V, M>,
    ) -> Result<Self, EngineError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(EngineError::InvalidInput("empty input".to_string()));
        }
        if GitUrl::parse(input).is_some() {
            return Ok(Self::from_url(input, auto_start, deps));
        }
        let path = Path::new(input);
        if path.is_dir() {
            return Ok(Self::from_path(path, deps));
        }
        Err(EngineError::InvalidInput(format!("{input} is neither a git remote nor a directory")))
    }

    /// Restore a persisted project. States of work in flight are not
    /// restored: nothing is running after a restart.
    pub fn from_record(record: &ProjectRecord, deps: ProjectDeps<V, M>) -> Self {
        let state = if record.state.is_working()
            || record.state.is_started()
            || record.state.in_transition()
        {
            ProjectState::Unknown
        } else {
            record.state
        };
        let data = ProjectData {
            url: record.url.clone(),
            name: record.name.clone(),
            path: record.path.clone(),
            base_path: artifacts_dir(&deps.projects_dir, &record.id),
            config: None,
            auto_start: record.auto_start,
            managed: record.managed,
            state,
        };
        Self::assemble(record.id.clone(), data, deps)
    }

    /// Wire subsystems and loops. Must run inside a Tokio runtime.
    fn assemble(id: ProjectId, data: ProjectData, deps: ProjectDeps<V, M>) -> Self {
        let inner = Arc::new(ProjectInner { id, channel: Channel::new(), data: RwLock::new(data) });
        let vcs = VersionControl::new(deps.vcs.clone(), deps.gate.clone());
        let modules = ModuleManager::new(deps.modules.clone(), deps.gate.clone(), deps.settings);
        vcs.attach(&inner);
        modules.attach(&inner);
        spawn_router(&inner);
        spawn_orchestrator(&inner, deps.modules);
        tracing::debug!(project = %inner.id, "project assembled");
        Project { inner, vcs, modules }
    }

    pub fn modules_state(&self) -> ModulesState {
        self.modules.state()
    }

    pub fn is_serving(&self) -> bool {
        self.modules.is_serving()
    }

    /// Credential challenges this project's clones are waiting on.
    pub fn pending_challenges(&self) -> usize {
        self.vcs.pending_challenges()
    }
}

impl<V, M> Project<V, M> {
    pub fn id(&self) -> ProjectId {
        self.inner.id.clone()
    }

    pub fn channel(&self) -> &Channel {
        &self.inner.channel
    }

    pub fn url(&self) -> Option<String> {
        self.inner.data.read().url.clone()
    }

    pub fn name(&self) -> Option<String> {
        self.inner.data.read().name.clone()
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.inner.data.read().path.clone()
    }

    pub fn base_path(&self) -> PathBuf {
        self.inner.data.read().base_path.clone()
    }

    pub fn config(&self) -> Option<serde_json::Value> {
        self.inner.data.read().config.clone()
    }

    pub fn auto_start(&self) -> bool {
        self.inner.data.read().auto_start
    }

    pub fn managed(&self) -> bool {
        self.inner.data.read().managed
    }

    pub fn state(&self) -> ProjectState {
        self.inner.data.read().state
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.inner.data.write().url = Some(url.into());
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.inner.data.write().name = Some(name.into());
    }

    pub fn set_config(&self, config: serde_json::Value) {
        self.inner.data.write().config = Some(config);
    }

    pub fn set_auto_start(&self, auto_start: bool) {
        self.inner.data.write().auto_start = auto_start;
    }

    /// Display name: the configured name, else the id.
    pub fn label(&self) -> String {
        self.name().unwrap_or_else(|| self.inner.id.short(8).to_string())
    }

    /// Send a request to this project.
    pub fn request(&self, message: Message) {
        self.inner.channel.down.next(message);
    }

    pub fn record(&self) -> ProjectRecord {
        let data = self.inner.data.read();
        ProjectRecord {
            id: self.inner.id.clone(),
            url: data.url.clone(),
            name: data.name.clone(),
            path: data.path.clone(),
            managed: data.managed,
            auto_start: data.auto_start,
            state: data.state,
        }
    }
}

fn artifacts_dir(projects_dir: &Path, id: &ProjectId) -> PathBuf {
    projects_dir.join(".artifacts").join(id.as_str())
}

/// Map project requests on `down` to subsystem requests.
fn spawn_router(inner: &Arc<ProjectInner>) {
    let mut requests = inner.channel.down.subscribe();
    let weak = Arc::downgrade(inner);
    tokio::spawn(async move {
        while let Some(message) = requests.recv().await {
            let Some(project) = weak.upgrade() else {
                break;
            };
            route(&project, &message);
        }
    });
}

fn route(project: &ProjectInner, message: &Message) {
    let down = &project.channel.down;
    let up = &project.channel.up;
    dispatch(message)
        .on::<ProjectProcessRequest>(|_| {
            let on_disk = project.path().is_some_and(|p| p.exists());
            if on_disk || !project.data.read().managed {
                down.next(message.reply(VcsAnalyseRequest {}));
            } else {
                down.next(message.reply(VcsCloneRequest {}));
            }
        })
        .on::<ProjectAnalyseRequest>(|_| down.next(message.reply(VcsAnalyseRequest {})))
        .on::<ProjectInstallRequest>(|_| down.next(message.reply(ModulesInstallRequest {})))
        .on::<ProjectConfigureRequest>(|_| down.next(message.reply(ModulesConfigureRequest {})))
        .on::<ProjectBuildRequest>(|_| down.next(message.reply(ModulesBuildRequest {})))
        .on::<ProjectStartRequest>(|r| {
            down.next(message.reply(ModulesStartRequest { open: r.open }))
        })
        .on::<ProjectStopRequest>(|_| down.next(message.reply(ModulesStopRequest {})))
        .on::<ProjectRemoveRequest>(|_| {
            down.next(message.reply(ModulesStopRequest {}));
            if project.data.read().managed {
                down.next(message.reply(VcsRemoveRequest {}));
            } else {
                tracing::info!(project = %project.id, "unlisting unmanaged project");
                up.next(message.reply(VcsRemoveEndNotification { id: project.id.clone() }));
                up.next(message.reply(VcsRemoveResponse { id: project.id.clone() }));
            }
        })
        .on::<ProjectOpenRequest>(|r| {
            up.next(message.reply(ProjectOpenNotification { id: r.id.clone() }))
        })
        .on::<ProjectUrlRequest>(|_| {
            let url = project.url().unwrap_or_default();
            up.next(message.reply(ProjectUrlResponse { url }));
        });
}

/// Feed every `up` message through the policy and carry out the result.
fn spawn_orchestrator<M: ModulesAdapter>(inner: &Arc<ProjectInner>, modules: M) {
    let mut observed = inner.channel.up.subscribe();
    let weak = Arc::downgrade(inner);
    tokio::spawn(async move {
        while let Some(message) = observed.recv().await {
            if !orchestrate(&weak, &modules, &message).await {
                break;
            }
        }
    });
}

async fn orchestrate<M: ModulesAdapter>(
    weak: &Weak<ProjectInner>,
    modules: &M,
    message: &Message,
) -> bool {
    let Some(project) = weak.upgrade() else {
        return false;
    };
    let (facts, state) = {
        let data = project.data.read();
        let installed = data.path.as_deref().is_some_and(|p| modules.is_installed(p));
        (Facts { managed: data.managed, auto_start: data.auto_start, installed }, data.state)
    };
    let transition = policy::advance(&facts, state, message);

    let mut changed = false;
    {
        let mut data = project.data.write();
        if let Some(next) = transition.next {
            if next != data.state {
                tracing::debug!(
                    project = %project.id,
                    from = data.state.as_str(),
                    to = next.as_str(),
                    "state changed"
                );
                data.state = next;
            }
        }
        for effect in &transition.effects {
            match effect {
                Effect::SetName { name } => {
                    changed |= data.name.as_ref() != Some(name);
                    data.name = Some(name.clone());
                }
                Effect::SetUrl { url } => {
                    changed |= data.url.as_ref() != Some(url);
                    data.url = Some(url.clone());
                }
                Effect::SetConfig { config } => data.config = Some(config.clone()),
                Effect::Request { .. } | Effect::Notify { .. } => {}
            }
        }
    }

    let outgoing: Vec<&Effect> =
        transition.effects.iter().filter(|e| e.message().is_some()).collect();
    if outgoing.is_empty() && !changed {
        return true;
    }
    // publish on the next tick, never from inside the handler's own delivery
    tokio::task::yield_now().await;
    for effect in outgoing {
        tracing::debug!(
            project = %project.id,
            effect = effect.name(),
            fields = ?effect.fields(),
            "effect"
        );
        match effect {
            Effect::Request { message } => project.channel.down.next(message.clone()),
            Effect::Notify { message } => project.channel.up.next(message.clone()),
            _ => {}
        }
    }
    if changed {
        project.channel.up.next(message.reply(ProjectSaveNotification { id: project.id.clone() }));
    }
    true
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
