// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The list of known projects
//!
//! Owns the [`Store`] the list is persisted to and merges every project's
//! `up` and `down` onto its own channel, so a single subscriber can follow
//! all of them.

use std::path::Path;
use std::sync::{Arc, Weak};

use dock_adapters::{ModulesAdapter, VcsClient};
use dock_core::message::{
    ProjectDiscardNotification, ProjectSaveNotification, ProjectSaveRequest, ProjectSaveResponse,
    VcsReadRequest, VcsRemoveResponse,
};
use dock_core::{dispatch, git_url, Channel, Message, ProjectId, Stream, Subscription};
use dock_storage::Store;
use parking_lot::{Mutex, RwLock};

use crate::error::EngineError;
use crate::project::{Project, ProjectDeps};

struct CollectionInner<V, M> {
    projects: RwLock<Vec<Project<V, M>>>,
    channel: Channel,
    store: Mutex<Store>,
    deps: ProjectDeps<V, M>,
}

pub struct ProjectCollection<V, M> {
    inner: Arc<CollectionInner<V, M>>,
}

impl<V, M> Clone for ProjectCollection<V, M> {
    fn clone(&self) -> Self {
        ProjectCollection { inner: Arc::clone(&self.inner) }
    }
}

impl<V: VcsClient, M: ModulesAdapter> ProjectCollection<V, M> {
    /// Restore every persisted project. Must run inside a Tokio runtime.
    pub fn from_store(store: Store, deps: ProjectDeps<V, M>) -> Self {
        let projects: Vec<Project<V, M>> =
            store.projects().iter().map(|r| Project::from_record(r, deps.clone())).collect();
        tracing::info!(count = projects.len(), path = %store.path().display(), "projects restored");

        let inner = Arc::new(CollectionInner {
            projects: RwLock::new(Vec::new()),
            channel: Channel::new(),
            store: Mutex::new(store),
            deps,
        });
        spawn_listener(&inner);
        spawn_save_handler(&inner);
        let collection = ProjectCollection { inner };
        for project in projects {
            collection.insert(project);
        }
        collection
    }

    /// Add a managed project for `url`. Fails when one already exists.
    pub fn add_by_url(&self, url: &str, auto_start: bool) -> Result<Project<V, M>, EngineError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(EngineError::InvalidInput("empty url".to_string()));
        }
        if self.contains_url(url) {
            return Err(EngineError::DuplicateUrl(url.to_string()));
        }
        let project = Project::from_url(url, auto_start, self.inner.deps.clone());
        self.insert(project.clone());
        self.persist()?;
        tracing::info!(project = %project.id(), url = %git_url::redact(url), "project added");
        Ok(project)
    }

    /// Add an unmanaged project for an existing directory and ask it to
    /// read its name and remote.
    pub fn add_from_path(&self, path: &Path) -> Result<Project<V, M>, EngineError> {
        if !path.is_dir() {
            return Err(EngineError::InvalidInput(format!("{} is not a directory", path.display())));
        }
        let project = Project::from_path(path, self.inner.deps.clone());
        self.insert(project.clone());
        project.request(Message::fresh(VcsReadRequest {}));
        self.persist()?;
        tracing::info!(project = %project.id(), path = %path.display(), "project opened");
        Ok(project)
    }

    pub fn add_empty(&self) -> Result<Project<V, M>, EngineError> {
        let project = Project::create_empty(self.inner.deps.clone());
        self.insert(project.clone());
        self.persist()?;
        Ok(project)
    }

    fn insert(&self, project: Project<V, M>) {
        forward(project.channel().up.subscribe(), self.inner.channel.up.clone());
        forward(project.channel().down.subscribe(), self.inner.channel.down.clone());
        self.inner.projects.write().push(project);
    }
}

impl<V, M> ProjectCollection<V, M> {
    pub fn channel(&self) -> &Channel {
        &self.inner.channel
    }

    pub fn items(&self) -> Vec<Project<V, M>>
    where
        V: Clone,
        M: Clone,
    {
        self.inner.projects.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.projects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.projects.read().is_empty()
    }

    /// Look a project up by id or unique id prefix.
    pub fn get(&self, prefix: &str) -> Result<Project<V, M>, EngineError>
    where
        V: Clone,
        M: Clone,
    {
        let projects = self.inner.projects.read();
        if let Some(exact) = projects.iter().find(|p| p.id() == prefix) {
            return Ok(exact.clone());
        }
        let matches: Vec<&Project<V, M>> =
            projects.iter().filter(|p| p.id().matches_prefix(prefix)).collect();
        match matches.as_slice() {
            [] => Err(EngineError::ProjectNotFound(prefix.to_string())),
            [one] => Ok((*one).clone()),
            many => {
                Err(EngineError::AmbiguousProject { prefix: prefix.to_string(), count: many.len() })
            }
        }
    }

    pub fn contains_url(&self, url: &str) -> bool {
        let url = url.trim();
        self.inner.projects.read().iter().any(|p| p.url().as_deref() == Some(url))
    }

    /// Send `message` down to every project.
    pub fn broadcast(&self, message: &Message) {
        for project in self.inner.projects.read().iter() {
            project.request(message.clone());
        }
    }

    /// Write the current project list to the store.
    pub fn persist(&self) -> Result<(), EngineError> {
        let records = self.inner.projects.read().iter().map(Project::record).collect();
        let mut store = self.inner.store.lock();
        store.set_projects(records);
        store.save()?;
        Ok(())
    }

    /// Last URL typed by the user.
    pub fn input(&self) -> String {
        self.inner.store.lock().input().to_string()
    }

    pub fn set_input(&self, input: &str) -> Result<(), EngineError> {
        let mut store = self.inner.store.lock();
        store.set_input(input);
        store.save()?;
        Ok(())
    }

    /// Drop a project from the list without touching its checkout.
    pub fn forget(&self, id: &ProjectId) -> bool {
        let mut projects = self.inner.projects.write();
        let before = projects.len();
        projects.retain(|p| p.id() != *id);
        before != projects.len()
    }
}

fn forward(mut from: Subscription, to: Stream) {
    tokio::spawn(async move {
        while let Some(message) = from.recv().await {
            to.next(message);
        }
    });
}

/// React to what projects report: removals, discards and saves.
fn spawn_listener<V, M>(inner: &Arc<CollectionInner<V, M>>)
where
    V: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    let mut observed = inner.channel.up.subscribe();
    let weak = Arc::downgrade(inner);
    tokio::spawn(async move {
        while let Some(message) = observed.recv().await {
            let Some(collection) = upgrade(&weak) else {
                break;
            };
            let mut dirty = false;
            dispatch(&message)
                .on::<VcsRemoveResponse>(|r| dirty |= collection.forget(&r.id))
                .on::<ProjectDiscardNotification>(|d| dirty |= collection.forget(&d.id))
                .on::<ProjectSaveNotification>(|_| dirty = true);
            if dirty {
                if let Err(e) = collection.persist() {
                    tracing::warn!(error = %e, "failed to persist projects");
                }
            }
        }
    });
}

/// Answer save requests arriving on the collection's `down`.
fn spawn_save_handler<V: VcsClient, M: ModulesAdapter>(inner: &Arc<CollectionInner<V, M>>) {
    let mut requests = inner.channel.down.subscribe();
    let weak = Arc::downgrade(inner);
    tokio::spawn(async move {
        while let Some(message) = requests.recv().await {
            let Some(request) = message.narrow::<ProjectSaveRequest>() else {
                continue;
            };
            let Some(collection) = upgrade(&weak) else {
                break;
            };
            let success = !collection.contains_url(&request.url);
            collection.inner.channel.up.next(message.reply(ProjectSaveResponse { success }));
            if !success {
                continue;
            }
            match collection.add_by_url(&request.url, collection.inner.deps.auto_start) {
                Ok(project) if !request.name.is_empty() => {
                    project.set_name(request.name.clone());
                    if let Err(e) = collection.persist() {
                        tracing::warn!(error = %e, "failed to persist projects");
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "save request failed"),
            }
        }
    });
}

fn upgrade<V, M>(weak: &Weak<CollectionInner<V, M>>) -> Option<ProjectCollection<V, M>> {
    weak.upgrade().map(|inner| ProjectCollection { inner })
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
