// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project identity and observable lifecycle state

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::{dispatch, Message};
use crate::message::{
    ModulesBuildEndNotification, ModulesBuildErrorNotification, ModulesBuildStartNotification,
    ModulesInstallEndNotification, ModulesInstallErrorNotification,
    ModulesInstallStartNotification, ModulesStartErrorNotification,
    ModulesStartStartNotification, ModulesStartStartedNotification, ModulesStopEndNotification,
    ModulesStopNotification, ProjectOpenNotification, ProjectOpenedNotification,
    VcsCloneEndNotification, VcsCloneStartNotification, VcsErrorNotification,
    VcsFetchEndNotification, VcsFetchStartNotification, VcsRemoveEndNotification,
    VcsRemoveStartNotification,
};

crate::define_id! {
    /// Stable identity of a project, generated once and persisted.
    pub struct ProjectId;
}

/// Where a project stands, derived purely from the notifications it emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectState {
    #[default]
    Unknown,
    Fetching,
    Fetched,
    Installing,
    Installed,
    Building,
    Built,
    Starting,
    Started,
    Opening,
    Opened,
    Stopping,
    Stopped,
    Errored,
    Removing,
    Removed,
}

/// Progress order. States outside it (errored, removing, stopping, removed)
/// compare below everything.
const STATE_ORDER: &[ProjectState] = &[
    ProjectState::Unknown,
    ProjectState::Fetching,
    ProjectState::Fetched,
    ProjectState::Installing,
    ProjectState::Installed,
    ProjectState::Building,
    ProjectState::Built,
    ProjectState::Starting,
    ProjectState::Started,
    ProjectState::Opening,
    ProjectState::Opened,
    ProjectState::Stopped,
];

impl ProjectState {
    fn rank(self) -> Option<usize> {
        STATE_ORDER.iter().position(|s| *s == self)
    }

    /// At or beyond `other` in progress order.
    pub fn reached(self, other: ProjectState) -> bool {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => a >= b,
            _ => false,
        }
    }

    pub fn is_working(self) -> bool {
        matches!(
            self,
            ProjectState::Fetching
                | ProjectState::Installing
                | ProjectState::Building
                | ProjectState::Removing
                | ProjectState::Starting
                | ProjectState::Opening
        )
    }

    /// Built or further along.
    pub fn is_ready(self) -> bool {
        self.reached(ProjectState::Built)
    }

    pub fn is_started(self) -> bool {
        self.reached(ProjectState::Started) && self != ProjectState::Stopped
    }

    pub fn in_transition(self) -> bool {
        matches!(self, ProjectState::Stopping | ProjectState::Removing)
    }

    /// State implied by a single notification, independent of project facts.
    /// Analyse responses depend on facts and are handled by the orchestration policy.
    pub fn observe(message: &Message) -> Option<ProjectState> {
        let mut next = None;
        let m = dispatch(message);
        m.on::<VcsCloneStartNotification>(|_| next = Some(ProjectState::Fetching));
        m.on::<VcsCloneEndNotification>(|_| next = Some(ProjectState::Fetched));
        m.on::<VcsFetchStartNotification>(|_| next = Some(ProjectState::Fetching));
        m.on::<VcsFetchEndNotification>(|_| next = Some(ProjectState::Fetched));
        m.on::<VcsErrorNotification>(|_| next = Some(ProjectState::Errored));
        m.on::<VcsRemoveStartNotification>(|_| next = Some(ProjectState::Removing));
        m.on::<VcsRemoveEndNotification>(|_| next = Some(ProjectState::Removed));
        m.on::<ModulesInstallStartNotification>(|_| next = Some(ProjectState::Installing));
        m.on::<ModulesInstallEndNotification>(|_| next = Some(ProjectState::Installed));
        m.on::<ModulesInstallErrorNotification>(|_| next = Some(ProjectState::Errored));
        m.on::<ModulesBuildStartNotification>(|_| next = Some(ProjectState::Building));
        m.on::<ModulesBuildEndNotification>(|_| next = Some(ProjectState::Built));
        m.on::<ModulesBuildErrorNotification>(|_| next = Some(ProjectState::Errored));
        m.on::<ModulesStartStartNotification>(|_| next = Some(ProjectState::Starting));
        m.on::<ModulesStartStartedNotification>(|_| next = Some(ProjectState::Started));
        m.on::<ModulesStartErrorNotification>(|_| next = Some(ProjectState::Errored));
        m.on::<ModulesStopNotification>(|_| next = Some(ProjectState::Stopping));
        m.on::<ModulesStopEndNotification>(|_| next = Some(ProjectState::Stopped));
        m.on::<ProjectOpenNotification>(|_| next = Some(ProjectState::Opening));
        m.on::<ProjectOpenedNotification>(|_| next = Some(ProjectState::Opened));
        next
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectState::Unknown => "unknown",
            ProjectState::Fetching => "fetching",
            ProjectState::Fetched => "fetched",
            ProjectState::Installing => "installing",
            ProjectState::Installed => "installed",
            ProjectState::Building => "building",
            ProjectState::Built => "built",
            ProjectState::Starting => "starting",
            ProjectState::Started => "started",
            ProjectState::Opening => "opening",
            ProjectState::Opened => "opened",
            ProjectState::Stopping => "stopping",
            ProjectState::Stopped => "stopped",
            ProjectState::Errored => "errored",
            ProjectState::Removing => "removing",
            ProjectState::Removed => "removed",
        }
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
