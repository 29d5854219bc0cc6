// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of messages exchanged between the application, the
//! project collection, projects and their subsystems.
//!
//! Requests travel down (towards subsystems), notifications and
//! responses travel up. A response reuses the transaction id of the
//! request that caused it.

use std::path::PathBuf;

use super::{Message, StartedInstance, TransferProgress};
use crate::diff::DiffFile;
use crate::project::ProjectId;

declare_messages! {
    /// Process-wide signals: runtime provisioning and deferred work.
    family App => AppMessage ("app") {
        AppModulesUnpackStarted = "app:unpack-started" {}
        AppModulesUnpackReady = "app:unpack-ready" {}
        AppModulesUnpackError = "app:unpack-error" { error: String }
        /// A subsystem request parked until the runtime becomes available.
        AppTaskDeferred = "app:task-deferred" { task: Box<Message> }
    }

    /// User-facing project commands and their outcomes.
    family Project => ProjectMessage ("project") {
        ProjectProcessRequest = "project:process-request" {}
        ProjectInstallRequest = "project:install-request" {}
        ProjectConfigureRequest = "project:configure-request" {}
        ProjectBuildRequest = "project:build-request" {}
        ProjectStartRequest = "project:start-request" {
            #[serde(default)]
            open: bool,
        }
        ProjectStopRequest = "project:stop-request" {}
        ProjectAnalyseRequest = "project:analyse-request" {}
        ProjectAnalyseResponse = "project:analyse-response" {
            synced: bool,
            installed: bool,
            #[serde(default)]
            diff: Vec<DiffFile>,
        }
        ProjectReadResponse = "project:read-response" {
            name: Option<String>,
            url: Option<String>,
        }
        ProjectOpenRequest = "project:open-request" { id: ProjectId }
        ProjectOpenNotification = "project:open" { id: ProjectId }
        ProjectOpenedNotification = "project:opened" { id: ProjectId }
        ProjectCloseNotification = "project:close" { id: ProjectId }
        ProjectSaveRequest = "project:save-request" { name: String, url: String }
        ProjectSaveResponse = "project:save-response" { success: bool }
        ProjectSaveNotification = "project:save" { id: ProjectId }
        ProjectDiscardNotification = "project:discard" { id: ProjectId }
        ProjectRemoveRequest = "project:remove-request" {}
        ProjectScreenshotNotification = "project:screenshot" {
            project: ProjectId,
            image: PathBuf,
        }
        ProjectUrlRequest = "project:url-request" {}
        ProjectUrlResponse = "project:url-response" { url: String }
    }

    /// Package installation, build and the child server.
    family Modules => ModulesMessage ("modules") {
        ModulesInstallRequest = "modules:install-request" {}
        ModulesInstallStartNotification = "modules:install-start" {}
        ModulesInstallEndNotification = "modules:install-end" {}
        ModulesInstallErrorNotification = "modules:install-error" { error: String }
        ModulesConfigureRequest = "modules:configure-request" {}
        ModulesConfigureResponse = "modules:configure-response" {
            #[serde(default)]
            payload: serde_json::Value,
        }
        ModulesBuildRequest = "modules:build-request" {}
        ModulesBuildStartNotification = "modules:build-start" {}
        ModulesBuildEndNotification = "modules:build-end" {}
        ModulesBuildErrorNotification = "modules:build-error" { error: String }
        ModulesStartRequest = "modules:start-request" {
            #[serde(default)]
            open: bool,
        }
        ModulesStartStartNotification = "modules:start-start" {}
        ModulesStartPortNotification = "modules:start-port" { port: u16 }
        ModulesStartStartedNotification = "modules:start-started" {
            id: ProjectId,
            instance: StartedInstance,
        }
        ModulesStartErrorNotification = "modules:start-error" { error: String }
        ModulesStopRequest = "modules:stop-request" {}
        ModulesStopNotification = "modules:stop" {}
        ModulesStopEndNotification = "modules:stop-end" {}
    }

    /// Version control of managed working copies.
    family Vcs => VcsMessage ("vcs") {
        VcsCloneRequest = "vcs:clone-request" {}
        VcsCloneStartNotification = "vcs:clone-start" { url: String, path: PathBuf }
        VcsCloneEndNotification = "vcs:clone-end" { url: String, path: PathBuf }
        VcsFetchRequest = "vcs:fetch-request" {}
        VcsFetchStartNotification = "vcs:fetch-start" { url: String, path: PathBuf }
        /// `diff` lists upstream commits that were not yet local.
        VcsFetchEndNotification = "vcs:fetch-end" {
            url: String,
            path: PathBuf,
            #[serde(default)]
            diff: Vec<String>,
        }
        VcsAnalyseRequest = "vcs:analyse-request" {}
        /// `hash` and `synced` are unknown (null) when the working copy is missing.
        VcsAnalyseResponse = "vcs:analyse-response" {
            exists: bool,
            hash: Option<String>,
            synced: Option<bool>,
            #[serde(default)]
            diff: Vec<DiffFile>,
        }
        VcsErrorNotification = "vcs:error" { error: String }
        VcsRetryNotification = "vcs:retry" { count: u32 }
        VcsReadRequest = "vcs:read-request" {}
        VcsReadResponse = "vcs:read-response" {
            name: Option<String>,
            url: Option<String>,
        }
        VcsRemoveRequest = "vcs:remove-request" {}
        VcsRemoveStartNotification = "vcs:remove-start" { id: ProjectId }
        VcsRemoveEndNotification = "vcs:remove-end" { id: ProjectId }
        VcsRemoveResponse = "vcs:remove-response" { id: ProjectId }
        VcsProgressNotification = "vcs:progress" { transfer_progress: TransferProgress }
        /// Interactive credentials are needed for `url`.
        VcsCredentialChallenge = "vcs:credential-challenge" { url: String }
        VcsCredentialAnswer = "vcs:credential-answer" { host: String, token: String }
    }

    /// Shell integration: context menus.
    family Ui => UiMessage ("ui") {
        UiContextMenuRequest = "ui:context-menu-request" { target_ref: String }
        UiContextMenuResponse = "ui:context-menu-response" { project: Option<ProjectId> }
    }
}

impl VcsFetchEndNotification {
    /// Nothing arrived from upstream.
    pub fn synced(&self) -> bool {
        self.diff.is_empty()
    }
}

impl VcsAnalyseResponse {
    /// Response for a working copy that is absent on disk.
    pub fn missing() -> Self {
        VcsAnalyseResponse { exists: false, hash: None, synced: None, diff: Vec::new() }
    }

    /// Response for an existing working copy. `synced` follows from `diff`.
    pub fn present(hash: Option<String>, diff: Vec<DiffFile>) -> Self {
        VcsAnalyseResponse { exists: true, hash, synced: Some(diff.is_empty()), diff }
    }
}
