// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::message::*;
use yare::parameterized;

fn observe(body: impl Into<Body>) -> Option<ProjectState> {
    ProjectState::observe(&Message::new("t", body))
}

#[test]
fn vcs_notifications_drive_fetch_states() {
    assert_eq!(observe(VcsCloneStartNotification::default()), Some(ProjectState::Fetching));
    assert_eq!(observe(VcsCloneEndNotification::default()), Some(ProjectState::Fetched));
    assert_eq!(observe(VcsFetchStartNotification::default()), Some(ProjectState::Fetching));
    assert_eq!(observe(VcsFetchEndNotification::default()), Some(ProjectState::Fetched));
    assert_eq!(observe(VcsErrorNotification::default()), Some(ProjectState::Errored));
    assert_eq!(observe(VcsRemoveStartNotification::default()), Some(ProjectState::Removing));
    assert_eq!(observe(VcsRemoveEndNotification::default()), Some(ProjectState::Removed));
}

#[test]
fn modules_notifications_drive_build_and_run_states() {
    assert_eq!(observe(ModulesInstallStartNotification {}), Some(ProjectState::Installing));
    assert_eq!(observe(ModulesInstallEndNotification {}), Some(ProjectState::Installed));
    assert_eq!(observe(ModulesBuildStartNotification {}), Some(ProjectState::Building));
    assert_eq!(observe(ModulesBuildEndNotification {}), Some(ProjectState::Built));
    assert_eq!(observe(ModulesStartStartNotification {}), Some(ProjectState::Starting));
    assert_eq!(
        observe(ModulesStartStartedNotification::default()),
        Some(ProjectState::Started)
    );
    assert_eq!(observe(ModulesStopNotification {}), Some(ProjectState::Stopping));
    assert_eq!(observe(ModulesStopEndNotification {}), Some(ProjectState::Stopped));
    assert_eq!(
        observe(ModulesStartErrorNotification { error: "boom".into() }),
        Some(ProjectState::Errored)
    );
}

#[test]
fn requests_do_not_change_state() {
    assert_eq!(observe(ProjectProcessRequest {}), None);
    assert_eq!(observe(ModulesBuildRequest {}), None);
    assert_eq!(observe(VcsAnalyseResponse::missing()), None);
}

#[parameterized(
    unknown = { ProjectState::Unknown, false, false, false, false },
    fetching = { ProjectState::Fetching, true, false, false, false },
    built = { ProjectState::Built, false, true, false, false },
    starting = { ProjectState::Starting, true, true, false, false },
    started = { ProjectState::Started, false, true, true, false },
    opened = { ProjectState::Opened, false, true, true, false },
    stopping = { ProjectState::Stopping, false, false, false, true },
    stopped = { ProjectState::Stopped, false, true, false, false },
    removing = { ProjectState::Removing, true, false, false, true },
    errored = { ProjectState::Errored, false, false, false, false },
)]
fn state_predicates(state: ProjectState, working: bool, ready: bool, started: bool, transition: bool) {
    assert_eq!(state.is_working(), working);
    assert_eq!(state.is_ready(), ready);
    assert_eq!(state.is_started(), started);
    assert_eq!(state.in_transition(), transition);
}

#[test]
fn state_serializes_snake_case() {
    let json = serde_json::to_string(&ProjectState::Installed).unwrap();
    assert_eq!(json, "\"installed\"");
    assert_eq!(ProjectState::Installed.to_string(), "installed");
}

#[test]
fn reached_orders_progress_states_only() {
    assert!(ProjectState::Opened.reached(ProjectState::Built));
    assert!(!ProjectState::Installed.reached(ProjectState::Built));
    assert!(!ProjectState::Errored.reached(ProjectState::Unknown));
}
