// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dock_core::message::{ModulesConfigureResponse, ModulesInstallErrorNotification};
use dock_core::{ProjectId, StartedInstance};
use std::path::PathBuf;

fn analysed(installed: bool, synced: bool) -> Message {
    Message::fresh(ProjectAnalyseResponse { synced, installed, diff: Vec::new() })
}

fn fetched(commits: &[&str]) -> Message {
    Message::fresh(VcsFetchEndNotification {
        url: "https://github.com/acme/library.git".into(),
        path: PathBuf::from("/projects/p1"),
        diff: commits.iter().map(|c| c.to_string()).collect(),
    })
}

fn started(port: u16) -> Message {
    Message::fresh(ModulesStartStartedNotification {
        id: ProjectId::new("p1"),
        instance: StartedInstance { port, cwd: PathBuf::from("/projects/p1"), open: false },
    })
}

fn run(progress: &mut ProcessProgress, messages: &[Message]) -> Vec<Reaction> {
    messages.iter().map(|m| progress.observe(m)).collect()
}

#[test]
fn installed_and_synced_checkout_is_done_at_once() {
    let mut progress = ProcessProgress::new(true, false);
    assert_eq!(progress.observe(&analysed(true, true)), Reaction::Step(Step::Done));
}

#[test]
fn checkout_behind_upstream_waits_for_the_build() {
    let mut progress = ProcessProgress::new(true, false);
    let reactions = run(
        &mut progress,
        &[
            analysed(true, false),
            fetched(&["c1"]),
            Message::fresh(ModulesConfigureResponse { payload: serde_json::json!({}) }),
            Message::fresh(ModulesInstallStartNotification {}),
            analysed(true, true),
            Message::fresh(ModulesInstallEndNotification {}),
        ],
    );
    assert!(reactions.iter().all(|r| *r == Reaction::Step(Step::Continue)), "{reactions:?}");

    assert_eq!(
        progress.observe(&Message::fresh(ModulesBuildEndNotification {})),
        Reaction::Step(Step::Done)
    );
}

#[test]
fn fetch_without_new_commits_finishes_on_the_reanalyse() {
    let mut progress = ProcessProgress::new(true, false);
    run(&mut progress, &[analysed(true, false), fetched(&[])]);
    assert_eq!(progress.observe(&analysed(true, true)), Reaction::Step(Step::Done));
}

#[test]
fn current_checkout_without_dependencies_is_installed_once() {
    let mut progress = ProcessProgress::new(false, false);
    assert_eq!(progress.observe(&analysed(false, false)), Reaction::Install);
    assert_eq!(progress.observe(&analysed(false, false)), Reaction::Step(Step::Continue));
    assert_eq!(
        progress.observe(&Message::fresh(ModulesBuildEndNotification {})),
        Reaction::Step(Step::Done)
    );
}

#[test]
fn fresh_clone_waits_for_the_build() {
    let mut progress = ProcessProgress::new(true, false);
    let clone_end = Message::fresh(VcsCloneEndNotification {
        url: "https://github.com/acme/library.git".into(),
        path: PathBuf::from("/projects/p1"),
    });
    run(&mut progress, &[analysed(false, false), clone_end]);
    assert_eq!(progress.observe(&analysed(false, true)), Reaction::Step(Step::Continue));
}

#[test]
fn auto_start_keeps_going_until_the_server_is_up() {
    let mut progress = ProcessProgress::new(true, true);
    assert_eq!(
        progress.observe(&Message::fresh(ModulesBuildEndNotification {})),
        Reaction::Step(Step::Continue)
    );
    assert_eq!(progress.observe(&started(4000)), Reaction::Step(Step::Done));
    assert_eq!(progress.url.as_deref(), Some("http://localhost:4000"));
}

#[test]
fn install_errors_fail_the_command() {
    let mut progress = ProcessProgress::new(true, false);
    progress.observe(&fetched(&["c1"]));
    let error = Message::fresh(ModulesInstallErrorNotification { error: "npm exited".into() });
    assert_eq!(progress.observe(&error), Reaction::Step(Step::Failed("npm exited".into())));
}
