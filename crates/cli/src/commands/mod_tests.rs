// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dock_core::message::{ModulesBuildEndNotification, ModulesStopNotification};
use yare::parameterized;

#[parameterized(
    vcs = { Message::fresh(VcsErrorNotification { error: "clone failed".into() }), "clone failed" },
    install = { Message::fresh(ModulesInstallErrorNotification { error: "npm".into() }), "npm" },
    build = { Message::fresh(ModulesBuildErrorNotification { error: "exit 2".into() }), "exit 2" },
    start = { Message::fresh(ModulesStartErrorNotification { error: "port".into() }), "port" },
)]
fn error_notifications_fail(message: Message, error: &str) {
    assert_eq!(failure(&message).as_deref(), Some(error));
    assert_eq!(continue_unless_failed(&message), Step::Failed(error.to_string()));
}

#[parameterized(
    build_end = { Message::fresh(ModulesBuildEndNotification {}) },
    stop = { Message::fresh(ModulesStopNotification {}) },
)]
fn other_notifications_continue(message: Message) {
    assert_eq!(failure(&message), None);
    assert_eq!(continue_unless_failed(&message), Step::Continue);
}
