// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial(env)]
fn state_dir_precedence() {
    std::env::set_var("DOCK_STATE_DIR", "/tmp/dock-explicit");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/dock-explicit"));

    std::env::remove_var("DOCK_STATE_DIR");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/dock"));

    std::env::remove_var("XDG_STATE_HOME");
    let dir = state_dir().unwrap();
    assert!(dir.ends_with(".local/state/dock"), "{}", dir.display());
}

#[test]
#[serial(env)]
fn heartbeat_interval_override() {
    std::env::remove_var("DOCK_HEARTBEAT_MS");
    assert_eq!(heartbeat_interval(), Duration::from_millis(500));
    std::env::set_var("DOCK_HEARTBEAT_MS", "50");
    assert_eq!(heartbeat_interval(), Duration::from_millis(50));
    std::env::set_var("DOCK_HEARTBEAT_MS", "0");
    assert_eq!(heartbeat_interval(), Duration::from_millis(500));
    std::env::remove_var("DOCK_HEARTBEAT_MS");
}

#[test]
#[serial(env)]
fn liveness_budget_override() {
    std::env::remove_var("DOCK_LIVENESS_MISSED");
    assert_eq!(liveness_max_missed(), 3);
    std::env::set_var("DOCK_LIVENESS_MISSED", "7");
    assert_eq!(liveness_max_missed(), 7);
    std::env::remove_var("DOCK_LIVENESS_MISSED");
}
