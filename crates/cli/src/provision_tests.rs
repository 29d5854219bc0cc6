// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dock_core::test_support::names;
use dock_core::{Channel, ReadinessGate};
use std::time::Duration;

#[test]
fn locates_explicit_paths() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("git");
    std::fs::write(&bin, "").unwrap();
    assert_eq!(locate(&bin), Some(bin.clone()));
    assert_eq!(locate(&dir.path().join("nope")), None);
}

#[tokio::test]
async fn ready_opens_a_following_gate() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("npm");
    std::fs::write(&bin, "").unwrap();
    let channel = Channel::new();
    let gate = ReadinessGate::new();
    gate.follow(channel.down.subscribe());
    let mut seen = channel.down.subscribe();

    provision(&channel.down, &[bin]).unwrap();
    tokio::time::timeout(Duration::from_secs(2), gate.opened()).await.unwrap();
    let mut messages = Vec::new();
    while let Some(m) = seen.try_recv() {
        messages.push(m);
    }
    assert_eq!(names(&messages), vec!["app:unpack-started", "app:unpack-ready"]);
}

#[tokio::test]
async fn missing_executables_keep_the_gate_closed() {
    let channel = Channel::new();
    let gate = ReadinessGate::new();
    gate.follow(channel.down.subscribe());
    let mut seen = channel.down.subscribe();

    let err = provision(&channel.down, &[PathBuf::from("/definitely/not/git")]).unwrap_err();
    assert!(err.contains("/definitely/not/git"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!gate.is_open());
    let mut messages = Vec::new();
    while let Some(m) = seen.try_recv() {
        messages.push(m);
    }
    assert_eq!(names(&messages), vec!["app:unpack-started", "app:unpack-error"]);
}
