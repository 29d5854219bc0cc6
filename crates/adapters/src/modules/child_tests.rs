// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use yare::parameterized;

#[parameterized(
    started = {
        r#"{"type":"patternplate:started","payload":{"port":1337,"cwd":"/p"}}"#,
        Some(ChildEvent::Started { port: 1337, cwd: PathBuf::from("/p") })
    },
    ack = { r#"{"type":"heartbeat:ack"}"#, Some(ChildEvent::HeartbeatAck) },
    unknown = { r#"{"type":"patternplate:log","payload":"x"}"#, None },
    started_without_port = { r#"{"type":"patternplate:started","payload":{"cwd":"/p"}}"#, None },
    plain_text = { "listening...", None },
)]
fn stdout_lines(line: &str, expected: Option<ChildEvent>) {
    assert_eq!(parse_event(line), expected);
}

#[tokio::test]
async fn pair_connects_both_ends() {
    let (mut handle, mut remote) = ChildHandle::pair("server");
    assert!(handle.heartbeat());
    assert_eq!(remote.next_control().await, Some(ChildControl::Heartbeat));
    remote.emit(ChildEvent::HeartbeatAck);
    assert_eq!(handle.next_event().await, Some(ChildEvent::HeartbeatAck));
    assert_eq!(handle.label(), "server");
}

#[tokio::test]
async fn dropped_remote_ends_the_event_stream() {
    let (mut handle, remote) = ChildHandle::pair("server");
    drop(remote);
    assert!(!handle.heartbeat());
    assert_eq!(handle.next_event().await, None);
}

fn sh(script: &str) -> Option<Child> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd.spawn().ok()
}

#[tokio::test]
async fn driven_process_announces_and_exits() {
    let Some(child) = sh(
        r#"echo '{"type":"patternplate:started","payload":{"port":4000,"cwd":"/srv"}}'; exit 3"#,
    ) else {
        return;
    };
    let (mut handle, remote) = ChildHandle::pair("server");
    drive(child, remote, "server".into());

    let started = tokio::time::timeout(Duration::from_secs(5), handle.next_event()).await.unwrap();
    assert_eq!(started, Some(ChildEvent::Started { port: 4000, cwd: PathBuf::from("/srv") }));
    let exited = tokio::time::timeout(Duration::from_secs(5), handle.next_event()).await.unwrap();
    assert_eq!(exited, Some(ChildEvent::Exited { code: Some(3) }));
}

#[tokio::test]
async fn heartbeats_are_written_to_stdin() {
    let Some(child) =
        sh(r#"while read line; do echo '{"type":"heartbeat:ack"}'; done"#)
    else {
        return;
    };
    let (mut handle, remote) = ChildHandle::pair("server");
    drive(child, remote, "server".into());

    assert!(handle.heartbeat());
    let ack = tokio::time::timeout(Duration::from_secs(5), handle.next_event()).await.unwrap();
    assert_eq!(ack, Some(ChildEvent::HeartbeatAck));

    handle.kill();
    let exited = tokio::time::timeout(Duration::from_secs(5), handle.next_event()).await.unwrap();
    assert!(matches!(exited, Some(ChildEvent::Exited { .. })));
}

#[tokio::test]
async fn controller_kills_without_the_handle() {
    let (handle, mut remote) = ChildHandle::pair("watch");
    let controller = handle.controller();
    controller.kill();
    assert_eq!(remote.next_control().await, Some(ChildControl::Kill));
    drop(remote);
    assert!(controller.is_closed());
}
