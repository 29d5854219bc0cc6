// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use yare::parameterized;

#[parameterized(
    built = { "built", "\x1b[32mbuilt\x1b[0m" },
    started = { "started", "\x1b[32mstarted\x1b[0m" },
    installing = { "installing", "\x1b[33minstalling\x1b[0m" },
    stopped = { "stopped", "\x1b[33mstopped\x1b[0m" },
    errored = { "errored", "\x1b[31merrored\x1b[0m" },
    unknown = { "unknown", "unknown" },
)]
fn status_colors(input: &str, expected: &str) {
    assert_eq!(apply_status(input), expected);
}

#[test]
fn padded_status_keeps_its_padding() {
    assert_eq!(apply_status("built   "), "\x1b[32mbuilt   \x1b[0m");
}

#[test]
#[serial]
fn no_color_wins_over_force() {
    std::env::set_var("NO_COLOR", "1");
    std::env::set_var("COLOR", "1");
    assert!(!should_colorize());
    assert_eq!(status("errored"), "errored");
    std::env::remove_var("NO_COLOR");
    std::env::remove_var("COLOR");
}

#[test]
#[serial]
fn color_can_be_forced() {
    std::env::remove_var("NO_COLOR");
    std::env::set_var("COLOR", "1");
    assert!(should_colorize());
    assert_eq!(muted("x"), "\x1b[38;5;240mx\x1b[0m");
    std::env::remove_var("COLOR");
}
