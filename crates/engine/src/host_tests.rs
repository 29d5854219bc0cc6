// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::TestHost;

#[test]
fn unset_path_is_guarded() {
    let host = TestHost::new("p1", None);
    assert_eq!(working_copy(&host), None);
}

#[test]
fn current_dir_is_guarded() {
    let cwd = std::env::current_dir().unwrap();
    let host = TestHost::new("p1", Some(cwd));
    assert_eq!(working_copy(&host), None);
}

#[test]
fn other_paths_pass() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkout");
    let host = TestHost::new("p1", Some(path.clone()));
    assert_eq!(working_copy(&host), Some(path));
}
