//! `dock input` specs

use crate::prelude::*;

#[test]
fn input_is_empty_initially() {
    Workspace::empty().dock().args(&["input"]).passes().stdout_eq("");
}

#[test]
fn input_survives_between_runs() {
    let ws = Workspace::empty();
    ws.dock().args(&["input", "https://github.com/acme/draft.git"]).passes();
    ws.dock().args(&["input"]).passes().stdout_eq("https://github.com/acme/draft.git\n");
}

#[test]
fn add_remembers_the_url() {
    let ws = Workspace::empty();
    ws.dock().args(&["add", "https://github.com/acme/library.git"]).passes();
    ws.dock().args(&["input"]).passes().stdout_has("acme/library.git");
}
