//! CLI help and version specs

use crate::prelude::*;

#[test]
fn no_arguments_prints_usage() {
    Workspace::empty().dock().passes().stdout_has("Usage:").stdout_has("Commands:");
}

#[test]
fn help_lists_every_command() {
    let run = cli().args(&["--help"]).passes();
    for command in
        ["add", "open", "list", "process", "analyse", "install", "build", "start", "remove", "input"]
    {
        assert!(run.stdout().contains(command), "help lacks {command}\n{}", run.stdout());
    }
}

#[test]
fn version_flag_prints_the_version() {
    cli().args(&["--version"]).passes().stdout_has("dock 0.1.0");
}

#[test]
fn start_help_documents_open() {
    cli().args(&["start", "--help"]).passes().stdout_has("--open");
}
