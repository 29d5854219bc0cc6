//! CLI error handling specs
//!
//! Verify error messages for invalid commands, arguments and ids.

use crate::prelude::*;

#[test]
fn unknown_subcommand_fails() {
    cli().args(&["frobnicate"]).fails().stderr_has("unrecognized subcommand");
}

#[test]
fn lifecycle_commands_require_an_id() {
    for command in ["process", "analyse", "install", "build", "start", "remove"] {
        cli().args(&[command]).fails().stderr_has("<ID>");
    }
}

#[test]
fn unknown_id_is_reported() {
    let ws = Workspace::empty();
    for command in ["process", "analyse", "install", "build", "start", "remove"] {
        ws.dock()
            .args(&[command, "nope"])
            .fails()
            .stderr_has("Error: project not found: nope");
    }
}

#[test]
fn invalid_config_is_reported() {
    let ws = Workspace::empty();
    std::fs::write(ws.state_path().join("config.toml"), "auto_start = \"sometimes\"").unwrap();
    ws.dock().args(&["list"]).fails().stderr_has("invalid config");
}

#[test]
fn invalid_output_format_fails() {
    cli().args(&["-o", "yaml", "list"]).fails().stderr_has("invalid value 'yaml'");
}
