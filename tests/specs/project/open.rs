//! `dock open` specs

use crate::prelude::*;

#[test]
fn open_reads_the_manifest_name() {
    let ws = Workspace::empty();
    ws.file("checkout/package.json", r#"{ "name": "my-lib", "version": "1.0.0" }"#);

    ws.dock().args(&["open", "checkout"]).passes().stdout_has("Opened my-lib (");
    ws.dock().args(&["list"]).passes().stdout_has("my-lib").stdout_has("unmanaged");

    let store = ws.store();
    assert_eq!(store["projects"][0]["managed"], false);
    assert_eq!(store["projects"][0]["name"], "my-lib");
}

#[test]
fn open_missing_directory_fails() {
    let ws = Workspace::empty();
    ws.dock().args(&["open", "nowhere"]).fails().stderr_has("cannot open nowhere");
}
