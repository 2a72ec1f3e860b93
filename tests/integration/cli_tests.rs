//! CLI integration tests
//!
//! These tests run the xmlgui binary against the manifest in tests/fixtures.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn xmlgui() -> Command {
    Command::cargo_bin("xmlgui").expect("binary is built")
}

/// Run a composition with JSON output and parse stdout
fn compose_json(args: &[&str]) -> Value {
    let output = xmlgui()
        .arg(fixtures_path())
        .args(["--format", "json", "--quiet"])
        .args(args)
        .output()
        .expect("Failed to execute command");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn item_names(container: &Value) -> Vec<String> {
    container["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|i| match i["kind"].as_str() {
                    Some("separator") => "-".to_string(),
                    _ => i["name"].as_str().unwrap_or_default().to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn child<'a>(container: &'a Value, name: &str) -> &'a Value {
    container["items"]
        .as_array()
        .and_then(|items| items.iter().find(|i| i["name"] == name))
        .unwrap_or(&Value::Null)
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    xmlgui()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("xmlgui"))
        .stdout(predicate::str::contains("--remove"))
        .stdout(predicate::str::contains("--dump-documents"));
}

#[test]
fn test_cli_version() {
    xmlgui()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_missing_config_fails() {
    xmlgui()
        .args(["--config", "/nonexistent/xmlgui.yml", "--quiet"])
        .assert()
        .failure();
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_compose_shell_and_plugin() {
    let report = compose_json(&[]);

    assert_eq!(report["clients"].as_array().unwrap().len(), 2);
    let menubar = &report["widgets"]["containers"][0];
    assert_eq!(menubar["tag"], "menubar");
    assert_eq!(item_names(menubar), vec!["file", "edit", "tools", "view"]);

    assert_eq!(
        item_names(child(menubar, "file")),
        vec!["file_new", "file_open", "file_print", "-", "file_quit"]
    );
    assert_eq!(item_names(child(menubar, "edit")), vec!["edit_undo"]);
    assert_eq!(item_names(child(menubar, "view")), vec!["view_zoom", "view_minimap"]);
    assert_eq!(child(menubar, "tools")["caption"], "&Tools");

    let print = &child(menubar, "file")["items"][2];
    assert_eq!(print["label"], "&Print");
    assert_eq!(print["shortcut"], "Ctrl+P");

    let toolbar = &report["widgets"]["containers"][1];
    assert_eq!(toolbar["name"], "mainToolBar");
    assert_eq!(item_names(toolbar), vec!["file_new", "file_print"]);
}

#[test]
fn test_strict_mode_reports_missing_actions() {
    let report = compose_json(&[]);
    let missing = report["missing_actions"].as_array().unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0]["client_name"], "plugin");
    assert_eq!(missing[0]["action"], "tools_thesaurus");
}

#[test]
fn test_remove_plugin() {
    let report = compose_json(&["--remove", "plugin"]);

    let menubar = &report["widgets"]["containers"][0];
    assert_eq!(item_names(menubar), vec!["file", "edit", "view"]);
    assert_eq!(item_names(child(menubar, "view")), vec!["view_zoom"]);
    assert_eq!(report["clients"].as_array().unwrap().len(), 1);
    // tools_thesaurus went away with the plugin
    assert!(report["missing_actions"].as_array().unwrap().is_empty());
}

#[test]
fn test_remove_everything_and_dump_documents() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().to_string_lossy().to_string();
    let report = compose_json(&["--remove", "shell", "--dump-documents", &dump]);

    assert!(report["widgets"]["containers"].as_array().unwrap().is_empty());
    assert!(report["clients"].as_array().unwrap().is_empty());

    let shell = std::fs::read_to_string(dir.path().join("shell.rc")).unwrap();
    assert!(shell.contains("name=\"shell\""));
    assert!(shell.contains("file_print"));
    assert!(dir.path().join("plugin.rc").exists());
}

#[test]
fn test_toml_manifest_and_output_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("app.rc"),
        r#"<gui name="app"><ToolBar name="main"><Action name="go"/><Separator/><Action name="stop"/></ToolBar></gui>"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("xmlgui.toml"),
        r#"
[[clients]]
id = "app"
file = "app.rc"
actions = ["go", "stop"]
"#,
    )
    .unwrap();
    let out = dir.path().join("report.json");

    xmlgui()
        .arg(dir.path())
        .args(["--format", "json", "--quiet", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let report: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(
        item_names(&report["widgets"]["containers"][0]),
        vec!["go", "-", "stop"]
    );
}

#[test]
fn test_terminal_output() {
    xmlgui()
        .arg(fixtures_path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Composed 2 clients"))
        .stdout(predicate::str::contains("tools_thesaurus"));
}
