//! Command-line behaviour of the `esi-typegen` binary.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SPEC: &str = r#"{
  "operations": [
    {
      "id": "get_status",
      "method": "get",
      "path": "/status/",
      "tag": "Status",
      "responses": { "200": { "schema": {
        "type": "object",
        "title": "get_status_ok",
        "required": ["players"],
        "properties": {
          "players": { "type": "integer", "format": "int32" },
          "server_version": { "type": "string" }
        }
      } } }
    },
    {
      "id": "get_alliances_alliance_id_icons",
      "method": "get",
      "path": "/alliances/{alliance_id}/icons/",
      "tag": "Alliance",
      "parameters": [
        { "name": "alliance_id", "in": "path", "required": true, "schema": { "type": "integer", "format": "int32" } }
      ],
      "responses": { "200": { "schema": {
        "type": "object",
        "properties": { "px64x64": { "type": "string" }, "px128x128": { "type": "string" } }
      } } }
    }
  ]
}
"#;

fn esi_typegen() -> Command {
    Command::new(env!("CARGO_BIN_EXE_esi-typegen"))
}

fn write_spec(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("swagger.json");
    std::fs::write(&path, SPEC).unwrap();
    path
}

fn run(args: &[&str], input: &Path) -> Output {
    esi_typegen().args(args).arg(input).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn plan_prints_report_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_spec(&dir);
    let output = run(&["plan"], &input);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let routes: Vec<&str> = report["routes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|route| route["id"].as_str().unwrap())
        .collect();
    assert_eq!(routes, vec!["get_status", "get_alliances_alliance_id_icons"]);
    assert!(report["namespaces"].as_array().is_some_and(|ns| !ns.is_empty()));
}

#[test]
fn plan_out_then_check_is_up_to_date() {
    let dir = TempDir::new().unwrap();
    let input = write_spec(&dir);
    let out = dir.path().join("plan.json");
    let out_arg = out.to_str().unwrap();

    let written = run(&["plan", "--out", out_arg], &input);
    assert!(written.status.success(), "stderr: {}", stderr(&written));
    assert!(stdout(&written).is_empty());
    assert!(std::fs::read_to_string(&out).unwrap().ends_with("}\n"));

    let checked = run(&["plan", "--out", out_arg, "--check"], &input);
    assert!(checked.status.success(), "stderr: {}", stderr(&checked));
    assert!(stdout(&checked).contains("is up to date"));
}

#[test]
fn plan_check_reports_stale_file() {
    let dir = TempDir::new().unwrap();
    let input = write_spec(&dir);
    let out = dir.path().join("plan.json");
    std::fs::write(&out, "{}\n").unwrap();

    let output = run(&["plan", "--out", out.to_str().unwrap(), "--check"], &input);
    assert_eq!(output.status.code(), Some(1));
    let err = console::strip_ansi_codes(&stderr(&output)).to_string();
    assert!(err.contains("-{}"));
    assert!(err.contains("is out of date"));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "{}\n");
}

#[test]
fn check_requires_out() {
    let dir = TempDir::new().unwrap();
    let input = write_spec(&dir);
    let output = run(&["plan", "--check"], &input);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn tree_lists_namespaces_and_members() {
    let dir = TempDir::new().unwrap();
    let input = write_spec(&dir);
    std::fs::write(
        dir.path().join("typegen.toml"),
        "[namespace]\nmin_types = 1\nmin_siblings = 0\n",
    )
    .unwrap();

    let output = run(&["tree", "--members"], &input);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let plain = console::strip_ansi_codes(&stdout(&output)).to_string();
    assert!(plain.starts_with("(root)"));
    assert!(plain.contains("  esi "));
    assert!(plain.contains("    alliance [1/1]"));
    assert!(plain.contains("    status [1/1]"));
    assert!(plain.contains("- Icons interface"));
}

#[test]
fn names_override_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let input = write_spec(&dir);
    let names = dir.path().join("names.json");
    std::fs::write(&names, r#"{ "get_status_ok": "ShardStatus" }"#).unwrap();

    let output = run(&["plan", "--names", names.to_str().unwrap()], &input);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("\"name\": \"ShardStatus\""));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(&["plan"], &dir.path().join("missing.json"));
    assert_eq!(output.status.code(), Some(1));
    assert!(!stderr(&output).is_empty());
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_spec(&dir);
    std::fs::write(dir.path().join("typegen.toml"), "[namespace]\nmin_types = 0\n").unwrap();
    let output = run(&["tree"], &input);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("min_types"));
}
