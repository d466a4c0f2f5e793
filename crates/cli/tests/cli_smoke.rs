//! CLI smoke tests for gdpack.
//!
//! These tests verify that commands which do not need a Swift toolchain run
//! without panicking and return appropriate exit codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the gdpack binary.
fn gdpack_cmd() -> Command {
  cargo_bin_cmd!("gdpack")
}

const MANIFEST: &str = r#"[configuration]
entry_symbol = "swift_entry_point"
compatibility_minimum = 4.2

[libraries]
linux.debug.arm64 = "linux-aarch64/debug/GameDriver.so"

[dependencies]
linux.debug.arm64 = {"linux-aarch64/debug/SwiftGodot.so": ""}

"#;

/// Create a temp directory holding `GameDriver.gdextension`.
fn temp_manifest(content: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("GameDriver.gdextension"), content).unwrap();
  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  gdpack_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  gdpack_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("gdpack"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "inspect", "info"] {
    gdpack_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// info
// =============================================================================

#[test]
fn info_shows_version() {
  gdpack_cmd()
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn info_json_is_valid() {
  let output = gdpack_cmd().args(["info", "--json"]).output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn verbose_before_subcommand_is_accepted() {
  gdpack_cmd()
    .args(["--verbose", "info"])
    .assert()
    .success()
    .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// inspect
// =============================================================================

#[test]
fn inspect_lists_sections() {
  let temp = temp_manifest(MANIFEST);

  gdpack_cmd()
    .arg("inspect")
    .arg(temp.path().join("GameDriver.gdextension"))
    .assert()
    .success()
    .stdout(predicate::str::contains("[configuration]"))
    .stdout(predicate::str::contains("[libraries]"))
    .stdout(predicate::str::contains("[dependencies]"));
}

#[test]
fn inspect_verbose_shows_entries() {
  let temp = temp_manifest(MANIFEST);

  gdpack_cmd()
    .args(["--verbose", "inspect"])
    .arg(temp.path().join("GameDriver.gdextension"))
    .assert()
    .success()
    .stdout(predicate::str::contains("linux.debug.arm64 = linux-aarch64/debug/GameDriver.so"))
    .stdout(predicate::str::contains("linux-aarch64/debug/SwiftGodot.so"));
}

#[test]
fn inspect_json_keeps_section_order() {
  let temp = temp_manifest(MANIFEST);

  let output = gdpack_cmd()
    .args(["inspect", "--json"])
    .arg(temp.path().join("GameDriver.gdextension"))
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let names: Vec<&str> = json
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["heading"]["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec!["configuration", "libraries", "dependencies"]);
  assert_eq!(json[0]["entries"]["compatibility_minimum"], 4.2);
}

#[test]
fn inspect_missing_file_fails() {
  let temp = TempDir::new().unwrap();

  gdpack_cmd()
    .arg("inspect")
    .arg(temp.path().join("missing.gdextension"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to read manifest"));
}

#[test]
fn inspect_malformed_file_reports_line() {
  let temp = temp_manifest("[libraries]\nnot an entry\n");

  gdpack_cmd()
    .arg("inspect")
    .arg(temp.path().join("GameDriver.gdextension"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("line 2"));
}

// =============================================================================
// build (argument validation only; no toolchain is invoked)
// =============================================================================

#[test]
fn build_rejects_unknown_target() {
  gdpack_cmd()
    .args(["build", "--targets", "playstation"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown platform"));
}

#[test]
fn build_rejects_unknown_configuration() {
  gdpack_cmd()
    .args(["build", "-c", "profile"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("profile"));
}

#[test]
fn build_rejects_missing_project_folder() {
  let temp = TempDir::new().unwrap();

  gdpack_cmd()
    .arg("build")
    .arg("--project-root")
    .arg(temp.path().join("nope"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Project folder not found"));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn build_ios_requires_macos_host() {
  let temp = TempDir::new().unwrap();

  gdpack_cmd()
    .arg("--project-root")
    .arg(temp.path())
    .args(["--targets", "ios"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("require a macOS host"));
}
