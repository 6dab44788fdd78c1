// Integration tests for the rankboard CLI surface.
//
// These tests use assert_cmd to invoke the binary and verify
// exit codes and stdout/stderr output.

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to build a Command for the rankboard binary.
fn rankboard() -> Command {
    Command::cargo_bin("rankboard").expect("binary should exist")
}

#[test]
fn cli_version_flag() {
    rankboard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rankboard"));
}

#[test]
fn cli_help_flag() {
    rankboard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Row-locked rating board"));
}

#[test]
fn show_requires_path() {
    rankboard()
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn init_requires_path() {
    rankboard()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn move_requires_question_item_and_bucket() {
    rankboard()
        .args(["move", "/tmp/test", "--item", "brand_a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn restore_requires_source_file() {
    rankboard()
        .args(["restore", "/tmp/test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--from"));
}

#[test]
fn quiet_conflicts_with_verbose() {
    rankboard()
        .args(["-q", "-v", "validate", "/tmp/test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn show_rejects_unknown_format() {
    rankboard()
        .args(["show", "/tmp/test", "--format", "sarif"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn missing_board_directory_is_a_runtime_failure() {
    rankboard()
        .args(["show", "/nonexistent/rankboard/board"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("path does not exist"));
}
