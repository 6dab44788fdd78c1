#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RECOMMEND: &str = "How likely are you to recommend this brand?";
const EXPECTATIONS: &str = "Does this brand meet your expectations?";

fn rankboard() -> Command {
    Command::cargo_bin("rankboard").expect("binary should compile")
}

fn init_board(path: &Path) {
    rankboard()
        .arg("init")
        .arg(path)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("create:"));
}

fn move_item(path: &Path, question: &str, item: &str, bucket: &str) {
    rankboard()
        .arg("move")
        .arg(path)
        .args(["--question", question, "--item", item, "--bucket", bucket])
        .assert()
        .code(0);
}

fn saved_records(path: &Path) -> Vec<Value> {
    let raw = fs::read_to_string(path.join(".rankboard/state.json"))
        .expect("state file should exist");
    let snapshot: Value = serde_json::from_str(&raw).expect("state file should be json");
    snapshot["records"]
        .as_array()
        .expect("snapshot should hold records")
        .clone()
}

fn find<'a>(records: &'a [Value], question: &str, item: &str) -> &'a Value {
    records
        .iter()
        .find(|record| record["question"] == question && record["item"] == item)
        .expect("record should exist")
}

#[test]
fn init_then_show_renders_unsorted_board_and_seeds_state() {
    let board = TempDir::new().expect("temp dir should be created");
    init_board(board.path());

    rankboard()
        .arg("show")
        .arg(board.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("# Rank Board"))
        .stdout(predicate::str::contains("| Question | Unsorted | Strongly disagree |"))
        .stdout(predicate::str::contains("Placed: 0 of 9 judgments"));

    let records = saved_records(board.path());
    assert_eq!(records.len(), 9);
    assert!(records
        .iter()
        .all(|record| record["bucket"] == "unsorted" && record["rank"].is_null()));
}

#[test]
fn init_keeps_existing_config_with_no_overwrite() {
    let board = TempDir::new().expect("temp dir should be created");
    init_board(board.path());

    rankboard()
        .arg("init")
        .arg(board.path())
        .arg("--no-overwrite")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("keep:"));
}

#[test]
fn move_persists_state_and_ranks_by_bucket_weight() {
    let board = TempDir::new().expect("temp dir should be created");
    init_board(board.path());

    move_item(board.path(), RECOMMEND, "brand_a", "Agree");
    rankboard()
        .arg("move")
        .arg(board.path())
        .args(["--question", RECOMMEND, "--item", "Brand B", "--bucket", "Strongly agree"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Brand B (#1)"))
        .stdout(predicate::str::contains("Brand A (#2)"))
        .stderr(predicate::str::contains("rank 1"));

    let records = saved_records(board.path());
    let a = find(&records, RECOMMEND, "brand_a");
    let b = find(&records, RECOMMEND, "brand_b");
    assert_eq!(a["bucket"], "Agree");
    assert_eq!(a["rank"], 2);
    assert_eq!(a["weight"], 4);
    assert_eq!(b["rank"], 1);
    assert_eq!(find(&records, RECOMMEND, "brand_c")["rank"], Value::Null);
    assert_eq!(find(&records, EXPECTATIONS, "brand_a")["bucket"], "unsorted");
}

#[test]
fn show_json_reflects_saved_moves() {
    let board = TempDir::new().expect("temp dir should be created");
    init_board(board.path());
    move_item(board.path(), RECOMMEND, "brand_c", "Neutral");

    let output = rankboard()
        .arg("show")
        .arg(board.path())
        .args(["--format", "json"])
        .output()
        .expect("show should run");
    assert!(output.status.success());
    let records: Vec<Value> =
        serde_json::from_slice(&output.stdout).expect("json output should parse");
    let c = find(&records, RECOMMEND, "brand_c");
    assert_eq!(c["bucket"], "Neutral");
    assert_eq!(c["rank"], 1);
}

#[test]
fn move_to_unknown_bucket_fails_without_touching_state() {
    let board = TempDir::new().expect("temp dir should be created");
    init_board(board.path());
    move_item(board.path(), RECOMMEND, "brand_a", "Agree");
    let before = saved_records(board.path());

    rankboard()
        .arg("move")
        .arg(board.path())
        .args(["--question", RECOMMEND, "--item", "brand_a", "--bucket", "Maybe"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown bucket: Maybe"));

    assert_eq!(saved_records(board.path()), before);
}

#[test]
fn restore_from_legacy_records_warns_about_skipped_entries() {
    let board = TempDir::new().expect("temp dir should be created");
    init_board(board.path());
    let legacy = board.path().join("legacy.json");
    fs::write(
        &legacy,
        format!(
            r#"[
  {{"question":"{EXPECTATIONS}","brand":"Brand B","scale":"Agree","rank":1,"value":4}},
  {{"question":"Is this question gone?","brand":"brand_a","scale":"Agree","rank":1,"value":4}}
]"#
        ),
    )
    .expect("legacy file should be written");

    rankboard()
        .arg("restore")
        .arg(board.path())
        .arg("--from")
        .arg(&legacy)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("applied=1"))
        .stderr(predicate::str::contains("skipped=1"))
        .stderr(predicate::str::contains("unknown question"));

    let records = saved_records(board.path());
    let b = find(&records, EXPECTATIONS, "brand_b");
    assert_eq!(b["bucket"], "Agree");
    assert_eq!(b["rank"], 1);
}

#[test]
fn missing_config_is_a_runtime_failure() {
    let board = TempDir::new().expect("temp dir should be created");

    rankboard()
        .arg("show")
        .arg(board.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn state_file_outside_board_is_rejected() {
    let board = TempDir::new().expect("temp dir should be created");
    fs::write(
        board.path().join("rankboard.toml"),
        r#"[board]
state_file = "../escape.json"

[[items]]
key = "a"

[[questions]]
text = "Q"
"#,
    )
    .expect("config should be written");

    rankboard()
        .arg("show")
        .arg(board.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("path traversal rejected"));
}

#[test]
fn empty_configuration_renders_placeholder() {
    let board = TempDir::new().expect("temp dir should be created");
    fs::write(board.path().join("rankboard.toml"), "[board]\ngrouping = \"domain\"\n")
        .expect("config should be written");

    rankboard()
        .arg("show")
        .arg(board.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Nothing to rank"));
}

#[test]
fn validate_reports_configuration_summary() {
    let board = TempDir::new().expect("temp dir should be created");
    init_board(board.path());

    rankboard()
        .arg("validate")
        .arg(board.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "config ok: 3 items, 3 questions, 5 scale buckets",
        ))
        .stdout(predicate::str::contains("saved state: none"));
}

#[test]
fn show_skips_unreadable_saved_entries() {
    let board = TempDir::new().expect("temp dir should be created");
    init_board(board.path());
    let state_dir = board.path().join(".rankboard");
    fs::create_dir_all(&state_dir).expect("state dir should be created");
    fs::write(
        state_dir.join("state.json"),
        format!(
            r#"[
  {{"question":"{RECOMMEND}","brand":"Brand A","scale":"Agree","rank":1,"value":4}},
  {{"question":"{RECOMMEND}","brand":"Brand B","scale":"Agree","rank":2,"value":4.5}},
  {{"question":"{RECOMMEND}","brand":"Brand C","rank":3}}
]"#
        ),
    )
    .expect("saved state should be written");

    rankboard()
        .arg("show")
        .arg(board.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Brand A (#1)"))
        .stderr(predicate::str::contains("applied=1"))
        .stderr(predicate::str::contains("skipped=2"))
        .stderr(predicate::str::contains("malformed entry"));
}

#[test]
fn show_leaves_saved_state_with_stale_entries_untouched() {
    let board = TempDir::new().expect("temp dir should be created");
    init_board(board.path());
    let state_dir = board.path().join(".rankboard");
    fs::create_dir_all(&state_dir).expect("state dir should be created");
    let state_file = state_dir.join("state.json");
    fs::write(
        &state_file,
        format!(
            r#"[
  {{"question":"{RECOMMEND}","brand":"Brand A","scale":"Agree","rank":1,"value":4}},
  {{"question":"{RECOMMEND}","brand":"Brand Z","scale":"Agree","rank":2,"value":4}}
]"#
        ),
    )
    .expect("saved state should be written");
    let before = fs::read(&state_file).expect("saved state should read");

    rankboard()
        .arg("show")
        .arg(board.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown item 'Brand Z'"));

    let after = fs::read(&state_file).expect("saved state should read");
    assert_eq!(after, before);
}
