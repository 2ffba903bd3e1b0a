//! Integration tests for the nutrilog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Catalog seeding and item management
//! - Day log edits and totals
//! - Interactive session undo/redo
//! - CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to build a CLI invocation isolated to the given directory
fn cli(temp: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nutrilog"));
    // keep the user's real config out of the test
    cmd.env("XDG_CONFIG_HOME", temp.path().join("config"));
    cmd.arg("--data-dir").arg(temp.path().join("data"));
    cmd
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("nutrilog"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Food catalog and daily consumption log",
        ));
}

#[test]
fn test_fresh_data_dir_is_seeded_with_starter_items() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["items", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("apple"))
        .stdout(predicate::str::contains("fruit_bowl"));

    assert!(temp.path().join("data/items.json").exists());
}

#[test]
fn test_add_and_total() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["add", "apple", "2", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("190.0"));

    cli(&temp)
        .args(["total", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total: 190.0"));

    // a different day is unaffected
    cli(&temp)
        .args(["total", "--date", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing logged"));
}

#[test]
fn test_add_unknown_item_fails() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["add", "pizza", "1", "--date", "2024-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnknownItem"));
}

#[test]
fn test_remove_record() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["add", "banana", "1", "--date", "2024-01-01"])
        .assert()
        .success();

    cli(&temp)
        .args(["remove", "banana", "--date", "2024-01-01"])
        .assert()
        .success();

    cli(&temp)
        .args(["total", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing logged"));
}

#[test]
fn test_add_composite_and_show() {
    let temp = setup_test_dir();

    cli(&temp)
        .args([
            "items",
            "add-composite",
            "smoothie",
            "banana=1",
            "milk=1",
            "--keywords",
            "drink,sweet",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("208.0"));

    cli(&temp)
        .args(["items", "show", "smoothie"])
        .assert()
        .success()
        .stdout(predicate::str::contains("banana x1"))
        .stdout(predicate::str::contains("per serving: 208.0"));
}

#[test]
fn test_self_referential_recipe_is_rejected() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["items", "add-composite", "salad", "fruit_bowl=1", "salad=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cycle"));
}

#[test]
fn test_item_in_use_cannot_be_removed() {
    let temp = setup_test_dir();

    // apple is a component of the seeded fruit_bowl
    cli(&temp)
        .args(["items", "remove", "apple"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InUse"));

    cli(&temp)
        .args(["items", "remove", "fruit_bowl"])
        .assert()
        .success();
}

#[test]
fn test_search_modes() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["items", "search", "fruit", "sweet", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("apple"))
        .stdout(predicate::str::contains("fruit_bowl").not());

    cli(&temp)
        .args(["items", "search", "bowl", "dairy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fruit_bowl"))
        .stdout(predicate::str::contains("milk"));
}

#[test]
fn test_session_undo_redo() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["session", "--date", "2024-01-01"])
        .write_stdin("add fruit_bowl 1\nundo\nredo\ndone\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("session saved (day total: 295.0)"));

    // the redone addition was persisted
    cli(&temp)
        .args(["total", "--date", "2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total: 295.0"));
}

#[test]
fn test_session_undo_discards_unsaved_edit() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["session", "--date", "2024-01-01"])
        .write_stdin("add apple 1\nadd banana 2\nundo\ndone\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("session saved (day total: 95.0)"));
}

#[test]
fn test_session_undo_with_empty_history_reports_error() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["session", "--date", "2024-01-01"])
        .write_stdin("undo\ndone\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to undo"));
}

#[test]
fn test_export_csv() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["add", "apple", "1", "--date", "2024-01-01"])
        .assert()
        .success();
    cli(&temp)
        .args(["add", "banana", "2", "--date", "2024-01-02", "--tag", "snack"])
        .assert()
        .success();

    let out = temp.path().join("export.csv");
    cli(&temp)
        .arg("export")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported 2 rows"));

    let contents = fs::read_to_string(&out).expect("Failed to read CSV");
    assert!(contents.starts_with("day,item_id,servings,tag,unit_value,total_value"));
    assert!(contents.contains("2024-01-02,banana,2.0,snack,105.0,210.0"));
}

#[test]
fn test_log_survives_between_invocations() {
    let temp = setup_test_dir();

    cli(&temp)
        .args(["add", "apple", "1", "--date", "2024-01-01"])
        .assert()
        .success();
    cli(&temp)
        .args(["add", "apple", "1", "--date", "2024-01-01"])
        .assert()
        .success();

    // the two additions merged into one record
    let log_json = fs::read_to_string(temp.path().join("data/log.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&log_json).unwrap();
    let consumed = parsed[0]["consumed"].as_array().unwrap();
    assert_eq!(consumed.len(), 1);
    assert_eq!(consumed[0]["servings"], 2.0);
}
