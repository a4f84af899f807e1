//! End-to-end tests for the `jc` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `jc` with its config, database and log file inside `temp`
fn jc(temp: &TempDir) -> Command {
    let config_path = temp.path().join("jarviscore.yml");
    if !config_path.exists() {
        let db_path = temp.path().join("memory.db");
        std::fs::write(&config_path, format!("memory:\n  db-path: {}\n", db_path.display())).unwrap();
    }

    let mut cmd = Command::cargo_bin("jc").unwrap();
    cmd.env("HOME", temp.path())
        .env("XDG_DATA_HOME", temp.path().join("data"))
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .arg("--config")
        .arg(&config_path);
    cmd
}

#[test]
fn test_send_then_history_json() {
    let temp = TempDir::new().unwrap();

    jc(&temp)
        .args(["send", "note", r#"{"text":"hi"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored interaction: note"));

    jc(&temp)
        .args(["history", "--limit", "5", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type": "note""#))
        .stdout(predicate::str::contains(r#""text": "hi""#))
        .stdout(predicate::str::contains(r#""context": null"#));
}

#[test]
fn test_history_text_lists_newest_first() {
    let temp = TempDir::new().unwrap();

    jc(&temp).args(["send", "first", r#"{"n":1}"#]).assert().success();
    jc(&temp).args(["send", "second", r#"{"n":2}"#]).assert().success();

    let output = jc(&temp).args(["history", "-n", "1"]).assert().success();
    output
        .stdout(predicate::str::contains(r#"second: {"n":2}"#))
        .stdout(predicate::str::contains("first").not());
}

#[test]
fn test_history_on_empty_store() {
    let temp = TempDir::new().unwrap();

    jc(&temp)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No interactions recorded."));
}

#[test]
fn test_send_rejects_non_object_data() {
    let temp = TempDir::new().unwrap();

    jc(&temp)
        .args(["send", "note", "[1]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Data must be a JSON object"));

    jc(&temp)
        .args(["send", "note", "not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Data must be valid JSON"));

    jc(&temp)
        .args(["history", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_history_rejects_unknown_format() {
    let temp = TempDir::new().unwrap();

    jc(&temp)
        .args(["history", "--format", "table"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}
