//! Tests that exercise the compiled `repo-sync` binary using assert_cmd.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn repo_sync() -> Command {
    let mut cmd = Command::cargo_bin("repo-sync").expect("Failed to find repo-sync binary");
    cmd.env_remove("RUST_LOG").env_remove("REPO_SYNC_CONFIG");
    cmd
}

#[test]
fn test_help_lists_arguments() {
    repo_sync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("REPO_URL"))
        .stdout(predicate::str::contains("BRANCH"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_missing_arguments_are_usage_error() {
    repo_sync()
        .arg("https://bitbucket.org/acme/service.git")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("BRANCH"));
}

#[test]
fn test_extra_arguments_are_usage_error() {
    repo_sync()
        .args(["https://bitbucket.org/acme/service.git", "develop", "main"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_config_fails_and_logs_to_file() {
    let temp = TempDir::new().unwrap();

    repo_sync()
        .current_dir(temp.path())
        .args(["https://bitbucket.org/acme/service.git", "develop"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));

    let log = fs::read_to_string(temp.path().join("repo-sync.log")).unwrap();
    assert!(log.contains("critical=true"));
    assert!(log.contains("Sync aborted"));
}

#[test]
fn test_missing_credentials_still_advance_counter() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.json");
    fs::write(
        &config,
        r#"{"bitbucket": {"username": "ci-bot"}, "paths": {}, "count_reset": 12}"#,
    )
    .unwrap();
    let log_file = temp.path().join("logs.txt");

    repo_sync()
        .current_dir(temp.path())
        .arg("--log-file")
        .arg(&log_file)
        .args(["https://bitbucket.org/acme/service.git", "develop"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bitbucket.token"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(saved["count_reset"], 11);
    assert!(log_file.exists());
    assert!(!temp.path().join("repo-sync.log").exists());
}
