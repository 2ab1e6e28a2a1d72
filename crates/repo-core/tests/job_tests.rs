//! Whole-run orchestration with an in-memory backend

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use repo_core::sync::Reconciliation;
use repo_core::{Error, Provisioned, REPLENISH, RetentionDecision, SyncJob};
use repo_test_utils::fake::FakeGit;
use serde_json::{Value, json};
use tempfile::TempDir;
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

const URL: &str = "https://bitbucket.org/acme/service.git";

fn write_config(dir: &Path, value: Value) -> std::path::PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}

fn read_config(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn job(config_path: std::path::PathBuf, working_dir: &Path, url: &str, branch: &str) -> SyncJob {
    SyncJob {
        config_path,
        repo_url: url.to_string(),
        branch: branch.to_string(),
        working_dir: working_dir.to_path_buf(),
    }
}

fn server(path: repo_fs::NormalizedPath) -> FakeGit {
    FakeGit::new(path).with_upstream(&["develop", "release-1"])
}

#[test]
fn test_first_run_clones_into_repo_path() {
    let temp = TempDir::new().unwrap();
    let repos = temp.path().join("repos");
    let config = write_config(
        temp.path(),
        json!({
            "bitbucket": {"username": "ci-bot", "token": "s3cret"},
            "paths": {"repo_path": repos.to_string_lossy()},
            "count_reset": 5,
            "notify": {"channel": "builds"}
        }),
    );

    let report = job(config.clone(), temp.path(), URL, "release-1")
        .run_with(server)
        .unwrap();

    assert_eq!(report.checkout.to_native(), repos.join("service"));
    assert_eq!(report.retention, RetentionDecision::Continue { remaining: 4 });
    assert_eq!(
        report.provisioned,
        Provisioned::Cloned(Reconciliation::Materialized { retried: false })
    );

    let saved = read_config(&config);
    assert_eq!(saved["count_reset"], 4);
    assert_eq!(saved["notify"]["channel"], "builds");
    assert_eq!(saved["bitbucket"]["token"], "s3cret");
}

#[test]
fn test_checkout_defaults_to_working_dir() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        json!({"bitbucket": {"username": "ci-bot", "token": "s3cret"}, "count_reset": 2}),
    );

    let report = job(config, temp.path(), "https://bitbucket.org/acme/web.app.git", "develop")
        .run_with(server)
        .unwrap();

    assert_eq!(report.checkout.to_native(), temp.path().join("web_app"));
}

#[test]
fn test_exhausted_counter_is_replenished() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        json!({"bitbucket": {"username": "ci-bot", "token": "s3cret"}}),
    );

    let report = job(config.clone(), temp.path(), URL, "develop")
        .run_with(server)
        .unwrap();

    assert_eq!(report.retention, RetentionDecision::Reset);
    assert_eq!(read_config(&config)["count_reset"], REPLENISH);
}

#[test]
fn test_missing_credentials_fail_after_counter_is_saved() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        json!({"bitbucket": {"username": "ci-bot"}, "count_reset": 9}),
    );

    let err = job(config.clone(), temp.path(), URL, "develop")
        .run_with(server)
        .unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert_eq!(read_config(&config)["count_reset"], 8);
}

#[test]
fn test_missing_config_file_is_config_error() {
    let temp = TempDir::new().unwrap();

    let err = job(temp.path().join("absent.json"), temp.path(), URL, "develop")
        .run_with(server)
        .unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_malformed_config_is_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let err = job(path, temp.path(), URL, "develop")
        .run_with(server)
        .unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_url_without_folder_name_is_rejected_untouched() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        json!({"bitbucket": {"username": "ci-bot", "token": "s3cret"}, "count_reset": 3}),
    );

    let err = job(config.clone(), temp.path(), "https://bitbucket.org/acme/", "develop")
        .run_with(server)
        .unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert_eq!(read_config(&config)["count_reset"], 3);
}

#[test]
fn test_empty_branch_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        json!({"bitbucket": {"username": "ci-bot", "token": "s3cret"}}),
    );

    let err = job(config, temp.path(), URL, " ").run_with(server).unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
}

/// Records the name of every span opened and whether it carries `repo`.
#[derive(Clone, Default)]
struct SpanLog(Arc<Mutex<Vec<(String, bool)>>>);

impl<S: Subscriber> Layer<S> for SpanLog {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let meta = attrs.metadata();
        self.0
            .lock()
            .unwrap()
            .push((meta.name().to_string(), meta.fields().field("repo").is_some()));
    }
}

#[test]
fn test_each_stage_runs_in_a_repo_span() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        json!({"bitbucket": {"username": "ci-bot", "token": "s3cret"}, "count_reset": 1}),
    );
    let spans = SpanLog::default();
    let subscriber = tracing_subscriber::registry().with(spans.clone());

    tracing::subscriber::with_default(subscriber, || {
        job(config, temp.path(), URL, "release-1")
            .run_with(server)
            .unwrap();
    });

    let recorded = spans.0.lock().unwrap().clone();
    for name in ["sync_job", "retention", "provision", "reconcile"] {
        assert!(
            recorded.iter().any(|(n, repo)| n == name && *repo),
            "no {name} span with a repo field in {recorded:?}"
        );
    }
}
