//! End-to-end runs against a real bare remote
//!
//! Exercises the complete flow (retention -> provision -> reconcile ->
//! update) with the `git` CLI backend. Without git-lfs a no-op stub stands
//! in for it; without git the tests are skipped.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use repo_core::retention::{Cleared, RetentionDecision, clear_checkout, enforce};
use repo_core::sync::{Reconciliation, reconcile};
use repo_core::{Error, ProvisionRequest, Provisioned, provision};
use repo_fs::NormalizedPath;
use repo_git::{CommandGit, GitBackend};
use repo_test_utils::git::{
    RemoteFixture, current_branch, local_branches, run_git, sync_tools_available,
};

macro_rules! require_tools {
    () => {
        if !sync_tools_available() {
            eprintln!("SKIPPED: git (or git-lfs on this platform) not available");
            return;
        }
    };
}

fn backend(remote: &RemoteFixture, path: &Path) -> CommandGit {
    CommandGit::new(NormalizedPath::new(path)).with_program(remote.git_program())
}

fn provision_local(remote: &RemoteFixture, dir: &Path, branch: &str) -> repo_core::Result<Provisioned> {
    let url = remote.url();
    provision(
        &backend(remote, dir),
        &ProvisionRequest {
            url: &url,
            branch,
            credentials: None,
        },
    )
}

#[test]
fn test_empty_folder_ends_on_new_tracking_branch() {
    require_tools!();
    let remote = RemoteFixture::new(&["release-1"]);
    let dir = remote.scratch("service");

    let outcome = provision_local(&remote, &dir, "release-1").unwrap();

    assert_eq!(
        outcome,
        Provisioned::Cloned(Reconciliation::Materialized { retried: false })
    );
    assert_eq!(current_branch(&dir), "release-1");
    assert!(dir.join("release-1.txt").exists());
    assert_eq!(
        run_git(&dir, &["rev-parse", "--abbrev-ref", "release-1@{upstream}"]).trim(),
        "origin/release-1"
    );
}

#[test]
fn test_idea_folder_does_not_block_first_clone() {
    require_tools!();
    let remote = RemoteFixture::new(&[]);
    let dir = remote.scratch("service");
    fs::create_dir_all(dir.join(".idea")).unwrap();
    fs::write(dir.join(".idea/workspace.xml"), "<project/>").unwrap();

    let outcome = provision_local(&remote, &dir, "develop").unwrap();

    assert!(matches!(outcome, Provisioned::Cloned(_)));
    assert_eq!(current_branch(&dir), "develop");
}

#[test]
fn test_second_run_keeps_branch_and_pulls_updates() {
    require_tools!();
    let remote = RemoteFixture::new(&["release-1"]);
    let dir = remote.scratch("service");
    provision_local(&remote, &dir, "release-1").unwrap();

    remote.advance("release-1", "notes.md", "second build\n");
    let outcome = provision_local(&remote, &dir, "release-1").unwrap();

    assert_eq!(outcome, Provisioned::Reconciled(Reconciliation::SwitchedToLocal));
    assert_eq!(current_branch(&dir), "release-1");
    assert_eq!(
        fs::read_to_string(dir.join("notes.md")).unwrap(),
        "second build\n"
    );
    assert_eq!(local_branches(&dir), vec!["develop", "release-1"]);
}

#[test]
fn test_local_changes_are_discarded() {
    require_tools!();
    let remote = RemoteFixture::new(&[]);
    let dir = remote.scratch("service");
    provision_local(&remote, &dir, "develop").unwrap();

    fs::write(dir.join("README.md"), "edited locally\n").unwrap();
    fs::write(dir.join("scratch.txt"), "untracked").unwrap();

    let outcome = reconcile(&backend(&remote, &dir), "develop").unwrap();

    assert_eq!(outcome, Reconciliation::AlreadyOnTarget);
    assert_eq!(fs::read_to_string(dir.join("README.md")).unwrap(), "# Service\n");
    assert!(!dir.join("scratch.txt").exists());
}

#[test]
fn test_switching_to_new_branch_prunes_unrelated_locals() {
    require_tools!();
    let remote = RemoteFixture::new(&["release-1"]);
    let dir = remote.scratch("service");
    provision_local(&remote, &dir, "release-1").unwrap();
    run_git(&dir, &["branch", "scratch-work", "develop"]);

    remote.add_branch("release-2");
    let outcome = reconcile(&backend(&remote, &dir), "release-2").unwrap();

    assert_eq!(outcome, Reconciliation::Materialized { retried: false });
    assert_eq!(current_branch(&dir), "release-2");
    assert_eq!(local_branches(&dir), vec!["develop", "release-2"]);
}

#[test]
fn test_existing_local_branch_is_not_recreated() {
    require_tools!();
    let remote = RemoteFixture::new(&["release-1"]);
    let dir = remote.scratch("service");
    provision_local(&remote, &dir, "release-1").unwrap();
    run_git(&dir, &["branch", "keep-me", "develop"]);

    let outcome = reconcile(&backend(&remote, &dir), "release-1").unwrap();

    assert_eq!(outcome, Reconciliation::SwitchedToLocal);
    assert!(local_branches(&dir).contains(&"keep-me".to_string()));
}

#[test]
fn test_unknown_branch_needs_intervention() {
    require_tools!();
    let remote = RemoteFixture::new(&[]);
    let dir = remote.scratch("service");
    provision_local(&remote, &dir, "develop").unwrap();

    let err = reconcile(&backend(&remote, &dir), "does-not-exist").unwrap_err();

    assert!(matches!(err, Error::CriticalReconciliation { .. }));
    assert_eq!(current_branch(&dir), "develop");
}

#[test]
fn test_forced_clear_compacts_valid_checkout() {
    require_tools!();
    let remote = RemoteFixture::new(&[]);
    let dir = remote.scratch("service");
    provision_local(&remote, &dir, "develop").unwrap();
    fs::write(dir.join("build.log"), "ignored or not, it goes").unwrap();

    let git = backend(&remote, &dir);
    let decision = enforce(0, |_| Ok(()), &git).unwrap();

    assert_eq!(decision, RetentionDecision::Reset);
    assert!(git.is_repository());
    assert!(!dir.join("build.log").exists());
    assert!(dir.join("README.md").exists());
}

#[test]
fn test_forced_clear_deletes_corrupt_folder() {
    require_tools!();
    let remote = RemoteFixture::new(&[]);
    let dir = remote.scratch("service");
    fs::write(dir.join("half-written.pack"), "garbage").unwrap();

    assert_eq!(clear_checkout(&backend(&remote, &dir)).unwrap(), Cleared::Deleted);
    assert!(!dir.exists());

    let outcome = provision_local(&remote, &dir, "develop").unwrap();
    assert!(matches!(outcome, Provisioned::Cloned(_)));
}

#[test]
fn test_large_file_commands_succeed_on_plain_remote() {
    require_tools!();
    let remote = RemoteFixture::new(&[]);
    let dir = remote.clone_into("service", "develop");
    let git = backend(&remote, &dir);

    git.lfs_pull().unwrap();
    assert!(git.lfs_ls_files().unwrap().is_empty());
}
