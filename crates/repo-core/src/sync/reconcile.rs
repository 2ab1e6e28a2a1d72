//! Branch reconciliation state machine
//!
//! Drives an existing, possibly inconsistent checkout onto the target
//! branch:
//!
//! 1. Stabilize on `develop` (best effort)
//! 2. Hard-reset housekeeping (always runs)
//! 3. Opportunistic pull
//! 4. Compare the active branch with the target
//! 5. Resolve the target from a local head, or materialize it from the remote
//!
//! Local changes are always discarded in favour of the remote state.

use std::collections::BTreeSet;

use repo_git::{BASE_BRANCH, CleanMode, DEFAULT_REMOTE, GcMode, GitBackend};

use super::escalation::Escalation;
use super::executor::update;
use crate::{Error, Result};

/// Where the target branch exists, relative to the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRef {
    /// Currently checked out
    Current,
    /// A local branch that is not checked out
    LocalHead,
    /// Only a remote-tracking reference exists
    RemoteOnly,
    /// Not known locally or remotely
    Missing,
}

/// How reconciliation reached the target branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The checkout was already on the target branch
    AlreadyOnTarget,
    /// Switched to an existing local branch
    SwitchedToLocal,
    /// Created a local tracking branch from the remote
    Materialized {
        /// Whether the garbage-collecting retry was needed
        retried: bool,
    },
}

/// Classify `target` against the checkout's branches.
pub fn classify(git: &dyn GitBackend, current: Option<&str>, target: &str) -> Result<BranchRef> {
    if current == Some(target) {
        return Ok(BranchRef::Current);
    }
    if git.local_branches()?.iter().any(|b| b == target) {
        return Ok(BranchRef::LocalHead);
    }
    if git.remote_branches(DEFAULT_REMOTE)?.iter().any(|b| b == target) {
        return Ok(BranchRef::RemoteOnly);
    }
    Ok(BranchRef::Missing)
}

/// Bring the checkout at `git.workdir()` onto `target` and update it.
///
/// Only fails once every fallback for the current step is exhausted; the
/// returned [`Error::CriticalReconciliation`] names the operation that
/// could not be completed. Update failures on the final branch surface as
/// [`Error::Sync`].
pub fn reconcile(git: &dyn GitBackend, target: &str) -> Result<Reconciliation> {
    let span = tracing::info_span!("reconcile", repo = %git.workdir(), branch = %target);
    let _guard = span.enter();

    if !git.is_repository() {
        return Err(Error::critical(
            "open checkout",
            format!("{} is not a git repository", git.workdir()),
        ));
    }

    stabilize(git);
    housekeeping(git)?;

    if let Err(e) = git.pull() {
        tracing::warn!(error = %e, "Can't update current branch, continuing with fetched refs");
    }

    let current = git
        .current_branch()
        .map_err(|e| Error::critical("read active branch", e))?;

    if current.as_deref() == Some(target) {
        tracing::info!("Already on the requested branch, pulling updates");
        update(git)?;
        return Ok(Reconciliation::AlreadyOnTarget);
    }

    let state = classify(git, current.as_deref(), target)
        .map_err(|e| Error::critical("list branches", e))?;
    tracing::info!(
        current = current.as_deref().unwrap_or("HEAD"),
        ?state,
        "Active branch differs from target"
    );

    match state {
        BranchRef::Current => {
            update(git)?;
            Ok(Reconciliation::AlreadyOnTarget)
        }
        BranchRef::LocalHead => {
            switch_to_local(git, target)?;
            update(git)?;
            Ok(Reconciliation::SwitchedToLocal)
        }
        BranchRef::RemoteOnly | BranchRef::Missing => {
            let retried = materialize(git, current.as_deref(), target)?;
            update(git)?;
            Ok(Reconciliation::Materialized { retried })
        }
    }
}

/// Try progressively harder to get onto `develop`. Never fails: the
/// housekeeping that follows corrects whatever drift is left.
fn stabilize(git: &dyn GitBackend) {
    let upstream = format!("{DEFAULT_REMOTE}/{BASE_BRANCH}");

    let outcome = Escalation::new(format!("stabilize on {BASE_BRANCH}"))
        .attempt(format!("checkout -f {BASE_BRANCH}"), || {
            git.checkout_force(BASE_BRANCH).map_err(Error::from)
        })
        .attempt(format!("switch -f {BASE_BRANCH}"), || {
            git.switch_force(BASE_BRANCH).map_err(Error::from)
        })
        .attempt(format!("switch --track {upstream} and update"), || {
            git.switch_track(&upstream)?;
            update(git)
        })
        .attempt(format!("checkout -f {BASE_BRANCH} (second try)"), || {
            git.checkout_force(BASE_BRANCH).map_err(Error::from)
        })
        .run();

    match outcome {
        Ok(resolved) => tracing::info!(via = %resolved.name, "Switched to {BASE_BRANCH}"),
        Err(exhausted) => tracing::error!(
            attempts = exhausted.failures.len(),
            "Can't switch to {BASE_BRANCH}, continuing with hard reset"
        ),
    }
}

/// Unconditional reset to a deterministic baseline.
fn housekeeping(git: &dyn GitBackend) -> Result<()> {
    git.clean(CleanMode::Untracked)
        .map_err(|e| Error::critical("clean working tree", e))?;
    git.prune_remote(DEFAULT_REMOTE)
        .map_err(|e| Error::critical("prune remote references", e))?;
    git.reset_hard()
        .map_err(|e| Error::critical("hard reset", e))?;
    git.gc(GcMode::Prune)
        .map_err(|e| Error::critical("garbage collect", e))?;
    git.fetch_all()
        .map_err(|e| Error::critical("fetch all remotes", e))?;
    Ok(())
}

fn switch_to_local(git: &dyn GitBackend, target: &str) -> Result<()> {
    tracing::info!("Branch already exists locally, switching to it");
    let upstream = format!("{DEFAULT_REMOTE}/{target}");

    Escalation::new(format!("switch to local branch {target}"))
        .attempt(format!("switch --track {upstream}"), || {
            git.switch_track(&upstream).map_err(Error::from)
        })
        .attempt(format!("checkout -f {target}"), || {
            git.checkout_force(target).map_err(Error::from)
        })
        .run()?;
    Ok(())
}

/// Create a local tracking branch for `target`, retrying once after a
/// garbage collection. Returns whether the retry was needed.
fn materialize(git: &dyn GitBackend, current: Option<&str>, target: &str) -> Result<bool> {
    prune_local_branches(git, current, target);
    git.reset_hard()
        .map_err(|e| Error::critical("hard reset", e))?;

    tracing::info!("Getting branch from remote repository");
    let resolved = Escalation::new(format!("materialize branch {target}"))
        .attempt("fetch and check out", || {
            git.fetch_all()?;
            git.reset_hard()?;
            checkout_remote(git, target)
        })
        .attempt("garbage collect and check out", || {
            git.reset_hard()?;
            git.gc(GcMode::Prune)?;
            git.fetch_all()?;
            git.reset_hard()?;
            checkout_remote(git, target)
        })
        .run()?;

    tracing::info!(via = %resolved.name, "Created and switched to new branch");
    Ok(resolved.index > 0)
}

fn checkout_remote(git: &dyn GitBackend, target: &str) -> Result<()> {
    let upstream = format!("{DEFAULT_REMOTE}/{target}");

    Escalation::new(format!("check out {target}"))
        .attempt(format!("checkout -f {target}"), || {
            git.checkout_force(target).map_err(Error::from)
        })
        .attempt(format!("switch --track {upstream}"), || {
            git.switch_track(&upstream).map_err(Error::from)
        })
        .run()?;
    Ok(())
}

/// Best-effort deletion of every local branch except the active one, the
/// target and `develop`.
fn prune_local_branches(git: &dyn GitBackend, current: Option<&str>, target: &str) {
    tracing::info!("Cleaning repo branches");
    let keep: BTreeSet<&str> = [current, Some(target), Some(BASE_BRANCH)]
        .into_iter()
        .flatten()
        .collect();

    let branches = match git.local_branches() {
        Ok(branches) => branches,
        Err(e) => {
            tracing::warn!(error = %e, "Can't list local branches, skipping branch cleaning");
            return;
        }
    };

    for branch in branches.iter().filter(|b| !keep.contains(b.as_str())) {
        if let Err(e) = git.delete_branch(branch) {
            tracing::warn!(branch = %branch, error = %e, "Can't delete branch");
        }
    }
}
