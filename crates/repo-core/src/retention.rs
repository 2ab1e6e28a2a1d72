//! Periodic forced clear of the checkout
//!
//! A persisted counter bounds how many incremental reconciliations run
//! between destructive clears. Each run decrements it; once it reaches
//! zero the checkout is cleared and the counter replenished.

use repo_fs::dir;
use repo_git::{CleanMode, GcMode, GitBackend};

use crate::Result;

/// Value the counter is reset to after a forced clear.
pub const REPLENISH: i64 = 50;

/// Outcome of one counter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionDecision {
    /// Keep the checkout; `remaining` runs left before the next clear.
    Continue { remaining: i64 },
    /// Clear the checkout; the counter restarts at [`REPLENISH`].
    Reset,
}

impl RetentionDecision {
    /// Decide from the counter value read at the start of a run.
    pub fn from_counter(counter: i64) -> Self {
        if counter <= 0 {
            Self::Reset
        } else {
            Self::Continue {
                remaining: counter - 1,
            }
        }
    }

    /// Counter value to persist for the next run.
    pub fn next_counter(&self) -> i64 {
        match self {
            Self::Continue { remaining } => *remaining,
            Self::Reset => REPLENISH,
        }
    }
}

/// What a forced clear did to the checkout folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleared {
    /// Nothing to clear.
    Absent,
    /// Ignored and untracked content removed, object store compacted.
    Compacted,
    /// The folder was deleted outright.
    Deleted,
}

/// Advance the counter, persist it through `persist`, and clear the
/// checkout when the counter ran out.
///
/// Persisting happens before any clearing. A failure to persist is
/// returned; a failure to clear is logged and the run continues, since
/// provisioning copes with whatever is left.
pub fn enforce(
    counter: i64,
    persist: impl FnOnce(i64) -> Result<()>,
    git: &dyn GitBackend,
) -> Result<RetentionDecision> {
    let span = tracing::info_span!("retention", repo = %git.workdir(), counter);
    let _guard = span.enter();

    let decision = RetentionDecision::from_counter(counter);
    persist(decision.next_counter())?;

    match decision {
        RetentionDecision::Continue { remaining } => {
            tracing::info!(remaining, "Remaining attempts before forced clear");
        }
        RetentionDecision::Reset => {
            tracing::info!("Attempts exhausted, clearing checkout");
            match clear_checkout(git) {
                Ok(cleared) => tracing::info!(?cleared, "Checkout cleared"),
                Err(e) => tracing::error!(error = %e, "Clearing checkout failed, continuing"),
            }
        }
    }
    Ok(decision)
}

/// Destructively clear the checkout folder.
///
/// A valid checkout gets `clean -fdx`, an aggressive gc and a full repack;
/// if any of those fail, or the folder is not a checkout at all, it is
/// deleted recursively.
pub fn clear_checkout(git: &dyn GitBackend) -> Result<Cleared> {
    let workdir = git.workdir();
    if !workdir.exists() {
        return Ok(Cleared::Absent);
    }

    if !git.is_repository() {
        tracing::error!(path = %workdir, "Folder is not a valid checkout, deleting it");
        dir::remove_dir_force(workdir)?;
        return Ok(Cleared::Deleted);
    }

    let compacted = git
        .clean(CleanMode::All)
        .and_then(|()| git.gc(GcMode::Aggressive))
        .and_then(|()| git.repack());

    match compacted {
        Ok(()) => Ok(Cleared::Compacted),
        Err(e) => {
            tracing::warn!(path = %workdir, error = %e, "Can't clear folder, deleting it");
            dir::remove_dir_force(workdir)?;
            Ok(Cleared::Deleted)
        }
    }
}
