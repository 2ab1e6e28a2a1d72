//! Update sequence for an already checked-out branch

use repo_git::GitBackend;

use crate::{Error, Result, lfs};

/// Fetch all remotes, pull the current branch, pull large files and check
/// their declarations.
///
/// The first failing step aborts the sequence and is returned wrapped in
/// [`Error::Sync`]. Nothing is rolled back: the checkout stays as git left
/// it and the caller decides whether to retry or escalate.
pub fn update(git: &dyn GitBackend) -> Result<()> {
    run(git).map_err(|e| Error::Sync {
        source: Box::new(e),
    })
}

fn run(git: &dyn GitBackend) -> Result<()> {
    tracing::info!("Retrieving fresh data from remote");
    git.fetch_all()?;
    git.pull()?;
    lfs::materialize(git)?;
    tracing::info!("Data updated successfully");
    Ok(())
}
