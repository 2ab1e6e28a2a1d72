//! Large-file inventory and materialization

use repo_git::GitBackend;

use crate::{Result, attributes};

/// Repository-relative paths tracked by the large-file subsystem.
///
/// A listing failure is returned as-is: without an inventory the
/// declaration check cannot be trusted.
pub fn inventory(git: &dyn GitBackend) -> Result<Vec<String>> {
    let files = git.lfs_ls_files()?;
    tracing::debug!(count = files.len(), "Listed LFS files");
    Ok(files)
}

/// Download large-file content, then check every tracked file is declared.
///
/// Returns the number of tracked large files.
pub fn materialize(git: &dyn GitBackend) -> Result<usize> {
    tracing::info!("Pulling LFS content");
    git.lfs_pull()?;

    let files = inventory(git)?;
    if files.is_empty() {
        tracing::info!("No LFS files tracked, skipping .gitattributes check");
    } else {
        tracing::info!(count = files.len(), "Validating .gitattributes coverage");
        attributes::validate(git.workdir(), &files)?;
    }
    Ok(files.len())
}
