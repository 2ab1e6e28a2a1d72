//! Shared git2 helper functions for read-only repository inspection
//!
//! Mutating operations go through the `git` CLI so that hooks, filters and
//! the large-file extension behave exactly as they do for a user; queries
//! about branches only need the object database and are answered by git2.

use std::path::Path;

use git2::{BranchType, ErrorCode, Repository};

use crate::{Error, Result};

/// Open the repository whose working directory is exactly `root`.
///
/// Parent directories are not searched: a folder nested inside some other
/// checkout is not a repository of its own.
pub fn open_exact(root: &Path) -> Result<Repository> {
    Repository::open(root).map_err(|e| match e.code() {
        ErrorCode::NotFound => Error::NotARepository {
            path: root.to_path_buf(),
        },
        _ => Error::Git(e),
    })
}

/// Get the current branch name from a repository.
///
/// Returns the branch name if HEAD points to a branch, or `None` if HEAD is detached.
pub fn get_current_branch(repo: &Repository) -> Result<Option<String>> {
    let head = repo.head()?;

    if head.is_branch() {
        Ok(head.shorthand().map(str::to_string))
    } else {
        Ok(None)
    }
}

/// List local branch names.
pub fn list_local_branches(repo: &Repository) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for branch in repo.branches(Some(BranchType::Local))? {
        let (branch, _) = branch?;
        if let Some(name) = branch.name()? {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// List remote-tracking branches of `remote`, with the `remote/` prefix
/// stripped. The symbolic `remote/HEAD` entry is skipped.
pub fn list_remote_branches(repo: &Repository, remote: &str) -> Result<Vec<String>> {
    let prefix = format!("{remote}/");
    let mut names = Vec::new();
    for branch in repo.branches(Some(BranchType::Remote))? {
        let (branch, _) = branch?;
        let Some(full) = branch.name()? else {
            continue;
        };
        if let Some(short) = full.strip_prefix(&prefix)
            && short != "HEAD"
        {
            names.push(short.to_string());
        }
    }
    names.sort();
    Ok(names)
}
