//! Capability trait for the version-control operations used during sync

use crate::Result;
use repo_fs::NormalizedPath;

/// Remote every checkout is bound to.
pub const DEFAULT_REMOTE: &str = "origin";

/// Branch a fresh clone starts from and that reconciliation stabilizes on.
pub const BASE_BRANCH: &str = "develop";

/// What `clean` removes besides untracked files and directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanMode {
    /// `clean -fd`: untracked files and directories
    Untracked,
    /// `clean -fdx`: untracked and ignored content
    All,
}

/// Garbage-collection strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcMode {
    /// `gc --prune=now`
    Prune,
    /// `gc --prune=now --aggressive`
    Aggressive,
}

/// Version-control operations on a single working copy.
///
/// Implementations are bound to one working directory. Each operation
/// blocks until the underlying tool finishes and reports success or
/// failure; none of them retries on its own.
pub trait GitBackend {
    /// Working directory this backend operates on.
    fn workdir(&self) -> &NormalizedPath;

    /// Whether the working directory is itself a valid checkout.
    fn is_repository(&self) -> bool;

    /// Populate the (empty) working directory from `url`, checking out
    /// `branch` as a local tracking branch.
    fn clone_branch(&self, url: &str, branch: &str) -> Result<()>;

    /// Fetch from all remotes.
    fn fetch_all(&self) -> Result<()>;

    /// Pull the current branch from its upstream.
    fn pull(&self) -> Result<()>;

    /// `checkout -f <branch>`, creating a tracking branch when only the
    /// remote branch exists.
    fn checkout_force(&self, branch: &str) -> Result<()>;

    /// `switch -f <branch>`
    fn switch_force(&self, branch: &str) -> Result<()>;

    /// `switch --track <upstream>`, e.g. `origin/develop`.
    fn switch_track(&self, upstream: &str) -> Result<()>;

    fn clean(&self, mode: CleanMode) -> Result<()>;

    /// Drop remote-tracking references that no longer exist on `remote`.
    fn prune_remote(&self, remote: &str) -> Result<()>;

    /// `reset --hard` to HEAD.
    fn reset_hard(&self) -> Result<()>;

    fn gc(&self, mode: GcMode) -> Result<()>;

    /// `repack -a -d --depth=250 --window=250`
    fn repack(&self) -> Result<()>;

    /// Name of the checked-out branch, or `None` when HEAD is detached.
    fn current_branch(&self) -> Result<Option<String>>;

    /// Names of local branches.
    fn local_branches(&self) -> Result<Vec<String>>;

    /// Short names (without the `remote/` prefix) of remote-tracking
    /// branches for `remote`.
    fn remote_branches(&self, remote: &str) -> Result<Vec<String>>;

    /// Force-delete a local branch.
    fn delete_branch(&self, name: &str) -> Result<()>;

    /// Download large-file content for the current checkout.
    fn lfs_pull(&self) -> Result<()>;

    /// Repository-relative paths tracked by the large-file subsystem.
    fn lfs_ls_files(&self) -> Result<Vec<String>>;
}
