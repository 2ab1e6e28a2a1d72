//! `git` CLI backed implementation of [`GitBackend`]

use std::ffi::OsString;
use std::process::Command;

use repo_fs::NormalizedPath;

use crate::helpers;
use crate::provider::{CleanMode, DEFAULT_REMOTE, GcMode, GitBackend};
use crate::remote::redact_credentials;
use crate::{Error, Result};

/// Runs git operations against one working directory by invoking the
/// `git` executable, with git2 answering read-only branch queries.
///
/// Commands never prompt for credentials and never walk up past the
/// working directory looking for an enclosing repository, so a folder that
/// is not itself a checkout can't be mistaken for one.
pub struct CommandGit {
    root: NormalizedPath,
    program: OsString,
}

impl CommandGit {
    /// Create a backend for the checkout at `root`.
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            program: OsString::from("git"),
        }
    }

    /// Use a specific git executable instead of the one on `PATH`.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        self.run_described(args, &format!("git {}", args.join(" ")))
    }

    /// Run git with `args`, reporting it as `description` in errors and logs.
    fn run_described(&self, args: &[&str], description: &str) -> Result<String> {
        let root = self.root.to_native();
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&root)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0");
        if let Some(parent) = root.parent() {
            cmd.env("GIT_CEILING_DIRECTORIES", parent);
        }

        tracing::debug!(command = %description, workdir = %self.root, "Running git");

        let output = cmd.output().map_err(|source| Error::Spawn {
            command: description.to_string(),
            source,
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::ToolInvocation {
                command: description.to_string(),
                code: output.status.code(),
                stderr: redact_credentials(stderr.trim()),
            })
        }
    }

    fn open(&self) -> Result<git2::Repository> {
        helpers::open_exact(&self.root.to_native())
    }
}

impl GitBackend for CommandGit {
    fn workdir(&self) -> &NormalizedPath {
        &self.root
    }

    fn is_repository(&self) -> bool {
        self.open().is_ok()
    }

    fn clone_branch(&self, url: &str, branch: &str) -> Result<()> {
        // Initialising in place instead of `git clone` tolerates IDE
        // metadata already sitting in the target folder.
        let upstream = format!("{DEFAULT_REMOTE}/{branch}");
        self.run(&["init"])?;
        self.run_described(
            &["remote", "add", DEFAULT_REMOTE, url],
            &format!("git remote add {DEFAULT_REMOTE} {}", redact_credentials(url)),
        )?;
        self.run(&["fetch", DEFAULT_REMOTE])?;
        self.run(&["checkout", "-f", "-B", branch, "--track", &upstream])?;
        Ok(())
    }

    fn fetch_all(&self) -> Result<()> {
        self.run(&["fetch", "--all"]).map(drop)
    }

    fn pull(&self) -> Result<()> {
        self.run(&["pull"]).map(drop)
    }

    fn checkout_force(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", "-f", branch]).map(drop)
    }

    fn switch_force(&self, branch: &str) -> Result<()> {
        self.run(&["switch", "-f", branch]).map(drop)
    }

    fn switch_track(&self, upstream: &str) -> Result<()> {
        self.run(&["switch", "--track", upstream]).map(drop)
    }

    fn clean(&self, mode: CleanMode) -> Result<()> {
        let flags = match mode {
            CleanMode::Untracked => "-fd",
            CleanMode::All => "-fdx",
        };
        self.run(&["clean", flags]).map(drop)
    }

    fn prune_remote(&self, remote: &str) -> Result<()> {
        self.run(&["remote", "update", remote, "--prune"]).map(drop)
    }

    fn reset_hard(&self) -> Result<()> {
        self.run(&["reset", "--hard"]).map(drop)
    }

    fn gc(&self, mode: GcMode) -> Result<()> {
        let args: &[&str] = match mode {
            GcMode::Prune => &["gc", "--prune=now"],
            GcMode::Aggressive => &["gc", "--prune=now", "--aggressive"],
        };
        self.run(args).map(drop)
    }

    fn repack(&self) -> Result<()> {
        self.run(&["repack", "-a", "-d", "--depth=250", "--window=250"])
            .map(drop)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let repo = self.open()?;
        helpers::get_current_branch(&repo)
    }

    fn local_branches(&self) -> Result<Vec<String>> {
        let repo = self.open()?;
        helpers::list_local_branches(&repo)
    }

    fn remote_branches(&self, remote: &str) -> Result<Vec<String>> {
        let repo = self.open()?;
        helpers::list_remote_branches(&repo, remote)
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        self.run(&["branch", "-D", name]).map(drop)
    }

    fn lfs_pull(&self) -> Result<()> {
        self.run(&["lfs", "pull"]).map(drop)
    }

    fn lfs_ls_files(&self) -> Result<Vec<String>> {
        let stdout = self.run(&["lfs", "ls-files", "--name-only"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
