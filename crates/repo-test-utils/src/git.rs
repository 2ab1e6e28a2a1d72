//! Real git remotes and checkouts.
//!
//! Realism level: **REAL**: every fixture is built with the `git` CLI.
//! Tests using these should bail out early with [`git_available`]. The
//! sync path also needs git-lfs; [`RemoteFixture::git_program`] stands in a
//! no-op one where it is missing.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Whether a usable `git` executable is on `PATH`.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Whether the large-file extension is installed.
pub fn git_lfs_available() -> bool {
    Command::new("git")
        .args(["lfs", "version"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Whether the sync path can run: git plus either git-lfs or the stub that
/// [`RemoteFixture::git_program`] installs on Unix.
pub fn sync_tools_available() -> bool {
    git_available() && (cfg!(unix) || git_lfs_available())
}

/// Run `git args` in `dir`, panicking with stderr on failure. Returns stdout.
///
/// # Panics
/// Panics if git cannot be started or exits unsuccessfully.
pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed in {}:\n{}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn configure_identity(dir: &Path) {
    run_git(dir, &["config", "user.email", "test@test.com"]);
    run_git(dir, &["config", "user.name", "Test User"]);
    run_git(dir, &["config", "commit.gpgsign", "false"]);
}

/// A bare remote seeded with a `develop` branch and optional extra branches.
///
/// Each extra branch adds one commit with a file named after the branch,
/// so tests can tell which branch a checkout is on from its contents.
pub struct RemoteFixture {
    temp: TempDir,
    bare: PathBuf,
    seed: PathBuf,
}

impl RemoteFixture {
    /// Seed a remote with `develop` plus `branches`.
    ///
    /// # Panics
    /// Panics if any git operation fails.
    pub fn new(branches: &[&str]) -> Self {
        let temp = TempDir::new().unwrap();
        let bare = temp.path().join("remote.git");
        let seed = temp.path().join("seed");
        fs::create_dir_all(&bare).unwrap();
        fs::create_dir_all(&seed).unwrap();

        run_git(&bare, &["init", "--bare"]);

        run_git(&seed, &["init"]);
        configure_identity(&seed);
        run_git(&seed, &["checkout", "-b", "develop"]);
        fs::write(seed.join("README.md"), "# Service\n").unwrap();
        run_git(&seed, &["add", "."]);
        run_git(&seed, &["commit", "-m", "Initial commit"]);
        let bare_url = bare.to_string_lossy().into_owned();
        run_git(&seed, &["remote", "add", "origin", &bare_url]);
        run_git(&seed, &["push", "origin", "develop"]);

        let fixture = Self { temp, bare, seed };
        for branch in branches {
            fixture.add_branch(branch);
        }
        fixture
    }

    /// Create `branch` off `develop` on the remote.
    pub fn add_branch(&self, branch: &str) {
        run_git(&self.seed, &["checkout", "-B", branch, "develop"]);
        fs::write(self.seed.join(format!("{branch}.txt")), branch).unwrap();
        run_git(&self.seed, &["add", "."]);
        run_git(&self.seed, &["commit", "-m", &format!("Add {branch}")]);
        run_git(&self.seed, &["push", "origin", branch]);
        run_git(&self.seed, &["checkout", "develop"]);
    }

    /// Push one more commit to `branch` on the remote.
    pub fn advance(&self, branch: &str, file: &str, content: &str) {
        run_git(&self.seed, &["checkout", branch]);
        fs::write(self.seed.join(file), content).unwrap();
        run_git(&self.seed, &["add", "."]);
        run_git(&self.seed, &["commit", "-m", &format!("Update {file}")]);
        run_git(&self.seed, &["push", "origin", branch]);
        run_git(&self.seed, &["checkout", "develop"]);
    }

    /// URL usable as a clone source.
    pub fn url(&self) -> String {
        self.bare.to_string_lossy().into_owned()
    }

    /// Scratch directory that lives as long as the fixture.
    pub fn scratch(&self, name: &str) -> PathBuf {
        let path = self.temp.path().join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Executable for `CommandGit::with_program`.
    ///
    /// Plain `git` when git-lfs is installed. Otherwise a wrapper that puts a
    /// no-op `git-lfs` first on `PATH`, so `lfs pull` succeeds and
    /// `lfs ls-files` lists nothing.
    pub fn git_program(&self) -> PathBuf {
        if git_lfs_available() {
            return PathBuf::from("git");
        }
        self.lfs_stub_wrapper()
    }

    #[cfg(unix)]
    fn lfs_stub_wrapper(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let bin = self.temp.path().join("lfs-stub");
        let lfs = bin.join("git-lfs");
        let wrapper = self.temp.path().join("git-with-lfs-stub");
        if wrapper.exists() {
            return wrapper;
        }
        fs::create_dir_all(&bin).unwrap();
        fs::write(&lfs, "#!/bin/sh\nexit 0\n").unwrap();
        fs::write(
            &wrapper,
            format!(
                "#!/bin/sh\nPATH='{}':\"$PATH\" exec git \"$@\"\n",
                bin.display()
            ),
        )
        .unwrap();
        for script in [&lfs, &wrapper] {
            fs::set_permissions(script, fs::Permissions::from_mode(0o755)).unwrap();
        }
        wrapper
    }

    #[cfg(not(unix))]
    fn lfs_stub_wrapper(&self) -> PathBuf {
        PathBuf::from("git")
    }

    /// Clone the remote's `branch` into a fresh scratch directory named
    /// `name`, with a committer identity configured.
    pub fn clone_into(&self, name: &str, branch: &str) -> PathBuf {
        let dest = self.temp.path().join(name);
        let url = self.url();
        let dest_str = dest.to_string_lossy().into_owned();
        run_git(
            self.temp.path(),
            &["clone", "--branch", branch, &url, &dest_str],
        );
        configure_identity(&dest);
        dest
    }
}

/// Name of the branch checked out in `dir`, via the CLI.
pub fn current_branch(dir: &Path) -> String {
    run_git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
        .trim()
        .to_string()
}

/// Local branch names in `dir`, via the CLI.
pub fn local_branches(dir: &Path) -> Vec<String> {
    run_git(dir, &["branch", "--format=%(refname:short)"])
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
