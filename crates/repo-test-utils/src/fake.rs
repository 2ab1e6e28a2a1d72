//! Scripted in-memory git backend.
//!
//! Realism level: **FAKE**: no git process is started. Branch state is a
//! handful of sets, every call is journaled as its CLI spelling (e.g.
//! `"checkout -f release-1"`), and any call can be scripted to fail.
//!
//! Use for: reconciliation and provisioning tests that assert which
//! operations ran, in what order, and how failures escalate.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use repo_fs::NormalizedPath;
use repo_git::{CleanMode, DEFAULT_REMOTE, Error, GcMode, GitBackend, Result};

#[derive(Debug, Default)]
struct State {
    is_repo: bool,
    current: Option<String>,
    local: BTreeSet<String>,
    /// Remote-tracking refs known locally
    remote_refs: BTreeSet<String>,
    /// Branches present on the server, visible after a fetch
    upstream: BTreeSet<String>,
    lfs_files: Vec<String>,
    cloned_from: Option<String>,
}

/// In-memory [`GitBackend`] with scripted failures and a call journal.
pub struct FakeGit {
    workdir: NormalizedPath,
    state: RefCell<State>,
    /// Call -> remaining failures (`None` = fail forever)
    failures: RefCell<HashMap<String, Option<usize>>>,
    journal: RefCell<Vec<String>>,
}

impl FakeGit {
    /// A folder that is not a checkout yet.
    pub fn new(workdir: impl Into<NormalizedPath>) -> Self {
        Self {
            workdir: workdir.into(),
            state: RefCell::new(State::default()),
            failures: RefCell::new(HashMap::new()),
            journal: RefCell::new(Vec::new()),
        }
    }

    /// A checkout on `current` with the given local branches. Every branch
    /// on the server is already known as a remote-tracking ref.
    pub fn checkout(
        workdir: impl Into<NormalizedPath>,
        current: &str,
        local: &[&str],
        upstream: &[&str],
    ) -> Self {
        let fake = Self::new(workdir).with_upstream(upstream);
        {
            let mut state = fake.state.borrow_mut();
            state.is_repo = true;
            state.current = Some(current.to_string());
            state.local = local.iter().map(|b| b.to_string()).collect();
            state.local.insert(current.to_string());
            state.remote_refs = state.upstream.clone();
        }
        fake
    }

    /// Branches that exist on the server.
    pub fn with_upstream(self, branches: &[&str]) -> Self {
        self.state.borrow_mut().upstream = branches.iter().map(|b| b.to_string()).collect();
        self
    }

    /// Add a branch to the server without making it known locally; it
    /// becomes visible after the next fetch.
    pub fn with_unfetched_branch(self, branch: &str) -> Self {
        self.state.borrow_mut().upstream.insert(branch.to_string());
        self
    }

    /// Paths reported by `lfs ls-files`.
    pub fn with_lfs_files(self, files: &[&str]) -> Self {
        self.state.borrow_mut().lfs_files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Detach HEAD.
    pub fn detached(self) -> Self {
        self.state.borrow_mut().current = None;
        self
    }

    /// Make `call` fail every time.
    pub fn fail_on(self, call: &str) -> Self {
        self.failures.borrow_mut().insert(call.to_string(), None);
        self
    }

    /// Make `call` fail the next `times` invocations, then succeed.
    pub fn fail_times(self, call: &str, times: usize) -> Self {
        self.failures
            .borrow_mut()
            .insert(call.to_string(), Some(times));
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    /// Whether `call` was made at least once.
    pub fn called(&self, call: &str) -> bool {
        self.journal.borrow().iter().any(|c| c == call)
    }

    /// Number of times `call` was made.
    pub fn count(&self, call: &str) -> usize {
        self.journal.borrow().iter().filter(|c| *c == call).count()
    }

    /// Whether any call starting with `prefix` was made.
    pub fn called_prefix(&self, prefix: &str) -> bool {
        self.journal.borrow().iter().any(|c| c.starts_with(prefix))
    }

    pub fn active_branch(&self) -> Option<String> {
        self.state.borrow().current.clone()
    }

    pub fn local(&self) -> Vec<String> {
        self.state.borrow().local.iter().cloned().collect()
    }

    /// URL passed to the last successful clone.
    pub fn cloned_from(&self) -> Option<String> {
        self.state.borrow().cloned_from.clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.journal.borrow_mut().push(call.clone());

        let mut failures = self.failures.borrow_mut();
        let scripted = match failures.get_mut(&call) {
            Some(None) => true,
            Some(Some(0)) => false,
            Some(Some(remaining)) => {
                *remaining -= 1;
                true
            }
            None => false,
        };
        if scripted {
            return Err(tool_error(&call, "scripted failure"));
        }

        if !call.starts_with("clone") && !self.state.borrow().is_repo {
            return Err(tool_error(&call, "not a git repository"));
        }
        Ok(())
    }
}

fn tool_error(call: &str, stderr: &str) -> Error {
    Error::ToolInvocation {
        command: format!("git {call}"),
        code: Some(128),
        stderr: format!("fatal: {stderr}"),
    }
}

impl GitBackend for FakeGit {
    fn workdir(&self) -> &NormalizedPath {
        &self.workdir
    }

    fn is_repository(&self) -> bool {
        self.state.borrow().is_repo
    }

    fn clone_branch(&self, url: &str, branch: &str) -> Result<()> {
        let call = format!("clone --branch {branch}");
        self.record(call.clone())?;

        let mut state = self.state.borrow_mut();
        if !state.upstream.contains(branch) {
            return Err(tool_error(
                &call,
                &format!("couldn't find remote ref {branch}"),
            ));
        }
        state.is_repo = true;
        state.remote_refs = state.upstream.clone();
        state.local = BTreeSet::from([branch.to_string()]);
        state.current = Some(branch.to_string());
        state.cloned_from = Some(url.to_string());
        Ok(())
    }

    fn fetch_all(&self) -> Result<()> {
        self.record("fetch --all".into())?;
        let mut state = self.state.borrow_mut();
        state.remote_refs = state.upstream.clone();
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        self.record("pull".into())?;
        match self.state.borrow().current {
            Some(_) => Ok(()),
            None => Err(tool_error("pull", "You are not currently on a branch.")),
        }
    }

    fn checkout_force(&self, branch: &str) -> Result<()> {
        let call = format!("checkout -f {branch}");
        self.record(call.clone())?;

        let mut state = self.state.borrow_mut();
        if !state.local.contains(branch) {
            if !state.remote_refs.contains(branch) {
                return Err(tool_error(
                    &call,
                    &format!("pathspec '{branch}' did not match any file(s) known to git"),
                ));
            }
            state.local.insert(branch.to_string());
        }
        state.current = Some(branch.to_string());
        Ok(())
    }

    fn switch_force(&self, branch: &str) -> Result<()> {
        let call = format!("switch -f {branch}");
        self.record(call.clone())?;

        let mut state = self.state.borrow_mut();
        if !state.local.contains(branch) {
            return Err(tool_error(&call, &format!("invalid reference: {branch}")));
        }
        state.current = Some(branch.to_string());
        Ok(())
    }

    fn switch_track(&self, upstream: &str) -> Result<()> {
        let call = format!("switch --track {upstream}");
        self.record(call.clone())?;

        let prefix = format!("{DEFAULT_REMOTE}/");
        let Some(branch) = upstream.strip_prefix(&prefix) else {
            return Err(tool_error(&call, "missing branch name; try -c"));
        };
        let mut state = self.state.borrow_mut();
        if state.local.contains(branch) {
            return Err(tool_error(
                &call,
                &format!("a branch named '{branch}' already exists"),
            ));
        }
        if !state.remote_refs.contains(branch) {
            return Err(tool_error(&call, &format!("invalid reference: {upstream}")));
        }
        state.local.insert(branch.to_string());
        state.current = Some(branch.to_string());
        Ok(())
    }

    fn clean(&self, mode: CleanMode) -> Result<()> {
        match mode {
            CleanMode::Untracked => self.record("clean -fd".into()),
            CleanMode::All => self.record("clean -fdx".into()),
        }
    }

    fn prune_remote(&self, remote: &str) -> Result<()> {
        self.record(format!("remote update {remote} --prune"))?;
        let mut state = self.state.borrow_mut();
        state.remote_refs = state
            .remote_refs
            .intersection(&state.upstream)
            .cloned()
            .collect();
        Ok(())
    }

    fn reset_hard(&self) -> Result<()> {
        self.record("reset --hard".into())
    }

    fn gc(&self, mode: GcMode) -> Result<()> {
        match mode {
            GcMode::Prune => self.record("gc --prune=now".into()),
            GcMode::Aggressive => self.record("gc --prune=now --aggressive".into()),
        }
    }

    fn repack(&self) -> Result<()> {
        self.record("repack -a -d --depth=250 --window=250".into())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        self.record("rev-parse --abbrev-ref HEAD".into())?;
        Ok(self.state.borrow().current.clone())
    }

    fn local_branches(&self) -> Result<Vec<String>> {
        self.record("branch --list".into())?;
        Ok(self.state.borrow().local.iter().cloned().collect())
    }

    fn remote_branches(&self, remote: &str) -> Result<Vec<String>> {
        self.record(format!("branch --remotes --list {remote}/*"))?;
        Ok(self.state.borrow().remote_refs.iter().cloned().collect())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let call = format!("branch -D {name}");
        self.record(call.clone())?;

        let mut state = self.state.borrow_mut();
        if state.current.as_deref() == Some(name) {
            return Err(tool_error(
                &call,
                &format!("Cannot delete branch '{name}' checked out"),
            ));
        }
        if !state.local.remove(name) {
            return Err(tool_error(&call, &format!("branch '{name}' not found")));
        }
        Ok(())
    }

    fn lfs_pull(&self) -> Result<()> {
        self.record("lfs pull".into())
    }

    fn lfs_ls_files(&self) -> Result<Vec<String>> {
        self.record("lfs ls-files --name-only".into())?;
        Ok(self.state.borrow().lfs_files.clone())
    }
}
