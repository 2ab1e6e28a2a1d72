//! One sync invocation, end to end
//!
//! Loads settings, advances the retention counter, then provisions the
//! checkout for the requested branch.

use std::path::PathBuf;

use repo_fs::NormalizedPath;
use repo_git::{CommandGit, GitBackend, repo_folder_name};

use crate::config::SyncConfig;
use crate::provision::{ProvisionRequest, Provisioned, provision};
use crate::retention::{self, RetentionDecision};
use crate::{Error, Result};

/// Inputs for one run.
#[derive(Debug, Clone)]
pub struct SyncJob {
    /// Settings file; its `count_reset` is rewritten by every run.
    pub config_path: PathBuf,
    pub repo_url: String,
    pub branch: String,
    /// Parent for the checkout when the settings name none.
    pub working_dir: PathBuf,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub checkout: NormalizedPath,
    pub retention: RetentionDecision,
    pub provisioned: Provisioned,
}

impl SyncJob {
    /// Run against the `git` executable.
    pub fn run(&self) -> Result<JobReport> {
        self.run_with(CommandGit::new)
    }

    /// Run with a backend built by `make_backend` for the checkout folder.
    pub fn run_with<G, F>(&self, make_backend: F) -> Result<JobReport>
    where
        G: GitBackend,
        F: FnOnce(NormalizedPath) -> G,
    {
        if self.branch.trim().is_empty() {
            return Err(Error::Config {
                message: "branch name is empty".into(),
            });
        }
        let folder = repo_folder_name(&self.repo_url);
        if folder.is_empty() {
            return Err(Error::Config {
                message: format!("can't derive a folder name from {}", self.repo_url),
            });
        }

        let config_path = NormalizedPath::new(&self.config_path);
        let mut config = SyncConfig::load(&config_path)?;
        let checkout = config.checkout_root(&self.working_dir, &folder);
        let span = tracing::info_span!("sync_job", repo = %checkout, branch = %self.branch);
        let _guard = span.enter();
        tracing::info!(url = %self.repo_url, "Starting sync");

        let git = make_backend(checkout.clone());

        let retention = retention::enforce(
            config.count_reset,
            |next| {
                config.count_reset = next;
                config.save(&config_path)
            },
            &git,
        )?;

        let credentials = config.credentials()?;
        let provisioned = provision(
            &git,
            &ProvisionRequest {
                url: &self.repo_url,
                branch: &self.branch,
                credentials: Some(&credentials),
            },
        )?;

        tracing::info!(?provisioned, "Sync finished");
        Ok(JobReport {
            checkout,
            retention,
            provisioned,
        })
    }
}
