//! First-time clone or hand-off to reconciliation

use repo_fs::dir;
use repo_git::{BASE_BRANCH, Credentials, GitBackend, authenticated_url};

use crate::sync::{Reconciliation, reconcile};
use crate::{Error, Result, lfs};

/// What to provision and how to authenticate.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionRequest<'a> {
    /// Remote URL as given by the user, without credentials.
    pub url: &'a str,
    /// Branch the checkout must end up on.
    pub branch: &'a str,
    /// Embedded into the URL for the clone; `None` clones `url` as-is.
    pub credentials: Option<&'a Credentials>,
}

/// How the checkout was brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// The folder was empty and `develop` was cloned before reconciling.
    Cloned(Reconciliation),
    /// An existing checkout was reconciled.
    Reconciled(Reconciliation),
}

impl Provisioned {
    pub fn reconciliation(&self) -> Reconciliation {
        match self {
            Self::Cloned(r) | Self::Reconciled(r) => *r,
        }
    }
}

/// Ensure `git.workdir()` holds a checkout of `request.branch`.
///
/// A folder with content (ignoring IDE metadata) is handed straight to
/// [`reconcile`]. An empty or missing folder gets `develop` cloned into
/// it, large files pulled and checked, and is then reconciled onto the
/// requested branch. Clone-stage failures are wrapped in
/// [`Error::Provisioning`]; a half-finished clone is left for the next
/// retention clear to deal with.
pub fn provision(git: &dyn GitBackend, request: &ProvisionRequest<'_>) -> Result<Provisioned> {
    let workdir = git.workdir();
    let span = tracing::info_span!("provision", repo = %workdir, branch = %request.branch);
    let _guard = span.enter();

    dir::ensure_dir(workdir)?;

    if !dir::is_effectively_empty(workdir)? {
        tracing::info!("Folder not empty, reconciling existing checkout");
        return reconcile(git, request.branch).map(Provisioned::Reconciled);
    }

    tracing::info!(url = %request.url, "First clone of {BASE_BRANCH}");
    clone_base(git, request).map_err(|e| Error::Provisioning {
        source: Box::new(e),
    })?;
    tracing::info!("Repository cloned");

    reconcile(git, request.branch).map(Provisioned::Cloned)
}

fn clone_base(git: &dyn GitBackend, request: &ProvisionRequest<'_>) -> Result<()> {
    let remote_url = match request.credentials {
        Some(credentials) => authenticated_url(request.url, credentials)?,
        None => request.url.to_string(),
    };
    git.clone_branch(&remote_url, BASE_BRANCH)?;
    lfs::materialize(git)?;
    Ok(())
}
