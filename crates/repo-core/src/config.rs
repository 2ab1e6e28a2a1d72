//! Settings file for the sync job
//!
//! The file is a JSON object shared with other tooling; fields this crate
//! does not know about are kept and written back unchanged.

use std::fmt;
use std::path::Path;

use repo_fs::{ConfigStore, NormalizedPath};
use repo_git::Credentials;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Server account used for authenticated clones.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct BitbucketConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Debug for BitbucketConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitbucketConfig")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Parent directory of every checkout. Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Contents of the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub bitbucket: BitbucketConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Runs left before the next forced clear.
    #[serde(default)]
    pub count_reset: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SyncConfig {
    /// Load from `path`. A missing or malformed file is a [`Error::Config`].
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config {
                message: format!("settings file {path} not found"),
            });
        }
        ConfigStore::new().load(path).map_err(|e| Error::Config {
            message: e.to_string(),
        })
    }

    /// Rewrite the settings file atomically.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }

    /// Account credentials; both fields must be present and non-empty.
    pub fn credentials(&self) -> Result<Credentials> {
        let field = |value: &Option<String>, name: &str| match value.as_deref() {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(Error::Config {
                message: format!("bitbucket.{name} is missing or empty"),
            }),
        };
        Ok(Credentials {
            username: field(&self.bitbucket.username, "username")?,
            token: field(&self.bitbucket.token, "token")?,
        })
    }

    /// Directory holding `folder`: `paths.repo_path` when set, else `cwd`.
    pub fn checkout_root(&self, cwd: &Path, folder: &str) -> NormalizedPath {
        let parent = match self.paths.repo_path.as_deref() {
            Some(root) if !root.is_empty() => NormalizedPath::new(root),
            _ => NormalizedPath::new(cwd),
        };
        parent.join(folder)
    }
}
