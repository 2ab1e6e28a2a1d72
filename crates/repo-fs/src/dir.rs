//! Checkout folder helpers.

use std::fs;

use walkdir::WalkDir;

use crate::{Error, NormalizedPath, RepoPath, Result};

/// Create `path` and any missing parents.
pub fn ensure_dir(path: &NormalizedPath) -> Result<()> {
    let native = path.to_native();
    fs::create_dir_all(&native).map_err(|e| Error::io(&native, e))
}

/// Whether `path` has no entries other than IDE metadata.
///
/// A folder holding only `.idea` is treated as empty so that an editor
/// left open on the checkout location does not block a first clone.
pub fn is_effectively_empty(path: &NormalizedPath) -> Result<bool> {
    let native = path.to_native();
    let entries = fs::read_dir(&native).map_err(|e| Error::io(&native, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(&native, e))?;
        if entry.file_name() != RepoPath::IdeaDir.as_str() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Recursively delete `path`, clearing read-only attributes if the first
/// attempt is refused.
///
/// Git marks pack files read-only on some platforms, which makes a plain
/// recursive delete fail part-way through.
pub fn remove_dir_force(path: &NormalizedPath) -> Result<()> {
    let native = path.to_native();
    if !native.exists() {
        return Ok(());
    }

    match fs::remove_dir_all(&native) {
        Ok(()) => Ok(()),
        Err(first) => {
            tracing::debug!(
                path = %path,
                error = %first,
                "Recursive delete refused, clearing read-only attributes"
            );
            make_writable(path);
            fs::remove_dir_all(&native).map_err(|e| Error::io(&native, e))
        }
    }
}

#[allow(clippy::permissions_set_readonly_false)]
fn make_writable(path: &NormalizedPath) {
    for entry in WalkDir::new(path.to_native()).into_iter().flatten() {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let mut permissions = metadata.permissions();
        if permissions.readonly() {
            permissions.set_readonly(false);
            if let Err(e) = fs::set_permissions(entry.path(), permissions) {
                tracing::warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "Failed to clear read-only attribute"
                );
            }
        }
    }
}
