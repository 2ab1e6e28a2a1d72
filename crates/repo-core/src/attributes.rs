//! Large-file declaration checks against `.gitattributes`
//!
//! Every path the large-file subsystem tracks must be matched by a pattern
//! declared in the attributes file. Matching is deliberately simple: a path
//! is covered when it equals a pattern, or ends with the pattern after one
//! leading `*` is removed. This is not glob matching (`*.bin` also covers
//! `archive.tar.bin`, `dir/*.bin` never matches) and must stay that way so
//! validation outcomes do not shift under existing repositories.

use std::collections::BTreeSet;

use repo_fs::{NormalizedPath, RepoPath, io};

use crate::{Error, Result};

/// Patterns declared in an attributes file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationSet {
    patterns: BTreeSet<String>,
}

impl DeclarationSet {
    /// Parse attributes file content.
    ///
    /// Blank lines and lines starting with `#` are skipped; the first
    /// whitespace-delimited token of every other line is a pattern.
    pub fn parse(content: &str) -> Self {
        let patterns = content
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect();
        Self { patterns }
    }

    /// Declared patterns, sorted.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `path` is covered by any declared pattern.
    pub fn covers(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            path == pattern || path.ends_with(pattern.strip_prefix('*').unwrap_or(pattern))
        })
    }

    /// Entries of `inventory` not covered by any pattern, in inventory order.
    pub fn uncovered<'a>(&self, inventory: &'a [String]) -> Vec<&'a str> {
        inventory
            .iter()
            .map(String::as_str)
            .filter(|path| !self.covers(path))
            .collect()
    }
}

/// Path of the declarations file inside a checkout.
pub fn declarations_path(root: &NormalizedPath) -> NormalizedPath {
    root.join(RepoPath::GitAttributes.as_str())
}

/// Check that every entry of `inventory` is declared in the checkout's
/// attributes file.
///
/// An empty inventory succeeds without touching the filesystem. Otherwise
/// the file must exist, and every uncovered entry is reported together.
pub fn validate(root: &NormalizedPath, inventory: &[String]) -> Result<()> {
    if inventory.is_empty() {
        return Ok(());
    }

    let path = declarations_path(root);
    if !path.exists() {
        return Err(Error::MissingDeclarationsFile {
            path: path.to_native(),
        });
    }

    let declarations = DeclarationSet::parse(&io::read_text(&path)?);
    let uncovered = declarations.uncovered(inventory);
    if !uncovered.is_empty() {
        return Err(Error::UncoveredLargeFiles {
            files: uncovered.into_iter().map(str::to_string).collect(),
        });
    }

    tracing::info!(
        files = inventory.len(),
        patterns = declarations.patterns.len(),
        "All LFS files declared in .gitattributes"
    );
    Ok(())
}
