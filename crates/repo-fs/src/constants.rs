//! Well-known names inside a checkout folder.

use std::path::Path;

/// Standard checkout markers and paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoPath {
    /// The `.git` directory (Git database)
    GitDir,
    /// The `.idea` directory (IDE metadata, ignored when judging emptiness)
    IdeaDir,
    /// The `.gitattributes` declarations file at the checkout root
    GitAttributes,
}

impl RepoPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitDir => ".git",
            Self::IdeaDir => ".idea",
            Self::GitAttributes => ".gitattributes",
        }
    }
}

impl AsRef<Path> for RepoPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
