//! Search scope resolution

use crossrepo_core::Repository;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which part of a repository to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    /// Only the repository's priority paths
    Priority,
    /// The whole checkout
    Full,
}

impl Default for SearchScope {
    fn default() -> Self {
        Self::Priority
    }
}

impl SearchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for SearchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Directories to search for `repo`. Never empty: whenever the priority
/// paths are unset or none of them exist, the repository root is used.
pub fn resolve_roots(repo: &Repository, scope: SearchScope) -> Vec<PathBuf> {
    let root = repo.root_dir().to_path_buf();

    if scope == SearchScope::Full || repo.priority_paths.is_empty() {
        return vec![root];
    }

    let existing: Vec<PathBuf> = repo
        .priority_paths
        .iter()
        .map(|p| repo.path_in_repo(p))
        .filter(|p| p.exists())
        .collect();

    if existing.is_empty() {
        vec![root]
    } else {
        existing
    }
}
