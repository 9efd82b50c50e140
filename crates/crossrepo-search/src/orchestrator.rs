//! Per-repository search orchestration
//!
//! A failing repository is logged and left out; it never fails the batch.
//! Results always come back in the order the repositories were given.

use crossrepo_core::{Repository, SearchConfig};
use std::path::Path;
use tracing::{error, warn};

use crate::engine::{Match, Ripgrep, SearchRequest};
use crate::error::SearchError;
use crate::scope::{resolve_roots, SearchScope};

/// Per-call search options
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub scope: SearchScope,
    /// Inclusion glob, e.g. `*.tf`
    pub glob: Option<String>,
}

/// Matches found in one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSearchResult {
    pub repo_name: String,
    /// In ripgrep's traversal order
    pub matches: Vec<Match>,
}

/// Build the ripgrep request for one repository
pub fn build_request(
    repo: &Repository,
    pattern: &str,
    config: &SearchConfig,
    options: &SearchOptions,
) -> SearchRequest {
    SearchRequest {
        pattern: pattern.to_string(),
        roots: resolve_roots(repo, options.scope),
        glob: options.glob.clone(),
        context_lines: config.context_lines,
        max_count: config.max_results,
        exclude_globs: config.exclude_patterns.clone(),
    }
}

/// Search a single repository and fill in repository-relative paths
pub async fn search_repo(
    engine: &Ripgrep,
    repo: &Repository,
    pattern: &str,
    config: &SearchConfig,
    options: &SearchOptions,
) -> Result<RepoSearchResult, SearchError> {
    let request = build_request(repo, pattern, config, options);
    let mut matches = engine.search(&request).await?;

    let root = repo.root_dir();
    for m in &mut matches {
        m.relative_path = relative_path(root, &m.absolute_path);
    }

    Ok(RepoSearchResult {
        repo_name: repo.name.clone(),
        matches,
    })
}

/// Search repositories one after another
pub async fn search_each(
    engine: &Ripgrep,
    repos: &[&Repository],
    pattern: &str,
    config: &SearchConfig,
    options: &SearchOptions,
) -> Vec<RepoSearchResult> {
    let mut results = Vec::with_capacity(repos.len());

    for repo in repos {
        match search_repo(engine, repo, pattern, config, options).await {
            Ok(result) => results.push(result),
            Err(e) => warn!("Search failed for {}: {}", repo.name, e),
        }
    }

    results
}

/// Search every repository at once, one task each
pub async fn search_concurrent(
    engine: &Ripgrep,
    repos: &[&Repository],
    pattern: &str,
    config: &SearchConfig,
    options: &SearchOptions,
) -> Vec<RepoSearchResult> {
    let handles: Vec<_> = repos
        .iter()
        .map(|repo| {
            let engine = engine.clone();
            let repo = (*repo).clone();
            let pattern = pattern.to_string();
            let config = config.clone();
            let options = options.clone();

            tokio::spawn(async move {
                let result = search_repo(&engine, &repo, &pattern, &config, &options).await;
                (repo.name, result)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok((_, Ok(result))) => results.push(result),
            Ok((name, Err(e))) => warn!("Search failed for {}: {}", name, e),
            Err(e) => error!("Search task aborted: {}", e),
        }
    }

    results
}

/// `path` relative to `root`, or `path` itself when it lies elsewhere
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}
