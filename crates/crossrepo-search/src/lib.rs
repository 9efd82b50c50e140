//! Crossrepo Search - regex search across many repositories
//!
//! Every search is a fresh ripgrep run; nothing is indexed or cached.
//!
//! ## Pipeline
//!
//! - [`select`] picks the available repositories a query targets
//! - [`patterns`] turns a query intent into regex alternatives
//! - [`scope`] decides which directories of a repository to hand to ripgrep
//! - [`engine`] runs ripgrep and parses its `--json` stream
//! - [`orchestrator`] runs one search per repository and drops failures
//! - [`report`] filters and renders the per-repository results

pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod patterns;
pub mod report;
pub mod scope;
pub mod select;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{Match, Ripgrep, SearchRequest, Submatch};
pub use error::SearchError;
pub use orchestrator::{search_concurrent, search_each, search_repo, RepoSearchResult, SearchOptions};
pub use report::{apply_method_filter, format_results, NO_MATCHES};
pub use scope::{resolve_roots, SearchScope};
pub use select::{select_dependency_targets, select_repos};
