//! `get_repo_context` document collection

use crossrepo_core::Repository;
use tracing::{debug, warn};

/// Context documents of one repository, or `None` when none are readable
pub async fn repo_context(repo: &Repository) -> Option<String> {
    let mut sections = Vec::new();

    for file in &repo.context_files {
        let path = repo.path_in_repo(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => sections.push(format!("### {}\n\n{}", file, content.trim_end())),
            Err(e) => warn!("Skipping context file {:?} of {}: {}", path, repo.name, e),
        }
    }

    if sections.is_empty() {
        debug!("No readable context files in {}", repo.name);
        return None;
    }

    Some(format!("## {}\n\n{}", repo.name, sections.join("\n\n")))
}

/// Context documents of every repository, or `None` when nothing was readable
pub async fn collect_context(repos: &[&Repository]) -> Option<String> {
    let mut blocks = Vec::new();

    for repo in repos {
        if let Some(block) = repo_context(repo).await {
            blocks.push(block);
        }
    }

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n\n"))
    }
}
