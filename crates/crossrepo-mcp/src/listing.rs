//! `list_repos` report

use crossrepo_core::Repository;

/// Status report of every configured repository, in registry order
pub fn format_listing(repos: &[Repository]) -> String {
    let mut lines = vec!["## Configured Repositories".to_string(), String::new()];

    for repo in repos {
        if repo.labels.is_empty() {
            lines.push(format!("- {}", repo.name));
        } else {
            lines.push(format!("- {} [{}]", repo.name, repo.labels.join(", ")));
        }

        let path = repo
            .root
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not configured)".to_string());
        lines.push(format!("  Path: {}", path));
        lines.push(format!("  Description: {}", repo.description));

        if !repo.priority_paths.is_empty() {
            lines.push(format!("  Priority paths: {}", repo.priority_paths.join(", ")));
        }
        if !repo.context_files.is_empty() {
            lines.push(format!("  Context files: {}", repo.context_files.join(", ")));
        }

        let status = if repo.available {
            "✓ available"
        } else {
            "✗ path not found"
        };
        lines.push(format!("  Status: {}", status));
        lines.push(String::new());
    }

    lines.join("\n")
}
