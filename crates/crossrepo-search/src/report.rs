//! Result filtering and rendering

use crate::engine::Match;
use crate::orchestrator::RepoSearchResult;

/// Returned by [`format_results`] when nothing matched anywhere
pub const NO_MATCHES: &str = "No matches found.";

/// Total matches across all repositories
pub fn total_matches(results: &[RepoSearchResult]) -> usize {
    results.iter().map(|r| r.matches.len()).sum()
}

/// Render results grouped by repository.
///
/// Repositories without matches are left out; matches keep ripgrep's order.
pub fn format_results(results: &[RepoSearchResult]) -> String {
    if total_matches(results) == 0 {
        return NO_MATCHES.to_string();
    }

    results
        .iter()
        .filter(|r| !r.matches.is_empty())
        .map(|r| {
            let mut section = format!("## {} ({} matches)", r.repo_name, r.matches.len());
            for m in &r.matches {
                section.push_str(&format!("\n{}:{}: {}", m.relative_path, m.line_number, m.line_text));
            }
            section
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fragments that mark a line as using `method`: `GET`, `get`, `.get(`,
/// `method: 'GET'` and `method: "GET"`.
fn method_markers(method: &str) -> [String; 5] {
    let upper = method.to_uppercase();
    let lower = method.to_lowercase();
    [
        format!("method: '{}'", upper),
        format!("method: \"{}\"", upper),
        format!(".{}(", lower),
        upper,
        lower,
    ]
}

/// Matches whose line mentions the HTTP method
pub fn filter_by_method(matches: &[Match], method: &str) -> Vec<Match> {
    let markers = method_markers(method);
    matches
        .iter()
        .filter(|m| markers.iter().any(|marker| m.line_text.contains(marker.as_str())))
        .cloned()
        .collect()
}

/// Narrow a repository's matches to `method`.
///
/// The method often sits on a neighbouring line, so a filter that would
/// remove every match is dropped and the unfiltered matches are kept.
pub fn apply_method_filter(mut result: RepoSearchResult, method: &str) -> RepoSearchResult {
    if result.matches.is_empty() {
        return result;
    }

    let filtered = filter_by_method(&result.matches, method);
    if !filtered.is_empty() {
        result.matches = filtered;
    }
    result
}
