//! Repository selection
//!
//! Unavailable repositories are never selected, whatever the filters say.

use crossrepo_core::Repository;

/// Select available repositories by name or label.
///
/// With neither filter every available repository is returned. Otherwise a
/// repository qualifies when its name is listed OR it carries any listed
/// label. A filter that is present but empty matches nothing.
pub fn select_repos<'a>(
    all: &'a [Repository],
    names: Option<&[String]>,
    labels: Option<&[String]>,
) -> Vec<&'a Repository> {
    let available = all.iter().filter(|r| r.available);

    if names.is_none() && labels.is_none() {
        return available.collect();
    }

    available
        .filter(|repo| {
            let by_name = names.map_or(false, |n| n.contains(&repo.name));
            let by_label = labels.map_or(false, |l| repo.has_any_label(l));
            by_name || by_label
        })
        .collect()
}

/// Select the repositories to scan for references to `source`.
///
/// The source itself is always excluded. A non-empty `targets` list
/// restricts the selection strictly by name; otherwise every other
/// available repository is a target.
pub fn select_dependency_targets<'a>(
    all: &'a [Repository],
    source: &str,
    targets: Option<&[String]>,
) -> Vec<&'a Repository> {
    let candidates = all.iter().filter(|r| r.available && r.name != source);

    match targets {
        Some(names) if !names.is_empty() => candidates.filter(|r| names.contains(&r.name)).collect(),
        _ => candidates.collect(),
    }
}
