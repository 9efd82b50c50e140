//! Pattern synthesis
//!
//! Each query intent becomes a non-empty list of regex alternatives that
//! [`join_alternatives`] folds into the single pattern handed to ripgrep.

use regex::Regex;
use std::sync::OnceLock;

/// Characters that must be escaped to match literally
const REGEX_META: &[char] = &['.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\'];

/// Names this short are too noisy to search for their naming variants
const MIN_VARIANT_NAME_LEN: usize = 4;

/// Escape regex metacharacters so `literal` matches itself
pub fn escape_regex(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if REGEX_META.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Remove `/:param` segments, e.g. `/users/:id/posts` -> `/users/posts`
pub fn strip_path_params(path: &str) -> String {
    static PARAM: OnceLock<Regex> = OnceLock::new();
    let param = PARAM.get_or_init(|| Regex::new(r"/:[^/]+").expect("path parameter regex is valid"));
    param.replace_all(path, "").into_owned()
}

/// Join alternatives into one pattern
pub fn join_alternatives(alternatives: &[String]) -> String {
    alternatives.join("|")
}

/// A plain search is already a regex and passes through untouched
pub fn plain_patterns(query: &str) -> Vec<String> {
    vec![query.to_string()]
}

/// Patterns locating callers of an API path.
///
/// The literal path comes first. When the path has `/:param` segments the
/// path without them follows, for callers that interpolate the parameter
/// (`` `/api/v1/users/${id}` ``).
pub fn api_caller_patterns(api_path: &str) -> Vec<String> {
    let mut patterns = vec![escape_regex(api_path)];

    let without_params = strip_path_params(api_path);
    if without_params != api_path {
        patterns.push(escape_regex(&without_params));
    }

    patterns
}

/// Naming-convention variants of a kebab-case name:
/// `sub-backend`, `sub_backend`, `subBackend`, `SubBackend`, `SUB_BACKEND`.
/// Duplicates are dropped, first occurrence wins.
pub fn name_variants(name: &str) -> Vec<String> {
    let snake = name.replace('-', "_");

    let camel: String = name
        .split('-')
        .enumerate()
        .map(|(i, part)| if i == 0 { part.to_string() } else { capitalize(part) })
        .collect();

    let pascal: String = name.split('-').map(capitalize).collect();

    let upper_snake = snake.to_uppercase();

    let mut variants: Vec<String> = Vec::with_capacity(5);
    for candidate in [name.to_string(), snake, camel, pascal, upper_snake] {
        let escaped = escape_regex(&candidate);
        if !variants.contains(&escaped) {
            variants.push(escaped);
        }
    }
    variants
}

/// Patterns locating references to `source_name` from other repositories.
///
/// Names longer than three characters contribute their naming variants; an
/// extra keyword contributes itself and its param-stripped form. When neither
/// applies the bare name is searched.
pub fn dependency_patterns(source_name: &str, keyword: Option<&str>) -> Vec<String> {
    let mut patterns = Vec::new();

    if source_name.chars().count() >= MIN_VARIANT_NAME_LEN {
        patterns.extend(name_variants(source_name));
    }

    if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
        patterns.push(escape_regex(keyword));

        let without_params = strip_path_params(keyword);
        if without_params != keyword {
            patterns.push(escape_regex(&without_params));
        }
    }

    if patterns.is_empty() {
        patterns.push(escape_regex(source_name));
    }

    patterns
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
