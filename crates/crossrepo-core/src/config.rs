//! Registry file schema
//!
//! `repos.yaml` declares the repositories crossrepo may search and the
//! process-wide search settings:
//!
//! ```yaml
//! repositories:
//!   sub-backend:
//!     env_key: SUB_BACKEND_PATH
//!     labels: [backend, api]
//!     description: Billing API
//!     context_files: [README.md, CLAUDE.md]
//!     priority_paths: [src]
//! search:
//!   max_results: 50
//!   context_lines: 3
//!   exclude_patterns: ["*.min.js"]
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Matches reported per file when the registry does not say otherwise
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Context lines requested around each match by default
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Validation failures for a parsed registry file
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Repository name must not be empty")]
    EmptyRepositoryName,

    #[error("Repository \"{0}\" has an empty env_key")]
    EmptyEnvKey(String),

    #[error("search.max_results must be greater than zero")]
    ZeroMaxResults,

    #[error("search.exclude_patterns must not contain empty entries")]
    EmptyExcludePattern,
}

/// Parsed `repos.yaml`
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryFile {
    /// Repositories in declaration order
    #[serde(deserialize_with = "ordered_repositories")]
    pub repositories: Vec<(String, RepoEntry)>,

    /// Search settings (all defaults when the section is omitted)
    #[serde(default)]
    pub search: SearchConfig,
}

/// A single repository declaration
#[derive(Debug, Clone, Deserialize)]
pub struct RepoEntry {
    /// Environment variable holding the checkout path
    pub env_key: String,

    pub labels: Vec<String>,

    pub description: String,

    /// Documentation files returned by `get_repo_context`, relative to the root
    #[serde(default)]
    pub context_files: Vec<String>,

    /// Sub-directories searched when the scope is `priority`
    #[serde(default)]
    pub priority_paths: Vec<String>,
}

/// Process-wide search settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchConfig {
    /// Maximum matches reported per file
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Lines of context requested around each match
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,

    /// Globs excluded from every search
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_context_lines() -> usize {
    DEFAULT_CONTEXT_LINES
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            context_lines: default_context_lines(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == 0 {
            return Err(ConfigError::ZeroMaxResults);
        }
        if self.exclude_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::EmptyExcludePattern);
        }
        Ok(())
    }
}

impl RegistryFile {
    /// Parse and validate registry YAML
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let file: Self = serde_yaml::from_str(content)?;
        file.validate()?;
        Ok(file)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, entry) in &self.repositories {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyRepositoryName);
            }
            if entry.env_key.trim().is_empty() {
                return Err(ConfigError::EmptyEnvKey(name.clone()));
            }
        }
        self.search.validate()
    }
}

/// Deserialize the `repositories` mapping without losing declaration order
fn ordered_repositories<'de, D>(deserializer: D) -> Result<Vec<(String, RepoEntry)>, D::Error>
where
    D: Deserializer<'de>,
{
    let mapping = serde_yaml::Mapping::deserialize(deserializer)?;

    mapping
        .into_iter()
        .map(|(key, value)| {
            let name = match key {
                serde_yaml::Value::String(name) => name,
                other => {
                    return Err(D::Error::custom(format!(
                        "repository names must be strings, got {:?}",
                        other
                    )))
                }
            };
            let entry = serde_yaml::from_value(value)
                .map_err(|e| D::Error::custom(format!("repository \"{}\": {}", name, e)))?;
            Ok((name, entry))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults_when_section_missing() {
        let file = RegistryFile::parse(
            r#"
repositories:
  web:
    env_key: WEB_PATH
    labels: [frontend]
    description: Web client
"#,
        )
        .unwrap();

        assert_eq!(file.search, SearchConfig::default());
        assert_eq!(file.search.max_results, 50);
        assert_eq!(file.search.context_lines, 3);
        assert!(file.search.exclude_patterns.is_empty());

        let (name, entry) = &file.repositories[0];
        assert_eq!(name, "web");
        assert!(entry.context_files.is_empty());
        assert!(entry.priority_paths.is_empty());
    }

    #[test]
    fn test_partial_search_section_fills_defaults() {
        let file = RegistryFile::parse(
            r#"
repositories: {}
search:
  context_lines: 0
"#,
        )
        .unwrap();

        assert_eq!(file.search.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(file.search.context_lines, 0);
    }

    #[test]
    fn test_repositories_keep_declaration_order() {
        let file = RegistryFile::parse(
            r#"
repositories:
  zeta:
    env_key: ZETA
    labels: []
    description: z
  alpha:
    env_key: ALPHA
    labels: []
    description: a
  mid:
    env_key: MID
    labels: []
    description: m
"#,
        )
        .unwrap();

        let names: Vec<&str> = file.repositories.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let result = RegistryFile::parse(
            r#"
repositories:
  web:
    env_key: WEB_PATH
    description: no labels here
"#,
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("web"), "unexpected error: {}", message);
    }

    #[test]
    fn test_validation_errors() {
        let err = RegistryFile::parse(
            r#"
repositories:
  web:
    env_key: ""
    labels: []
    description: x
"#,
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::EmptyEnvKey("web".to_string()))
        );

        let err = RegistryFile::parse("repositories: {}\nsearch:\n  max_results: 0\n").unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::ZeroMaxResults));

        let config = SearchConfig {
            exclude_patterns: vec!["  ".to_string()],
            ..SearchConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyExcludePattern));
    }
}
