//! Resolved repository registry
//!
//! Turns the declarations of `repos.yaml` into [`Repository`] descriptors by
//! looking up each `env_key`. Resolution never fails: a repository whose
//! variable is unset or whose path does not exist is kept with
//! `available = false` so it still shows up in listings.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{RegistryFile, RepoEntry, SearchConfig};
use crate::paths::Paths;

/// A repository as seen by the search tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Unique key from the registry file
    pub name: String,
    /// Checkout root, `None` when the env key is not defined
    pub root: Option<PathBuf>,
    pub labels: Vec<String>,
    pub description: String,
    pub context_files: Vec<String>,
    pub priority_paths: Vec<String>,
    /// Whether `root` exists on disk
    pub available: bool,
}

impl Repository {
    /// Root directory, or the empty path for an unconfigured repository
    pub fn root_dir(&self) -> &Path {
        self.root.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// `rel` resolved under the root. A leading `/` (or drive prefix) is
    /// dropped so `priority_paths: [/src]` still means `<root>/src`.
    pub fn path_in_repo(&self, rel: &str) -> PathBuf {
        let rel: PathBuf = Path::new(rel)
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        self.root_dir().join(rel)
    }

    pub fn has_any_label(&self, labels: &[String]) -> bool {
        labels.iter().any(|l| self.labels.contains(l))
    }
}

/// Every configured repository plus the search settings
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Repositories in registry file order
    pub repos: Vec<Repository>,
    pub search: SearchConfig,
}

impl Registry {
    /// Load a registry file, seeding the environment from `env_file` (or the
    /// `.env` next to the registry) first.
    pub fn load(registry_file: &Path, env_file: Option<&Path>) -> Result<Self> {
        let content = std::fs::read_to_string(registry_file)
            .with_context(|| format!("Failed to read registry from {:?}", registry_file))?;
        let file = RegistryFile::parse(&content)
            .with_context(|| format!("Invalid registry file {:?}", registry_file))?;

        let env_path = env_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Paths::env_file(registry_file));
        load_env_file(&env_path);

        let registry = Self::resolve(file, |key| std::env::var(key).ok());
        info!(
            "Loaded {} repositories ({} available) from {:?}",
            registry.repos.len(),
            registry.available_count(),
            registry_file
        );
        Ok(registry)
    }

    /// Resolve declarations using `lookup` for environment variables
    pub fn resolve<F>(file: RegistryFile, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let repos = file
            .repositories
            .into_iter()
            .map(|(name, entry)| resolve_repository(name, entry, &lookup))
            .collect();

        Self {
            repos,
            search: file.search,
        }
    }

    /// Look up a repository by name, available or not
    pub fn find(&self, name: &str) -> Option<&Repository> {
        self.repos.iter().find(|r| r.name == name)
    }

    pub fn available_count(&self) -> usize {
        self.repos.iter().filter(|r| r.available).count()
    }
}

fn resolve_repository<F>(name: String, entry: RepoEntry, lookup: &F) -> Repository
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(&entry.env_key).filter(|v| !v.trim().is_empty());

    let (root, available) = match raw {
        None => {
            warn!("env_key \"{}\" is not defined for {}", entry.env_key, name);
            (None, false)
        }
        Some(raw) => {
            let path = PathBuf::from(shellexpand::tilde(raw.trim()).into_owned());
            let exists = path.exists();
            if !exists {
                warn!("Path not found for {}: {}", name, path.display());
            }
            (Some(path), exists)
        }
    };

    Repository {
        name,
        root,
        labels: entry.labels,
        description: entry.description,
        context_files: entry.context_files,
        priority_paths: entry.priority_paths,
        available,
    }
}

/// Merge a `.env` file into the process environment. Existing variables win.
fn load_env_file(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => debug!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => debug!("No env file at {:?}", path),
        Err(e) => warn!("Failed to load env file {:?}: {}", path, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn registry_yaml() -> &'static str {
        r#"
repositories:
  web:
    env_key: WEB_PATH
    labels: [frontend]
    description: Web client
    context_files: [README.md]
  api:
    env_key: API_PATH
    labels: [backend]
    description: API server
    priority_paths: [src]
  ghost:
    env_key: GHOST_PATH
    labels: [backend]
    description: Never checked out
"#
    }

    #[test]
    fn test_resolve_marks_unavailable_repositories() -> Result<()> {
        let tmp = TempDir::new()?;
        let web = tmp.path().join("web");
        std::fs::create_dir(&web)?;

        let mut env = HashMap::new();
        env.insert("WEB_PATH", web.to_string_lossy().to_string());
        env.insert("API_PATH", tmp.path().join("missing").to_string_lossy().to_string());

        let file = RegistryFile::parse(registry_yaml())?;
        let registry = Registry::resolve(file, |k| env.get(k).cloned());

        let names: Vec<&str> = registry.repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["web", "api", "ghost"]);

        let web_repo = registry.find("web").unwrap();
        assert!(web_repo.available);
        assert_eq!(web_repo.root.as_deref(), Some(web.as_path()));
        assert_eq!(web_repo.context_files, vec!["README.md".to_string()]);

        let api = registry.find("api").unwrap();
        assert!(!api.available);
        assert!(api.root.is_some());

        let ghost = registry.find("ghost").unwrap();
        assert!(!ghost.available);
        assert!(ghost.root.is_none());
        assert_eq!(ghost.root_dir(), Path::new(""));

        assert_eq!(registry.available_count(), 1);
        Ok(())
    }

    #[test]
    fn test_blank_env_value_counts_as_undefined() -> Result<()> {
        let file = RegistryFile::parse(registry_yaml())?;
        let registry = Registry::resolve(file, |_| Some("   ".to_string()));
        assert!(registry.repos.iter().all(|r| r.root.is_none() && !r.available));
        Ok(())
    }

    #[test]
    fn test_load_reads_env_file_next_to_registry() -> Result<()> {
        let tmp = TempDir::new()?;
        let checkout = tmp.path().join("checkout");
        std::fs::create_dir(&checkout)?;

        let registry_path = tmp.path().join("repos.yaml");
        std::fs::write(
            &registry_path,
            r#"
repositories:
  only:
    env_key: CROSSREPO_TEST_REGISTRY_LOAD_ONLY
    labels: []
    description: loaded through .env
search:
  max_results: 10
"#,
        )?;
        std::fs::write(
            tmp.path().join(".env"),
            format!("CROSSREPO_TEST_REGISTRY_LOAD_ONLY={}\n", checkout.display()),
        )?;

        let registry = Registry::load(&registry_path, None)?;
        let only = registry.find("only").unwrap();
        assert!(only.available);
        assert_eq!(only.root.as_deref(), Some(checkout.as_path()));
        assert_eq!(registry.search.max_results, 10);
        Ok(())
    }

    #[test]
    fn test_env_file_does_not_override_process_env() -> Result<()> {
        let tmp = TempDir::new()?;
        let env_file = tmp.path().join(".env");
        std::fs::write(
            &env_file,
            "CROSSREPO_TEST_ENV_PRESET=from-file\nCROSSREPO_TEST_ENV_FILLED=from-file\n",
        )?;
        std::env::set_var("CROSSREPO_TEST_ENV_PRESET", "from-process");

        load_env_file(&env_file);

        assert_eq!(std::env::var("CROSSREPO_TEST_ENV_PRESET")?, "from-process");
        assert_eq!(std::env::var("CROSSREPO_TEST_ENV_FILLED")?, "from-file");
        Ok(())
    }

    #[test]
    fn test_load_missing_registry_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = Registry::load(&tmp.path().join("nope.yaml"), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read registry"));
    }

    #[test]
    fn test_path_in_repo_stays_under_root() {
        let repo = Repository {
            name: "api".to_string(),
            root: Some(PathBuf::from("/work/api")),
            labels: vec![],
            description: String::new(),
            context_files: vec![],
            priority_paths: vec![],
            available: true,
        };
        assert_eq!(repo.path_in_repo("src"), PathBuf::from("/work/api/src"));
        assert_eq!(repo.path_in_repo("/src"), PathBuf::from("/work/api/src"));
        assert_eq!(repo.path_in_repo("/docs/arch.md"), PathBuf::from("/work/api/docs/arch.md"));
        assert_eq!(repo.path_in_repo("/"), PathBuf::from("/work/api"));
    }

    #[test]
    fn test_has_any_label() {
        let repo = Repository {
            name: "api".to_string(),
            root: None,
            labels: vec!["backend".to_string(), "go".to_string()],
            description: String::new(),
            context_files: vec![],
            priority_paths: vec![],
            available: false,
        };
        assert!(repo.has_any_label(&["frontend".to_string(), "go".to_string()]));
        assert!(!repo.has_any_label(&["frontend".to_string()]));
        assert!(!repo.has_any_label(&[]));
    }
}
