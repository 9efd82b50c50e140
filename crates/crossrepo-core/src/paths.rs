//! Standard paths used by crossrepo

use std::path::{Path, PathBuf};

/// Environment variable that overrides the registry file location
pub const CONFIG_ENV: &str = "CROSSREPO_CONFIG";

/// Registry file name, both in the working directory and the config dir
pub const REGISTRY_FILE: &str = "repos.yaml";

/// Standard crossrepo paths
pub struct Paths {
    /// Config directory (~/.config/crossrepo)
    pub config: PathBuf,
    /// Working directory the server was started from
    pub cwd: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("crossrepo");

        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Self { config, cwd }
    }

    /// Locate the registry file.
    ///
    /// Order: explicit path, `CROSSREPO_CONFIG`, `./repos.yaml`, then
    /// `~/.config/crossrepo/repos.yaml`. The last candidate is returned even
    /// when it does not exist so the caller can report it.
    pub fn registry_file(&self, explicit: Option<&Path>) -> PathBuf {
        self.locate_registry(explicit, std::env::var(CONFIG_ENV).ok())
    }

    fn locate_registry(&self, explicit: Option<&Path>, from_env: Option<String>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        if let Some(path) = from_env.filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }

        let local = self.cwd.join(REGISTRY_FILE);
        if local.exists() {
            return local;
        }

        self.config.join(REGISTRY_FILE)
    }

    /// The `.env` file that accompanies a registry file
    pub fn env_file(registry_file: &Path) -> PathBuf {
        registry_file
            .parent()
            .map(|dir| dir.join(".env"))
            .unwrap_or_else(|| PathBuf::from(".env"))
    }
}
