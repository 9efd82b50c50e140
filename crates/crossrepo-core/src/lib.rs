//! Crossrepo Core - repository registry shared by the crossrepo tools
//!
//! Loads `repos.yaml`, resolves each repository's checkout path from the
//! environment (optionally seeded from a `.env` file) and exposes the result
//! as an immutable [`Registry`].

pub mod config;
pub mod paths;
pub mod registry;

pub use config::{ConfigError, RegistryFile, RepoEntry, SearchConfig};
pub use paths::Paths;
pub use registry::{Registry, Repository};
