//! Tool Handler
//!
//! Validates tool arguments and runs the matching cross-repository search.

use crossrepo_core::Registry;
use crossrepo_search::{
    apply_method_filter, format_results, patterns, report, search_concurrent, search_each,
    select_dependency_targets, select_repos, Ripgrep, SearchOptions, SearchScope,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::context::collect_context;
use crate::listing::format_listing;
use crate::protocol::ToolResult;

pub const NO_MATCHING_REPOS: &str = "No matching repositories found.";
pub const NO_CONTEXT_FILES: &str = "No context files found.";
pub const NO_TARGET_REPOS: &str = "No target repositories available.";

/// Errors reported back to the client as `Invalid params`
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: &'static str, message: String },
}

fn invalid(tool: &'static str, message: impl Into<String>) -> ToolError {
    ToolError::InvalidArguments {
        tool,
        message: message.into(),
    }
}

/// Deserialize a tool's arguments and check them
fn parse_args<T>(tool: &'static str, arguments: Map<String, Value>) -> Result<T, ToolError>
where
    T: DeserializeOwned + Validate,
{
    let args: T = serde_json::from_value(Value::Object(arguments)).map_err(|e| invalid(tool, e.to_string()))?;
    args.validate().map_err(|message| invalid(tool, message))?;
    Ok(args)
}

fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(())
    }
}

trait Validate {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct GetRepoContextArgs {
    pub repos: Option<Vec<String>>,
    pub labels: Option<Vec<String>>,
}

impl Validate for GetRepoContextArgs {}

#[derive(Debug, Deserialize)]
pub struct SearchCodeArgs {
    pub query: String,
    pub repos: Option<Vec<String>>,
    pub labels: Option<Vec<String>>,
    pub glob: Option<String>,
    #[serde(default)]
    pub scope: SearchScope,
}

impl Validate for SearchCodeArgs {}

#[derive(Debug, Deserialize)]
pub struct FindApiCallersArgs {
    pub path: String,
    pub method: Option<String>,
    pub repos: Option<Vec<String>>,
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub scope: SearchScope,
}

impl Validate for FindApiCallersArgs {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("path", &self.path)
    }
}

#[derive(Debug, Deserialize)]
pub struct FindCrossRepoDependenciesArgs {
    pub source_repo: String,
    pub target_repos: Option<Vec<String>>,
    pub path: Option<String>,
    #[serde(default)]
    pub scope: SearchScope,
}

impl Validate for FindCrossRepoDependenciesArgs {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("source_repo", &self.source_repo)
    }
}

/// Everything a tool call needs: the resolved registry and the search engine
#[derive(Debug, Clone)]
pub struct App {
    pub registry: Registry,
    pub engine: Ripgrep,
}

impl App {
    pub fn new(registry: Registry, engine: Ripgrep) -> Self {
        Self { registry, engine }
    }

    /// Handle a tool call by name
    pub async fn handle_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<ToolResult, ToolError> {
        debug!("Tool {} arguments: {:?}", name, arguments);

        let text = match name {
            "list_repos" => format_listing(&self.registry.repos),
            "get_repo_context" => self.get_repo_context(parse_args("get_repo_context", arguments)?).await,
            "search_code" => {
                let args: SearchCodeArgs = parse_args("search_code", arguments)?;
                self.check_query(&args.query)?;
                self.search_code(args).await
            }
            "find_api_callers" => self.find_api_callers(parse_args("find_api_callers", arguments)?).await,
            "find_cross_repo_dependencies" => {
                self.find_cross_repo_dependencies(parse_args("find_cross_repo_dependencies", arguments)?)
                    .await
            }
            _ => return Err(ToolError::UnknownTool(name.to_string())),
        };

        Ok(ToolResult::text(text))
    }

    /// Reject queries ripgrep's default engine cannot parse. With PCRE2 in
    /// play the syntax is wider, so a bad pattern is left to ripgrep.
    fn check_query(&self, query: &str) -> Result<(), ToolError> {
        if self.engine.may_use_pcre2() {
            return Ok(());
        }
        regex::Regex::new(query)
            .map(|_| ())
            .map_err(|e| invalid("search_code", format!("query is not a valid regex: {}", e)))
    }

    async fn get_repo_context(&self, args: GetRepoContextArgs) -> String {
        let repos = select_repos(&self.registry.repos, args.repos.as_deref(), args.labels.as_deref());
        if repos.is_empty() {
            return NO_MATCHING_REPOS.to_string();
        }

        collect_context(&repos)
            .await
            .unwrap_or_else(|| NO_CONTEXT_FILES.to_string())
    }

    async fn search_code(&self, args: SearchCodeArgs) -> String {
        let repos = select_repos(&self.registry.repos, args.repos.as_deref(), args.labels.as_deref());
        if repos.is_empty() {
            return NO_MATCHING_REPOS.to_string();
        }

        let pattern = patterns::join_alternatives(&patterns::plain_patterns(&args.query));
        let options = SearchOptions {
            scope: args.scope,
            glob: args.glob.filter(|g| !g.is_empty()),
        };

        info!("search_code {:?} in {} repositories ({})", pattern, repos.len(), args.scope);
        let results = search_each(&self.engine, &repos, &pattern, &self.registry.search, &options).await;
        format_results(&results)
    }

    async fn find_api_callers(&self, args: FindApiCallersArgs) -> String {
        let repos = select_repos(&self.registry.repos, args.repos.as_deref(), args.labels.as_deref());
        if repos.is_empty() {
            return NO_MATCHING_REPOS.to_string();
        }

        let pattern = patterns::join_alternatives(&patterns::api_caller_patterns(&args.path));
        let options = SearchOptions {
            scope: args.scope,
            glob: None,
        };

        info!("find_api_callers {:?} in {} repositories ({})", args.path, repos.len(), args.scope);
        let mut results = search_each(&self.engine, &repos, &pattern, &self.registry.search, &options).await;

        if let Some(method) = args.method.filter(|m| !m.is_empty()) {
            results = results
                .into_iter()
                .map(|result| apply_method_filter(result, &method))
                .collect();
        }

        format_results(&results)
    }

    async fn find_cross_repo_dependencies(&self, args: FindCrossRepoDependenciesArgs) -> String {
        let source = match self.registry.find(&args.source_repo).filter(|r| r.available) {
            Some(repo) => repo,
            None => return format!("Source repository \"{}\" not found or unavailable.", args.source_repo),
        };

        let targets = select_dependency_targets(&self.registry.repos, &source.name, args.target_repos.as_deref());
        if targets.is_empty() {
            return NO_TARGET_REPOS.to_string();
        }

        let pattern = patterns::join_alternatives(&patterns::dependency_patterns(&source.name, args.path.as_deref()));
        let options = SearchOptions {
            scope: args.scope,
            glob: None,
        };

        info!("find_cross_repo_dependencies on {} in {} repositories ({})", source.name, targets.len(), args.scope);
        let results = search_concurrent(&self.engine, &targets, &pattern, &self.registry.search, &options).await;

        if report::total_matches(&results) == 0 {
            return format!("No dependencies from \"{}\" found in target repositories.", source.name);
        }

        format!(
            "Dependencies from \"{}\" found in target repositories:\n\n{}",
            source.name,
            format_results(&results)
        )
    }
}
