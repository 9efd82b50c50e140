//! Crossrepo Tool Definitions
//!
//! The tools advertised through `tools/list`.

use serde_json::{json, Value};

use crate::protocol::{InputSchema, Tool};

/// Create a tool definition with the given name, description, and schema properties
fn tool(name: &str, description: &str, properties: Value, required: Vec<&str>) -> Tool {
    let props = properties.as_object().cloned().unwrap_or_default();
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: InputSchema {
            schema_type: "object".to_string(),
            properties: props,
            required: required.into_iter().map(|s| s.to_string()).collect(),
        },
    }
}

fn repos_property(description: &str) -> Value {
    json!({"type": "array", "items": {"type": "string"}, "description": description})
}

fn labels_property() -> Value {
    json!({
        "type": "array",
        "items": {"type": "string"},
        "description": "Select repositories carrying any of these labels (e.g. ['backend'])"
    })
}

fn scope_property() -> Value {
    json!({
        "type": "string",
        "enum": ["priority", "full"],
        "default": "priority",
        "description": "priority = only the repository's priority paths, full = the whole checkout"
    })
}

/// Get all crossrepo tools
pub fn all_tools() -> Vec<Tool> {
    vec![
        tool(
            "list_repos",
            "List configured repositories with their labels, paths, priority paths and availability.",
            json!({}),
            vec![],
        ),
        tool(
            "get_repo_context",
            "Fetch context documents (README.md, CLAUDE.md, ...) of repositories. Use before cross-repo searches to learn how each project is laid out. Filter with repos/labels.",
            json!({
                "repos": repos_property("Repository names"),
                "labels": labels_property()
            }),
            vec![],
        ),
        tool(
            "search_code",
            "Regex search across repositories. Filter with repos/labels (either one matches). scope chooses priority paths (default) or the whole checkout.",
            json!({
                "query": {"type": "string", "description": "Regular expression to search for"},
                "repos": repos_property("Repository names to search"),
                "labels": labels_property(),
                "glob": {"type": "string", "description": "File glob to restrict the search (e.g. '*.ts', '*.tf')"},
                "scope": scope_property()
            }),
            vec!["query"],
        ),
        tool(
            "find_api_callers",
            "Find call sites of an API endpoint (fetch, axios and other HTTP clients) across repositories. Path parameters like ':id' also match interpolated calls. method narrows to one HTTP method.",
            json!({
                "path": {"type": "string", "description": "API path (e.g. '/api/v1/users/:id')"},
                "method": {"type": "string", "description": "HTTP method (e.g. 'GET', 'POST')"},
                "repos": repos_property("Repository names to search"),
                "labels": labels_property(),
                "scope": scope_property()
            }),
            vec!["path"],
        ),
        tool(
            "find_cross_repo_dependencies",
            "Find references to source_repo from other repositories (kebab, snake, camel, pascal and constant spellings of its name). path adds a keyword such as an endpoint, module or function name for sharper results.",
            json!({
                "source_repo": {"type": "string", "description": "Repository whose dependents to find"},
                "target_repos": repos_property("Repositories to scan (default: every other available repository)"),
                "path": {"type": "string", "description": "Extra keyword to search for (path, module or function name)"},
                "scope": scope_property()
            }),
            vec!["source_repo"],
        ),
    ]
}
