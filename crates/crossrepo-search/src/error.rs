//! Errors from a single ripgrep invocation

use thiserror::Error;

/// Failure of one search process. Scoped to one repository, never retried.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary} failed ({status}): {stderr}")]
    Exit {
        binary: String,
        /// Exit code, `None` when the process was killed by a signal
        code: Option<i32>,
        status: String,
        stderr: String,
    },

    #[error("Search process has no {0} pipe")]
    MissingPipe(&'static str),

    #[error("Failed to read search output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed search output: {0}")]
    Parse(#[from] serde_json::Error),
}
