//! Ripgrep process driver
//!
//! Runs `rg --json` over a set of roots and keeps only the `match` records of
//! its output stream. Exit code 1 ("nothing found") is a success.

use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::error::SearchError;

/// Binary used when none is configured
pub const DEFAULT_BINARY: &str = "rg";

/// One ripgrep invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Regex handed to ripgrep verbatim
    pub pattern: String,
    /// Directories to search, never empty
    pub roots: Vec<PathBuf>,
    /// Inclusion glob, e.g. `*.ts`
    pub glob: Option<String>,
    pub context_lines: usize,
    /// `--max-count`: matches reported per file
    pub max_count: usize,
    /// Globs excluded from the search
    pub exclude_globs: Vec<String>,
}

impl SearchRequest {
    /// Command-line arguments in ripgrep's expected order
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--json".into(), "--no-heading".into()];

        if self.context_lines > 0 {
            args.push("--context".into());
            args.push(self.context_lines.to_string().into());
        }

        args.push("--max-count".into());
        args.push(self.max_count.to_string().into());

        for exclude in &self.exclude_globs {
            args.push("--glob".into());
            args.push(format!("!{}", exclude).into());
        }

        if let Some(glob) = &self.glob {
            args.push("--glob".into());
            args.push(glob.into());
        }

        args.push("--".into());
        args.push(self.pattern.as_str().into());
        args.extend(self.roots.iter().map(|r| r.as_os_str().to_os_string()));

        args
    }
}

/// A matched line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Path as reported by ripgrep
    pub absolute_path: PathBuf,
    /// Path relative to the repository root, filled in by the orchestrator
    pub relative_path: String,
    pub line_number: u64,
    /// Line content without trailing whitespace
    pub line_text: String,
    pub submatches: Vec<Submatch>,
}

/// Byte range of one pattern hit inside a matched line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Handle on the ripgrep binary
#[derive(Debug, Clone)]
pub struct Ripgrep {
    binary: PathBuf,
    /// Arguments placed before the generated ones (e.g. `--hidden`)
    extra_args: Vec<String>,
}

impl Default for Ripgrep {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl Ripgrep {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Whether the extra arguments can switch ripgrep to PCRE2, which accepts
    /// syntax (look-around, backreferences) the default engine rejects
    pub fn may_use_pcre2(&self) -> bool {
        self.extra_args.iter().enumerate().any(|(i, arg)| match arg.as_str() {
            "-P" | "--pcre2" | "--auto-hybrid-regex" => true,
            "--engine" => self.extra_args.get(i + 1).map_or(true, |v| v != "default"),
            other => other.strip_prefix("--engine=").map_or(false, |v| v != "default"),
        })
    }

    /// Run one search and collect its matches in ripgrep's traversal order.
    ///
    /// Any exit code other than 0 or 1 is an error carrying ripgrep's stderr.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Match>, SearchError> {
        let binary = self.binary.display().to_string();
        let args = request.args();

        debug!("Running {} {:?} {:?}", binary, self.extra_args, args);

        let mut child = Command::new(&self.binary)
            .args(&self.extra_args)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SearchError::Spawn {
                binary: binary.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(SearchError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(SearchError::MissingPipe("stderr"))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Err(e) = BufReader::new(stderr).read_to_end(&mut buf).await {
                debug!("Failed to read stderr: {}", e);
            }
            String::from_utf8_lossy(&buf).into_owned()
        });

        let mut matches = Vec::new();
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(m) = parse_line(&line)? {
                matches.push(m);
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();

        match status.code() {
            Some(0) | Some(1) => Ok(matches),
            code => Err(SearchError::Exit {
                binary,
                code,
                status: describe_status(&status),
                stderr: stderr.trim().to_string(),
            }),
        }
    }
}

fn describe_status(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// A line of `rg --json` output
#[derive(Deserialize)]
struct RgMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct RgMatch {
    path: RgText,
    lines: RgText,
    line_number: Option<u64>,
    #[serde(default)]
    submatches: Vec<RgSubmatch>,
}

/// Ripgrep sends `text` for UTF-8 data and base64 `bytes` otherwise
#[derive(Deserialize)]
struct RgText {
    text: Option<String>,
}

#[derive(Deserialize)]
struct RgSubmatch {
    #[serde(rename = "match")]
    matched: RgText,
    start: usize,
    end: usize,
}

/// Parse one output line. Non-match records yield `None`.
pub(crate) fn parse_line(line: &str) -> Result<Option<Match>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let message: RgMessage = serde_json::from_str(line)?;
    if message.kind != "match" {
        return Ok(None);
    }

    let data: RgMatch = serde_json::from_value(message.data)?;
    let (Some(path), Some(text), Some(line_number)) = (data.path.text, data.lines.text, data.line_number)
    else {
        debug!("Skipping match record without UTF-8 path, text or line number");
        return Ok(None);
    };

    Ok(Some(Match {
        absolute_path: PathBuf::from(path),
        relative_path: String::new(),
        line_number,
        line_text: text.trim_end().to_string(),
        submatches: data
            .submatches
            .into_iter()
            .map(|s| Submatch {
                text: s.matched.text.unwrap_or_default(),
                start: s.start,
                end: s.end,
            })
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_engine, match_line, script_engine};
    use tempfile::TempDir;

    fn request(roots: Vec<PathBuf>) -> SearchRequest {
        SearchRequest {
            pattern: "fetchUser".to_string(),
            roots,
            glob: None,
            context_lines: 0,
            max_count: 50,
            exclude_globs: vec![],
        }
    }

    fn args_of(request: &SearchRequest) -> Vec<String> {
        request
            .args()
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_args_full_order() {
        let req = SearchRequest {
            pattern: "a|b".to_string(),
            roots: vec![PathBuf::from("/r/src"), PathBuf::from("/r/lib")],
            glob: Some("*.ts".to_string()),
            context_lines: 3,
            max_count: 20,
            exclude_globs: vec!["node_modules".to_string(), "*.min.js".to_string()],
        };

        assert_eq!(
            args_of(&req),
            vec![
                "--json", "--no-heading", "--context", "3", "--max-count", "20", "--glob",
                "!node_modules", "--glob", "!*.min.js", "--glob", "*.ts", "--", "a|b", "/r/src",
                "/r/lib",
            ]
        );
    }

    #[test]
    fn test_args_omit_zero_context_and_missing_glob() {
        let req = request(vec![PathBuf::from("/r")]);
        assert_eq!(
            args_of(&req),
            vec!["--json", "--no-heading", "--max-count", "50", "--", "fetchUser", "/r"]
        );
    }

    #[test]
    fn test_parse_keeps_only_match_records() {
        let begin = r#"{"type":"begin","data":{"path":{"text":"/r/a.ts"}}}"#;
        let context = r#"{"type":"context","data":{"path":{"text":"/r/a.ts"},"lines":{"text":"ctx\n"},"line_number":1,"absolute_offset":0,"submatches":[]}}"#;
        let summary = r#"{"type":"summary","data":{"elapsed_total":{"secs":0,"nanos":1}}}"#;

        assert!(parse_line(begin).unwrap().is_none());
        assert!(parse_line(context).unwrap().is_none());
        assert!(parse_line(summary).unwrap().is_none());
        assert!(parse_line("   ").unwrap().is_none());

        let m = parse_line(&match_line("/r/a.ts", 7, "  const u = fetchUser(id);   \n", "fetchUser", 12))
            .unwrap()
            .unwrap();
        assert_eq!(m.absolute_path, PathBuf::from("/r/a.ts"));
        assert_eq!(m.relative_path, "");
        assert_eq!(m.line_number, 7);
        assert_eq!(m.line_text, "  const u = fetchUser(id);");
        assert_eq!(
            m.submatches,
            vec![Submatch {
                text: "fetchUser".to_string(),
                start: 12,
                end: 21
            }]
        );
    }

    #[test]
    fn test_parse_skips_non_utf8_paths() {
        let line = r#"{"type":"match","data":{"path":{"bytes":"L3IvYQ=="},"lines":{"text":"x\n"},"line_number":1,"absolute_offset":0,"submatches":[]}}"#;
        assert!(parse_line(line).unwrap().is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_line("not json").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_search_collects_matches() {
        let tmp = TempDir::new().unwrap();
        let stdout = [
            r#"{"type":"begin","data":{"path":{"text":"/r/a.ts"}}}"#.to_string(),
            match_line("/r/a.ts", 1, "first\n", "first", 0),
            match_line("/r/b.ts", 9, "second\n", "second", 0),
            r#"{"type":"end","data":{"path":{"text":"/r/b.ts"}}}"#.to_string(),
        ]
        .join("\n");
        let engine = fake_engine(tmp.path(), &stdout, "", 0);

        let matches = engine.search(&request(vec![tmp.path().to_path_buf()])).await.unwrap();
        let lines: Vec<(&str, u64)> = matches.iter().map(|m| (m.line_text.as_str(), m.line_number)).collect();
        assert_eq!(lines, vec![("first", 1), ("second", 9)]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_one_is_empty_success() {
        let tmp = TempDir::new().unwrap();
        let engine = fake_engine(tmp.path(), "", "", 1);

        let matches = engine.search(&request(vec![tmp.path().to_path_buf()])).await.unwrap();
        assert!(matches.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_two_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let engine = fake_engine(tmp.path(), "", "regex parse error", 2);

        let err = engine.search(&request(vec![tmp.path().to_path_buf()])).await.unwrap_err();
        match err {
            SearchError::Exit { code, stderr, .. } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "regex parse error");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_stderr_is_kept() {
        let tmp = TempDir::new().unwrap();
        let engine = script_engine(tmp.path(), "printf 'cannot open /r/\\377.ts\\n' >&2\nexit 2\n");

        let err = engine.search(&request(vec![tmp.path().to_path_buf()])).await.unwrap_err();
        match err {
            SearchError::Exit { stderr, .. } => {
                assert!(stderr.starts_with("cannot open /r/"), "{:?}", stderr);
                assert!(stderr.contains('\u{FFFD}'));
                assert!(stderr.ends_with(".ts"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_may_use_pcre2() {
        let with = |args: &[&str]| Ripgrep::default().with_args(args.iter().map(|a| a.to_string()).collect());

        assert!(!Ripgrep::default().may_use_pcre2());
        assert!(!with(&["--hidden", "--engine=default"]).may_use_pcre2());
        assert!(!with(&["--engine", "default"]).may_use_pcre2());
        assert!(with(&["--pcre2"]).may_use_pcre2());
        assert!(with(&["--hidden", "-P"]).may_use_pcre2());
        assert!(with(&["--engine=pcre2"]).may_use_pcre2());
        assert!(with(&["--engine", "auto"]).may_use_pcre2());
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error() {
        let engine = Ripgrep::new("/nonexistent/crossrepo-test-rg");
        let err = engine.search(&request(vec![PathBuf::from("/")])).await.unwrap_err();
        assert!(matches!(err, SearchError::Spawn { .. }));
    }
}
