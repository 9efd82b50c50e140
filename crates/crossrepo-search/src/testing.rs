//! Fake ripgrep for tests: a shell script run through `sh`.

use std::path::Path;

use crate::engine::Ripgrep;

/// A `--json` match record
pub fn match_line(path: &str, line_number: u64, text: &str, submatch: &str, start: usize) -> String {
    serde_json::json!({
        "type": "match",
        "data": {
            "path": {"text": path},
            "lines": {"text": text},
            "line_number": line_number,
            "absolute_offset": 0,
            "submatches": [{"match": {"text": submatch}, "start": start, "end": start + submatch.len()}],
        }
    })
    .to_string()
}

/// Engine running `body` as a POSIX shell script
pub fn script_engine(dir: &Path, body: &str) -> Ripgrep {
    let script = dir.join("engine.sh");
    std::fs::write(&script, body).unwrap();
    Ripgrep::new("sh").with_args(vec![script.to_string_lossy().to_string()])
}

/// Engine that prints canned output and exits with `code`
pub fn fake_engine(dir: &Path, stdout: &str, stderr: &str, code: i32) -> Ripgrep {
    let out = dir.join("stdout.jsonl");
    let err = dir.join("stderr.txt");
    std::fs::write(&out, stdout).unwrap();
    std::fs::write(&err, stderr).unwrap();

    script_engine(
        dir,
        &format!(
            "cat '{}'\ncat '{}' >&2\nexit {}\n",
            out.display(),
            err.display(),
            code
        ),
    )
}

/// Engine reporting one match under the last root it is given. A root named
/// `broken` fails with exit code 2, `empty` finds nothing and `slow` answers
/// late.
pub fn per_root_engine(dir: &Path) -> Ripgrep {
    script_engine(
        dir,
        r#"for root; do :; done
case "${root##*/}" in
  broken) echo "cannot search $root" >&2; exit 2 ;;
  empty) exit 1 ;;
  slow) sleep 0.2 ;;
esac
printf '{"type":"match","data":{"path":{"text":"%s/src/lib.rs"},"lines":{"text":"hit\\n"},"line_number":4,"absolute_offset":0,"submatches":[{"match":{"text":"hit"},"start":0,"end":3}]}}\n' "$root"
exit 0
"#,
    )
}
