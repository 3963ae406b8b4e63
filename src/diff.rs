//! Minimal unified-diff reader.
//!
//! Only the pieces the scanner needs are parsed: file headers, hunk headers,
//! and the add/remove classification of hunk lines. Added lines are numbered
//! on the new side of the diff, removed lines on the old side, so a usage
//! record always points at a line that exists in the corresponding file
//! version.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::UsageMode;

/// One changed line inside a hunk. Context lines are not kept; they are
/// unchanged code and never produce usages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub number: usize,
    pub mode: UsageMode,
    pub content: String,
}

/// All changed lines of one file in the diff, in hunk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: String,
    pub lines: Vec<DiffLine>,
}

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("hunk header pattern")
});

/// Parse unified diff text into per-file changed-line listings. Files appear
/// in diff order; unrecognized lines outside hunks are ignored.
pub fn parse_unified_diff(input: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut old_path: Option<String> = None;
    let mut old_line = 0usize;
    let mut new_line = 0usize;
    let mut old_remaining = 0usize;
    let mut new_remaining = 0usize;

    for raw in input.lines() {
        if old_remaining > 0 || new_remaining > 0 {
            match raw.as_bytes().first() {
                Some(b'+') => {
                    push_line(&mut files, new_line, UsageMode::Add, &raw[1..]);
                    new_line += 1;
                    new_remaining = new_remaining.saturating_sub(1);
                }
                Some(b'-') => {
                    push_line(&mut files, old_line, UsageMode::Remove, &raw[1..]);
                    old_line += 1;
                    old_remaining = old_remaining.saturating_sub(1);
                }
                Some(b'\\') => {} // "\ No newline at end of file"
                _ => {
                    old_line += 1;
                    new_line += 1;
                    old_remaining = old_remaining.saturating_sub(1);
                    new_remaining = new_remaining.saturating_sub(1);
                }
            }
            continue;
        }

        if let Some(rest) = raw.strip_prefix("--- ") {
            old_path = Some(strip_diff_prefix(rest, "a/"));
            continue;
        }
        if let Some(rest) = raw.strip_prefix("+++ ") {
            let new_path = strip_diff_prefix(rest, "b/");
            let path = if new_path == "/dev/null" {
                old_path.take().unwrap_or(new_path)
            } else {
                new_path
            };
            files.push(FileDiff {
                path,
                lines: Vec::new(),
            });
            continue;
        }
        if let Some(caps) = HUNK_HEADER.captures(raw) {
            old_line = caps[1].parse().unwrap_or(0);
            old_remaining = caps
                .get(2)
                .map_or(1, |m| m.as_str().parse().unwrap_or(0));
            new_line = caps[3].parse().unwrap_or(0);
            new_remaining = caps
                .get(4)
                .map_or(1, |m| m.as_str().parse().unwrap_or(0));
        }
    }

    files
}

fn push_line(files: &mut Vec<FileDiff>, number: usize, mode: UsageMode, content: &str) {
    if let Some(file) = files.last_mut() {
        file.lines.push(DiffLine {
            number,
            mode,
            content: content.to_string(),
        });
    }
}

fn strip_diff_prefix(path: &str, prefix: &str) -> String {
    path.strip_prefix(prefix).unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
diff --git a/src/app.js b/src/app.js
index 1111111..2222222 100644
--- a/src/app.js
+++ b/src/app.js
@@ -10,6 +10,6 @@ function setup() {
 const client = makeClient()
-const old = client.variable(user, 'old-flag', false)
+const fresh = client.variable(user, 'fresh-flag', false)
 const other = 1
 const more = 2
 const done = 3
 return client
";

    #[test]
    fn numbers_added_lines_on_the_new_side() {
        let files = parse_unified_diff(SAMPLE);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/app.js");
        assert_eq!(files[0].lines.len(), 2);

        let removed = &files[0].lines[0];
        assert_eq!(removed.mode, UsageMode::Remove);
        assert_eq!(removed.number, 11);

        let added = &files[0].lines[1];
        assert_eq!(added.mode, UsageMode::Add);
        assert_eq!(added.number, 11);
        assert!(added.content.contains("fresh-flag"));
    }

    #[test]
    fn new_file_diff_starts_at_line_one() {
        let diff = "\
diff --git a/new.py b/new.py
new file mode 100644
--- /dev/null
+++ b/new.py
@@ -0,0 +1,2 @@
+first
+second
";
        let files = parse_unified_diff(diff);
        assert_eq!(files[0].path, "new.py");
        assert_eq!(files[0].lines[0].number, 1);
        assert_eq!(files[0].lines[1].number, 2);
    }

    #[test]
    fn deleted_file_keeps_old_path() {
        let diff = "\
diff --git a/gone.rb b/gone.rb
deleted file mode 100644
--- a/gone.rb
+++ /dev/null
@@ -1,1 +0,0 @@
-client.variable(user, 'dead', false)
";
        let files = parse_unified_diff(diff);
        assert_eq!(files[0].path, "gone.rb");
        assert_eq!(files[0].lines[0].mode, UsageMode::Remove);
        assert_eq!(files[0].lines[0].number, 1);
    }
}
