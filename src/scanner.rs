//! # Source Scanner
//!
//! Applies the pattern registry to a set of files or a parsed unified diff
//! and yields [`Usage`] records grouped by language identity. The scan is
//! read-only and holds no state across inputs, so scanning the same input
//! twice yields identical output.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::diff::FileDiff;
use crate::parsers::{self, SourceLine};
use crate::types::{Usage, UsageKind, UsageMode, UsageReport};

/// Match acceptance parameters.
///
/// With a target key, a matched accessor is accepted only when its extracted
/// key equals the target (kind `regular`) or belongs to the alias set (kind
/// `alias`). Without a target every accessor usage is reported, which is the
/// shape diff-based reporting uses.
#[derive(Debug, Clone, Default)]
pub struct MatchParams {
    pub target_key: Option<String>,
    pub aliases: BTreeSet<String>,
}

impl MatchParams {
    pub fn for_key(key: impl Into<String>, aliases: BTreeSet<String>) -> Self {
        Self {
            target_key: Some(key.into()),
            aliases,
        }
    }

    fn classify(&self, key: &str) -> Option<UsageKind> {
        match &self.target_key {
            Some(target) if key == target => Some(UsageKind::Regular),
            Some(_) if self.aliases.contains(key) => Some(UsageKind::Alias),
            Some(_) => None,
            None if self.aliases.contains(key) => Some(UsageKind::Alias),
            None => Some(UsageKind::Regular),
        }
    }
}

pub struct Scanner {
    params: MatchParams,
}

impl Scanner {
    pub fn new(params: MatchParams) -> Self {
        Self { params }
    }

    /// Scan the changed lines of a parsed diff. Files without an applicable
    /// parser are skipped silently.
    pub fn scan_diff(&self, diff: &[FileDiff]) -> UsageReport {
        let mut report = UsageReport::new();
        for file in diff {
            let lines: Vec<SourceLine> = file
                .lines
                .iter()
                .map(|line| SourceLine {
                    number: line.number,
                    mode: line.mode,
                    content: line.content.clone(),
                })
                .collect();
            self.scan_lines(&mut report, &file.path, &lines);
        }
        report
    }

    /// Scan whole files from disk, every line carrying mode `regular`.
    /// Unreadable files are skipped, matching the per-file isolation the
    /// rest of the pipeline applies.
    pub fn scan_files(&self, paths: &[PathBuf]) -> UsageReport {
        let mut report = UsageReport::new();
        for path in paths {
            let Some(content) = std::fs::read_to_string(path).ok() else {
                continue;
            };
            let lines: Vec<SourceLine> = content
                .lines()
                .enumerate()
                .map(|(index, text)| SourceLine {
                    number: index + 1,
                    mode: UsageMode::Regular,
                    content: text.to_string(),
                })
                .collect();
            self.scan_lines(&mut report, &path.to_string_lossy(), &lines);
        }
        report
    }

    fn scan_lines(&self, report: &mut UsageReport, file_name: &str, lines: &[SourceLine]) {
        let Some(extension) = extension_of(file_name) else {
            return;
        };
        let Some(parser) = parsers::parser_for_extension(&extension) else {
            return;
        };
        for found in parser.find_accessors(lines) {
            let Some(kind) = self.params.classify(&found.key) else {
                continue;
            };
            report
                .entry(parser.identity().to_string())
                .or_default()
                .push(Usage {
                    file_name: file_name.to_string(),
                    line: found.line,
                    mode: found.mode,
                    kind,
                    name: found.key,
                });
        }
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
}
