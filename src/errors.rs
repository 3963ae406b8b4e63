//! # Error Types
//!
//! Error handling for the flag-sweep core.
//!
//! Only configuration-level failures surface through [`SweepError`] and abort
//! a run. Per-file and per-engine failures are isolated where they occur and
//! reported as warnings (see `engines::EngineOutcome`).

use std::fmt;

/// Errors that abort a run before or during scanning and dispatch setup.
#[derive(Debug)]
pub enum SweepError {
    /// Malformed alias map, variable spec, or config file
    Config(String),
    /// I/O error reading input files or diffs
    Io(std::io::Error),
    /// Pattern compilation error in a parser definition
    Regex(regex::Error),
    /// Error serializing the engine wire contract or the usage report
    SerdeJson(serde_json::Error),
    /// Error parsing the YAML repo config
    SerdeYaml(serde_yaml::Error),
    /// Include/exclude glob compilation error
    Glob(globset::Error),
    /// Error walking the working tree
    WalkDir(walkdir::Error),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Config(msg) => write!(f, "Invalid configuration: {msg}"),
            SweepError::Io(err) => write!(f, "IO error: {err}"),
            SweepError::Regex(err) => write!(f, "Regex error: {err}"),
            SweepError::SerdeJson(err) => write!(f, "JSON error: {err}"),
            SweepError::SerdeYaml(err) => write!(f, "YAML parsing error: {err}"),
            SweepError::Glob(err) => write!(f, "Glob error: {err}"),
            SweepError::WalkDir(err) => write!(f, "Directory traversal error: {err}"),
        }
    }
}

impl std::error::Error for SweepError {}

impl From<std::io::Error> for SweepError {
    fn from(err: std::io::Error) -> Self {
        SweepError::Io(err)
    }
}

impl From<regex::Error> for SweepError {
    fn from(err: regex::Error) -> Self {
        SweepError::Regex(err)
    }
}

impl From<serde_json::Error> for SweepError {
    fn from(err: serde_json::Error) -> Self {
        SweepError::SerdeJson(err)
    }
}

impl From<serde_yaml::Error> for SweepError {
    fn from(err: serde_yaml::Error) -> Self {
        SweepError::SerdeYaml(err)
    }
}

impl From<globset::Error> for SweepError {
    fn from(err: globset::Error) -> Self {
        SweepError::Glob(err)
    }
}

impl From<walkdir::Error> for SweepError {
    fn from(err: walkdir::Error) -> Self {
        SweepError::WalkDir(err)
    }
}
