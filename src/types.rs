use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::errors::SweepError;

/// Type of the static value that replaces a variable accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    String,
    Boolean,
    Number,
    #[serde(rename = "JSON")]
    Json,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableType::String => write!(f, "String"),
            VariableType::Boolean => write!(f, "Boolean"),
            VariableType::Number => write!(f, "Number"),
            VariableType::Json => write!(f, "JSON"),
        }
    }
}

impl FromStr for VariableType {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "String" => Ok(VariableType::String),
            "Boolean" => Ok(VariableType::Boolean),
            "Number" => Ok(VariableType::Number),
            "JSON" => Ok(VariableType::Json),
            other => Err(SweepError::Config(format!(
                "unknown variable type '{other}' (expected String, Boolean, Number or JSON)"
            ))),
        }
    }
}

/// The feature-flag variable being replaced, fixed for the whole run.
///
/// Serializes to the JSON shape the engine contract expects:
/// `{"key": ..., "value": ..., "type": "String"|"Boolean"|"Number"|"JSON"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
    pub r#type: VariableType,
}

impl Variable {
    /// Build a variable, rejecting an empty key up front since it would
    /// invalidate every subsequent match and dispatch.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        r#type: VariableType,
    ) -> Result<Self, SweepError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(SweepError::Config(
                "variable key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            key,
            value: value.into(),
            r#type,
        })
    }
}

/// Where engines send the rewritten source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    Console,
    /// Rewrite the source file in place.
    #[default]
    File,
}

impl FromStr for OutputTarget {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(OutputTarget::Console),
            "file" => Ok(OutputTarget::File),
            other => Err(SweepError::Config(format!(
                "unknown output target '{other}' (expected console or file)"
            ))),
        }
    }
}

/// Options handed to every engine invocation, serialized as
/// `{"output": "console"|"file", "aliases": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactorOptions {
    pub output: OutputTarget,
    pub aliases: Vec<String>,
}

impl RefactorOptions {
    /// Aliases are emitted in sorted order so the serialized contract is
    /// deterministic across runs.
    pub fn new(output: OutputTarget, aliases: &BTreeSet<String>) -> Self {
        Self {
            output,
            aliases: aliases.iter().cloned().collect(),
        }
    }
}

/// Whether a usage comes from an added diff line, a removed diff line, or a
/// whole-file scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageMode {
    Add,
    Remove,
    Regular,
}

/// Whether the matched accessor named the variable key itself or one of its
/// configured aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageKind {
    Regular,
    Alias,
}

/// One detected accessor call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// 1-based line number of the line that opens the call.
    pub line: usize,
    pub mode: UsageMode,
    pub kind: UsageKind,
    /// The accessor key as written in source, quotes stripped.
    pub name: String,
}

/// Scan output: language identity mapped to usages, ascending by line within
/// each file, files in input order. Only languages with matches appear.
pub type UsageReport = BTreeMap<String, Vec<Usage>>;
