//! Repo-level configuration.
//!
//! Loaded from `.flagsweep/config.yaml` in the working directory (override
//! with `FLAGSWEEP_CONFIG_PATH`). A missing file is an empty config; a file
//! that fails to parse aborts the run.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::SweepError;

const DEFAULT_CONFIG_PATH: &str = ".flagsweep/config.yaml";
pub const CONFIG_PATH_ENV: &str = "FLAGSWEEP_CONFIG_PATH";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoConfig {
    #[serde(default)]
    pub code_insights: CodeInsights,
}

/// Scanning defaults that live with the repository rather than the CLI
/// invocation. CLI flags override these per run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeInsights {
    #[serde(default)]
    pub include_files: Vec<String>,
    #[serde(default)]
    pub exclude_files: Vec<String>,
    /// Alias name to the canonical variable key it stands for.
    #[serde(default)]
    pub variable_aliases: BTreeMap<String, String>,
}

/// Resolve the config file location from the environment.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

impl RepoConfig {
    pub fn load(path: &Path) -> Result<Self, SweepError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&raw)?;
        Ok(config)
    }
}
