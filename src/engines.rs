//! # Engine Dispatcher
//!
//! Routes files to external, per-language rewrite engines. An engine is an
//! opaque subprocess addressed by a fixed argv contract:
//!
//! ```text
//! <command> <entrypoint> <filePath> <variableJSON> <optionsJSON>
//! ```
//!
//! Engines for one file run strictly in configured order; dispatch across
//! files is concurrent. Every invocation is an independent unit of work:
//! a missing executable or a failing engine is reported and the batch keeps
//! going. Once spawned, an engine runs to completion; no timeout is imposed.

use futures::StreamExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::warn;

use crate::errors::SweepError;
use crate::types::{RefactorOptions, Variable};

/// One external rewrite engine: the command to run and its entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub command: String,
    pub entrypoint: PathBuf,
}

impl EngineCommand {
    pub fn new(command: impl Into<String>, entrypoint: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            entrypoint: entrypoint.into(),
        }
    }
}

/// Extension to ordered engine chain. Built once at startup and injected
/// into the dispatcher; tests may build alternate tables.
#[derive(Debug, Clone, Default)]
pub struct EngineTable {
    chains: HashMap<String, Vec<EngineCommand>>,
}

impl EngineTable {
    /// The default table. An extension absent from it has no engine chain
    /// and its files are skipped silently.
    pub fn builtin(lib_dir: &Path) -> Self {
        let js = EngineCommand::new("node", lib_dir.join("javascript/main.js"));
        let py = EngineCommand::new("python3", lib_dir.join("python/main.py"));
        let java = EngineCommand::new("java", lib_dir.join("java/JavaEngine.class"));

        let mut table = Self::default();
        for extension in ["js", "jsx", "ts", "tsx"] {
            table.insert(extension, vec![js.clone()]);
        }
        table.insert("py", vec![py]);
        table.insert("java", vec![java]);
        table
    }

    pub fn insert(&mut self, extension: impl Into<String>, chain: Vec<EngineCommand>) {
        self.chains.insert(extension.into(), chain);
    }

    pub fn chain_for(&self, extension: &str) -> Option<&[EngineCommand]> {
        self.chains.get(extension).map(Vec::as_slice)
    }
}

/// Terminal outcome of one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    Completed,
    /// The configured executable could not be found.
    Missing { command: String },
    /// The engine could not be spawned for another reason, or ran and failed.
    Failed { message: String },
}

/// All engine outcomes for one file, in chain order. Empty when the file's
/// extension has no engine chain.
#[derive(Debug)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub engines: Vec<EngineOutcome>,
}

impl FileOutcome {
    pub fn rewritten(&self) -> bool {
        !self.engines.is_empty()
            && self
                .engines
                .iter()
                .all(|outcome| *outcome == EngineOutcome::Completed)
    }

    pub fn missing_engine(&self) -> Option<&str> {
        self.engines.iter().find_map(|outcome| match outcome {
            EngineOutcome::Missing { command } => Some(command.as_str()),
            _ => None,
        })
    }
}

/// Batch-level summary, derived after every file completes.
#[derive(Debug, Default)]
pub struct DispatchSummary {
    pub rewritten: Vec<PathBuf>,
    pub missing_engines: Vec<(PathBuf, String)>,
    pub failed: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl DispatchSummary {
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            if outcome.engines.is_empty() {
                summary.skipped.push(outcome.file.clone());
            } else if let Some(command) = outcome.missing_engine() {
                summary
                    .missing_engines
                    .push((outcome.file.clone(), command.to_string()));
            } else if outcome.rewritten() {
                summary.rewritten.push(outcome.file.clone());
            } else {
                summary.failed.push(outcome.file.clone());
            }
        }
        summary
    }
}

pub struct EngineDispatcher {
    table: EngineTable,
    max_concurrency: usize,
}

impl EngineDispatcher {
    pub fn new(table: EngineTable, max_concurrency: usize) -> Self {
        Self {
            table,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Run every file's engine chain. Files run concurrently up to the
    /// configured limit; completion order across files is not defined and
    /// engine output may interleave accordingly.
    pub async fn dispatch_all(
        &self,
        files: &[PathBuf],
        variable: &Variable,
        options: &RefactorOptions,
    ) -> Result<Vec<FileOutcome>, SweepError> {
        let variable_json = serde_json::to_string(variable)?;
        let options_json = serde_json::to_string(options)?;

        let outcomes = futures::stream::iter(
            files
                .iter()
                .map(|file| self.run_chain(file, &variable_json, &options_json)),
        )
        .buffer_unordered(self.max_concurrency)
        .collect::<Vec<_>>()
        .await;
        Ok(outcomes)
    }

    async fn run_chain(&self, file: &Path, variable_json: &str, options_json: &str) -> FileOutcome {
        let extension = file
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Some(chain) = self.table.chain_for(&extension) else {
            return FileOutcome {
                file: file.to_path_buf(),
                engines: Vec::new(),
            };
        };

        let mut engines = Vec::with_capacity(chain.len());
        for engine in chain {
            let outcome = run_engine(engine, file, variable_json, options_json).await;
            match &outcome {
                EngineOutcome::Missing { command } => {
                    warn!("Error refactoring {}", file.display());
                    warn!("Could not find {command} executable. Is it installed?");
                }
                EngineOutcome::Failed { message } => {
                    warn!("Error refactoring {}", file.display());
                    warn!("{message}");
                }
                EngineOutcome::Completed => {}
            }
            engines.push(outcome);
        }
        FileOutcome {
            file: file.to_path_buf(),
            engines,
        }
    }
}

/// Spawn one engine and forward its stdout line-by-line as it arrives.
async fn run_engine(
    engine: &EngineCommand,
    file: &Path,
    variable_json: &str,
    options_json: &str,
) -> EngineOutcome {
    let spawned = Command::new(&engine.command)
        .arg(&engine.entrypoint)
        .arg(file)
        .arg(variable_json)
        .arg(options_json)
        .stdout(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return EngineOutcome::Missing {
                command: engine.command.clone(),
            };
        }
        Err(err) => {
            return EngineOutcome::Failed {
                message: err.to_string(),
            };
        }
    };

    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            println!("{line}");
        }
    }

    match child.wait().await {
        Ok(status) if status.success() => EngineOutcome::Completed,
        Ok(status) => EngineOutcome::Failed {
            message: format!("engine exited with {status}"),
        },
        Err(err) => EngineOutcome::Failed {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(file: &str, engines: Vec<EngineOutcome>) -> FileOutcome {
        FileOutcome {
            file: PathBuf::from(file),
            engines,
        }
    }

    #[test]
    fn summary_classifies_every_outcome_shape() {
        let outcomes = vec![
            outcome("ok.js", vec![EngineOutcome::Completed]),
            outcome("skipped.cs", vec![]),
            outcome(
                "missing.py",
                vec![EngineOutcome::Missing {
                    command: "python3".to_string(),
                }],
            ),
            outcome(
                "failed.java",
                vec![
                    EngineOutcome::Completed,
                    EngineOutcome::Failed {
                        message: "engine exited with exit status: 1".to_string(),
                    },
                ],
            ),
        ];

        let summary = DispatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.rewritten, vec![PathBuf::from("ok.js")]);
        assert_eq!(summary.skipped, vec![PathBuf::from("skipped.cs")]);
        assert_eq!(
            summary.missing_engines,
            vec![(PathBuf::from("missing.py"), "python3".to_string())]
        );
        assert_eq!(summary.failed, vec![PathBuf::from("failed.java")]);
    }

    #[test]
    fn partially_failed_chain_is_not_rewritten() {
        let partial = outcome(
            "a.js",
            vec![
                EngineOutcome::Completed,
                EngineOutcome::Failed {
                    message: "boom".to_string(),
                },
            ],
        );
        assert!(!partial.rewritten());
        assert!(partial.missing_engine().is_none());
    }
}
