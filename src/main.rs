use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::{self, filter::EnvFilter};
use walkdir::{DirEntry, WalkDir};

use flag_sweep::aliases;
use flag_sweep::config::{self, RepoConfig};
use flag_sweep::diff::parse_unified_diff;
use flag_sweep::engines::{DispatchSummary, EngineDispatcher, EngineTable};
use flag_sweep::errors::SweepError;
use flag_sweep::scanner::{MatchParams, Scanner};
use flag_sweep::{OutputTarget, RefactorOptions, Variable, VariableType};

/// Replace a feature-flag variable with a static value in your code
#[derive(Parser, Debug)]
#[command(name = "flag-sweep")]
#[command(about = "Replace a feature-flag variable with a static value in your code")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Replace a variable with a static value across the working tree
    Cleanup(CleanupArgs),
    /// Report variable accessor usages from a diff or a set of files
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
struct CleanupArgs {
    /// Key of the variable to replace
    key: String,

    /// Value to use in place of the variable
    #[arg(long)]
    value: String,

    /// Type of the replacement value (String, Boolean, Number, JSON)
    #[arg(long = "type", value_name = "TYPE")]
    variable_type: VariableType,

    /// Files to include when scanning (glob, repeatable; default all files)
    #[arg(long = "include", value_name = "GLOB")]
    include: Vec<String>,

    /// Files to exclude when scanning (glob, repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// Where the refactored code is written (console or file)
    #[arg(long, default_value = "file")]
    output: OutputTarget,

    /// Treat ALIAS as another name for the variable key (repeatable)
    #[arg(long = "var-alias", value_name = "ALIAS=KEY")]
    var_alias: Vec<String>,

    /// Directory holding the engine entry points
    #[arg(long = "engines-dir", value_name = "PATH")]
    engines_dir: Option<PathBuf>,

    /// Maximum number of files refactored concurrently
    #[arg(long = "max-concurrency", default_value = "10")]
    max_concurrency: usize,

    /// Root of the tree to scan
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Files to scan when no diff is given
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Unified diff file to scan instead of whole files
    #[arg(long, value_name = "PATH")]
    diff: Option<PathBuf>,

    /// Key of the variable to report; every accessor usage when omitted
    #[arg(long)]
    key: Option<String>,

    /// Treat ALIAS as another name for its KEY (repeatable)
    #[arg(long = "var-alias", value_name = "ALIAS=KEY")]
    var_alias: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match cli.command {
        CliCommand::Cleanup(args) => run_cleanup(args).await,
        CliCommand::Scan(args) => run_scan(args),
    }
}

async fn run_cleanup(args: CleanupArgs) -> Result<()> {
    let repo_config = RepoConfig::load(&config::config_path())?;
    let variable = Variable::new(args.key, args.value, args.variable_type)?;

    let alias_flags = aliases::parse_alias_flags(&args.var_alias)?;
    let alias_map = aliases::merge_alias_maps(
        &repo_config.code_insights.variable_aliases,
        alias_flags,
    );
    let alias_set = aliases::aliases_for_key(&alias_map, &variable.key);

    let include = pick_globs(args.include, &repo_config.code_insights.include_files);
    let exclude = pick_globs(args.exclude, &repo_config.code_insights.exclude_files);
    let include_set = build_globset(&include)?;
    let exclude_set = build_globset(&exclude)?;
    let files = walk_files(&args.root, include_set.as_ref(), exclude_set.as_ref())?;

    if files.is_empty() {
        warn!("No files found to process.");
        return Ok(());
    }

    let options = RefactorOptions::new(args.output, &alias_set);
    let table = EngineTable::builtin(&engines_dir(args.engines_dir));
    let dispatcher = EngineDispatcher::new(table, args.max_concurrency);

    let outcomes = dispatcher.dispatch_all(&files, &variable, &options).await?;
    print_summary(&DispatchSummary::from_outcomes(&outcomes));
    Ok(())
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let repo_config = RepoConfig::load(&config::config_path())?;
    let alias_flags = aliases::parse_alias_flags(&args.var_alias)?;
    let alias_map = aliases::merge_alias_maps(
        &repo_config.code_insights.variable_aliases,
        alias_flags,
    );

    let params = match &args.key {
        Some(key) => MatchParams::for_key(key.clone(), aliases::aliases_for_key(&alias_map, key)),
        None => MatchParams {
            target_key: None,
            aliases: alias_map.keys().cloned().collect(),
        },
    };
    let scanner = Scanner::new(params);

    let report = match &args.diff {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            scanner.scan_diff(&parse_unified_diff(&text))
        }
        None => scanner.scan_files(&args.files),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// CLI globs override the repo config's when given.
fn pick_globs(from_flags: Vec<String>, from_config: &[String]) -> Vec<String> {
    if from_flags.is_empty() {
        from_config.to_vec()
    } else {
        from_flags
    }
}

/// Compile glob patterns; a pattern without a path separator matches by
/// base name anywhere in the tree.
fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, SweepError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let expanded = if pattern.contains('/') {
            pattern.clone()
        } else {
            format!("**/{pattern}")
        };
        builder.add(Glob::new(&expanded)?);
    }
    Ok(Some(builder.build()?))
}

fn walk_files(
    root: &Path,
    include: Option<&GlobSet>,
    exclude: Option<&GlobSet>,
) -> Result<Vec<PathBuf>, SweepError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        // Globs match against the root-relative path; engines get the full one.
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if include.is_some_and(|set| !set.is_match(relative)) {
            continue;
        }
        if exclude.is_some_and(|set| set.is_match(relative)) {
            continue;
        }
        files.push(entry.path().to_path_buf());
    }
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn engines_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("FLAGSWEEP_ENGINES_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("lib/refactor"))
}

fn print_summary(summary: &DispatchSummary) {
    for file in &summary.rewritten {
        println!("Rewrote {}", file.display());
    }
    for (file, command) in &summary.missing_engines {
        println!(
            "Skipped {} ({} executable not found)",
            file.display(),
            command
        );
    }
    for file in &summary.failed {
        println!("Failed to refactor {}", file.display());
    }
    println!(
        "{} rewritten, {} failed, {} missing engines, {} without an engine",
        summary.rewritten.len(),
        summary.failed.len(),
        summary.missing_engines.len(),
        summary.skipped.len()
    );
}
