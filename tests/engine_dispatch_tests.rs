//! Tests for the engine dispatcher: table resolution, the argv contract,
//! per-file chain ordering, and failure isolation.

use flag_sweep::engines::{
    DispatchSummary, EngineCommand, EngineDispatcher, EngineOutcome, EngineTable,
};
use flag_sweep::{OutputTarget, RefactorOptions, Variable, VariableType};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn test_variable() -> Variable {
    Variable::new("my-flag", "true", VariableType::Boolean).unwrap()
}

fn test_options() -> RefactorOptions {
    let mut aliases = BTreeSet::new();
    aliases.insert("MY_FLAG".to_string());
    RefactorOptions::new(OutputTarget::File, &aliases)
}

/// A shell script usable as an engine entry point via `sh <script> <args>`.
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn builtin_table_maps_the_default_extensions() {
    let table = EngineTable::builtin(Path::new("lib/refactor"));

    for extension in ["js", "jsx", "ts", "tsx"] {
        let chain = table.chain_for(extension).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].command, "node");
        assert_eq!(
            chain[0].entrypoint,
            Path::new("lib/refactor/javascript/main.js")
        );
    }

    let python = table.chain_for("py").unwrap();
    assert_eq!(python[0].command, "python3");
    assert_eq!(python[0].entrypoint, Path::new("lib/refactor/python/main.py"));

    let java = table.chain_for("java").unwrap();
    assert_eq!(java[0].command, "java");
    assert_eq!(
        java[0].entrypoint,
        Path::new("lib/refactor/java/JavaEngine.class")
    );

    for extension in ["cs", "go", "rb", "xyz", ""] {
        assert!(table.chain_for(extension).is_none());
    }
}

#[tokio::test]
async fn missing_executable_is_reported_and_other_files_continue() {
    let temp_dir = TempDir::new().unwrap();
    let marker = temp_dir.path().join("ran.txt");
    let script = write_script(
        temp_dir.path(),
        "engine.sh",
        &format!("#!/bin/sh\necho done >> {}\n", marker.display()),
    );

    let mut table = EngineTable::default();
    table.insert(
        "zz",
        vec![EngineCommand::new(
            "flag-sweep-test-no-such-engine",
            "missing.js",
        )],
    );
    table.insert("txt", vec![EngineCommand::new("sh", &script)]);

    let broken = temp_dir.path().join("a.zz");
    let healthy = temp_dir.path().join("b.txt");
    fs::write(&broken, "").unwrap();
    fs::write(&healthy, "").unwrap();

    let dispatcher = EngineDispatcher::new(table, 4);
    let outcomes = dispatcher
        .dispatch_all(
            &[broken.clone(), healthy.clone()],
            &test_variable(),
            &test_options(),
        )
        .await
        .unwrap();

    let broken_outcome = outcomes.iter().find(|o| o.file == broken).unwrap();
    assert_eq!(
        broken_outcome.engines,
        vec![EngineOutcome::Missing {
            command: "flag-sweep-test-no-such-engine".to_string()
        }]
    );
    assert_eq!(broken_outcome.missing_engine(), Some("flag-sweep-test-no-such-engine"));

    let healthy_outcome = outcomes.iter().find(|o| o.file == healthy).unwrap();
    assert!(healthy_outcome.rewritten());
    assert_eq!(fs::read_to_string(&marker).unwrap(), "done\n");
}

#[tokio::test]
async fn chain_engines_run_in_configured_order() {
    let temp_dir = TempDir::new().unwrap();
    let log = temp_dir.path().join("order.log");
    let first = write_script(
        temp_dir.path(),
        "first.sh",
        &format!("#!/bin/sh\necho first >> {}\n", log.display()),
    );
    let second = write_script(
        temp_dir.path(),
        "second.sh",
        &format!("#!/bin/sh\necho second >> {}\n", log.display()),
    );

    let mut table = EngineTable::default();
    table.insert(
        "txt",
        vec![
            EngineCommand::new("sh", &first),
            EngineCommand::new("sh", &second),
        ],
    );

    let file = temp_dir.path().join("input.txt");
    fs::write(&file, "").unwrap();

    let dispatcher = EngineDispatcher::new(table, 4);
    let outcomes = dispatcher
        .dispatch_all(&[file], &test_variable(), &test_options())
        .await
        .unwrap();

    assert!(outcomes[0].rewritten());
    assert_eq!(outcomes[0].engines.len(), 2);
    assert_eq!(fs::read_to_string(&log).unwrap(), "first\nsecond\n");
}

#[tokio::test]
async fn engines_receive_the_fixed_argv_contract() {
    let temp_dir = TempDir::new().unwrap();
    let captured = temp_dir.path().join("argv.txt");
    let script = write_script(
        temp_dir.path(),
        "capture.sh",
        &format!(
            "#!/bin/sh\nprintf '%s\\n' \"$1\" \"$2\" \"$3\" > {}\n",
            captured.display()
        ),
    );

    let mut table = EngineTable::default();
    table.insert("txt", vec![EngineCommand::new("sh", &script)]);

    let file = temp_dir.path().join("input.txt");
    fs::write(&file, "").unwrap();

    let dispatcher = EngineDispatcher::new(table, 1);
    dispatcher
        .dispatch_all(&[file.clone()], &test_variable(), &test_options())
        .await
        .unwrap();

    let lines: Vec<String> = fs::read_to_string(&captured)
        .unwrap()
        .lines()
        .map(String::from)
        .collect();
    assert_eq!(lines[0], file.to_string_lossy().as_ref());

    let variable: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(variable["key"], "my-flag");
    assert_eq!(variable["value"], "true");
    assert_eq!(variable["type"], "Boolean");

    let options: serde_json::Value = serde_json::from_str(&lines[2]).unwrap();
    assert_eq!(options["output"], "file");
    assert_eq!(options["aliases"], serde_json::json!(["MY_FLAG"]));
}

#[tokio::test]
async fn failing_engine_is_isolated_per_file() {
    let temp_dir = TempDir::new().unwrap();
    let failing = write_script(temp_dir.path(), "fail.sh", "#!/bin/sh\nexit 3\n");

    let mut table = EngineTable::default();
    table.insert("txt", vec![EngineCommand::new("sh", &failing)]);

    let file = temp_dir.path().join("input.txt");
    fs::write(&file, "").unwrap();

    let dispatcher = EngineDispatcher::new(table, 1);
    let outcomes = dispatcher
        .dispatch_all(&[file], &test_variable(), &test_options())
        .await
        .unwrap();

    assert!(!outcomes[0].rewritten());
    assert!(matches!(
        outcomes[0].engines[0],
        EngineOutcome::Failed { .. }
    ));
}

#[tokio::test]
async fn unlisted_extension_produces_zero_dispatches() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("data.xyz");
    fs::write(&file, "").unwrap();

    let dispatcher = EngineDispatcher::new(EngineTable::builtin(Path::new("lib/refactor")), 1);
    let outcomes = dispatcher
        .dispatch_all(&[file.clone()], &test_variable(), &test_options())
        .await
        .unwrap();

    assert!(outcomes[0].engines.is_empty());

    let summary = DispatchSummary::from_outcomes(&outcomes);
    assert_eq!(summary.skipped, vec![file]);
    assert!(summary.rewritten.is_empty());
    assert!(summary.missing_engines.is_empty());
}
