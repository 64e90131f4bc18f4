use std::path::Path;

use super::*;
use crate::test::CaseOutcome;
use crate::testing::{write_fixture, FixtureScript, ScriptedSandbox, StaticBundler};
use bc_fixture::{AssertionError, FixtureHooks, Stage};
use bc_ir::BundleError;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn harness(root: &Path, bundler: Arc<StaticBundler>, config: HarnessConfig) -> Harness {
    let config = HarnessConfig {
        root: root.to_path_buf(),
        ..config
    };
    Harness::new(
        config,
        bundler,
        Arc::new(ScriptedSandbox::exporting(json!({}))),
    )
}

fn sequential() -> HarnessConfig {
    HarnessConfig {
        parallel: false,
        ..HarnessConfig::default()
    }
}

fn outcomes(summary: &SuiteSummary) -> Vec<(String, &'static str)> {
    summary
        .fixtures
        .iter()
        .flat_map(|f| &f.results)
        .map(|r| {
            let outcome = if r.outcome.is_passed() {
                "pass"
            } else if r.outcome.is_failed() {
                "fail"
            } else {
                "skip"
            };
            (r.id.to_string(), outcome)
        })
        .collect()
}

fn write_form(root: &Path, name: &str) {
    write_fixture(
        root,
        "form",
        name,
        &[
            ("main.js", "export default 1;\n"),
            ("_config.json", r#"{ "description": "form" }"#),
            ("_expected/amd.js", "export default 1;"),
            ("_expected/cjs.js", "export default 1;"),
            ("_expected/es6.js", "export default 1;"),
            ("_expected/iife.js", "export default 1;"),
            ("_expected/umd.js", "export default 1;"),
        ],
    )
    .unwrap();
}

#[test]
fn per_profile_fixture_is_built_once() {
    let dir = TempDir::new().unwrap();
    write_form(dir.path(), "simple");
    let bundler = Arc::new(StaticBundler::new());

    let summary = harness(dir.path(), Arc::clone(&bundler), HarnessConfig::default()).run();

    assert_eq!(summary.passed, 5);
    assert_eq!(bundler.builds("simple"), 1);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let dir = TempDir::new().unwrap();
    write_form(dir.path(), "alpha");
    write_form(dir.path(), "beta");
    write_fixture(dir.path(), "function", "gamma", &[("main.js", "")]).unwrap();
    write_fixture(dir.path(), "function", "broken", &[("main.js", "")]).unwrap();
    let script = || {
        StaticBundler::new().script(
            "broken",
            FixtureScript::new().fails_build(BundleError::new("Unexpected token")),
        )
    };

    let parallel = harness(dir.path(), Arc::new(script()), HarnessConfig::default()).run();
    let serial = harness(dir.path(), Arc::new(script()), sequential()).run();

    assert_eq!(outcomes(&parallel), outcomes(&serial));
    assert_eq!(
        outcomes(&serial).first(),
        Some(&("function/broken".to_string(), "fail"))
    );
    assert_eq!(serial.failed, 1);
    assert_eq!(serial.passed, 11);
}

#[test]
fn skipped_fixture_is_never_built() {
    let dir = TempDir::new().unwrap();
    write_fixture(
        dir.path(),
        "function",
        "later",
        &[("main.js", ""), ("_config.json", r#"{ "skip": true }"#)],
    )
    .unwrap();
    let bundler = Arc::new(StaticBundler::new());

    let summary = harness(dir.path(), Arc::clone(&bundler), sequential()).run();

    assert_eq!(outcomes(&summary), vec![("function/later".to_string(), "skip")]);
    assert_eq!(bundler.total_builds(), 0);
    // Nothing ran.
    assert_eq!(summary.exit_code(), 2);
}

#[test]
fn solo_narrows_the_run() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "function", "other", &[("main.js", "")]).unwrap();
    write_fixture(
        dir.path(),
        "function",
        "focus",
        &[("main.js", ""), ("_config.json", r#"{ "solo": true }"#)],
    )
    .unwrap();

    let summary = harness(dir.path(), Arc::new(StaticBundler::new()), sequential()).run();

    assert_eq!(
        outcomes(&summary),
        vec![
            ("function/focus".to_string(), "pass"),
            ("function/other".to_string(), "skip"),
        ]
    );
    let other = summary.case("function/other").unwrap();
    assert!(matches!(&other.outcome, CaseOutcome::Skipped(reason) if reason == "not solo"));
}

#[test]
fn discovery_errors_fail_the_suite() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "function", "fine", &[("main.js", "")]).unwrap();
    write_fixture(dir.path(), "form", "unconfigured", &[("main.js", "")]).unwrap();

    let summary = harness(dir.path(), Arc::new(StaticBundler::new()), sequential()).run();

    assert_eq!(summary.passed, 1);
    assert_eq!(summary.error_fixtures, 1);
    let broken = summary
        .fixtures
        .iter()
        .find(|f| f.id == "form/unconfigured")
        .unwrap();
    assert_eq!(broken.errors.len(), 1);
    assert!(broken.errors[0].contains("_config.json"));
    assert_eq!(summary.exit_code(), 1);
}

#[test]
fn categories_and_filter_select_cases() {
    let dir = TempDir::new().unwrap();
    write_form(dir.path(), "simple");
    write_fixture(dir.path(), "function", "simple", &[("main.js", "")]).unwrap();

    let only_function = HarnessConfig {
        categories: vec![FixtureCategory::Function],
        ..sequential()
    };
    let summary = harness(dir.path(), Arc::new(StaticBundler::new()), only_function).run();
    assert_eq!(outcomes(&summary), vec![("function/simple".to_string(), "pass")]);

    let filtered = HarnessConfig {
        filter: Some("/iife".to_string()),
        ..sequential()
    };
    let summary = harness(dir.path(), Arc::new(StaticBundler::new()), filtered).run();
    assert_eq!(outcomes(&summary), vec![("form/simple/iife".to_string(), "pass")]);
}

#[test]
fn hooks_reach_their_fixture() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "function", "hooked", &[("main.js", "")]).unwrap();
    let bundler = StaticBundler::new().script(
        "hooked",
        FixtureScript::new().fails_build(BundleError::new("Could not resolve './dep'")),
    );
    let mut hooks = HookRegistry::new();
    hooks.register(
        FixtureCategory::Function,
        "hooked",
        FixtureHooks::new().on_error(Stage::Build, |err| {
            if err.message.starts_with("Could not resolve") {
                Ok(())
            } else {
                Err(AssertionError::new("wrong error"))
            }
        }),
    );

    let summary = harness(dir.path(), Arc::new(bundler), sequential())
        .with_hooks(hooks)
        .run();
    assert_eq!(outcomes(&summary), vec![("function/hooked".to_string(), "pass")]);
}

#[test]
fn rerunning_gives_identical_results() {
    let dir = TempDir::new().unwrap();
    write_form(dir.path(), "simple");
    let harness = harness(dir.path(), Arc::new(StaticBundler::new()), sequential());

    let first = harness.run();
    let second = harness.run();
    assert_eq!(outcomes(&first), outcomes(&second));
}
