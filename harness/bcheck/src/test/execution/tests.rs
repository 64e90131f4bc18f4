use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::testing::{harness_for, FixtureScript, ScriptedSandbox, ScriptedTransformer, StaticBundler};
use bc_fixture::{AssertionError, ConfigResolver, FixtureCategory, FixtureConfig};
use bc_ir::BundleError;
use bc_sandbox::{ModuleRecord, Thrown};
use pretty_assertions::assert_eq;
use serde_json::json;

fn fixture(name: &str, config: FixtureConfig) -> Fixture {
    Fixture {
        name: name.to_string(),
        category: FixtureCategory::Function,
        dir: PathBuf::from("/fixtures/function").join(name),
        config: Arc::new(config),
    }
}

fn config(name: &str) -> FixtureConfig {
    FixtureConfig::synthesized(name)
}

fn expect_error(stage: Stage, calls: &Arc<AtomicUsize>, fragment: &'static str) -> ExpectedError {
    let calls = Arc::clone(calls);
    ExpectedError {
        stage,
        handler: Arc::new(move |err: &CaughtError| {
            calls.fetch_add(1, Ordering::SeqCst);
            if err.message.contains(fragment) {
                Ok(())
            } else {
                Err(AssertionError::new(format!("unexpected message {:?}", err.message)))
            }
        }),
    }
}

/// Bundles report the requested format as their code.
fn format_echo(name: &str) -> StaticBundler {
    StaticBundler::new().script(name, FixtureScript::new().with_code(|f| format!("/* {f} */")))
}

fn run_case(harness: &Harness, fixture: &Fixture) -> Verdict {
    let build = SharedBuild::new(ConfigResolver::new().resolve(fixture));
    run(harness, fixture, &build)
}

#[test]
fn success_path_generates_cjs_and_executes() {
    let sandbox = Arc::new(ScriptedSandbox::exporting(json!({})));
    let harness = harness_for(Path::new("."), Arc::new(format_echo("basic")), sandbox.clone());

    let mut cfg = config("basic");
    // Forced cjs wins over bundleOptions.
    cfg.bundle_options = bc_ir::Options::new().with(keys::FORMAT, "amd");
    let verdict = run_case(&harness, &fixture("basic", cfg));

    assert!(verdict.result.is_ok());
    assert!(verdict.diagnostics.is_empty());
    assert_eq!(sandbox.calls(), vec!["/* cjs */".to_string()]);
}

#[test]
fn declared_build_error_is_handled_once() {
    let bundler = StaticBundler::new().script(
        "declares-error",
        FixtureScript::new().fails_build(BundleError::with_code(
            "Could not resolve './nope' from main.js",
            "UNRESOLVED_IMPORT",
        )),
    );
    let sandbox = Arc::new(ScriptedSandbox::exporting(json!({})));
    let harness = harness_for(Path::new("."), Arc::new(bundler), sandbox.clone());

    let calls = Arc::new(AtomicUsize::new(0));
    let mut cfg = config("declares-error");
    cfg.error = Some(expect_error(Stage::Build, &calls, "Could not resolve"));
    let verdict = run_case(&harness, &fixture("declares-error", cfg));

    assert!(verdict.result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(sandbox.calls().is_empty());
}

#[test]
fn missing_declared_errors_are_labelled_by_stage() {
    for (stage, message) in [
        (Stage::Build, "expected an error while rolling up"),
        (Stage::Generate, "expected an error while generating output"),
        (Stage::Execute, "expected an error while executing output"),
    ] {
        let harness = harness_for(
            Path::new("."),
            Arc::new(format_echo("quiet")),
            Arc::new(ScriptedSandbox::exporting(json!({}))),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cfg = config("quiet");
        cfg.error = Some(expect_error(stage, &calls, ""));

        let verdict = run_case(&harness, &fixture("quiet", cfg));
        let failure = verdict.result.unwrap_err();
        assert_eq!(failure.to_string(), message);
        assert!(failure.is_unintended());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

#[test]
fn error_at_another_stage_is_unintended() {
    let bundler = StaticBundler::new().script(
        "early",
        FixtureScript::new().fails_build(BundleError::new("Unexpected token")),
    );
    let harness = harness_for(
        Path::new("."),
        Arc::new(bundler),
        Arc::new(ScriptedSandbox::exporting(json!({}))),
    );
    let calls = Arc::new(AtomicUsize::new(0));
    let mut cfg = config("early");
    cfg.error = Some(expect_error(Stage::Generate, &calls, "Unexpected"));

    let failure = run_case(&harness, &fixture("early", cfg)).result.unwrap_err();
    assert!(matches!(
        failure,
        CaseFailure::Unintended {
            stage: Stage::Build,
            ..
        }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn declared_generate_error_is_handled() {
    let bundler = StaticBundler::new().script(
        "bad-export",
        FixtureScript::new().fails_generate(BundleError::new("'default' is not exported")),
    );
    let harness = harness_for(
        Path::new("."),
        Arc::new(bundler),
        Arc::new(ScriptedSandbox::exporting(json!({}))),
    );
    let calls = Arc::new(AtomicUsize::new(0));
    let mut cfg = config("bad-export");
    cfg.error = Some(expect_error(Stage::Generate, &calls, "not exported"));

    assert!(run_case(&harness, &fixture("bad-export", cfg)).result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn thrown_execution_errors_route_to_the_handler() {
    let thrown = Thrown {
        name: Some("TypeError".to_string()),
        message: "x is not a function".to_string(),
        code: None,
        stack: None,
    };
    let harness = harness_for(
        Path::new("."),
        Arc::new(format_echo("throws")),
        Arc::new(ScriptedSandbox::throwing(thrown)),
    );

    let calls = Arc::new(AtomicUsize::new(0));
    let mut cfg = config("throws");
    cfg.error = Some(expect_error(Stage::Execute, &calls, "not a function"));
    assert!(run_case(&harness, &fixture("throws", cfg)).result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Same throw without a declaration: unintended, and the code is surfaced.
    let verdict = run_case(&harness, &fixture("throws", config("throws")));
    let failure = verdict.result.unwrap_err();
    assert_eq!(
        failure.to_string(),
        "unexpected error during execute: TypeError: x is not a function"
    );
    assert_eq!(verdict.diagnostics, vec!["generated code:\n/* cjs */".to_string()]);
}

#[test]
fn exports_are_checked_after_execution() {
    let harness = harness_for(
        Path::new("."),
        Arc::new(format_echo("exports")),
        Arc::new(ScriptedSandbox::exporting(json!({ "answer": 41 }))),
    );
    let mut cfg = config("exports");
    let expected = json!({ "answer": 42 });
    cfg.exports = Some(Arc::new(move |exports: &serde_json::Value| {
        bc_fixture::check_exports(expected.as_object().unwrap(), exports)
    }));

    let verdict = run_case(&harness, &fixture("exports", cfg));
    assert!(matches!(verdict.result, Err(CaseFailure::Exports(_))));
    // An assertion failure is not an unintended fault.
    assert!(verdict.diagnostics.is_empty());
}

#[test]
fn show_surfaces_code_on_success() {
    let harness = harness_for(
        Path::new("."),
        Arc::new(format_echo("shown")),
        Arc::new(ScriptedSandbox::exporting(json!({}))),
    );
    let mut cfg = config("shown");
    cfg.show = true;

    let verdict = run_case(&harness, &fixture("shown", cfg));
    assert!(verdict.result.is_ok());
    assert_eq!(verdict.diagnostics.len(), 1);
}

#[test]
fn transforms_run_before_execution() {
    let sandbox = Arc::new(ScriptedSandbox::exporting(json!({})));
    let mut cfg = config("es2015");
    cfg.transforms = vec!["es2015".to_string()];

    let harness = harness_for(Path::new("."), Arc::new(format_echo("es2015")), sandbox.clone());
    let failure = run_case(&harness, &fixture("es2015", cfg.clone()))
        .result
        .unwrap_err();
    assert!(matches!(failure, CaseFailure::NoTransformer));

    let harness = harness.with_transformer(Arc::new(ScriptedTransformer::new(|code, whitelist| {
        Ok(format!("{code} /* {} */", whitelist.join(",")))
    })));
    assert!(run_case(&harness, &fixture("es2015", cfg)).result.is_ok());
    assert_eq!(sandbox.calls(), vec!["/* cjs */ /* es2015 */".to_string()]);
}

#[test]
fn transformer_rejection_is_an_execution_error() {
    let harness = harness_for(
        Path::new("."),
        Arc::new(format_echo("rejected")),
        Arc::new(ScriptedSandbox::exporting(json!({}))),
    )
    .with_transformer(Arc::new(ScriptedTransformer::new(|_, _| {
        Err(TransformError::Rejected {
            message: "Unexpected token (1:4)".to_string(),
            code: None,
        })
    })));

    let calls = Arc::new(AtomicUsize::new(0));
    let mut cfg = config("rejected");
    cfg.transforms = vec!["es2015".to_string()];
    cfg.error = Some(expect_error(Stage::Execute, &calls, "Unexpected token"));

    assert!(run_case(&harness, &fixture("rejected", cfg)).result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn sandbox_breakdown_is_not_a_thrown_error() {
    let harness = harness_for(
        Path::new("."),
        Arc::new(format_echo("broken-sandbox")),
        Arc::new(ScriptedSandbox::new(|_, _| {
            Err::<ModuleRecord, _>(SandboxError::Protocol("no result".to_string()))
        })),
    );
    let calls = Arc::new(AtomicUsize::new(0));
    let mut cfg = config("broken-sandbox");
    cfg.error = Some(expect_error(Stage::Execute, &calls, ""));

    let failure = run_case(&harness, &fixture("broken-sandbox", cfg))
        .result
        .unwrap_err();
    assert!(matches!(failure, CaseFailure::Sandbox(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
