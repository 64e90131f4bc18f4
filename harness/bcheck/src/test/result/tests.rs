use super::*;
use bc_fixture::Stage;
use pretty_assertions::assert_eq;

fn id(name: &str) -> CaseId {
    CaseId::new(FixtureCategory::Form, name)
}

#[test]
fn case_id_display() {
    assert_eq!(id("simple").to_string(), "form/simple");
    assert_eq!(
        id("simple").with_profile(OutputFormat::Es6).to_string(),
        "form/simple/es6"
    );
    assert_eq!(
        id("simple").with_profile(OutputFormat::Es6).fixture_id(),
        "form/simple"
    );
}

#[test]
fn case_outcome_predicates() {
    assert!(CaseOutcome::Passed.is_passed());
    assert!(!CaseOutcome::Passed.is_failed());
    assert!(CaseOutcome::Failed(CaseFailure::MissingError(Stage::Build)).is_failed());
    assert!(CaseOutcome::Skipped("skip".into()).is_skipped());
    assert!(CaseOutcome::Passed.failure().is_none());
}

#[test]
fn fixture_summary_counts() {
    let mut summary = FixtureSummary::new("form/simple");
    summary.add_result(CaseResult::passed(
        id("simple").with_profile(OutputFormat::Amd),
        Duration::from_millis(10),
    ));
    summary.add_result(CaseResult::failed(
        id("simple").with_profile(OutputFormat::Cjs),
        CaseFailure::MissingError(Stage::Generate),
        Duration::from_millis(5),
    ));
    summary.add_result(CaseResult::skipped(
        id("simple").with_profile(OutputFormat::Es6),
        "not solo",
    ));

    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.duration, Duration::from_millis(15));
    assert!(summary.has_failures());
}

#[test]
fn suite_exit_code() {
    let mut summary = SuiteSummary::new();
    assert_eq!(summary.exit_code(), 2); // Nothing ran

    summary.skipped = 3;
    assert_eq!(summary.exit_code(), 2); // Still nothing ran

    summary.passed = 1;
    assert_eq!(summary.exit_code(), 0);

    summary.failed = 1;
    assert_eq!(summary.exit_code(), 1);

    // A fixture that failed discovery is a failure even if everything else passed.
    let mut summary = SuiteSummary::new();
    let mut broken = FixtureSummary::new("form/broken");
    broken.add_error("form/broken: missing _config.json".to_string());
    summary.add_fixture(broken);
    summary.passed = 4;
    assert_eq!(summary.error_fixtures, 1);
    assert_eq!(summary.exit_code(), 1);
}

#[test]
fn suite_looks_up_cases_by_id() {
    let mut fixture = FixtureSummary::new("form/simple");
    fixture.add_result(CaseResult::passed(
        id("simple").with_profile(OutputFormat::Umd),
        Duration::ZERO,
    ));
    let mut summary = SuiteSummary::new();
    summary.add_fixture(fixture);

    assert!(summary.case("form/simple/umd").is_some());
    assert!(summary.case("form/simple/amd").is_none());
}
