//! Fixture test engine.
//!
//! This module provides:
//! - Case registration: turning discovered fixtures into runnable cases
//! - Execution: one runner per fixture category
//! - Comparison: recorded vs. freshly written output
//! - Result tracking: pass/fail/skip counts per fixture and per suite
//! - Parallel execution: running cases concurrently with rayon


pub use build::SharedBuild;
pub use compare::{compare_output, ComparisonResult, Mismatch, MISSING_FILE};
pub use failure::CaseFailure;
pub use registry::{Case, CaseRegistry, RegistrationError};
pub use result::{CaseId, CaseOutcome, CaseResult, FixtureSummary, SuiteSummary};
pub use runner::{Harness, HarnessConfig};
