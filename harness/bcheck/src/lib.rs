//! bundlecheck - conformance testing for module bundlers.
//!
//! Drives an opaque bundler through fixture directories and checks what it
//! produces in three ways:
//!
//! ```text
//! list_fixtures() ──► CaseRegistry::register() ──► Harness::run_registry()
//!                                                        │
//!                      ┌─────────────────────────────────┼──────────────────────────┐
//!                      ▼                                 ▼                          ▼
//!              function: build, generate cjs,   form: build, write each    sourcemaps: build,
//!              execute in a sandbox             profile, compare with      generate each profile
//!                                               _expected/                 with maps, run `test`
//! ```
//!
//! Each fixture is built at most once; every case of that fixture shares the
//! resulting bundle.

pub mod bridge;
pub mod commands;
pub mod test;
pub mod testing;

use std::sync::Once;

pub use test::{
    CaseFailure, CaseId, CaseOutcome, CaseRegistry, CaseResult, ComparisonResult, FixtureSummary,
    Harness, HarnessConfig, Mismatch, SharedBuild, SuiteSummary, MISSING_FILE,
};

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// Spans nest per fixture and profile. Filtering follows `RUST_LOG`
/// (default `warn`). Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let tree = tracing_tree::HierarchicalLayer::new(2)
            .with_targets(true)
            .with_bracketed_fields(true);

        // Another subscriber may already be installed (e.g. by a test binary).
        let _ = tracing_subscriber::registry().with(filter).with(tree).try_init();
    });
}
