//! The `list` command: show the cases discovery would register.

use std::sync::Arc;

use bc_ir::{Bundle, BundleError, BuildRequest, Bundler};
use bc_sandbox::NodeSandbox;

use crate::test::{Harness, HarnessConfig};

/// Print every case id under the configured root, then any fixture errors.
///
/// Listing never builds, so no bundler is required.
pub fn list_cases(config: &HarnessConfig) {
    if !config.root.exists() {
        eprintln!("Path not found: {}", config.root.display());
        std::process::exit(1);
    }

    let harness = Harness::new(
        config.clone(),
        Arc::new(NoBundler),
        Arc::new(NodeSandbox::with_program(config.node.clone())),
    );
    let registry = harness.discover();

    for case in registry.cases() {
        let marker = if case.fixture.config.solo {
            " (solo)"
        } else if case.fixture.config.skip {
            " (skip)"
        } else {
            ""
        };
        println!("{}{marker}", case.id);
    }
    for error in registry.errors() {
        println!("ERROR: {}", error.error);
    }

    println!();
    println!("{} cases, {} errors", registry.len(), registry.errors().len());
    std::process::exit(i32::from(!registry.errors().is_empty()));
}

/// Stands in for the bundler when nothing is built.
struct NoBundler;

impl Bundler for NoBundler {
    fn build(&self, _request: &BuildRequest) -> Result<Arc<dyn Bundle>, BundleError> {
        Err(BundleError::new("listing does not build"))
    }
}
