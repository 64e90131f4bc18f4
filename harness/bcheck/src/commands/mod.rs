//! Command handlers for the bundlecheck CLI.

mod list;

pub use list::list_cases;
pub use test::run_tests;

use std::sync::Arc;

use bc_sandbox::NodeSandbox;

use crate::bridge::{CommandBundler, CommandTransformer};
use crate::test::{Harness, HarnessConfig};

/// Build a harness from the CLI configuration, or exit with a message.
fn harness_from_config(config: &HarnessConfig) -> Harness {
    let Some(line) = config.bundler.as_deref() else {
        eprintln!("error: no bundler configured");
        eprintln!("Pass --bundler=<command>, e.g. --bundler=\"node ./bridge.js\"");
        std::process::exit(1);
    };
    let Some(bundler) = CommandBundler::parse(line) else {
        eprintln!("error: invalid --bundler command: {line}");
        eprintln!("Quote words containing spaces; every quote must be closed");
        std::process::exit(1);
    };

    let sandbox = NodeSandbox::with_program(config.node.clone());
    let harness = Harness::new(config.clone(), Arc::new(bundler), Arc::new(sandbox));

    match config.transformer.as_deref() {
        Some(line) => match CommandTransformer::parse(line) {
            Some(transformer) => harness.with_transformer(Arc::new(transformer)),
            None => {
                eprintln!("error: invalid --transformer command: {line}");
                std::process::exit(1);
            }
        },
        None => harness,
    }
}
