//! Testing utilities for bundlecheck.
//!
//! In-memory stand-ins for the external collaborators, so the engine can be
//! exercised without a real bundler or `node`:
//!
//! - **mocks**: [`StaticBundler`], [`ScriptedSandbox`], [`ScriptedTransformer`]
//! - **harness**: fixture-tree writers and a ready-made [`Harness`](crate::Harness)
//!
//! # Usage
//!
//! ```ignore
//! use bcheck::testing::{harness_for, write_fixture, ScriptedSandbox, StaticBundler};
//!
//! write_fixture(root, "function", "basic-function", &[("main.js", "export default 42;")])?;
//! let bundler = Arc::new(StaticBundler::new());
//! let sandbox = Arc::new(ScriptedSandbox::exporting(json!({})));
//! let summary = harness_for(root, bundler, sandbox).run();
//! assert_eq!(summary.exit_code(), 0);
//! ```

pub mod harness;
pub mod mocks;

pub use harness::{harness_for, write_fixture};
pub use mocks::{FixtureScript, ScriptedSandbox, ScriptedTransformer, StaticBundler};
