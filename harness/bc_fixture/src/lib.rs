//! Fixtures for the bundlecheck harness.
//!
//! A fixture is a directory under one of three category roots:
//!
//! ```text
//! <root>/
//!   function/<name>/main.js  [_config.json]
//!   form/<name>/main.js       _config.json  _expected/<profile>.js[.map]
//!   sourcemaps/<name>/main.js _config.json
//! ```
//!
//! This crate finds them ([`list_fixtures`]), lowers their `_config.json`
//! into a [`FixtureConfig`] (merging in any programmatic [`FixtureHooks`]),
//! and turns a fixture into a [`bc_ir::BuildRequest`] ([`ConfigResolver`]).

mod assertion;
mod category;
mod config;
mod discovery;
mod hooks;
mod resolve;

pub use assertion::{check_error, check_exports, check_sourcemap, AssertionError};
pub use category::FixtureCategory;
pub use config::{
    CaughtError, ConfigFile, ErrorSpec, ExpectedError, FixtureConfig, MappingCheck, OriginalSpec,
    SourcemapSpec, Stage,
};
pub use discovery::{
    list_fixtures, DiscoveryError, Fixture, ACTUAL_DIR, CONFIG_FILE, ENTRY_FILE, EXPECTED_DIR,
};
pub use hooks::{ErrorHook, ExportsHook, FixtureHooks, HookRegistry, SourcemapHook};
pub use resolve::ConfigResolver;
