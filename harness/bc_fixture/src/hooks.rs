//! Programmatic fixture callbacks.
//!
//! Some assertions are easier to write in Rust than to encode in
//! `_config.json`. A [`HookRegistry`] maps `(category, fixture name)` to
//! [`FixtureHooks`]; discovery layers them over the declarative config.

use std::sync::Arc;

use bc_sourcemap::SourceMap;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::assertion::AssertionError;
use crate::category::FixtureCategory;
use crate::config::{CaughtError, ExpectedError, Stage};

/// Assertion over an expected error.
pub type ErrorHook = Arc<dyn Fn(&CaughtError) -> Result<(), AssertionError> + Send + Sync>;

/// Assertion over the executed module's exports.
pub type ExportsHook = Arc<dyn Fn(&Value) -> Result<(), AssertionError> + Send + Sync>;

/// Assertion over generated code and its source map.
pub type SourcemapHook =
    Arc<dyn Fn(&str, &SourceMap) -> Result<(), AssertionError> + Send + Sync>;

/// Callbacks for one fixture.
#[derive(Clone, Default)]
pub struct FixtureHooks {
    pub error: Option<ExpectedError>,
    pub exports: Option<ExportsHook>,
    pub test: Option<SourcemapHook>,
}

impl FixtureHooks {
    pub fn new() -> Self {
        FixtureHooks::default()
    }

    /// Require `stage` to fail and check the error with `handler`.
    #[must_use]
    pub fn on_error(
        mut self,
        stage: Stage,
        handler: impl Fn(&CaughtError) -> Result<(), AssertionError> + Send + Sync + 'static,
    ) -> Self {
        self.error = Some(ExpectedError {
            stage,
            handler: Arc::new(handler),
        });
        self
    }

    #[must_use]
    pub fn on_exports(
        mut self,
        check: impl Fn(&Value) -> Result<(), AssertionError> + Send + Sync + 'static,
    ) -> Self {
        self.exports = Some(Arc::new(check));
        self
    }

    #[must_use]
    pub fn on_sourcemap(
        mut self,
        check: impl Fn(&str, &SourceMap) -> Result<(), AssertionError> + Send + Sync + 'static,
    ) -> Self {
        self.test = Some(Arc::new(check));
        self
    }
}

/// Hooks keyed by fixture identity.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: FxHashMap<(FixtureCategory, String), FixtureHooks>,
}

impl HookRegistry {
    pub fn new() -> Self {
        HookRegistry::default()
    }

    /// Register hooks for `category/name`, replacing any earlier ones.
    pub fn register(
        &mut self,
        category: FixtureCategory,
        name: impl Into<String>,
        hooks: FixtureHooks,
    ) -> &mut Self {
        self.hooks.insert((category, name.into()), hooks);
        self
    }

    pub fn get(&self, category: FixtureCategory, name: &str) -> Option<&FixtureHooks> {
        self.hooks.get(&(category, name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
