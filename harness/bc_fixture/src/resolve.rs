//! Fixture → build request.

use bc_ir::{BuildRequest, Options};
use rustc_hash::FxHashMap;

use crate::category::FixtureCategory;
use crate::discovery::Fixture;

/// Produces the build options for a fixture.
///
/// Three layers, later wins, shallow: the category's defaults, the
/// fixture's declared `options`, then `entry` pointing at the fixture's
/// `main.js`.
#[derive(Clone, Debug, Default)]
pub struct ConfigResolver {
    defaults: FxHashMap<FixtureCategory, Options>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        ConfigResolver::default()
    }

    /// Set the default options for `category`.
    #[must_use]
    pub fn with_defaults(mut self, category: FixtureCategory, defaults: Options) -> Self {
        self.defaults.insert(category, defaults);
        self
    }

    pub fn defaults(&self, category: FixtureCategory) -> Option<&Options> {
        self.defaults.get(&category)
    }

    pub fn resolve(&self, fixture: &Fixture) -> BuildRequest {
        let mut options = self
            .defaults
            .get(&fixture.category)
            .cloned()
            .unwrap_or_default();
        options.extend_from(&fixture.config.options);
        BuildRequest::new(options, fixture.entry())
    }
}
