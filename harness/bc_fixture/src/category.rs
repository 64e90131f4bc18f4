//! Fixture categories.

use std::fmt;
use std::str::FromStr;

/// The three kinds of fixture, each with its own validation strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FixtureCategory {
    /// Build, generate CommonJS, execute in a sandbox.
    Function,
    /// Build, write every profile, compare against recorded output.
    Form,
    /// Build, generate every profile with source maps, run custom checks.
    Sourcemaps,
}

impl FixtureCategory {
    pub const ALL: [FixtureCategory; 3] = [
        FixtureCategory::Function,
        FixtureCategory::Form,
        FixtureCategory::Sourcemaps,
    ];

    /// Directory name of the category root.
    pub const fn dir_name(self) -> &'static str {
        match self {
            FixtureCategory::Function => "function",
            FixtureCategory::Form => "form",
            FixtureCategory::Sourcemaps => "sourcemaps",
        }
    }

    /// Whether fixtures of this category must carry a `_config.json`.
    ///
    /// A function fixture without one is a plain "must run cleanly" case.
    pub const fn requires_config(self) -> bool {
        !matches!(self, FixtureCategory::Function)
    }

    /// Whether cases are registered once per output profile.
    pub const fn per_profile(self) -> bool {
        !matches!(self, FixtureCategory::Function)
    }
}

impl fmt::Display for FixtureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for FixtureCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FixtureCategory::ALL
            .into_iter()
            .find(|c| c.dir_name() == s)
            .ok_or_else(|| format!("unknown fixture category '{s}' (expected function, form or sourcemaps)"))
    }
}
