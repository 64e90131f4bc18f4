//! Output profiles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A module format the bundler can emit.
///
/// The declaration order is the profile order: snapshot and sourcemap
/// fixtures are checked against every format in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Amd,
    Cjs,
    Es6,
    Iife,
    Umd,
}

impl OutputFormat {
    /// Every profile, in the order they are checked.
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Amd,
        OutputFormat::Cjs,
        OutputFormat::Es6,
        OutputFormat::Iife,
        OutputFormat::Umd,
    ];

    /// The `format` option value understood by the bundler.
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Amd => "amd",
            OutputFormat::Cjs => "cjs",
            OutputFormat::Es6 => "es6",
            OutputFormat::Iife => "iife",
            OutputFormat::Umd => "umd",
        }
    }

    /// Artifact file name for this profile, e.g. `es6.js`.
    pub fn file_name(self) -> String {
        format!("{}.js", self.as_str())
    }

    /// Companion source-map file name, e.g. `es6.js.map`.
    pub fn map_file_name(self) -> String {
        format!("{}.js.map", self.as_str())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `format` value that names none of the known profiles.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown output format '{0}' (expected one of amd, cjs, es6, iife, umd)")]
pub struct UnknownFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}
