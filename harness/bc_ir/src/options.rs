//! Option maps passed across the bundler boundary.
//!
//! Options are kept as an open JSON object: fixtures may pass any option the
//! bundler understands, and the harness only reads or injects the handful of
//! keys listed in [`keys`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::format::{OutputFormat, UnknownFormat};

/// Option keys the harness reads or injects.
pub mod keys {
    pub const ENTRY: &str = "entry";
    pub const DEST: &str = "dest";
    pub const FORMAT: &str = "format";
    pub const SOURCE_MAP: &str = "sourceMap";
    pub const SOURCE_MAP_FILE: &str = "sourceMapFile";
}

/// An ordered bag of bundler options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Map<String, Value>);

impl Options {
    pub fn new() -> Self {
        Options(Map::new())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`Options::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Copy every key of `other` over `self` (later wins, no deep merge).
    pub fn extend_from(&mut self, other: &Options) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Shallow merge into a fresh map; `self` and `other` are left untouched.
    #[must_use]
    pub fn merged(&self, other: &Options) -> Options {
        let mut out = self.clone();
        out.extend_from(other);
        out
    }

    /// The requested output format, if any.
    pub fn format(&self) -> Result<Option<OutputFormat>, UnknownFormat> {
        match self.0.get(keys::FORMAT) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => s.parse().map(Some),
            Some(other) => Err(UnknownFormat(other.to_string())),
        }
    }

    pub fn entry(&self) -> Option<PathBuf> {
        self.path(keys::ENTRY)
    }

    pub fn dest(&self) -> Option<PathBuf> {
        self.path(keys::DEST)
    }

    /// Whether source-map computation was requested.
    pub fn source_map(&self) -> bool {
        matches!(self.0.get(keys::SOURCE_MAP), Some(Value::Bool(true)))
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.0.get(key).and_then(Value::as_str).map(PathBuf::from)
    }
}

impl From<Map<String, Value>> for Options {
    fn from(map: Map<String, Value>) -> Self {
        Options(map)
    }
}

/// The options handed to [`crate::Bundler::build`].
///
/// Always carries an `entry`; produced by merging category defaults, a
/// fixture's declared options and the fixture's entry file.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildRequest {
    options: Options,
    entry: PathBuf,
}

impl BuildRequest {
    /// Wrap `options`, injecting `entry` last so it always wins.
    pub fn new(options: Options, entry: PathBuf) -> Self {
        let options = options.with(keys::ENTRY, entry.to_string_lossy().into_owned());
        BuildRequest { options, entry }
    }

    pub fn entry(&self) -> &std::path::Path {
        &self.entry
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}
