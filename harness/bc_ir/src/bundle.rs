//! The bundler boundary.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::{BuildRequest, Options};

/// Generated output for one profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub code: String,
    /// Structured source map, present only when `sourceMap` was requested.
    #[serde(default)]
    pub map: Option<Value>,
}

/// An error raised by the bundler (or by writing its output).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleError {
    /// Human-readable message, as reported by the bundler.
    pub message: String,
    /// Machine-readable error code, when the bundler provides one.
    #[serde(default)]
    pub code: Option<String>,
}

impl BundleError {
    #[cold]
    pub fn new(message: impl Into<String>) -> Self {
        BundleError {
            message: message.into(),
            code: None,
        }
    }

    #[cold]
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        BundleError {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    #[cold]
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        BundleError::with_code(format!("could not write {}: {err}", path.display()), "EIO")
    }
}

impl std::fmt::Display for BundleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} [{code}]", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for BundleError {}

/// The result of a successful build.
///
/// A bundle may be generated from any number of times, concurrently, with
/// different options. Generation must not change the bundle.
pub trait Bundle: Send + Sync {
    /// Generate output in memory.
    fn generate(&self, options: &Options) -> Result<Output, BundleError>;

    /// Generate output and persist it to `options.dest`.
    ///
    /// The code is written to `dest`; when the output carries a source map it
    /// is written next to it as `<dest>.map`.
    fn write(&self, options: &Options) -> Result<Output, BundleError> {
        let Some(dest) = options.dest() else {
            return Err(BundleError::new("bundle.write requires a `dest` option"));
        };

        let output = self.generate(options)?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| BundleError::io(parent, &e))?;
        }
        fs::write(&dest, &output.code).map_err(|e| BundleError::io(&dest, &e))?;

        if let Some(map) = &output.map {
            let map_path = map_path_for(&dest);
            let text = serde_json::to_string(map)
                .map_err(|e| BundleError::new(format!("could not serialize source map: {e}")))?;
            fs::write(&map_path, text).map_err(|e| BundleError::io(&map_path, &e))?;
        }

        tracing::debug!(dest = %dest.display(), map = output.map.is_some(), "wrote bundle");
        Ok(output)
    }
}

/// The bundler under test.
pub trait Bundler: Send + Sync {
    fn build(&self, request: &BuildRequest) -> Result<Arc<dyn Bundle>, BundleError>;
}

/// `<dest>.map`, the companion map path for an output file.
pub fn map_path_for(dest: &Path) -> PathBuf {
    let mut name: OsString = dest.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}
