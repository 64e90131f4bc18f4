//! Fixture configuration.
//!
//! `_config.json` is read into a [`ConfigFile`] and lowered into a
//! [`FixtureConfig`]. Every field is optional; the callback-shaped fields
//! (`error`, `exports`, `test`) have declarative forms here and programmatic
//! forms in [`crate::FixtureHooks`].

use std::fmt;
use std::sync::Arc;

use bc_ir::Options;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::assertion::{check_error, check_exports, check_sourcemap};
use crate::hooks::{ErrorHook, ExportsHook, FixtureHooks, SourcemapHook};

/// A pipeline stage of a function fixture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// `Bundler::build`.
    #[default]
    Build,
    /// `Bundle::generate`.
    Generate,
    /// Post-processing and sandboxed execution of the generated code.
    Execute,
}

impl Stage {
    /// The gerund used in "expected an error while ..." faults.
    pub const fn activity(self) -> &'static str {
        match self {
            Stage::Build => "rolling up",
            Stage::Generate => "generating output",
            Stage::Execute => "executing output",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Build => "build",
            Stage::Generate => "generate",
            Stage::Execute => "execute",
        })
    }
}

/// Declarative `error` expectation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ErrorSpec {
    /// Substring the error message must contain.
    pub message: Option<String>,
    /// Exact error code.
    pub code: Option<String>,
    /// Stage that must throw.
    pub stage: Stage,
}

/// Declarative sourcemap `test`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SourcemapSpec {
    /// Sources the map must list (matched by path suffix).
    pub sources: Option<Vec<String>>,
    pub mappings: Vec<MappingCheck>,
}

impl SourcemapSpec {
    /// Whether the spec checks nothing at all.
    pub fn is_empty(&self) -> bool {
        self.sources.as_deref().unwrap_or_default().is_empty() && self.mappings.is_empty()
    }
}

/// "The first `generated` in the bundle maps back to `original`."
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingCheck {
    pub generated: String,
    pub original: OriginalSpec,
}

/// Expected original position; unset fields are not checked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OriginalSpec {
    pub source: Option<String>,
    /// One-based.
    pub line: Option<u32>,
    /// Zero-based.
    pub column: Option<u32>,
    pub name: Option<String>,
}

/// The on-disk shape of `_config.json`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ConfigFile {
    pub description: Option<String>,
    /// Build options, merged into the build request.
    pub options: Options,
    /// Generate-time overrides for function fixtures.
    pub bundle_options: Options,
    pub skip: bool,
    pub solo: bool,
    /// Always print the generated code.
    pub show: bool,
    /// Post-processing transforms applied before execution.
    #[serde(rename = "babel", alias = "transforms")]
    pub transforms: Vec<String>,
    pub error: Option<ErrorSpec>,
    /// Expected exports, compared key by key.
    pub exports: Option<Map<String, Value>>,
    pub test: Option<SourcemapSpec>,
}

/// An error caught while running a fixture, as handed to `error` callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaughtError {
    pub stage: Stage,
    pub message: String,
    pub code: Option<String>,
    /// Error class name, for errors thrown by executed code.
    pub name: Option<String>,
}

impl fmt::Display for CaughtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        Ok(())
    }
}

/// A declared expected failure.
#[derive(Clone)]
pub struct ExpectedError {
    /// The stage that must throw.
    pub stage: Stage,
    /// Runs the fixture's assertions on the caught error.
    pub handler: ErrorHook,
}

/// A fixture's resolved configuration.
#[derive(Clone, Default)]
pub struct FixtureConfig {
    pub description: String,
    pub options: Options,
    pub bundle_options: Options,
    pub skip: bool,
    pub solo: bool,
    pub show: bool,
    pub transforms: Vec<String>,
    /// Present exactly when failure is required.
    pub error: Option<ExpectedError>,
    pub exports: Option<ExportsHook>,
    pub test: Option<SourcemapHook>,
}

impl fmt::Debug for FixtureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureConfig")
            .field("description", &self.description)
            .field("options", &self.options)
            .field("bundle_options", &self.bundle_options)
            .field("skip", &self.skip)
            .field("solo", &self.solo)
            .field("show", &self.show)
            .field("transforms", &self.transforms)
            .field("error", &self.error.as_ref().map(|e| e.stage))
            .field("exports", &self.exports.is_some())
            .field("test", &self.test.is_some())
            .finish()
    }
}

impl FixtureConfig {
    /// The config of a function fixture that has no `_config.json`.
    pub fn synthesized(name: &str) -> Self {
        FixtureConfig {
            description: name.to_string(),
            ..FixtureConfig::default()
        }
    }

    /// Lower a parsed config file, layering programmatic hooks on top.
    ///
    /// When both forms of a callback exist, the declarative check runs
    /// first. Returns an error message if they disagree on the error stage.
    pub fn lower(
        name: &str,
        file: ConfigFile,
        hooks: Option<&FixtureHooks>,
    ) -> Result<Self, String> {
        let empty = FixtureHooks::default();
        let hooks = hooks.unwrap_or(&empty);

        let declared_error = file.error.map(|spec| {
            let stage = spec.stage;
            let handler: ErrorHook = Arc::new(move |err: &CaughtError| check_error(&spec, err));
            ExpectedError { stage, handler }
        });
        let error = match (declared_error, hooks.error.clone()) {
            (None, None) => None,
            (Some(declared), None) => Some(declared),
            (None, Some(hook)) => Some(hook),
            (Some(declared), Some(hook)) => {
                if declared.stage != hook.stage {
                    return Err(format!(
                        "`error` is declared for the {} stage in _config.json but for the {} stage by a registered hook",
                        declared.stage, hook.stage
                    ));
                }
                let first = declared.handler;
                let second = hook.handler;
                let handler: ErrorHook = Arc::new(move |err: &CaughtError| {
                    first(err)?;
                    second(err)
                });
                Some(ExpectedError {
                    stage: declared.stage,
                    handler,
                })
            }
        };

        let declared_exports = file.exports.map(|expected| {
            let hook: ExportsHook =
                Arc::new(move |exports: &Value| check_exports(&expected, exports));
            hook
        });
        let exports = chain(
            declared_exports,
            hooks.exports.clone(),
            |first: ExportsHook, second: ExportsHook| -> ExportsHook {
                Arc::new(move |exports: &Value| {
                    first(exports)?;
                    second(exports)
                })
            },
        );

        let declared_test = file.test.map(|spec| {
            let hook: SourcemapHook = Arc::new(move |code: &str, map: &bc_sourcemap::SourceMap| {
                check_sourcemap(&spec, code, map)
            });
            hook
        });
        let test = chain(
            declared_test,
            hooks.test.clone(),
            |first: SourcemapHook, second: SourcemapHook| -> SourcemapHook {
                Arc::new(move |code: &str, map: &bc_sourcemap::SourceMap| {
                    first(code, map)?;
                    second(code, map)
                })
            },
        );

        Ok(FixtureConfig {
            description: file.description.unwrap_or_else(|| name.to_string()),
            options: file.options,
            bundle_options: file.bundle_options,
            skip: file.skip,
            solo: file.solo,
            show: file.show,
            transforms: file.transforms,
            error,
            exports,
            test,
        })
    }
}

fn chain<T>(first: Option<T>, second: Option<T>, both: impl FnOnce(T, T) -> T) -> Option<T> {
    match (first, second) {
        (Some(a), Some(b)) => Some(both(a, b)),
        (a, b) => a.or(b),
    }
}
