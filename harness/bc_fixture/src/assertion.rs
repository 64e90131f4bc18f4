//! Checks behind the declarative `error`, `exports` and `test` fields.

use bc_sourcemap::{locate, SourceMap};
use serde_json::{Map, Value};

use crate::config::{CaughtError, ErrorSpec, SourcemapSpec};

/// A fixture assertion that did not hold.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct AssertionError(pub String);

impl AssertionError {
    #[cold]
    pub fn new(message: impl Into<String>) -> Self {
        AssertionError(message.into())
    }
}

/// Check a caught error against an `error` spec.
pub fn check_error(spec: &ErrorSpec, err: &CaughtError) -> Result<(), AssertionError> {
    if let Some(fragment) = &spec.message {
        if !err.message.contains(fragment.as_str()) {
            return Err(AssertionError::new(format!(
                "expected error message to contain {fragment:?}, got {:?}",
                err.message
            )));
        }
    }
    if let Some(code) = &spec.code {
        if err.code.as_deref() != Some(code.as_str()) {
            return Err(AssertionError::new(format!(
                "expected error code {code:?}, got {}",
                err.code.as_deref().map_or_else(|| "none".to_string(), |c| format!("{c:?}"))
            )));
        }
    }
    Ok(())
}

/// Every key of `expected` must deep-equal the same key of `exports`.
pub fn check_exports(expected: &Map<String, Value>, exports: &Value) -> Result<(), AssertionError> {
    let Some(actual) = exports.as_object() else {
        return Err(AssertionError::new(format!(
            "expected exports to be an object, got {exports}"
        )));
    };

    for (key, want) in expected {
        match actual.get(key) {
            Some(got) if got == want => {}
            Some(got) => {
                return Err(AssertionError::new(format!(
                    "export `{key}`: expected {want}, got {got}"
                )))
            }
            None => return Err(AssertionError::new(format!("missing export `{key}`"))),
        }
    }
    Ok(())
}

/// Whether `actual` names the file `expected`, allowing any leading path.
fn source_matches(actual: &str, expected: &str) -> bool {
    actual == expected || actual.ends_with(&format!("/{expected}"))
}

/// Run a declarative sourcemap `test`.
pub fn check_sourcemap(
    spec: &SourcemapSpec,
    code: &str,
    map: &SourceMap,
) -> Result<(), AssertionError> {
    if let Some(sources) = &spec.sources {
        for expected in sources {
            if !map.sources.iter().any(|s| source_matches(s, expected)) {
                return Err(AssertionError::new(format!(
                    "expected map sources {:?} to include {expected:?}",
                    map.sources
                )));
            }
        }
    }

    for check in &spec.mappings {
        let Some(generated) = locate(code, &check.generated) else {
            return Err(AssertionError::new(format!(
                "could not find {:?} in generated code",
                check.generated
            )));
        };

        let original = map
            .original_position_for(generated)
            .map_err(|e| AssertionError::new(format!("invalid source map: {e}")))?
            .ok_or_else(|| {
                AssertionError::new(format!(
                    "{:?} at {}:{} has no original position",
                    check.generated, generated.line, generated.column
                ))
            })?;

        let want = &check.original;
        let mismatch = |what: &str, expected: String, got: String| {
            AssertionError::new(format!(
                "{:?}: expected original {what} {expected}, got {got}",
                check.generated
            ))
        };

        if let Some(source) = &want.source {
            if !source_matches(&original.source, source) {
                return Err(mismatch("source", format!("{source:?}"), format!("{:?}", original.source)));
            }
        }
        if let Some(line) = want.line {
            if original.line != line {
                return Err(mismatch("line", line.to_string(), original.line.to_string()));
            }
        }
        if let Some(column) = want.column {
            if original.column != column {
                return Err(mismatch("column", column.to_string(), original.column.to_string()));
            }
        }
        if let Some(name) = &want.name {
            if original.name.as_deref() != Some(name.as_str()) {
                return Err(mismatch("name", format!("{name:?}"), format!("{:?}", original.name)));
            }
        }
    }

    Ok(())
}
