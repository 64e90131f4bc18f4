//! Source map support for bundlecheck.
//!
//! Sourcemap fixtures check semantic properties ("this token in the bundle
//! came from line 3 of `foo.js`") rather than diffing the raw map. This crate
//! provides what such checks need:
//!
//! - [`SourceMap`]: a revision 3 source map model (serde)
//! - [`decode_mappings`]: base64 VLQ decoding of the `mappings` field
//! - [`SourceMap::original_position_for`]: generated → original lookup
//! - [`locate`] / [`location_of`]: find line/column positions in text
//!
//! Conventions follow the common source-map consumers: [`Location`] is
//! zero-based in both line and column, while [`OriginalPosition::line`] is
//! one-based. Columns count UTF-16 code units.

mod locate;
mod vlq;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use locate::{locate, location_of, Location};
pub use vlq::{decode_mappings, Segment, SourceRef};

/// Errors produced while reading a source map.
#[derive(Debug, thiserror::Error)]
pub enum SourceMapError {
    #[error("source map is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported source map version {0} (expected 3)")]
    UnsupportedVersion(u32),
    #[error("invalid base64 character '{0}' in mappings")]
    InvalidBase64(char),
    #[error("mappings end in the middle of a VLQ value")]
    UnterminatedVlq,
    #[error("segment on generated line {line} has {fields} fields (expected 1, 4 or 5)")]
    InvalidSegment { line: usize, fields: usize },
    #[error("segment on generated line {line} decodes to a negative position")]
    NegativePosition { line: usize },
    #[error("segment references source #{0}, which does not exist")]
    SourceOutOfRange(u32),
    #[error("segment references name #{0}, which does not exist")]
    NameOutOfRange(u32),
}

/// A revision 3 source map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources_content: Vec<Option<String>>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

/// Where a generated position came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OriginalPosition {
    pub source: String,
    /// One-based line in `source`.
    pub line: u32,
    /// Zero-based column in `source`.
    pub column: u32,
    pub name: Option<String>,
}

impl SourceMap {
    pub fn parse(text: &str) -> Result<Self, SourceMapError> {
        Self::checked(serde_json::from_str(text)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, SourceMapError> {
        Self::checked(Self::deserialize(value)?)
    }

    fn checked(map: SourceMap) -> Result<Self, SourceMapError> {
        if map.version == 3 {
            Ok(map)
        } else {
            Err(SourceMapError::UnsupportedVersion(map.version))
        }
    }

    /// Decode `mappings` into per-line segments.
    pub fn decoded(&self) -> Result<Vec<Vec<Segment>>, SourceMapError> {
        decode_mappings(&self.mappings)
    }

    /// Map a generated position back to its original position.
    ///
    /// Uses the closest segment at or before `generated.column` on the same
    /// generated line. Returns `None` when there is no such segment or when
    /// it carries no source information.
    pub fn original_position_for(
        &self,
        generated: Location,
    ) -> Result<Option<OriginalPosition>, SourceMapError> {
        let lines = self.decoded()?;
        let Some(segments) = lines.get(generated.line as usize) else {
            return Ok(None);
        };

        let Some(segment) = segments
            .iter()
            .take_while(|s| s.generated_column <= generated.column)
            .last()
        else {
            return Ok(None);
        };

        let Some(origin) = segment.source else {
            return Ok(None);
        };

        let source = self
            .sources
            .get(origin.source as usize)
            .ok_or(SourceMapError::SourceOutOfRange(origin.source))?;
        let name = match origin.name {
            Some(index) => Some(
                self.names
                    .get(index as usize)
                    .ok_or(SourceMapError::NameOutOfRange(index))?
                    .clone(),
            ),
            None => None,
        };

        Ok(Some(OriginalPosition {
            source: source.clone(),
            line: origin.line + 1,
            column: origin.column,
            name,
        }))
    }
}
