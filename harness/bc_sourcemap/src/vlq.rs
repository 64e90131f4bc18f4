//! Base64 VLQ decoding of the `mappings` field.

use crate::SourceMapError;

/// A decoded mapping segment with absolute positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Zero-based column in the generated line.
    pub generated_column: u32,
    pub source: Option<SourceRef>,
}

/// The original-source half of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceRef {
    /// Index into `sources`.
    pub source: u32,
    /// Zero-based line.
    pub line: u32,
    /// Zero-based column.
    pub column: u32,
    /// Index into `names`.
    pub name: Option<u32>,
}

const VLQ_SHIFT: u32 = 5;
const VLQ_CONTINUATION: u32 = 1 << VLQ_SHIFT;
const VLQ_MASK: u32 = VLQ_CONTINUATION - 1;

fn base64_value(byte: u8) -> Result<u32, SourceMapError> {
    let value = match byte {
        b'A'..=b'Z' => byte - b'A',
        b'a'..=b'z' => byte - b'a' + 26,
        b'0'..=b'9' => byte - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return Err(SourceMapError::InvalidBase64(char::from(byte))),
    };
    Ok(u32::from(value))
}

/// Decode one segment's worth of signed VLQ values.
fn decode_fields(segment: &[u8]) -> Result<Vec<i64>, SourceMapError> {
    let mut fields = Vec::with_capacity(5);
    let mut value: i64 = 0;
    let mut shift: u32 = 0;
    let mut pending = false;

    for &byte in segment {
        let digit = base64_value(byte)?;
        value += i64::from(digit & VLQ_MASK) << shift;
        if digit & VLQ_CONTINUATION == 0 {
            // Least significant bit carries the sign.
            let magnitude = value >> 1;
            fields.push(if value & 1 == 1 { -magnitude } else { magnitude });
            value = 0;
            shift = 0;
            pending = false;
        } else {
            shift += VLQ_SHIFT;
            pending = true;
            if shift > 60 {
                return Err(SourceMapError::UnterminatedVlq);
            }
        }
    }

    if pending {
        return Err(SourceMapError::UnterminatedVlq);
    }
    Ok(fields)
}

fn absolute(base: &mut i64, delta: i64, line: usize) -> Result<u32, SourceMapError> {
    *base += delta;
    u32::try_from(*base).map_err(|_| SourceMapError::NegativePosition { line })
}

/// Decode a `mappings` string into one segment list per generated line.
///
/// Source index, original line/column and name index are relative across the
/// whole string; the generated column resets at every line.
pub fn decode_mappings(mappings: &str) -> Result<Vec<Vec<Segment>>, SourceMapError> {
    let mut lines = Vec::new();
    let mut source: i64 = 0;
    let mut original_line: i64 = 0;
    let mut original_column: i64 = 0;
    let mut name: i64 = 0;

    for (index, line) in mappings.split(';').enumerate() {
        let mut generated_column: i64 = 0;
        let mut segments = Vec::new();

        for raw in line.split(',').filter(|s| !s.is_empty()) {
            let fields = decode_fields(raw.as_bytes())?;
            let Some(&first) = fields.first() else {
                return Err(SourceMapError::InvalidSegment {
                    line: index,
                    fields: 0,
                });
            };
            let column = absolute(&mut generated_column, first, index)?;
            let source_ref = match fields.len() {
                1 => None,
                4 | 5 => Some(SourceRef {
                    source: absolute(&mut source, fields[1], index)?,
                    line: absolute(&mut original_line, fields[2], index)?,
                    column: absolute(&mut original_column, fields[3], index)?,
                    name: match fields.get(4) {
                        Some(&delta) => Some(absolute(&mut name, delta, index)?),
                        None => None,
                    },
                }),
                n => {
                    return Err(SourceMapError::InvalidSegment {
                        line: index,
                        fields: n,
                    })
                }
            };
            segments.push(Segment {
                generated_column: column,
                source: source_ref,
            });
        }

        lines.push(segments);
    }

    Ok(lines)
}
