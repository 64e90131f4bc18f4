//! Character locators.

/// A zero-based line/column position. Columns count UTF-16 code units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub const fn new(line: u32, column: u32) -> Self {
        Location { line, column }
    }
}

/// Position of the first occurrence of `needle` in `text`.
pub fn locate(text: &str, needle: &str) -> Option<Location> {
    text.find(needle).map(|offset| location_of(text, offset))
}

/// Position of the byte offset `offset` in `text`.
///
/// Offsets past the end resolve to the end of the text.
pub fn location_of(text: &str, offset: usize) -> Location {
    let mut line: u32 = 0;
    let mut column: u32 = 0;

    for (index, ch) in text.char_indices() {
        if index >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += u32::try_from(ch.len_utf16()).unwrap_or(2);
        }
    }

    Location { line, column }
}
