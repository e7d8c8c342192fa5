//! Validation helpers shared by the import pipeline and the session engine

use std::fmt;

/// Byte-order mark that spreadsheet exports prepend to the first header
const BOM: char = '\u{feff}';

/// Return the trimmed text if anything remains
#[inline]
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Canonical form of a column name: BOM stripped, trimmed, lowercased
pub fn normalize_header(name: &str) -> String {
    name.trim_start_matches(BOM).trim().to_lowercase()
}

/// Why a question record, or one of its options, cannot be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDefect {
    BlankPrompt,
    /// No option has both a label and a trait
    NoOptions,
    /// Option at this position has a blank label or trait
    BlankOption(usize),
}

impl fmt::Display for RecordDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDefect::BlankPrompt => write!(f, "blank prompt"),
            RecordDefect::NoOptions => write!(f, "no usable options"),
            RecordDefect::BlankOption(i) => write!(f, "option {} has a blank label or trait", i),
        }
    }
}
