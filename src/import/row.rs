//! Typed decoding of uploaded rows
//!
//! Rows arrive as loose column maps. They are turned into a fixed
//! `QuestionRow` shape right away, so nothing past this module ever sees
//! column names.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{non_blank, normalize_header, AnswerOption, OptionList, QuestionRecord, MAX_OPTION_SLOTS};

/// Column holding the question prompt
pub const QUESTION_COLUMN: &str = "question";

/// Matches any option column, supported or not
static OPTION_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^option(\d+)_(?:text|type)$").expect("option column pattern is valid")
});

/// One uploaded row keyed by normalized column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: AHashMap<String, String>,
}

impl RawRow {
    /// Build a row, normalizing every column name
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (normalize_header(k.as_ref()), v.into()))
            .collect();
        Self { cells }
    }

    /// Trimmed, non-empty value of a column
    #[inline]
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells.get(column).and_then(|v| non_blank(v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

/// Column names of one option slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionColumns {
    pub slot: usize,
    pub text: String,
    pub trait_column: String,
}

/// Which columns make up a question row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    slots: Vec<OptionColumns>,
}

impl ColumnLayout {
    /// Layout reading option pairs 1..=max_slots, capped at `MAX_OPTION_SLOTS`
    pub fn new(max_slots: usize) -> Self {
        let slots = (1..=max_slots.min(MAX_OPTION_SLOTS))
            .map(|slot| OptionColumns {
                slot,
                text: format!("option{}_text", slot),
                trait_column: format!("option{}_type", slot),
            })
            .collect();
        Self { slots }
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[OptionColumns] {
        &self.slots
    }

    /// Decode a row into the fixed question shape
    pub fn decode(&self, row: &RawRow) -> QuestionRow {
        let prompt = row.cell(QUESTION_COLUMN).map(str::to_string);

        let mut options = OptionList::new();
        for columns in &self.slots {
            // Both halves must be present; slots may have gaps
            if let (Some(text), Some(trait_name)) =
                (row.cell(&columns.text), row.cell(&columns.trait_column))
            {
                options.push(AnswerOption::new(text, trait_name));
            }
        }

        QuestionRow { prompt, options }
    }

    /// Option columns this layout does not read, sorted
    pub fn unsupported_columns<'a>(&self, columns: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut ignored: Vec<String> = columns
            .filter(|name| {
                OPTION_COLUMN
                    .captures(name)
                    .and_then(|caps| caps[1].parse::<usize>().ok())
                    .is_some_and(|slot| slot == 0 || slot > self.slot_count())
            })
            .map(str::to_string)
            .collect();
        ignored.sort();
        ignored
    }
}

/// Why a row produced no question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    MissingQuestion,
    NoValidOptions,
}

/// A decoded row, not yet accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRow {
    pub prompt: Option<String>,
    pub options: OptionList,
}

impl QuestionRow {
    pub fn into_record(self) -> std::result::Result<QuestionRecord, RowRejection> {
        let prompt = self.prompt.ok_or(RowRejection::MissingQuestion)?;
        if self.options.is_empty() {
            return Err(RowRejection::NoValidOptions);
        }
        Ok(QuestionRecord {
            prompt,
            options: self.options,
        })
    }
}
