//! Question bank data structures

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::validate::{non_blank, RecordDefect};

/// Inline capacity for answer options, matching the default row format
pub const INLINE_OPTIONS: usize = 4;

/// Options of a single question, stored inline for the common case
pub type OptionList = SmallVec<[AnswerOption; INLINE_OPTIONS]>;

/// One selectable answer, contributing to a single trait
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Text shown to the user
    #[serde(rename = "text")]
    pub label: String,
    /// Trait this option counts toward
    #[serde(rename = "type")]
    pub trait_name: String,
}

impl AnswerOption {
    pub fn new(label: impl Into<String>, trait_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            trait_name: trait_name.into(),
        }
    }

    /// Both fields must carry text
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        non_blank(&self.label).is_some() && non_blank(&self.trait_name).is_some()
    }
}

/// A question with its ordered answer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(default)]
    pub options: OptionList,
}

impl QuestionRecord {
    pub fn new(prompt: impl Into<String>, options: impl IntoIterator<Item = AnswerOption>) -> Self {
        Self {
            prompt: prompt.into(),
            options: options.into_iter().collect(),
        }
    }

    /// Problem that keeps the whole record out of a session, if any
    ///
    /// Blank options alone do not disqualify a record as long as one
    /// usable option remains; see `blank_options`.
    pub fn defect(&self) -> Option<RecordDefect> {
        if non_blank(&self.prompt).is_none() {
            return Some(RecordDefect::BlankPrompt);
        }
        if !self.options.iter().any(AnswerOption::is_well_formed) {
            return Some(RecordDefect::NoOptions);
        }
        None
    }

    /// Positions of options with a blank label or trait
    pub fn blank_options(&self) -> impl Iterator<Item = usize> + '_ {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.is_well_formed())
            .map(|(i, _)| i)
    }

    /// Presentable: a prompt and at least one usable option
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.defect().is_none()
    }
}

/// Ordered question set; insertion order is presentation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    questions: Vec<QuestionRecord>,
}

impl QuestionBank {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        Self { questions }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&QuestionRecord> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestionRecord> {
        self.questions.iter()
    }

    /// Parse a bank from its persisted JSON form
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the bank in its persisted JSON form
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FromIterator<QuestionRecord> for QuestionBank {
    fn from_iter<I: IntoIterator<Item = QuestionRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
