//! Tunable settings for import and result reporting

use serde::{Deserialize, Deserializer};

use crate::error::QuizError;

/// Number of option column pairs in the standard upload format
pub const DEFAULT_OPTION_SLOTS: usize = 4;

/// Largest accepted `max_option_slots`
pub const MAX_OPTION_SLOTS: usize = 16;

/// Quiz-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizSettings {
    /// Highest `option{i}_text` / `option{i}_type` pair read from uploads
    #[serde(default = "default_option_slots", deserialize_with = "deserialize_option_slots")]
    pub max_option_slots: usize,
    /// Shown when the dominant trait has no interpretation text
    #[serde(default = "default_fallback_interpretation")]
    pub fallback_interpretation: String,
    /// Lower bound for the chart scale
    #[serde(default = "default_chart_floor")]
    pub chart_floor: u32,
    /// Shown instead of a chart when nothing was answered
    #[serde(default = "default_empty_result_message")]
    pub empty_result_message: String,
}

fn default_option_slots() -> usize {
    DEFAULT_OPTION_SLOTS
}

fn deserialize_option_slots<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let slots = usize::deserialize(deserializer)?;
    check_option_slots(slots).map_err(serde::de::Error::custom)
}

/// Slot count within 1..=MAX_OPTION_SLOTS
pub fn check_option_slots(slots: usize) -> Result<usize, QuizError> {
    if (1..=MAX_OPTION_SLOTS).contains(&slots) {
        Ok(slots)
    } else {
        Err(QuizError::InvalidSettings(format!(
            "max_option_slots must be between 1 and {}, got {}",
            MAX_OPTION_SLOTS, slots
        )))
    }
}

fn default_fallback_interpretation() -> String {
    "Your results are being calculated.".to_string()
}

fn default_chart_floor() -> u32 {
    3
}

fn default_empty_result_message() -> String {
    "No answers were recorded. Please retake the test.".to_string()
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            max_option_slots: default_option_slots(),
            fallback_interpretation: default_fallback_interpretation(),
            chart_floor: default_chart_floor(),
            empty_result_message: default_empty_result_message(),
        }
    }
}
