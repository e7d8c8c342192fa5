//! Completed-test records kept in the results log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::result::QuizResult;

/// One finished test: who took it, when, and the per-trait counts
///
/// Serialized with the log's field names `userId`, `date` and `scores`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "date")]
    pub completed_at: DateTime<Utc>,
    /// Trait to count; empty when nothing was answered
    #[serde(default)]
    pub scores: BTreeMap<String, u32>,
}

impl ResultRecord {
    pub fn new(user_id: impl Into<String>, result: &QuizResult, completed_at: DateTime<Utc>) -> Self {
        let scores = result
            .scores()
            .iter()
            .map(|s| (s.trait_name.clone(), s.count))
            .collect();
        Self {
            user_id: user_id.into(),
            completed_at,
            scores,
        }
    }

    /// Record stamped with the current time
    pub fn now(user_id: impl Into<String>, result: &QuizResult) -> Self {
        Self::new(user_id, result, Utc::now())
    }
}
