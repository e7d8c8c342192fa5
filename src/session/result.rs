//! Result vector derived from a completed session

use serde::Serialize;

use super::state::TraitCatalog;

/// Count for one trait
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitScore {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub count: u32,
}

/// Scores of every trait with a non-zero tally, plus the dominant one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultVector {
    /// In catalog order
    pub scores: Vec<TraitScore>,
    pub dominant: String,
}

impl ResultVector {
    pub fn score(&self, trait_name: &str) -> Option<u32> {
        self.scores
            .iter()
            .find(|s| s.trait_name == trait_name)
            .map(|s| s.count)
    }

    /// Highest count
    pub fn max_score(&self) -> u32 {
        self.scores.iter().map(|s| s.count).max().unwrap_or(0)
    }
}

/// Outcome of a session, with the empty case kept distinct
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuizResult {
    Empty,
    Scored(ResultVector),
}

impl QuizResult {
    /// Build from per-trait counts indexed like the catalog
    pub fn from_tally(catalog: &TraitCatalog, tally: &[u32]) -> Self {
        let scores: Vec<TraitScore> = catalog
            .iter()
            .filter_map(|(id, name)| {
                let count = tally.get(id.index()).copied().unwrap_or(0);
                (count > 0).then(|| TraitScore {
                    trait_name: name.to_string(),
                    count,
                })
            })
            .collect();

        let dominant =
            dominant_trait(scores.iter().map(|s| (s.trait_name.as_str(), s.count))).map(str::to_string);
        match dominant {
            Some(dominant) => QuizResult::Scored(ResultVector { scores, dominant }),
            None => QuizResult::Empty,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, QuizResult::Empty)
    }

    pub fn scores(&self) -> &[TraitScore] {
        match self {
            QuizResult::Empty => &[],
            QuizResult::Scored(vector) => &vector.scores,
        }
    }

    pub fn dominant(&self) -> Option<&str> {
        match self {
            QuizResult::Empty => None,
            QuizResult::Scored(vector) => Some(&vector.dominant),
        }
    }
}

/// First trait whose count strictly exceeds every count before it
///
/// Ties keep the earlier trait. Zero counts never win.
pub fn dominant_trait<'a>(scores: impl IntoIterator<Item = (&'a str, u32)>) -> Option<&'a str> {
    let mut best: Option<(&str, u32)> = None;
    for (name, count) in scores {
        if count > best.map_or(0, |(_, max)| max) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name)
}
