//! Presenter-ready view of a quiz result

use serde::Serialize;

use crate::config::{InterpretationMap, QuizSettings};

use super::result::QuizResult;

/// Data series for the score chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u32>,
    /// Upper end of the scale, never below the configured floor
    pub suggested_max: u32,
}

/// What the presenter shows after a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResultReport {
    /// Nothing answered: message only, no chart
    NoResults { message: String },
    Scored {
        dominant: String,
        interpretation: String,
        chart: ChartSeries,
    },
}

impl ResultReport {
    pub fn build(result: &QuizResult, interpretations: &InterpretationMap, settings: &QuizSettings) -> Self {
        let QuizResult::Scored(vector) = result else {
            return ResultReport::NoResults {
                message: settings.empty_result_message.clone(),
            };
        };

        let interpretation = interpretations
            .get(&vector.dominant)
            .unwrap_or(settings.fallback_interpretation.as_str())
            .to_string();
        let chart = ChartSeries {
            labels: vector.scores.iter().map(|s| s.trait_name.clone()).collect(),
            values: vector.scores.iter().map(|s| s.count).collect(),
            suggested_max: vector.max_score().max(settings.chart_floor),
        };

        ResultReport::Scored {
            dominant: vector.dominant.clone(),
            interpretation,
            chart,
        }
    }

    pub fn chart(&self) -> Option<&ChartSeries> {
        match self {
            ResultReport::NoResults { .. } => None,
            ResultReport::Scored { chart, .. } => Some(chart),
        }
    }
}
