//! Flat serialization of a session's progress

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `{cursor, tally, history}` plus the bank version they refer to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub bank_version: u64,
    pub cursor: usize,
    /// Non-zero counts by trait name
    #[serde(default)]
    pub tally: BTreeMap<String, u32>,
    /// Trait of each answered question, oldest first
    #[serde(default)]
    pub history: Vec<String>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let snapshot = SessionSnapshot {
            bank_version: 3,
            cursor: 1,
            tally: BTreeMap::from([("Creative".to_string(), 1)]),
            history: vec!["Creative".to_string()],
        };
        let json = snapshot.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"bank_version":3,"cursor":1,"tally":{"Creative":1},"history":["Creative"]}"#
        );
        assert_eq!(SessionSnapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_bad_json_is_deserialization_error() {
        assert!(matches!(
            SessionSnapshot::from_json("{\"cursor\": -1}"),
            Err(crate::error::QuizError::Deserialization(_))
        ));
    }
}
