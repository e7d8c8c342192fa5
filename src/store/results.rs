//! Append-only log of completed tests

use parking_lot::RwLock;
use tracing::info;

use crate::session::ResultRecord;

/// Completed-test records in submission order
///
/// Records are only ever appended; `restore` replaces the whole log when
/// reloading it from its persisted JSON form.
#[derive(Debug, Default)]
pub struct ResultLog {
    records: RwLock<Vec<ResultRecord>>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning the new log length
    pub fn append(&self, record: ResultRecord) -> usize {
        let mut records = self.records.write();
        info!(user = %record.user_id, traits = record.scores.len(), "test result recorded");
        records.push(record);
        records.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Copy of every record
    pub fn records(&self) -> Vec<ResultRecord> {
        self.records.read().clone()
    }

    pub fn for_user(&self, user_id: &str) -> Vec<ResultRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Render the log in its persisted JSON form
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(&*self.records.read())?)
    }

    /// Replace the log with a persisted JSON array; the log is untouched on error
    pub fn restore(&self, json: &str) -> crate::error::Result<usize> {
        let parsed: Vec<ResultRecord> = serde_json::from_str(json)?;
        let count = parsed.len();
        *self.records.write() = parsed;
        info!(records = count, "result log restored");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::QuizResult;
    use chrono::{TimeZone, Utc};

    fn record(user: &str) -> ResultRecord {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ResultRecord::new(user, &QuizResult::Empty, at)
    }

    #[test]
    fn test_append_keeps_order() {
        let log = ResultLog::new();
        assert!(log.is_empty());
        assert_eq!(log.append(record("u1")), 1);
        assert_eq!(log.append(record("u2")), 2);
        assert_eq!(log.append(record("u1")), 3);

        let users: Vec<String> = log.records().into_iter().map(|r| r.user_id).collect();
        assert_eq!(users, vec!["u1", "u2", "u1"]);
        assert_eq!(log.for_user("u1").len(), 2);
        assert!(log.for_user("nobody").is_empty());
    }

    #[test]
    fn test_json_restore() {
        let log = ResultLog::new();
        log.append(record("u1"));
        let json = log.to_json_pretty().unwrap();

        let restored = ResultLog::new();
        assert_eq!(restored.restore(&json).unwrap(), 1);
        assert_eq!(restored.records(), log.records());
    }

    #[test]
    fn test_bad_json_leaves_log_unchanged() {
        let log = ResultLog::new();
        log.append(record("u1"));
        assert!(log.restore("{\"not\": \"a list\"}").is_err());
        assert_eq!(log.len(), 1);
    }
}
