//! Test session engine
//!
//! Drives one user's traversal of a question bank snapshot: answering,
//! stepping back, and producing the result once every active question has
//! been answered. Every rejected operation leaves the state untouched.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::EngineError;
use crate::store::BankSnapshot;

use super::normalize::{ActiveQuestions, DroppedOption, QuestionView, SkippedRecord};
use super::record::ResultRecord;
use super::result::QuizResult;
use super::snapshot::SessionSnapshot;
use super::state::SessionState;

/// Where a session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    InProgress,
    Complete,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::InProgress => "in_progress",
            SessionPhase::Complete => "complete",
        }
    }
}

/// What `start` found in the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Ready { total: usize, skipped: usize },
    /// Nothing presentable; the session stays idle and reports an empty result
    NoQuestions { skipped: usize },
}

/// A single user's quiz session
#[derive(Debug, Clone, Default)]
pub struct TestSession {
    bank: Option<Arc<BankSnapshot>>,
    active: ActiveQuestions,
    state: SessionState,
}

impl TestSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start against a bank snapshot, discarding any progress
    ///
    /// The snapshot is kept for the whole session, so a bank published
    /// afterwards does not affect it.
    pub fn start(&mut self, bank: Arc<BankSnapshot>) -> StartOutcome {
        let active = ActiveQuestions::from_bank(&bank.bank);
        let skipped = active.skipped().len();
        let total = active.len();

        self.state = SessionState::new(active.catalog().len(), total);
        self.active = active;
        debug!(version = bank.version, total, skipped, "session started");
        self.bank = Some(bank);

        if total == 0 {
            StartOutcome::NoQuestions { skipped }
        } else {
            StartOutcome::Ready { total, skipped }
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.bank.is_none() || self.active.is_empty() {
            SessionPhase::Idle
        } else if self.state.cursor() == self.active.len() {
            SessionPhase::Complete
        } else {
            SessionPhase::InProgress
        }
    }

    /// Question at the cursor while in progress
    pub fn current_question(&self) -> Option<QuestionView<'_>> {
        if self.phase() != SessionPhase::InProgress {
            return None;
        }
        let bank = self.bank.as_ref()?;
        self.active.question(&bank.bank, self.state.cursor())
    }

    /// Answer the current question with the option at `option_index`
    pub fn answer(&mut self, option_index: usize) -> Result<SessionPhase, EngineError> {
        if self.phase() != SessionPhase::InProgress {
            return Err(EngineError::NotInProgress);
        }
        let traits = self
            .active
            .option_traits(self.state.cursor())
            .ok_or(EngineError::NotInProgress)?;
        let id = *traits.get(option_index).ok_or(EngineError::InvalidOptionIndex {
            index: option_index,
            available: traits.len(),
        })?;

        self.state.record(id);
        Ok(self.phase())
    }

    /// Step back one question, undoing its answer
    pub fn back(&mut self) -> Result<SessionPhase, EngineError> {
        self.state.undo().ok_or(EngineError::NothingToUndo)?;
        Ok(self.phase())
    }

    /// Final scores; an empty result when the bank had nothing to ask
    pub fn result(&self) -> Result<QuizResult, EngineError> {
        match self.phase() {
            SessionPhase::Complete => Ok(QuizResult::from_tally(
                self.active.catalog(),
                self.state.tally(),
            )),
            SessionPhase::Idle if self.bank.is_some() => Ok(QuizResult::Empty),
            _ => Err(EngineError::NotComplete),
        }
    }

    /// Time-stamped record of the result for the results log
    pub fn result_record(&self, user_id: &str) -> Result<ResultRecord, EngineError> {
        Ok(ResultRecord::now(user_id, &self.result()?))
    }

    /// Fraction of active questions answered, 0.0 when there are none
    pub fn progress(&self) -> f64 {
        if self.active.is_empty() {
            0.0
        } else {
            self.state.cursor() as f64 / self.active.len() as f64
        }
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.state.cursor()
    }

    /// Number of active questions
    #[inline]
    pub fn total(&self) -> usize {
        self.active.len()
    }

    /// Records left out by the normalization pass
    #[inline]
    pub fn skipped(&self) -> &[SkippedRecord] {
        self.active.skipped()
    }

    /// Blank options hidden from otherwise presentable questions
    #[inline]
    pub fn dropped_options(&self) -> &[DroppedOption] {
        self.active.dropped_options()
    }

    pub fn bank_version(&self) -> Option<u64> {
        self.bank.as_ref().map(|b| b.version)
    }

    #[inline]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Flat copy of the progress, enough to resume deterministically
    pub fn snapshot(&self) -> SessionSnapshot {
        let catalog = self.active.catalog();
        let tally = catalog
            .iter()
            .map(|(id, name)| (name.to_string(), self.state.count(id)))
            .filter(|(_, count)| *count > 0)
            .collect();
        let history = self
            .state
            .history()
            .iter()
            .map(|id| catalog.name(*id).to_string())
            .collect();

        SessionSnapshot {
            bank_version: self.bank_version().unwrap_or(0),
            cursor: self.state.cursor(),
            tally,
            history,
        }
    }

    /// Rebuild a session from a snapshot taken against `bank`
    pub fn resume(bank: Arc<BankSnapshot>, snapshot: &SessionSnapshot) -> Result<Self, EngineError> {
        if snapshot.bank_version != bank.version {
            return Err(EngineError::InvalidSnapshot(format!(
                "taken against bank version {}, current is {}",
                snapshot.bank_version, bank.version
            )));
        }

        let mut session = Self::new();
        session.start(bank);

        if snapshot.cursor > session.total() {
            return Err(EngineError::InvalidSnapshot(format!(
                "cursor {} beyond {} questions",
                snapshot.cursor,
                session.total()
            )));
        }
        if snapshot.history.len() != snapshot.cursor {
            return Err(EngineError::InvalidSnapshot(format!(
                "history holds {} answers for cursor {}",
                snapshot.history.len(),
                snapshot.cursor
            )));
        }

        for (position, name) in snapshot.history.iter().enumerate() {
            let offered = session
                .active
                .option_traits(position)
                .unwrap_or_default();
            let id = session
                .active
                .catalog()
                .id(name)
                .filter(|id| offered.contains(id))
                .ok_or_else(|| {
                    EngineError::InvalidSnapshot(format!(
                        "question {} offers no option for trait {:?}",
                        position, name
                    ))
                })?;
            session.state.record(id);
        }

        let tally_matches = {
            let stated: BTreeMap<&str, u32> = snapshot
                .tally
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(name, count)| (name.as_str(), *count))
                .collect();
            let replayed: BTreeMap<&str, u32> = session
                .active
                .catalog()
                .iter()
                .map(|(id, name)| (name, session.state.count(id)))
                .filter(|(_, count)| *count > 0)
                .collect();
            stated == replayed
        };
        if !tally_matches {
            return Err(EngineError::InvalidSnapshot(
                "tally does not match history".to_string(),
            ));
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnswerOption, QuestionBank, QuestionRecord};

    fn snapshot_of(records: Vec<QuestionRecord>) -> Arc<BankSnapshot> {
        Arc::new(BankSnapshot::new(1, QuestionBank::new(records)))
    }

    fn two_question_bank() -> Arc<BankSnapshot> {
        snapshot_of(vec![
            QuestionRecord::new(
                "P1",
                [AnswerOption::new("a", "Analytical"), AnswerOption::new("b", "Creative")],
            ),
            QuestionRecord::new(
                "P2",
                [AnswerOption::new("c", "Analytical"), AnswerOption::new("d", "Creative")],
            ),
        ])
    }

    fn started(bank: Arc<BankSnapshot>) -> TestSession {
        let mut session = TestSession::new();
        session.start(bank);
        session
    }

    #[test]
    fn test_idle_before_start() {
        let mut session = TestSession::new();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.current_question().is_none());
        assert_eq!(session.answer(0), Err(EngineError::NotInProgress));
        assert_eq!(session.back(), Err(EngineError::NothingToUndo));
        assert_eq!(session.result(), Err(EngineError::NotComplete));
        assert_eq!(session.progress(), 0.0);
    }

    #[test]
    fn test_single_question_completes() {
        let bank = snapshot_of(vec![QuestionRecord::new(
            "P1",
            [AnswerOption::new("a", "Analytical"), AnswerOption::new("b", "Creative")],
        )]);
        let mut session = TestSession::new();
        assert_eq!(session.start(bank), StartOutcome::Ready { total: 1, skipped: 0 });
        assert_eq!(session.phase(), SessionPhase::InProgress);

        assert_eq!(session.answer(0), Ok(SessionPhase::Complete));
        assert_eq!(session.cursor(), 1);
        assert!(session.current_question().is_none());

        let result = session.result().unwrap();
        assert_eq!(result.dominant(), Some("Analytical"));
        assert_eq!(result.scores().len(), 1);
        assert_eq!(result.scores()[0].count, 1);
    }

    #[test]
    fn test_same_trait_twice() {
        let mut session = started(two_question_bank());
        session.answer(1).unwrap();
        session.answer(1).unwrap();

        let result = session.result().unwrap();
        assert_eq!(result.dominant(), Some("Creative"));
        assert_eq!(result.scores().len(), 1);
        assert_eq!(result.scores()[0].trait_name, "Creative");
        assert_eq!(result.scores()[0].count, 2);
    }

    #[test]
    fn test_back_returns_to_first_question() {
        let mut session = started(two_question_bank());
        session.answer(0).unwrap();
        assert_eq!(session.current_question().unwrap().prompt, "P2");

        assert_eq!(session.back(), Ok(SessionPhase::InProgress));
        assert_eq!(session.current_question().unwrap().prompt, "P1");
        assert!(session.state().tally().iter().all(|c| *c == 0));
        assert!(session.state().history().is_empty());
    }

    #[test]
    fn test_back_from_complete() {
        let mut session = started(two_question_bank());
        session.answer(0).unwrap();
        session.answer(1).unwrap();
        assert_eq!(session.phase(), SessionPhase::Complete);

        assert_eq!(session.back(), Ok(SessionPhase::InProgress));
        assert_eq!(session.current_question().unwrap().prompt, "P2");
        assert_eq!(session.result(), Err(EngineError::NotComplete));
    }

    #[test]
    fn test_rejections_leave_state_unchanged() {
        let mut session = started(two_question_bank());
        session.answer(0).unwrap();
        let before = session.state().clone();

        assert_eq!(
            session.answer(2),
            Err(EngineError::InvalidOptionIndex { index: 2, available: 2 })
        );
        assert_eq!(session.state(), &before);

        session.answer(1).unwrap();
        let complete = session.state().clone();
        assert_eq!(session.answer(0), Err(EngineError::NotInProgress));
        assert_eq!(session.state(), &complete);
    }

    #[test]
    fn test_repeated_back_at_start() {
        let mut session = started(two_question_bank());
        let before = session.state().clone();
        for _ in 0..3 {
            assert_eq!(session.back(), Err(EngineError::NothingToUndo));
            assert_eq!(session.state(), &before);
        }
    }

    #[test]
    fn test_progress_fraction() {
        let mut session = started(two_question_bank());
        assert_eq!(session.progress(), 0.0);
        session.answer(0).unwrap();
        assert_eq!(session.progress(), 0.5);
        session.answer(0).unwrap();
        assert_eq!(session.progress(), 1.0);
    }

    #[test]
    fn test_empty_bank_degraded_result() {
        let mut session = TestSession::new();
        let outcome = session.start(snapshot_of(vec![]));
        assert_eq!(outcome, StartOutcome::NoQuestions { skipped: 0 });
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.current_question().is_none());
        assert_eq!(session.answer(0), Err(EngineError::NotInProgress));
        assert_eq!(session.result(), Ok(QuizResult::Empty));
    }

    #[test]
    fn test_all_malformed_bank_degraded_result() {
        let mut session = TestSession::new();
        let outcome = session.start(snapshot_of(vec![QuestionRecord::new("", [])]));
        assert_eq!(outcome, StartOutcome::NoQuestions { skipped: 1 });
        assert_eq!(session.result(), Ok(QuizResult::Empty));
    }

    #[test]
    fn test_malformed_records_skipped_and_reported() {
        let bank = snapshot_of(vec![
            QuestionRecord::new("P1", [AnswerOption::new("a", "Analytical")]),
            QuestionRecord::new("", [AnswerOption::new("b", "Creative")]),
            QuestionRecord::new("P3", [AnswerOption::new("c", "Creative")]),
        ]);
        let mut session = TestSession::new();
        assert_eq!(session.start(bank), StartOutcome::Ready { total: 2, skipped: 1 });
        assert_eq!(session.skipped()[0].index, 1);

        session.answer(0).unwrap();
        assert_eq!(session.current_question().unwrap().prompt, "P3");
        session.answer(0).unwrap();
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert_eq!(session.state().history().len(), 2);
    }

    #[test]
    fn test_blank_option_keeps_question() {
        let bank = snapshot_of(vec![
            QuestionRecord::new(
                "P1",
                [AnswerOption::new("", ""), AnswerOption::new("a", "Analytical")],
            ),
            QuestionRecord::new("P2", [AnswerOption::new("b", "Creative")]),
        ]);
        let mut session = TestSession::new();
        assert_eq!(session.start(bank), StartOutcome::Ready { total: 2, skipped: 0 });
        assert_eq!(session.dropped_options(), &[DroppedOption { index: 0, option: 0 }]);

        {
            let first = session.current_question().unwrap();
            assert_eq!(first.prompt, "P1");
            assert_eq!(first.options.len(), 1);
            assert_eq!(first.options[0].label, "a");
        }

        // Indices address the usable options only
        assert_eq!(
            session.answer(1),
            Err(EngineError::InvalidOptionIndex { index: 1, available: 1 })
        );
        assert_eq!(session.answer(0), Ok(SessionPhase::InProgress));
        assert_eq!(session.answer(0), Ok(SessionPhase::Complete));

        let result = session.result().unwrap();
        let scores: Vec<(&str, u32)> = result
            .scores()
            .iter()
            .map(|s| (s.trait_name.as_str(), s.count))
            .collect();
        assert_eq!(scores, vec![("Analytical", 1), ("Creative", 1)]);
    }

    #[test]
    fn test_result_record_requires_completion() {
        let mut session = started(two_question_bank());
        session.answer(1).unwrap();
        assert_eq!(session.result_record("u1"), Err(EngineError::NotComplete));

        session.answer(0).unwrap();
        let record = session.result_record("u1").unwrap();
        assert_eq!(record.user_id, "u1");
        assert_eq!(record.scores.get("Analytical"), Some(&1));
        assert_eq!(record.scores.get("Creative"), Some(&1));

        let mut empty = TestSession::new();
        empty.start(snapshot_of(vec![]));
        assert!(empty.result_record("u2").unwrap().scores.is_empty());
    }

    #[test]
    fn test_restart_resets_progress() {
        let bank = two_question_bank();
        let mut session = started(bank.clone());
        session.answer(0).unwrap();
        session.start(bank);
        assert_eq!(session.cursor(), 0);
        assert!(session.state().history().is_empty());
        assert_eq!(session.current_question().unwrap().prompt, "P1");
    }

    #[test]
    fn test_session_keeps_its_bank_snapshot() {
        let store = crate::store::QuestionStore::new();
        store.publish(QuestionBank::new(vec![QuestionRecord::new(
            "Old",
            [AnswerOption::new("a", "Analytical")],
        )]));
        let mut session = started(store.snapshot());

        store.publish(QuestionBank::new(vec![
            QuestionRecord::new("New1", [AnswerOption::new("a", "Creative")]),
            QuestionRecord::new("New2", [AnswerOption::new("b", "Creative")]),
        ]));

        assert_eq!(session.bank_version(), Some(1));
        assert_eq!(session.current_question().unwrap().prompt, "Old");
        assert_eq!(session.answer(0), Ok(SessionPhase::Complete));
        assert_eq!(session.result().unwrap().dominant(), Some("Analytical"));
    }

    #[test]
    fn test_snapshot_resume_roundtrip() {
        let bank = two_question_bank();
        let mut session = started(bank.clone());
        session.answer(1).unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.cursor, 1);
        assert_eq!(snapshot.history, vec!["Creative".to_string()]);

        let resumed = TestSession::resume(bank, &snapshot).unwrap();
        assert_eq!(resumed.state(), session.state());
        assert_eq!(resumed.current_question().unwrap().prompt, "P2");
    }

    #[test]
    fn test_resume_rejects_tampering() {
        let bank = two_question_bank();
        let mut session = started(bank.clone());
        session.answer(1).unwrap();
        let good = session.snapshot();

        let mut wrong_version = good.clone();
        wrong_version.bank_version = 7;
        assert!(matches!(
            TestSession::resume(bank.clone(), &wrong_version),
            Err(EngineError::InvalidSnapshot(_))
        ));

        let mut wrong_cursor = good.clone();
        wrong_cursor.cursor = 2;
        assert!(TestSession::resume(bank.clone(), &wrong_cursor).is_err());

        let mut wrong_trait = good.clone();
        wrong_trait.history = vec!["Bold".to_string()];
        wrong_trait.tally = BTreeMap::from([("Bold".to_string(), 1)]);
        assert!(TestSession::resume(bank.clone(), &wrong_trait).is_err());

        let mut wrong_tally = good;
        wrong_tally.tally = BTreeMap::from([("Creative".to_string(), 2)]);
        assert!(TestSession::resume(bank, &wrong_tally).is_err());
    }
}
