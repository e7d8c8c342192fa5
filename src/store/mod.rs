//! Versioned question bank store
//!
//! Readers take an `Arc` snapshot and keep it for as long as they need;
//! publishing swaps in a new snapshot without touching existing ones.
//! Completed tests go to the append-only `ResultLog`.

mod results;

pub use results::*;

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{InterpretationMap, QuestionBank, QuizSettings};
use crate::error::ImportError;
use crate::import::{import_csv, import_rows, RawRow};

/// A published question bank together with its version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankSnapshot {
    pub version: u64,
    pub bank: QuestionBank,
}

impl BankSnapshot {
    pub fn new(version: u64, bank: QuestionBank) -> Self {
        Self { version, bank }
    }
}

/// Holds the current question bank, interpretation map and result log
#[derive(Debug, Default)]
pub struct QuestionStore {
    bank: RwLock<Arc<BankSnapshot>>,
    interpretations: RwLock<Arc<InterpretationMap>>,
    results: ResultLog,
}

impl QuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bank; unaffected by later publications
    #[inline]
    pub fn snapshot(&self) -> Arc<BankSnapshot> {
        self.bank.read().clone()
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.bank.read().version
    }

    /// Replace the whole bank, returning the new version
    pub fn publish(&self, bank: QuestionBank) -> u64 {
        self.swap(bank).version
    }

    fn swap(&self, bank: QuestionBank) -> Arc<BankSnapshot> {
        let mut guard = self.bank.write();
        let snapshot = Arc::new(BankSnapshot::new(guard.version + 1, bank));
        *guard = snapshot.clone();
        info!(version = snapshot.version, questions = snapshot.bank.len(), "question bank published");
        snapshot
    }

    /// Validate rows fully, then publish; the store is untouched on error
    pub fn import_rows<I>(&self, rows: I, settings: &QuizSettings) -> Result<Arc<BankSnapshot>, ImportError>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let bank = import_rows(rows, settings).inspect_err(|e| warn!("question import rejected: {}", e))?;
        Ok(self.swap(bank))
    }

    /// Decode and validate a CSV upload fully, then publish
    pub fn import_csv(&self, data: &[u8], settings: &QuizSettings) -> Result<Arc<BankSnapshot>, ImportError> {
        let bank = import_csv(data, settings).inspect_err(|e| warn!("question upload rejected: {}", e))?;
        Ok(self.swap(bank))
    }

    #[inline]
    pub fn interpretations(&self) -> Arc<InterpretationMap> {
        self.interpretations.read().clone()
    }

    pub fn set_interpretations(&self, map: InterpretationMap) {
        let count = map.len();
        *self.interpretations.write() = Arc::new(map);
        info!(traits = count, "interpretations loaded");
    }

    #[inline]
    pub fn results(&self) -> &ResultLog {
        &self.results
    }
}
