//! QuizSession - Python handle around a test session
//!
//! The session lives in Rust memory; Python drives it through methods and
//! receives plain dicts for questions and results.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use std::sync::Arc;

use crate::config::QuizSettings;
use crate::error::EngineError;
use crate::store::QuestionStore;

use super::{QuestionView, QuizResult, ResultReport, SessionSnapshot, StartOutcome, TestSession};

// ============================================================================
// QuizSession PyClass
// ============================================================================

/// QuizSession - one user's pass through the current question bank
///
/// `start()` snapshots the store's bank; later uploads only affect
/// sessions started after them.
#[pyclass]
pub struct QuizSession {
    session: TestSession,
    store: Arc<QuestionStore>,
    settings: Arc<QuizSettings>,
}

impl QuizSession {
    pub fn new(store: Arc<QuestionStore>, settings: Arc<QuizSettings>) -> Self {
        Self {
            session: TestSession::new(),
            store,
            settings,
        }
    }

    /// Start on the store's current bank
    pub fn begin(&mut self) -> StartOutcome {
        self.session.start(self.store.snapshot())
    }

    /// Wrap a session restored from a snapshot
    pub fn resume(
        store: Arc<QuestionStore>,
        settings: Arc<QuizSettings>,
        snapshot: &SessionSnapshot,
    ) -> Result<Self, EngineError> {
        let session = TestSession::resume(store.snapshot(), snapshot)?;
        Ok(Self {
            session,
            store,
            settings,
        })
    }

    /// Result report using the store's current interpretations
    pub fn build_report(&self) -> Result<ResultReport, EngineError> {
        let result = self.session.result()?;
        Ok(ResultReport::build(
            &result,
            &self.store.interpretations(),
            &self.settings,
        ))
    }
}

// ============================================================================
// PyMethods Implementation
// ============================================================================

#[pymethods]
impl QuizSession {
    // ------------------------------------------------------------------------
    // Getter Properties
    // ------------------------------------------------------------------------

    /// "idle", "in_progress" or "complete"
    #[getter]
    fn phase(&self) -> &'static str {
        self.session.phase().as_str()
    }

    #[getter]
    fn cursor(&self) -> usize {
        self.session.cursor()
    }

    /// Number of questions in this session
    #[getter]
    fn total(&self) -> usize {
        self.session.total()
    }

    /// Answered fraction, 0.0 to 1.0
    #[getter]
    fn progress(&self) -> f64 {
        self.session.progress()
    }

    #[getter]
    fn bank_version(&self) -> Option<u64> {
        self.session.bank_version()
    }

    /// Records left out at start, as [{"index": int, "reason": str}]
    #[getter]
    fn skipped(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let list = PyList::empty(py);
        for record in self.session.skipped() {
            let dict = PyDict::new(py);
            dict.set_item("index", record.index)?;
            dict.set_item("reason", record.defect.to_string())?;
            list.append(dict)?;
        }
        Ok(list.into())
    }

    /// Hidden blank options, as [{"index": int, "option": int}]
    #[getter]
    fn dropped_options(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let list = PyList::empty(py);
        for dropped in self.session.dropped_options() {
            let dict = PyDict::new(py);
            dict.set_item("index", dropped.index)?;
            dict.set_item("option", dropped.option)?;
            list.append(dict)?;
        }
        Ok(list.into())
    }

    // ------------------------------------------------------------------------
    // Session Operations
    // ------------------------------------------------------------------------

    /// Start (or retake) against the current question bank
    ///
    /// # Returns
    /// {"ready": bool, "total": int, "skipped": int}; `ready` is False when
    /// no questions are available
    fn start(&mut self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let dict = PyDict::new(py);
        match self.begin() {
            StartOutcome::Ready { total, skipped } => {
                dict.set_item("ready", true)?;
                dict.set_item("total", total)?;
                dict.set_item("skipped", skipped)?;
            }
            StartOutcome::NoQuestions { skipped } => {
                dict.set_item("ready", false)?;
                dict.set_item("total", 0)?;
                dict.set_item("skipped", skipped)?;
            }
        }
        Ok(dict.into())
    }

    /// Current question dict, or None once complete
    fn current_question(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        match self.session.current_question() {
            Some(view) => Ok(question_to_dict(py, &view, self.session.cursor(), self.session.total())?.into()),
            None => Ok(py.None()),
        }
    }

    /// Answer the current question; returns the new phase
    fn answer(&mut self, option_index: usize) -> PyResult<&'static str> {
        Ok(self.session.answer(option_index)?.as_str())
    }

    /// Go back one question; returns the new phase
    fn back(&mut self) -> PyResult<&'static str> {
        Ok(self.session.back()?.as_str())
    }

    /// Final scores as {"empty": bool, "scores": {trait: count}, "dominant": str | None}
    fn result(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let result = self.session.result()?;
        Ok(result_to_dict(py, &result)?.into())
    }

    /// Presenter view: dominant trait, interpretation and chart series
    fn report(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let dict = PyDict::new(py);
        match self.build_report()? {
            ResultReport::NoResults { message } => {
                dict.set_item("status", "no_results")?;
                dict.set_item("message", message)?;
            }
            ResultReport::Scored {
                dominant,
                interpretation,
                chart,
            } => {
                dict.set_item("status", "scored")?;
                dict.set_item("dominant", dominant)?;
                dict.set_item("interpretation", interpretation)?;
                let chart_dict = PyDict::new(py);
                chart_dict.set_item("labels", chart.labels)?;
                chart_dict.set_item("values", chart.values)?;
                chart_dict.set_item("suggested_max", chart.suggested_max)?;
                dict.set_item("chart", chart_dict)?;
            }
        }
        Ok(dict.into())
    }

    /// Append this session's result to the results log
    ///
    /// # Returns
    /// Number of records in the log
    ///
    /// # Raises
    /// RuntimeError if the session is still in progress
    fn submit(&self, user_id: &str) -> PyResult<usize> {
        let record = self.session.result_record(user_id)?;
        Ok(self.store.results().append(record))
    }

    /// JSON snapshot of {bank_version, cursor, tally, history}
    fn snapshot(&self) -> PyResult<String> {
        Ok(self.session.snapshot().to_json()?)
    }

    fn __repr__(&self) -> String {
        format!(
            "QuizSession(phase={}, cursor={}, total={})",
            self.session.phase().as_str(),
            self.session.cursor(),
            self.session.total()
        )
    }
}

// ============================================================================
// Private Helper Functions
// ============================================================================

fn question_to_dict<'py>(
    py: Python<'py>,
    view: &QuestionView<'_>,
    index: usize,
    total: usize,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("index", index)?;
    dict.set_item("total", total)?;
    dict.set_item("question", view.prompt)?;

    let options = PyList::empty(py);
    for option in &view.options {
        let option_dict = PyDict::new(py);
        option_dict.set_item("text", &option.label)?;
        option_dict.set_item("type", &option.trait_name)?;
        options.append(option_dict)?;
    }
    dict.set_item("options", options)?;

    Ok(dict)
}

fn result_to_dict<'py>(py: Python<'py>, result: &QuizResult) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("empty", result.is_empty())?;

    // Python dicts keep insertion order, so scores stay in catalog order
    let scores = PyDict::new(py);
    for score in result.scores() {
        scores.set_item(&score.trait_name, score.count)?;
    }
    dict.set_item("scores", scores)?;
    dict.set_item("dominant", result.dominant())?;

    Ok(dict)
}
