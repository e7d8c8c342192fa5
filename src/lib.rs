//! Trait Quiz Core - question bank import and test session engine
//!
//! This crate imports personality-quiz questions from CSV uploads, keeps a
//! versioned question bank, and drives per-user test sessions through to a
//! tallied result, with Python bindings via PyO3.

use pyo3::prelude::*;

pub mod config;
pub mod error;
pub mod import;
pub mod session;
pub mod store;

use crate::config::{InterpretationMap, QuestionBank, QuizSettings};
use crate::import::RawRow;
use crate::session::{QuizSession, SessionSnapshot};
use crate::store::QuestionStore;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use pyo3::types::{PyDict, PyList};
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Shared State
// ============================================================================

/// Process-wide question store shared by every session
static QUIZ_STORE: Lazy<Arc<QuestionStore>> = Lazy::new(|| Arc::new(QuestionStore::new()));

/// Current settings; sessions keep the copy they were created with
static SETTINGS: Lazy<RwLock<Arc<QuizSettings>>> =
    Lazy::new(|| RwLock::new(Arc::new(QuizSettings::default())));

fn current_settings() -> Arc<QuizSettings> {
    SETTINGS.read().clone()
}

// ============================================================================
// Python Functions
// ============================================================================

/// Install a log subscriber for this module's tracing output
///
/// # Arguments
/// * `filter` - EnvFilter directives, e.g. "trait_quiz_core=debug".
///   Falls back to RUST_LOG, then "trait_quiz_core=info".
///
/// # Returns
/// False if a subscriber was already installed
#[pyfunction]
#[pyo3(signature = (filter=None))]
fn init_logging(filter: Option<&str>) -> PyResult<bool> {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(format!("Invalid log filter: {}", e)))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trait_quiz_core=info")),
    };

    Ok(tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_ok())
}

/// Replace the quiz settings (missing keys take their defaults)
#[pyfunction]
#[pyo3(signature = (settings=None))]
fn configure(settings: Option<&Bound<'_, PyDict>>) -> PyResult<()> {
    let parsed = match settings {
        Some(dict) => config::deserialize_settings(dict)?,
        None => QuizSettings::default(),
    };
    *SETTINGS.write() = Arc::new(parsed);
    Ok(())
}

/// Load the trait interpretation texts {trait: text}
#[pyfunction]
fn load_interpretations(interpretations: &Bound<'_, PyDict>) -> PyResult<()> {
    let map = config::deserialize_interpretations(interpretations)?;
    QUIZ_STORE.set_interpretations(map);
    Ok(())
}

/// Load the trait interpretation texts from their persisted JSON form
#[pyfunction]
fn load_interpretations_json(json: &str) -> PyResult<usize> {
    let map = InterpretationMap::from_json(json)?;
    let count = map.len();
    QUIZ_STORE.set_interpretations(map);
    Ok(count)
}

/// Publish an already-parsed question list as the new bank
///
/// Records are taken as given; sessions skip malformed ones.
///
/// # Returns
/// The new bank version
#[pyfunction]
fn load_questions(questions: &Bound<'_, PyList>) -> PyResult<u64> {
    let bank = config::deserialize_questions(questions)?;
    Ok(QUIZ_STORE.publish(bank))
}

/// Publish a bank from its persisted JSON form
#[pyfunction]
fn load_questions_json(json: &str) -> PyResult<u64> {
    let bank = QuestionBank::from_json(json)?;
    Ok(QUIZ_STORE.publish(bank))
}

/// Current bank in its persisted JSON form
#[pyfunction]
fn export_questions_json() -> PyResult<String> {
    Ok(QUIZ_STORE.snapshot().bank.to_json_pretty()?)
}

/// Import an uploaded CSV file, replacing the bank only on success
///
/// # Returns
/// Number of questions imported
///
/// # Raises
/// ValueError if the upload cannot be decoded or yields no questions;
/// the existing bank stays in place
#[pyfunction]
fn import_questions(data: &[u8]) -> PyResult<usize> {
    let snapshot = QUIZ_STORE.import_csv(data, &current_settings())?;
    Ok(snapshot.bank.len())
}

/// Import an uploaded CSV file without blocking the event loop
///
/// Parsing runs on Tokio's blocking pool via spawn_blocking.
///
/// # Example (Python)
/// ```python
/// count = await import_questions_async(upload_bytes)
/// ```
#[pyfunction]
fn import_questions_async<'py>(py: Python<'py>, data: Vec<u8>) -> PyResult<Bound<'py, PyAny>> {
    let store = Arc::clone(&*QUIZ_STORE);
    let settings = current_settings();

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let snapshot = tokio::task::spawn_blocking(move || store.import_csv(&data, &settings))
            .await
            .map_err(|e| {
                PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                    "Import task panicked: {}",
                    e
                ))
            })??;

        Ok(snapshot.bank.len())
    })
}

/// Import rows already decoded into {column: value} dicts
#[pyfunction]
fn import_rows(rows: Vec<HashMap<String, String>>) -> PyResult<usize> {
    let rows = rows.into_iter().map(RawRow::from_pairs);
    let snapshot = QUIZ_STORE.import_rows(rows, &current_settings())?;
    Ok(snapshot.bank.len())
}

#[pyfunction]
fn bank_version() -> u64 {
    QUIZ_STORE.version()
}

#[pyfunction]
fn question_count() -> usize {
    QUIZ_STORE.snapshot().bank.len()
}

/// Template CSV showing the expected upload columns
#[pyfunction]
fn sample_csv() -> &'static str {
    import::SAMPLE_CSV
}

/// Create a session already started on the current question bank
///
/// Check `total` (or `phase`) to see whether any questions were available;
/// `start()` on the returned session retakes the test.
#[pyfunction]
fn start_session() -> QuizSession {
    let mut session = QuizSession::new(Arc::clone(&*QUIZ_STORE), current_settings());
    session.begin();
    session
}

/// Restore a session from `QuizSession.snapshot()` output
///
/// # Raises
/// ValueError if the snapshot is malformed or the bank has changed since
#[pyfunction]
fn resume_session(snapshot_json: &str) -> PyResult<QuizSession> {
    let snapshot = SessionSnapshot::from_json(snapshot_json)?;
    Ok(QuizSession::resume(Arc::clone(&*QUIZ_STORE), current_settings(), &snapshot)?)
}

/// Number of completed tests in the results log
#[pyfunction]
fn result_count() -> usize {
    QUIZ_STORE.results().len()
}

/// Results log in its persisted JSON form
///
/// # Arguments
/// * `user_id` - Only this user's records when given
#[pyfunction]
#[pyo3(signature = (user_id=None))]
fn export_results_json(user_id: Option<&str>) -> PyResult<String> {
    let results = QUIZ_STORE.results();
    match user_id {
        Some(id) => Ok(serde_json::to_string_pretty(&results.for_user(id))
            .map_err(error::QuizError::from)?),
        None => Ok(results.to_json_pretty()?),
    }
}

/// Replace the results log with a persisted JSON array
///
/// # Returns
/// Number of records loaded
#[pyfunction]
fn load_results_json(json: &str) -> PyResult<usize> {
    Ok(QUIZ_STORE.results().restore(json)?)
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn trait_quiz_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    m.add_function(wrap_pyfunction!(configure, m)?)?;
    m.add_function(wrap_pyfunction!(load_interpretations, m)?)?;
    m.add_function(wrap_pyfunction!(load_interpretations_json, m)?)?;
    m.add_function(wrap_pyfunction!(load_questions, m)?)?;
    m.add_function(wrap_pyfunction!(load_questions_json, m)?)?;
    m.add_function(wrap_pyfunction!(export_questions_json, m)?)?;
    m.add_function(wrap_pyfunction!(import_questions, m)?)?;
    m.add_function(wrap_pyfunction!(import_questions_async, m)?)?;
    m.add_function(wrap_pyfunction!(import_rows, m)?)?;
    m.add_function(wrap_pyfunction!(bank_version, m)?)?;
    m.add_function(wrap_pyfunction!(question_count, m)?)?;
    m.add_function(wrap_pyfunction!(sample_csv, m)?)?;
    m.add_function(wrap_pyfunction!(start_session, m)?)?;
    m.add_function(wrap_pyfunction!(resume_session, m)?)?;
    m.add_function(wrap_pyfunction!(result_count, m)?)?;
    m.add_function(wrap_pyfunction!(export_results_json, m)?)?;
    m.add_function(wrap_pyfunction!(load_results_json, m)?)?;
    m.add_class::<QuizSession>()?;
    Ok(())
}
