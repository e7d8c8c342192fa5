//! Error types for the trait quiz core

use pyo3::exceptions::{PyIndexError, PyRuntimeError, PyValueError};
use pyo3::PyErr;
use thiserror::Error;

/// Failure of the question bank import pipeline
///
/// The stored bank is never touched when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Upload failed: no valid questions were found")]
    Empty,

    #[error("Failed to decode tabular data: {0}")]
    DecodeFailure(String),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::DecodeFailure(err.to_string())
    }
}

/// Rejected test session operation
///
/// A rejected operation leaves the session state unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Option index {index} out of range ({available} options)")]
    InvalidOptionIndex { index: usize, available: usize },

    #[error("Session is not in progress")]
    NotInProgress,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Session is not complete")]
    NotComplete,

    #[error("Invalid session snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Main error type for the trait quiz core
#[derive(Error, Debug)]
pub enum QuizError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl From<serde_json::Error> for QuizError {
    fn from(err: serde_json::Error) -> Self {
        QuizError::Deserialization(err.to_string())
    }
}

impl From<ImportError> for PyErr {
    fn from(err: ImportError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> PyErr {
        match err {
            EngineError::InvalidOptionIndex { .. } => PyIndexError::new_err(err.to_string()),
            EngineError::InvalidSnapshot(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

impl From<QuizError> for PyErr {
    fn from(err: QuizError) -> PyErr {
        match err {
            QuizError::Import(e) => e.into(),
            QuizError::Engine(e) => e.into(),
            QuizError::Deserialization(msg) => {
                PyValueError::new_err(format!("Deserialization error: {}", msg))
            }
            QuizError::InvalidSettings(msg) => PyValueError::new_err(format!("Invalid settings: {}", msg)),
        }
    }
}

/// Result type alias for the trait quiz core
pub type Result<T> = std::result::Result<T, QuizError>;
