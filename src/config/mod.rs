//! Configuration module for quiz data structures
//!
//! This module holds the question bank and interpretation records, the
//! quiz settings, and their deserialization from Python objects.

mod interpretation;
mod question;
mod settings;
mod validate;

pub use interpretation::*;
pub use question::*;
pub use settings::*;
pub use validate::*;

use pyo3::types::{PyAnyMethods, PyDict, PyDictMethods, PyList, PyListMethods};
use pyo3::Bound;

/// Helper to get optional attribute from either dict or object
fn get_attr_opt<'py>(obj: &Bound<'py, pyo3::PyAny>, name: &str) -> Option<Bound<'py, pyo3::PyAny>> {
    if let Ok(dict) = obj.downcast::<PyDict>() {
        dict.get_item(name).ok().flatten()
    } else {
        obj.getattr(name).ok()
    }
}

/// Optional string attribute, accepting either of two field names
fn get_str_opt(obj: &Bound<'_, pyo3::PyAny>, name: &str, alias: &str) -> pyo3::PyResult<Option<String>> {
    match get_attr_opt(obj, name).or_else(|| get_attr_opt(obj, alias)) {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

/// Deserialize quiz settings from a Python dict, defaulting missing fields
pub fn deserialize_settings(dict: &Bound<'_, PyDict>) -> pyo3::PyResult<QuizSettings> {
    let defaults = QuizSettings::default();
    let obj = dict.as_any();

    let max_option_slots: usize = match get_attr_opt(obj, "max_option_slots") {
        Some(v) if !v.is_none() => check_option_slots(v.extract()?)?,
        _ => defaults.max_option_slots,
    };
    let chart_floor: u32 = match get_attr_opt(obj, "chart_floor") {
        Some(v) if !v.is_none() => v.extract()?,
        _ => defaults.chart_floor,
    };

    Ok(QuizSettings {
        max_option_slots,
        fallback_interpretation: get_str_opt(obj, "fallback_interpretation", "fallbackInterpretation")?
            .unwrap_or(defaults.fallback_interpretation),
        chart_floor,
        empty_result_message: get_str_opt(obj, "empty_result_message", "emptyResultMessage")?
            .unwrap_or(defaults.empty_result_message),
    })
}

/// Deserialize interpretations from a Python dict {trait: text}
pub fn deserialize_interpretations(dict: &Bound<'_, PyDict>) -> pyo3::PyResult<InterpretationMap> {
    let mut map = InterpretationMap::new();
    for (key, value) in dict.iter() {
        let trait_name: String = key.extract()?;
        let text: String = value.extract()?;
        map.insert(trait_name, text);
    }
    Ok(map)
}

/// Deserialize questions from a Python list of dicts or objects
///
/// Expected item format: {"question": str, "options": [{"text": str, "type": str}]}.
/// Missing fields become empty strings; sessions skip such records later.
pub fn deserialize_questions(list: &Bound<'_, PyList>) -> pyo3::PyResult<QuestionBank> {
    let mut questions = Vec::with_capacity(list.len());
    for item in list.iter() {
        questions.push(extract_question(&item)?);
    }
    Ok(QuestionBank::new(questions))
}

fn extract_question(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<QuestionRecord> {
    let prompt = get_str_opt(obj, "question", "prompt")?.unwrap_or_default();

    let mut options = OptionList::new();
    if let Some(options_obj) = get_attr_opt(obj, "options") {
        if !options_obj.is_none() {
            let items: Bound<'_, PyList> = options_obj.extract()?;
            for item in items.iter() {
                options.push(extract_option(&item)?);
            }
        }
    }

    Ok(QuestionRecord { prompt, options })
}

fn extract_option(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<AnswerOption> {
    // Support both the upload naming (text/type) and label/trait
    let label = get_str_opt(obj, "text", "label")?.unwrap_or_default();
    let trait_name = get_str_opt(obj, "type", "trait")?.unwrap_or_default();
    Ok(AnswerOption { label, trait_name })
}
