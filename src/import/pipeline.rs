//! Question bank import pipeline

use tracing::{debug, info};

use crate::config::{QuestionBank, QuizSettings};
use crate::error::ImportError;

use super::row::{ColumnLayout, RawRow};

/// Downloadable template showing the upload format
pub const SAMPLE_CSV: &str = r#"question,option1_text,option1_type,option2_text,option2_type,option3_text,option3_type,option4_text,option4_type
"When faced with a difficult problem, you prefer to:","Analyze it logically and systematically.","Analytical","Brainstorm creative and unconventional solutions.","Creative","Collaborate with others to find a solution.","Collaborative","Take immediate action and learn by doing.","Action-Oriented"
"In a social gathering, you are more likely to:","Engage in deep, one-on-one conversations.","Analytical","Be the life of the party, telling stories.","Creative","Introduce people and facilitate connections.","Collaborative","Organize an activity or a game.","Action-Oriented"
"Your ideal work environment is:","Quiet, organized, and focused on individual tasks.","Analytical","Dynamic, inspiring, and full of new ideas.","Creative","A supportive team where everyone helps each other.","Collaborative","Fast-paced, with clear goals and tangible results.","Action-Oriented"
"#;

/// Build a question bank from decoded rows
///
/// Rows without a question or without any complete option pair are
/// skipped. Fails with `ImportError::Empty` when nothing survives.
pub fn import_rows<I>(rows: I, settings: &QuizSettings) -> Result<QuestionBank, ImportError>
where
    I: IntoIterator<Item = RawRow>,
{
    let layout = ColumnLayout::new(settings.max_option_slots);
    let mut questions = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        if index == 0 {
            let ignored = layout.unsupported_columns(row.columns());
            if !ignored.is_empty() {
                debug!(?ignored, "ignoring option columns beyond slot {}", layout.slot_count());
            }
        }

        match layout.decode(&row).into_record() {
            Ok(record) => questions.push(record),
            Err(reason) => debug!(row = index + 1, ?reason, "skipping row"),
        }
    }

    if questions.is_empty() {
        return Err(ImportError::Empty);
    }

    info!(questions = questions.len(), "question rows imported");
    Ok(QuestionBank::new(questions))
}

/// Decode CSV bytes into rows keyed by header
pub fn decode_csv(data: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(RawRow::from_pairs(headers.iter().zip(record.iter())));
    }

    Ok(rows)
}

/// Decode and import an uploaded CSV payload
///
/// Parsing completes before any row is validated, so a decode failure
/// part way through yields no bank at all.
pub fn import_csv(data: &[u8], settings: &QuizSettings) -> Result<QuestionBank, ImportError> {
    let rows = decode_csv(data)?;
    import_rows(rows, settings)
}
