//! Normalization pass run when a session starts
//!
//! Malformed records and blank options are filtered out once, up front, so
//! navigation never has to branch on them.

use smallvec::SmallVec;
use tracing::warn;

use crate::config::{AnswerOption, QuestionBank, RecordDefect, INLINE_OPTIONS};

use super::state::{TraitCatalog, TraitId};

/// A bank record left out of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position in the published bank
    pub index: usize,
    pub defect: RecordDefect,
}

/// A blank option hidden from an otherwise presentable question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedOption {
    /// Position of the question in the published bank
    pub index: usize,
    /// Position of the option within the stored record
    pub option: usize,
}

/// A presentable question: its prompt and only its usable options
///
/// Answer indices refer to positions in `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView<'a> {
    pub prompt: &'a str,
    pub options: SmallVec<[&'a AnswerOption; INLINE_OPTIONS]>,
}

/// The presentable subset of a bank
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveQuestions {
    /// Bank positions of the presentable records, in order
    indices: Vec<usize>,
    /// Record positions of the usable options, parallel to `indices`
    option_positions: Vec<SmallVec<[usize; INLINE_OPTIONS]>>,
    /// Trait of each usable option, parallel to `option_positions`
    option_traits: Vec<SmallVec<[TraitId; INLINE_OPTIONS]>>,
    catalog: TraitCatalog,
    skipped: Vec<SkippedRecord>,
    dropped: Vec<DroppedOption>,
}

impl ActiveQuestions {
    /// Filter a bank down to its presentable records and options
    pub fn from_bank(bank: &QuestionBank) -> Self {
        let mut active = Self::default();

        for (index, record) in bank.iter().enumerate() {
            if let Some(defect) = record.defect() {
                warn!(index, %defect, "skipping malformed question record");
                active.skipped.push(SkippedRecord { index, defect });
                continue;
            }

            let mut positions = SmallVec::new();
            let mut traits = SmallVec::new();
            for (option, answer) in record.options.iter().enumerate() {
                if answer.is_well_formed() {
                    positions.push(option);
                    traits.push(active.catalog.intern(answer.trait_name.trim()));
                } else {
                    warn!(index, option, "hiding option with a blank label or trait");
                    active.dropped.push(DroppedOption { index, option });
                }
            }
            active.indices.push(index);
            active.option_positions.push(positions);
            active.option_traits.push(traits);
        }

        active
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Question at an active position, showing only its usable options
    pub fn question<'b>(&self, bank: &'b QuestionBank, position: usize) -> Option<QuestionView<'b>> {
        let record = self.indices.get(position).and_then(|&i| bank.get(i))?;
        let options = self
            .option_positions
            .get(position)?
            .iter()
            .filter_map(|&o| record.options.get(o))
            .collect();
        Some(QuestionView {
            prompt: &record.prompt,
            options,
        })
    }

    /// Option traits at an active position
    #[inline]
    pub fn option_traits(&self, position: usize) -> Option<&[TraitId]> {
        self.option_traits.get(position).map(|t| t.as_slice())
    }

    #[inline]
    pub fn catalog(&self) -> &TraitCatalog {
        &self.catalog
    }

    #[inline]
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    #[inline]
    pub fn dropped_options(&self) -> &[DroppedOption] {
        &self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuestionRecord;

    #[test]
    fn test_malformed_records_filtered() {
        let bank = QuestionBank::new(vec![
            QuestionRecord::new("", [AnswerOption::new("a", "A")]),
            QuestionRecord::new("P2", [AnswerOption::new("b", "B")]),
            QuestionRecord::new("P3", []),
            QuestionRecord::new("P4", [AnswerOption::new("d", " ")]),
            QuestionRecord::new("P5", [AnswerOption::new("e", "A"), AnswerOption::new("f", "B")]),
        ]);
        let active = ActiveQuestions::from_bank(&bank);

        assert_eq!(active.len(), 2);
        assert_eq!(active.question(&bank, 0).unwrap().prompt, "P2");
        assert_eq!(active.question(&bank, 1).unwrap().prompt, "P5");
        assert_eq!(active.question(&bank, 2), None);

        let skipped: Vec<(usize, RecordDefect)> =
            active.skipped().iter().map(|s| (s.index, s.defect)).collect();
        assert_eq!(
            skipped,
            vec![
                (0, RecordDefect::BlankPrompt),
                (2, RecordDefect::NoOptions),
                (3, RecordDefect::NoOptions),
            ]
        );
        assert!(active.dropped_options().is_empty());
    }

    #[test]
    fn test_blank_options_hidden_not_record() {
        let bank = QuestionBank::new(vec![
            QuestionRecord::new(
                "P1",
                [
                    AnswerOption::new("", "Creative"),
                    AnswerOption::new("a", "Analytical"),
                    AnswerOption::new("b", " "),
                    AnswerOption::new("c", "Bold"),
                ],
            ),
            QuestionRecord::new("P2", [AnswerOption::new("d", "Creative")]),
        ]);
        let active = ActiveQuestions::from_bank(&bank);

        assert_eq!(active.len(), 2);
        assert!(active.skipped().is_empty());
        assert_eq!(
            active.dropped_options(),
            &[DroppedOption { index: 0, option: 0 }, DroppedOption { index: 0, option: 2 }]
        );

        let first = active.question(&bank, 0).unwrap();
        assert_eq!(first.prompt, "P1");
        let labels: Vec<&str> = first.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "c"]);

        let traits = active.option_traits(0).unwrap();
        assert_eq!(active.catalog().name(traits[0]), "Analytical");
        assert_eq!(active.catalog().name(traits[1]), "Bold");

        // Hidden options never enter the catalog
        let names: Vec<&str> = active.catalog().iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["Analytical", "Bold", "Creative"]);
    }

    #[test]
    fn test_catalog_follows_active_questions() {
        let bank = QuestionBank::new(vec![
            QuestionRecord::new("P1", [AnswerOption::new("a", "Creative"), AnswerOption::new("b", "Analytical")]),
            QuestionRecord::new("P2", [AnswerOption::new("c", "Analytical"), AnswerOption::new("d", "Bold")]),
        ]);
        let active = ActiveQuestions::from_bank(&bank);
        let names: Vec<&str> = active.catalog().iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["Creative", "Analytical", "Bold"]);

        let second = active.option_traits(1).unwrap();
        assert_eq!(active.catalog().name(second[0]), "Analytical");
    }
}
