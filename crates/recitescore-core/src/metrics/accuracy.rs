//! Lexical accuracy: word accuracy blended with character error rate.

use serde::{Deserialize, Serialize};

use crate::alignment::OperationKind;
use crate::metrics::{json_words, points, ratio, unit, Diagnostics, MetricInput, MetricScore};

/// Problem words kept in diagnostics.
const MAX_PROBLEM_WORDS: usize = 10;

/// Weights of word accuracy and `1 - CER`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyBlend {
    #[serde(default = "default_word")]
    pub word: f64,
    #[serde(default = "default_character")]
    pub character: f64,
}

fn default_word() -> f64 {
    0.7
}

fn default_character() -> f64 {
    0.3
}

impl Default for AccuracyBlend {
    fn default() -> Self {
        Self {
            word: default_word(),
            character: default_character(),
        }
    }
}

impl AccuracyBlend {
    pub fn sum(&self) -> f64 {
        self.word + self.character
    }
}

/// Unit-interval accuracy before scaling to points.
pub fn blend_value(input: &MetricInput<'_>, blend: &AccuracyBlend) -> f64 {
    if input.reference.is_empty() || input.candidate.is_empty() {
        return 0.0;
    }
    let word_accuracy = ratio(input.matches.correct_words(), input.reference.word_count());
    let cer = ratio(input.char_distance, input.reference.chars.len());
    unit(word_accuracy * blend.word + (1.0 - unit(cer)) * blend.character)
}

pub fn accuracy(input: &MetricInput<'_>, blend: &AccuracyBlend, max: f64) -> MetricScore {
    let reference_words = input.reference.word_count();
    let correct_words = input.matches.correct_words();
    let wer = input.word_alignment.error_rate(reference_words);
    let cer = ratio(input.char_distance, input.reference.chars.len());

    let mut diagnostics = Diagnostics::new();
    diagnostics.insert("reference_words".into(), reference_words.into());
    diagnostics.insert("correct_words".into(), correct_words.into());
    diagnostics.insert("word_accuracy".into(), ratio(correct_words, reference_words).into());
    diagnostics.insert("wer".into(), wer.into());
    diagnostics.insert("cer".into(), cer.into());
    diagnostics.insert(
        "word_edit_distance".into(),
        input.word_alignment.edit_distance.into(),
    );
    diagnostics.insert("char_edit_distance".into(), input.char_distance.into());
    for (key, kind) in [
        ("substitutions", OperationKind::Substitution),
        ("insertions", OperationKind::Insertion),
        ("deletions", OperationKind::Deletion),
    ] {
        diagnostics.insert(key.into(), input.word_alignment.count(kind).into());
    }
    let problem_words: Vec<String> = input
        .matches
        .problem_words()
        .into_iter()
        .take(MAX_PROBLEM_WORDS)
        .collect();
    diagnostics.insert("problem_words".into(), json_words(&problem_words));

    MetricScore::new(points(blend_value(input, blend), max), max, diagnostics)
}
