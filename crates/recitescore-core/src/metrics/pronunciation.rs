//! Pronunciation risk from text alone.
//!
//! No audio is analysed. Reference words that are long or contain
//! non-letters are treated as difficult, and a difficult word that was not
//! matched exactly counts as an issue.

use std::collections::BTreeSet;

use crate::metrics::{json_words, Diagnostics, MetricInput, MetricScore};

/// Words longer than this are difficult.
const DIFFICULT_LEN: usize = 6;

/// Credit with one or two issues.
const MINOR_ISSUE_CREDIT: f64 = 0.75;

/// Credit with three or more issues.
const MAJOR_ISSUE_CREDIT: f64 = 0.5;

const MAJOR_ISSUE_COUNT: usize = 3;

pub fn is_difficult(word: &str) -> bool {
    word.chars().count() > DIFFICULT_LEN || word.chars().any(|c| !c.is_alphabetic())
}

/// Fraction of the allotment awarded for a number of issues.
pub fn credit_for_issues(issues: usize) -> f64 {
    match issues {
        0 => 1.0,
        n if n < MAJOR_ISSUE_COUNT => MINOR_ISSUE_CREDIT,
        _ => MAJOR_ISSUE_CREDIT,
    }
}

pub fn pronunciation(input: &MetricInput<'_>, max: f64) -> MetricScore {
    let mut seen = BTreeSet::new();
    let difficult: Vec<String> = input
        .reference
        .words
        .iter()
        .filter(|w| is_difficult(w))
        .filter(|w| seen.insert(w.as_str()))
        .cloned()
        .collect();

    let problems: BTreeSet<String> = input.matches.problem_words().into_iter().collect();
    let issue_words: Vec<String> = difficult
        .iter()
        .filter(|w| problems.contains(*w))
        .cloned()
        .collect();

    let mut diagnostics = Diagnostics::new();
    diagnostics.insert("difficult_words".into(), json_words(&difficult));
    diagnostics.insert("issue_words".into(), json_words(&issue_words));
    diagnostics.insert("issues".into(), issue_words.len().into());

    if input.candidate.is_empty() || input.reference.is_empty() {
        return MetricScore::zero(max, diagnostics);
    }
    let raw = credit_for_issues(issue_words.len()) * max;
    MetricScore::new(raw, max, diagnostics)
}
