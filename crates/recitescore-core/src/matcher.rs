//! Word matching between a reference and a candidate.
//!
//! Positional comparison classifies each index as exact, near, mismatch,
//! missing (candidate too short) or extra (candidate too long). A separate
//! set comparison finds candidate words absent from the reference and
//! reference words absent from the candidate; only completeness uses it.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::alignment::edit_distance;
use crate::traits::WordSimilarity;

/// Reference words this short are ignored when looking for skipped words.
pub const SKIPPED_MIN_LEN: usize = 3;

/// Classification of one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Near,
    /// Both sides have a word but they are neither exact nor near.
    Mismatch,
    Missing,
    Extra,
}

/// One positional comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordMatch {
    pub position: usize,
    /// Reference word; `None` for extra candidate words.
    pub original: Option<String>,
    /// Candidate word; `None` for missing reference words.
    pub transcribed: Option<String>,
    pub match_kind: MatchKind,
}

/// Full matcher output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    pub matches: Vec<WordMatch>,
    /// Candidate words not found anywhere in the reference.
    pub extra: Vec<String>,
    /// Reference words (longer than two letters) not found anywhere in the candidate.
    pub skipped: Vec<String>,
}

impl MatchReport {
    pub fn count(&self, kind: MatchKind) -> usize {
        self.matches.iter().filter(|m| m.match_kind == kind).count()
    }

    /// Number of exactly matched reference words.
    pub fn correct_words(&self) -> usize {
        self.count(MatchKind::Exact)
    }

    /// Reference positions that were not matched exactly.
    pub fn non_exact(&self) -> impl Iterator<Item = &WordMatch> {
        self.matches
            .iter()
            .filter(|m| m.match_kind != MatchKind::Exact && m.original.is_some())
    }

    /// Distinct reference words that were not matched exactly, in order.
    pub fn problem_words(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.non_exact()
            .filter_map(|m| m.original.clone())
            .filter(|w| seen.insert(w.clone()))
            .collect()
    }
}

/// Compare bare reference and candidate words.
pub fn match_words(
    reference: &[String],
    candidate: &[String],
    similarity: &dyn WordSimilarity,
) -> MatchReport {
    let len = reference.len().max(candidate.len());
    let mut matches = Vec::with_capacity(len);

    for position in 0..len {
        let word_match = match (reference.get(position), candidate.get(position)) {
            (Some(original), Some(transcribed)) => {
                let match_kind = if original == transcribed {
                    MatchKind::Exact
                } else if similarity.is_near(original, transcribed) {
                    MatchKind::Near
                } else {
                    MatchKind::Mismatch
                };
                WordMatch {
                    position,
                    original: Some(original.clone()),
                    transcribed: Some(transcribed.clone()),
                    match_kind,
                }
            }
            (Some(original), None) => WordMatch {
                position,
                original: Some(original.clone()),
                transcribed: None,
                match_kind: MatchKind::Missing,
            },
            (None, Some(transcribed)) => WordMatch {
                position,
                original: None,
                transcribed: Some(transcribed.clone()),
                match_kind: MatchKind::Extra,
            },
            (None, None) => unreachable!("position is below the longer length"),
        };
        matches.push(word_match);
    }

    let reference_set: HashSet<&str> = reference.iter().map(String::as_str).collect();
    let candidate_set: HashSet<&str> = candidate.iter().map(String::as_str).collect();

    MatchReport {
        matches,
        extra: distinct_absent(candidate, &reference_set, 0),
        skipped: distinct_absent(reference, &candidate_set, SKIPPED_MIN_LEN),
    }
}

/// Words of `words` absent from `other`, deduplicated in first-seen order.
fn distinct_absent(words: &[String], other: &HashSet<&str>, min_len: usize) -> Vec<String> {
    let mut seen = BTreeSet::new();
    words
        .iter()
        .filter(|w| w.chars().count() >= min_len)
        .filter(|w| !other.contains(w.as_str()))
        .filter(|w| seen.insert(w.as_str()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Similarity strategies
// ---------------------------------------------------------------------------

/// Prefix and edit-distance heuristic.
///
/// Near when both words are longer than three characters and either their
/// edit distance is at most two or one word's three-character prefix occurs
/// inside the other.
#[derive(Debug, Clone)]
pub struct PrefixEditSimilarity {
    pub min_len: usize,
    pub max_edits: usize,
    pub prefix_len: usize,
}

impl Default for PrefixEditSimilarity {
    fn default() -> Self {
        Self {
            min_len: 4,
            max_edits: 2,
            prefix_len: 3,
        }
    }
}

impl PrefixEditSimilarity {
    fn prefix(&self, word: &str) -> String {
        word.chars().take(self.prefix_len).collect()
    }
}

impl WordSimilarity for PrefixEditSimilarity {
    fn name(&self) -> &str {
        "prefix-edit"
    }

    fn is_near(&self, expected: &str, actual: &str) -> bool {
        let a: Vec<char> = expected.chars().collect();
        let b: Vec<char> = actual.chars().collect();
        if a.len() < self.min_len || b.len() < self.min_len {
            return false;
        }
        if edit_distance(&a, &b) <= self.max_edits {
            return true;
        }
        actual.contains(&self.prefix(expected)) || expected.contains(&self.prefix(actual))
    }
}

/// Jaro–Winkler similarity above a threshold.
#[derive(Debug, Clone)]
pub struct JaroWinklerSimilarity {
    pub threshold: f64,
    pub min_len: usize,
}

impl Default for JaroWinklerSimilarity {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            min_len: 4,
        }
    }
}

impl WordSimilarity for JaroWinklerSimilarity {
    fn name(&self) -> &str {
        "jaro-winkler"
    }

    fn is_near(&self, expected: &str, actual: &str) -> bool {
        if expected.chars().count() < self.min_len || actual.chars().count() < self.min_len {
            return false;
        }
        jaro_winkler(expected, actual) >= self.threshold
    }
}
