//! Metric calculators.
//!
//! Each calculator turns alignment, matcher and timing data into a
//! [`MetricScore`] bounded by the points its profile allots. Scores are
//! clamped to `[0, max]` at construction, so nothing unbounded can reach the
//! aggregator.

pub mod accuracy;
pub mod completeness;
pub mod fluency;
pub mod pronunciation;
pub mod prosody;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::alignment::AlignmentResult;
use crate::matcher::MatchReport;
use crate::model::ResolvedTiming;
use crate::text::TokenizedText;

pub use accuracy::AccuracyBlend;
pub use completeness::{CompletenessBlend, CompletenessGate};
pub use fluency::{FluencyBlend, WpmCurve};
pub use prosody::ProsodyBlend;

/// Diagnostic values attached to a metric score, in stable key order.
pub type Diagnostics = BTreeMap<String, Value>;

/// The scoring dimensions a profile can allot points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Accuracy,
    Fluency,
    Pronunciation,
    Completeness,
    Prosody,
    Attempt,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Accuracy,
        Metric::Fluency,
        Metric::Pronunciation,
        Metric::Completeness,
        Metric::Prosody,
        Metric::Attempt,
    ];
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Accuracy => write!(f, "accuracy"),
            Metric::Fluency => write!(f, "fluency"),
            Metric::Pronunciation => write!(f, "pronunciation"),
            Metric::Completeness => write!(f, "completeness"),
            Metric::Prosody => write!(f, "prosody"),
            Metric::Attempt => write!(f, "attempt"),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accuracy" => Ok(Metric::Accuracy),
            "fluency" => Ok(Metric::Fluency),
            "pronunciation" => Ok(Metric::Pronunciation),
            "completeness" => Ok(Metric::Completeness),
            "prosody" => Ok(Metric::Prosody),
            "attempt" => Ok(Metric::Attempt),
            other => Err(format!("unknown metric: {other}")),
        }
    }
}

/// A bounded sub-score with diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    pub raw: f64,
    pub max: f64,
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl MetricScore {
    /// Build a score, clamping `raw` into `[0, max]`. Non-finite values become 0.
    pub fn new(raw: f64, max: f64, diagnostics: Diagnostics) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        let raw = if raw.is_finite() { raw.clamp(0.0, max) } else { 0.0 };
        Self {
            raw,
            max,
            diagnostics,
        }
    }

    /// Zero score for a metric that had nothing to measure.
    pub fn zero(max: f64, diagnostics: Diagnostics) -> Self {
        Self::new(0.0, max, diagnostics)
    }

    /// `raw / max`, or 0 when the metric has no points.
    pub fn ratio(&self) -> f64 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.raw / self.max
        }
    }

    pub fn diagnostic(&self, key: &str) -> Option<&Value> {
        self.diagnostics.get(key)
    }

    /// String entries of an array diagnostic.
    pub fn diagnostic_words(&self, key: &str) -> Vec<String> {
        self.diagnostics
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Everything a calculator may look at for one attempt.
#[derive(Debug, Clone, Copy)]
pub struct MetricInput<'a> {
    pub reference: &'a TokenizedText,
    pub candidate: &'a TokenizedText,
    pub word_alignment: &'a AlignmentResult,
    /// Character-level edit distance (no trace is kept at this granularity).
    pub char_distance: usize,
    pub matches: &'a MatchReport,
    pub timing: &'a ResolvedTiming,
}

/// Clamp a ratio into `[0, 1]`, mapping non-finite values to 0.
pub(crate) fn unit(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub(crate) fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Scale a unit blend to points and round half away from zero.
pub(crate) fn points(blend: f64, max: f64) -> f64 {
    (unit(blend) * max).round()
}

pub(crate) fn json_words(words: &[String]) -> Value {
    Value::Array(words.iter().cloned().map(Value::String).collect())
}

/// Attempt credit: full points when the candidate said anything at all.
pub fn attempt(input: &MetricInput<'_>, max: f64) -> MetricScore {
    let words = input.candidate.word_count();
    let mut diagnostics = Diagnostics::new();
    diagnostics.insert("candidate_words".into(), words.into());
    let raw = if words > 0 { max } else { 0.0 };
    MetricScore::new(raw, max, diagnostics)
}
