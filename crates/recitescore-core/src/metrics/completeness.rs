//! Completeness: how much of the reference was covered.
//!
//! Ungated profiles blend coverage with skipped and extra word counts. Gated
//! profiles award full credit only when the learner both covered enough of
//! the reference and satisfied a duration rule.

use serde::{Deserialize, Serialize};

use crate::metrics::{json_words, points, ratio, unit, Diagnostics, MetricInput, MetricScore};

/// Skipped or extra word count at which that component reaches zero.
const WORD_LIST_SATURATION: f64 = 10.0;

fn default_completion_threshold() -> f64 {
    0.9
}

/// Duration rule for gated completeness.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompletenessGate {
    /// Blend coverage, skipped words, and extra words.
    #[default]
    None,
    /// The learner must keep going for at least `seconds`.
    MinimumDuration {
        seconds: f64,
        #[serde(default = "default_completion_threshold")]
        completion_threshold: f64,
    },
    /// The learner must finish within `seconds`.
    TimeLimit {
        seconds: f64,
        #[serde(default = "default_completion_threshold")]
        completion_threshold: f64,
    },
}

impl CompletenessGate {
    /// Describe why the gate is unusable, if it is.
    pub fn check(&self) -> Result<(), String> {
        match *self {
            CompletenessGate::None => Ok(()),
            CompletenessGate::MinimumDuration {
                seconds,
                completion_threshold,
            }
            | CompletenessGate::TimeLimit {
                seconds,
                completion_threshold,
            } => {
                if !(seconds.is_finite() && seconds > 0.0) {
                    return Err(format!("gate seconds must be positive, got {seconds}"));
                }
                if !(completion_threshold > 0.0 && completion_threshold <= 1.0) {
                    return Err(format!(
                        "completion threshold must be in (0, 1], got {completion_threshold}"
                    ));
                }
                Ok(())
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            CompletenessGate::None => "none",
            CompletenessGate::MinimumDuration { .. } => "minimum_duration",
            CompletenessGate::TimeLimit { .. } => "time_limit",
        }
    }
}

/// Weights of coverage, absence of skipped words, and absence of extra words.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletenessBlend {
    #[serde(default = "default_coverage")]
    pub coverage: f64,
    #[serde(default = "default_skipped")]
    pub skipped: f64,
    #[serde(default = "default_extra")]
    pub extra: f64,
}

fn default_coverage() -> f64 {
    0.6
}
fn default_skipped() -> f64 {
    0.3
}
fn default_extra() -> f64 {
    0.1
}

impl Default for CompletenessBlend {
    fn default() -> Self {
        Self {
            coverage: default_coverage(),
            skipped: default_skipped(),
            extra: default_extra(),
        }
    }
}

impl CompletenessBlend {
    pub fn sum(&self) -> f64 {
        self.coverage + self.skipped + self.extra
    }
}

/// Credit for a gated attempt that missed full credit: proportional, but
/// always at least one point short of the allotment.
fn partial_credit(ratio: f64, max: f64) -> f64 {
    points(ratio, max).min((max - 1.0).max(0.0))
}

pub fn completeness(
    input: &MetricInput<'_>,
    blend: &CompletenessBlend,
    gate: &CompletenessGate,
    max: f64,
) -> MetricScore {
    let candidate_words = input.candidate.word_count();
    let reference_words = input.reference.word_count();
    let coverage = ratio(candidate_words, reference_words);
    let skipped = &input.matches.skipped;
    let extra = &input.matches.extra;

    let mut diagnostics = Diagnostics::new();
    diagnostics.insert("coverage".into(), coverage.into());
    diagnostics.insert("candidate_words".into(), candidate_words.into());
    diagnostics.insert("reference_words".into(), reference_words.into());
    diagnostics.insert("skipped".into(), json_words(skipped));
    diagnostics.insert("extra".into(), json_words(extra));
    diagnostics.insert("gate".into(), gate.label().into());
    input.timing.annotate(&mut diagnostics);

    if candidate_words == 0 || reference_words == 0 {
        return MetricScore::zero(max, diagnostics);
    }

    let duration = input.timing.duration_secs;
    let raw = match *gate {
        CompletenessGate::None => points(
            unit(coverage) * blend.coverage
                + (1.0 - (skipped.len() as f64 / WORD_LIST_SATURATION).min(1.0)) * blend.skipped
                + (1.0 - (extra.len() as f64 / WORD_LIST_SATURATION).min(1.0)) * blend.extra,
            max,
        ),
        CompletenessGate::MinimumDuration {
            seconds,
            completion_threshold,
        } => {
            let seconds = input.timing.expected_secs.unwrap_or(seconds);
            let full = coverage >= completion_threshold && duration >= seconds;
            diagnostics.insert("gate_seconds".into(), seconds.into());
            diagnostics.insert("full_credit".into(), full.into());
            if full {
                max
            } else {
                partial_credit(duration / seconds, max)
            }
        }
        CompletenessGate::TimeLimit {
            seconds,
            completion_threshold,
        } => {
            let seconds = input.timing.expected_secs.unwrap_or(seconds);
            let full = coverage >= completion_threshold && duration <= seconds;
            diagnostics.insert("gate_seconds".into(), seconds.into());
            diagnostics.insert("full_credit".into(), full.into());
            if full {
                max
            } else {
                partial_credit(coverage, max)
            }
        }
    };

    MetricScore::new(raw, max, diagnostics)
}
