//! Core data model types for an evaluation attempt.
//!
//! A reference text is fixed per exercise; a candidate transcript and its
//! timing are captured once per attempt. Both are immutable once built.

use serde::{Deserialize, Serialize};

use crate::aggregate::CompositeScore;
use crate::feedback::Feedback;
use crate::metrics::Diagnostics;
use crate::profile::ScaleProfile;

/// The expected passage or answer for an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceText(String);

impl ReferenceText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The learner's submitted text, typed or transcribed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateTranscript(String);

impl CandidateTranscript {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Timing captured with a transcript. Either value may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingInfo {
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub expected_duration_seconds: Option<f64>,
}

impl TimingInfo {
    pub fn new(duration_seconds: f64) -> Self {
        Self {
            duration_seconds: Some(duration_seconds),
            expected_duration_seconds: None,
        }
    }

    pub fn with_expected(mut self, expected_duration_seconds: f64) -> Self {
        self.expected_duration_seconds = Some(expected_duration_seconds);
        self
    }

    /// Substitute `default_secs` for a missing or unusable duration.
    pub fn resolve(&self, default_secs: f64) -> ResolvedTiming {
        let usable = |v: Option<f64>| v.filter(|s| s.is_finite() && *s > 0.0);
        match usable(self.duration_seconds) {
            Some(duration_secs) => ResolvedTiming {
                duration_secs,
                expected_secs: usable(self.expected_duration_seconds),
                estimated: false,
            },
            None => ResolvedTiming {
                duration_secs: default_secs,
                expected_secs: usable(self.expected_duration_seconds),
                estimated: true,
            },
        }
    }
}

/// Timing after defaults have been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTiming {
    pub duration_secs: f64,
    pub expected_secs: Option<f64>,
    /// `true` when `duration_secs` is the configured default.
    pub estimated: bool,
}

impl ResolvedTiming {
    /// Record duration and whether it was measured or estimated.
    pub fn annotate(&self, diagnostics: &mut Diagnostics) {
        diagnostics.insert("duration_secs".into(), self.duration_secs.into());
        diagnostics.insert(
            "timing".into(),
            if self.estimated { "estimated" } else { "measured" }.into(),
        );
    }
}

/// Input to one engine call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub reference: ReferenceText,
    pub candidate: CandidateTranscript,
    #[serde(default)]
    pub timing: TimingInfo,
    pub profile: ScaleProfile,
}

/// Output of one engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub score: CompositeScore,
    pub feedback: Feedback,
}
