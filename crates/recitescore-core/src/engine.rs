//! Central evaluation engine.
//!
//! Runs the whole pipeline for one attempt: tokenize, align, match, compute
//! every metric the profile allots, aggregate, and synthesize feedback. The
//! engine holds no mutable state, performs no I/O, and never fails once it
//! has been given a validated profile.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::aggregate::{aggregate, CompositeScore};
use crate::alignment::{align, edit_distance};
use crate::feedback::synthesize;
use crate::matcher::{match_words, PrefixEditSimilarity};
use crate::metrics::prosody::ProsodySources;
use crate::metrics::{
    accuracy, attempt, completeness, fluency, pronunciation, prosody, Metric, MetricInput,
    MetricScore,
};
use crate::model::{
    CandidateTranscript, EvaluationOutcome, EvaluationRequest, ReferenceText, TimingInfo,
};
use crate::profile::ScaleProfile;
use crate::text::TokenizedText;
use crate::traits::WordSimilarity;

/// Configuration for the evaluation engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationEngineConfig {
    /// Duration assumed when timing is missing or unusable.
    pub default_duration_secs: f64,
    /// Word cap per token sequence; longer inputs are truncated before alignment.
    pub max_words: usize,
}

impl Default for EvaluationEngineConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: 60.0,
            max_words: 400,
        }
    }
}

/// The evaluation engine.
#[derive(Clone)]
pub struct EvaluationEngine {
    config: EvaluationEngineConfig,
    similarity: Arc<dyn WordSimilarity>,
}

impl Default for EvaluationEngine {
    fn default() -> Self {
        Self::new(EvaluationEngineConfig::default())
    }
}

impl std::fmt::Debug for EvaluationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationEngine")
            .field("config", &self.config)
            .field("similarity", &self.similarity.name())
            .finish()
    }
}

impl EvaluationEngine {
    pub fn new(config: EvaluationEngineConfig) -> Self {
        Self {
            config,
            similarity: Arc::new(PrefixEditSimilarity::default()),
        }
    }

    /// Replace the near-match rule used by the word matcher.
    pub fn with_similarity(mut self, similarity: Arc<dyn WordSimilarity>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn config(&self) -> &EvaluationEngineConfig {
        &self.config
    }

    /// Score one attempt and render its feedback.
    #[instrument(skip_all, fields(profile = %request.profile.name()))]
    pub fn evaluate(&self, request: &EvaluationRequest) -> EvaluationOutcome {
        let score = self.score(
            &request.reference,
            &request.candidate,
            &request.timing,
            &request.profile,
        );
        let feedback = synthesize(&score);
        EvaluationOutcome { score, feedback }
    }

    /// Compute the composite score without feedback.
    pub fn score(
        &self,
        reference: &ReferenceText,
        candidate: &CandidateTranscript,
        timing: &TimingInfo,
        profile: &ScaleProfile,
    ) -> CompositeScore {
        let mut reference = TokenizedText::new(reference.as_str());
        let mut candidate = TokenizedText::new(candidate.as_str());

        let max_words = self.config.max_words;
        let truncated_reference = reference.truncate(max_words);
        let truncated_candidate = candidate.truncate(max_words);
        let truncated = truncated_reference || truncated_candidate;
        if truncated {
            warn!(
                max_words,
                reference = truncated_reference,
                candidate = truncated_candidate,
                "input exceeds word cap, truncating before alignment"
            );
        }

        let timing = timing.resolve(self.config.default_duration_secs);
        if timing.estimated {
            warn!(
                default_secs = timing.duration_secs,
                "timing missing or unusable, using default duration"
            );
        }

        let word_alignment = align(&reference.words, &candidate.words);
        let char_distance = edit_distance(&reference.chars, &candidate.chars);
        let matches = match_words(&reference.words, &candidate.words, self.similarity.as_ref());

        let input = MetricInput {
            reference: &reference,
            candidate: &candidate,
            word_alignment: &word_alignment,
            char_distance,
            matches: &matches,
            timing: &timing,
        };

        let mut computed = BTreeMap::new();
        for allotment in profile.allotments() {
            let mut score = compute(allotment.metric, &input, profile, allotment.points);
            if truncated {
                score.diagnostics.insert("truncated".into(), true.into());
            }
            if allotment.metric == Metric::Accuracy {
                score
                    .diagnostics
                    .insert("similarity".into(), self.similarity.name().into());
            }
            debug!(
                metric = %allotment.metric,
                raw = score.raw,
                max = score.max,
                "metric scored"
            );
            computed.insert(allotment.metric, score);
        }

        aggregate(profile, computed)
    }
}

fn compute(metric: Metric, input: &MetricInput<'_>, profile: &ScaleProfile, max: f64) -> MetricScore {
    let blends = profile.blends();
    match metric {
        Metric::Accuracy => accuracy::accuracy(input, &blends.accuracy, max),
        Metric::Fluency => fluency::fluency(input, &blends.fluency, profile.wpm_curve(), max),
        Metric::Pronunciation => pronunciation::pronunciation(input, max),
        Metric::Completeness => completeness::completeness(
            input,
            &blends.completeness,
            profile.completeness_gate(),
            max,
        ),
        Metric::Prosody => prosody::prosody(
            input,
            &blends.prosody,
            ProsodySources {
                accuracy: &blends.accuracy,
                fluency: &blends.fluency,
                curve: profile.wpm_curve(),
            },
            max,
        ),
        Metric::Attempt => attempt(input, max),
    }
}
