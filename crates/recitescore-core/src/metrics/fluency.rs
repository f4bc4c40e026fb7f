//! Fluency: speaking pace, pause placement, and filler words.
//!
//! Only transcript text and total duration are available, so pauses are
//! approximated: one pause is credited per ten spoken words, up to the number
//! of sentence breaks in the reference.

use serde::{Deserialize, Serialize};

use crate::metrics::{points, unit, Diagnostics, MetricInput, MetricScore};

/// Single-word fillers.
pub const FILLER_WORDS: [&str; 5] = ["um", "uh", "er", "like", "hmm"];

/// Two-word fillers.
pub const FILLER_PHRASES: [[&str; 2]; 1] = [["you", "know"]];

/// Filler count at which the filler component reaches zero.
const FILLER_SATURATION: f64 = 10.0;

/// Spoken words credited per pause.
const WORDS_PER_PAUSE: usize = 10;

/// Piecewise-linear words-per-minute score.
///
/// 0 at or below `floor`, rising linearly to 1 at `ideal_low`, 1 across the
/// ideal band, falling linearly to 0 at `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WpmCurve {
    pub floor: f64,
    pub ideal_low: f64,
    pub ideal_high: f64,
    pub ceiling: f64,
}

impl Default for WpmCurve {
    fn default() -> Self {
        Self {
            floor: 50.0,
            ideal_low: 100.0,
            ideal_high: 150.0,
            ceiling: 200.0,
        }
    }
}

impl WpmCurve {
    pub fn normalize(&self, wpm: f64) -> f64 {
        if !wpm.is_finite() || wpm <= self.floor || wpm >= self.ceiling {
            0.0
        } else if wpm < self.ideal_low {
            (wpm - self.floor) / (self.ideal_low - self.floor)
        } else if wpm <= self.ideal_high {
            1.0
        } else {
            1.0 - (wpm - self.ideal_high) / (self.ceiling - self.ideal_high)
        }
    }

    /// Describe why the curve is unusable, if it is.
    pub fn check(&self) -> Result<(), String> {
        let values = [self.floor, self.ideal_low, self.ideal_high, self.ceiling];
        if values.iter().any(|v| !v.is_finite()) {
            return Err("all points must be finite".into());
        }
        if self.floor < 0.0 {
            return Err(format!("floor {} is negative", self.floor));
        }
        if !(self.floor < self.ideal_low
            && self.ideal_low <= self.ideal_high
            && self.ideal_high < self.ceiling)
        {
            return Err(format!(
                "expected floor < ideal_low <= ideal_high < ceiling, got {} / {} / {} / {}",
                self.floor, self.ideal_low, self.ideal_high, self.ceiling
            ));
        }
        Ok(())
    }
}

/// Weights of pace, pauses, and absence of fillers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluencyBlend {
    #[serde(default = "default_pace")]
    pub pace: f64,
    #[serde(default = "default_pauses")]
    pub pauses: f64,
    #[serde(default = "default_fillers")]
    pub fillers: f64,
}

fn default_pace() -> f64 {
    0.5
}
fn default_pauses() -> f64 {
    0.3
}
fn default_fillers() -> f64 {
    0.2
}

impl Default for FluencyBlend {
    fn default() -> Self {
        Self {
            pace: default_pace(),
            pauses: default_pauses(),
            fillers: default_fillers(),
        }
    }
}

impl FluencyBlend {
    pub fn sum(&self) -> f64 {
        self.pace + self.pauses + self.fillers
    }
}

/// Count filler words and phrases in bare tokens.
pub fn count_fillers(words: &[String]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < words.len() {
        let phrase = FILLER_PHRASES.iter().find(|phrase| {
            words.len() - i >= phrase.len()
                && phrase.iter().zip(&words[i..]).all(|(p, w)| *p == w.as_str())
        });
        if let Some(phrase) = phrase {
            count += 1;
            i += phrase.len();
        } else {
            if FILLER_WORDS.contains(&words[i].as_str()) {
                count += 1;
            }
            i += 1;
        }
    }
    count
}

/// Intermediate fluency measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluencySignals {
    pub wpm: f64,
    pub wpm_score: f64,
    pub expected_pauses: usize,
    pub observed_pauses: usize,
    pub pause_ratio: f64,
    pub filler_count: usize,
    pub filler_penalty: f64,
}

impl FluencySignals {
    pub fn measure(input: &MetricInput<'_>, curve: &WpmCurve) -> Self {
        let words = input.candidate.word_count();
        let minutes = input.timing.duration_secs / 60.0;
        let wpm = if minutes > 0.0 {
            words as f64 / minutes
        } else {
            0.0
        };
        let expected_pauses = input.reference.sentence_punctuation_count();
        let observed_pauses = expected_pauses.min(words / WORDS_PER_PAUSE);
        let pause_ratio = match (words, expected_pauses) {
            (0, _) => 0.0,
            (_, 0) => 1.0,
            _ => observed_pauses as f64 / expected_pauses as f64,
        };
        let filler_count = count_fillers(&input.candidate.words);
        Self {
            wpm,
            wpm_score: unit(curve.normalize(wpm)),
            expected_pauses,
            observed_pauses,
            pause_ratio,
            filler_count,
            filler_penalty: (filler_count as f64 / FILLER_SATURATION).min(1.0),
        }
    }

    pub fn blend(&self, blend: &FluencyBlend) -> f64 {
        unit(
            self.wpm_score * blend.pace
                + self.pause_ratio * blend.pauses
                + (1.0 - self.filler_penalty) * blend.fillers,
        )
    }
}

/// Unit-interval fluency before scaling to points.
pub fn blend_value(input: &MetricInput<'_>, blend: &FluencyBlend, curve: &WpmCurve) -> f64 {
    if input.candidate.is_empty() || input.reference.is_empty() {
        return 0.0;
    }
    FluencySignals::measure(input, curve).blend(blend)
}

pub fn fluency(
    input: &MetricInput<'_>,
    blend: &FluencyBlend,
    curve: &WpmCurve,
    max: f64,
) -> MetricScore {
    let signals = FluencySignals::measure(input, curve);

    let mut diagnostics = Diagnostics::new();
    diagnostics.insert("wpm".into(), signals.wpm.into());
    diagnostics.insert("wpm_score".into(), signals.wpm_score.into());
    diagnostics.insert("expected_pauses".into(), signals.expected_pauses.into());
    diagnostics.insert("observed_pauses".into(), signals.observed_pauses.into());
    diagnostics.insert("pause_ratio".into(), signals.pause_ratio.into());
    diagnostics.insert("filler_count".into(), signals.filler_count.into());
    diagnostics.insert("filler_penalty".into(), signals.filler_penalty.into());
    diagnostics.insert("ideal_wpm_low".into(), curve.ideal_low.into());
    diagnostics.insert("ideal_wpm_high".into(), curve.ideal_high.into());
    input.timing.annotate(&mut diagnostics);

    if input.candidate.is_empty() || input.reference.is_empty() {
        return MetricScore::zero(max, diagnostics);
    }
    MetricScore::new(points(signals.blend(blend), max), max, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::Fixture;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn normalize_wpm_reference_points() {
        let curve = WpmCurve::default();
        assert_eq!(curve.normalize(135.0), 1.0);
        assert!((curve.normalize(60.0) - 0.2).abs() < 1e-12);
        assert_eq!(curve.normalize(200.0), 0.0);
        assert_eq!(curve.normalize(50.0), 0.0);
        assert_eq!(curve.normalize(100.0), 1.0);
        assert!((curve.normalize(175.0) - 0.5).abs() < 1e-12);
        assert_eq!(curve.normalize(f64::INFINITY), 0.0);
    }

    #[test]
    fn curve_check_rejects_disorder() {
        assert!(WpmCurve::default().check().is_ok());
        let bad = WpmCurve {
            floor: 120.0,
            ..WpmCurve::default()
        };
        assert!(bad.check().is_err());
    }

    #[test]
    fn fillers_include_phrases() {
        assert_eq!(count_fillers(&words("um so you know it was like uh fine")), 4);
        assert_eq!(count_fillers(&words("you said you know")), 1);
        assert_eq!(count_fillers(&words("hmm")), 1);
        assert_eq!(count_fillers(&words("no fillers here")), 0);
    }

    fn fifty_words(fillers: &[&str]) -> String {
        let mut tokens: Vec<String> = fillers.iter().map(|f| f.to_string()).collect();
        let mut n = 0;
        while tokens.len() < 50 {
            tokens.push(format!("word{n}"));
            n += 1;
        }
        tokens.join(" ")
    }

    #[test]
    fn fillers_lower_the_score_at_equal_pace() {
        let reference = "A first sentence. A second one, with a pause.";
        let with = Fixture::new(reference, &fifty_words(&["um", "like", "uh"]), 24.0);
        let without = Fixture::new(reference, &fifty_words(&[]), 24.0);

        let signals = FluencySignals::measure(&with.input(), &WpmCurve::default());
        assert_eq!(signals.filler_count, 3);
        assert!((signals.filler_penalty - 0.3).abs() < 1e-12);

        let blend = FluencyBlend::default();
        let curve = WpmCurve::default();
        let a = fluency(&with.input(), &blend, &curve, 30.0);
        let b = fluency(&without.input(), &blend, &curve, 30.0);
        assert_eq!(
            a.diagnostic("wpm").and_then(|v| v.as_f64()),
            b.diagnostic("wpm").and_then(|v| v.as_f64())
        );
        assert!(a.raw < b.raw, "{} should be below {}", a.raw, b.raw);
    }

    #[test]
    fn pauses_are_capped_by_reference() {
        let reference = "One. Two. Three.";
        let f = Fixture::new(reference, &fifty_words(&[]), 30.0);
        let signals = FluencySignals::measure(&f.input(), &WpmCurve::default());
        assert_eq!(signals.expected_pauses, 3);
        assert_eq!(signals.observed_pauses, 3);
        assert_eq!(signals.pause_ratio, 1.0);
    }

    #[test]
    fn no_reference_pauses_gives_full_pause_credit() {
        let f = Fixture::new("no breaks here", "no breaks here", 2.0);
        let signals = FluencySignals::measure(&f.input(), &WpmCurve::default());
        assert_eq!(signals.pause_ratio, 1.0);
    }

    #[test]
    fn empty_candidate_scores_zero() {
        let f = Fixture::new("Hello there.", "", 10.0);
        let score = fluency(&f.input(), &FluencyBlend::default(), &WpmCurve::default(), 30.0);
        assert_eq!(score.raw, 0.0);
        assert_eq!(
            score.diagnostic("timing").and_then(|v| v.as_str()),
            Some("measured")
        );
    }

    #[test]
    fn empty_reference_scores_zero() {
        let f = Fixture::new("", "reading along at a steady pace", 3.0);
        let score = fluency(&f.input(), &FluencyBlend::default(), &WpmCurve::default(), 30.0);
        assert_eq!(score.raw, 0.0);
        assert_eq!(
            blend_value(&f.input(), &FluencyBlend::default(), &WpmCurve::default()),
            0.0
        );
    }
}
