//! Scale profiles.
//!
//! A profile names the metrics an exercise type is scored on, the points each
//! one is worth, the internal blend weights of each calculator, and the
//! thresholds feedback uses. Profiles are validated once, when built; a
//! `ScaleProfile` value is always internally consistent.

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::metrics::{
    AccuracyBlend, CompletenessBlend, CompletenessGate, FluencyBlend, Metric, ProsodyBlend,
    WpmCurve,
};

/// Tolerance when comparing sums of points or weights.
const TOLERANCE: f64 = 1e-6;

/// Points allotted to one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allotment {
    pub metric: Metric,
    /// Display name, e.g. "pace" for fluency in a pass/fail profile.
    #[serde(default)]
    pub label: Option<String>,
    pub points: f64,
}

impl Allotment {
    pub fn new(metric: Metric, points: f64) -> Self {
        Self {
            metric,
            label: None,
            points,
        }
    }

    pub fn labelled(metric: Metric, label: &str, points: f64) -> Self {
        Self {
            metric,
            label: Some(label.to_string()),
            points,
        }
    }

    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.metric.to_string())
    }
}

/// Internal blend weights for every calculator that has them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Blends {
    #[serde(default)]
    pub accuracy: AccuracyBlend,
    #[serde(default)]
    pub fluency: FluencyBlend,
    #[serde(default)]
    pub completeness: CompletenessBlend,
    #[serde(default)]
    pub prosody: ProsodyBlend,
}

/// One summary threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryBand {
    pub min_percentage: f64,
    pub message: String,
}

/// Summary messages keyed by overall percentage, highest band first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryBands {
    #[serde(default = "default_bands")]
    pub bands: Vec<SummaryBand>,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_bands() -> Vec<SummaryBand> {
    [
        (80.0, "Excellent work!"),
        (60.0, "Very good!"),
        (45.0, "Good progress!"),
        (30.0, "You're making progress."),
    ]
    .into_iter()
    .map(|(min_percentage, message)| SummaryBand {
        min_percentage,
        message: message.to_string(),
    })
    .collect()
}

fn default_fallback() -> String {
    "Keep practicing.".to_string()
}

impl Default for SummaryBands {
    fn default() -> Self {
        Self {
            bands: default_bands(),
            fallback: default_fallback(),
        }
    }
}

impl SummaryBands {
    /// Message of the first band whose minimum the percentage reaches.
    pub fn message_for(&self, percentage: f64) -> &str {
        self.bands
            .iter()
            .find(|band| percentage >= band.min_percentage)
            .map(|band| band.message.as_str())
            .unwrap_or(&self.fallback)
    }
}

/// Unvalidated profile definition, as written in TOML or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub overall_max: f64,
    #[serde(default = "default_pass_percentage")]
    pub pass_percentage: f64,
    pub allotments: Vec<Allotment>,
    #[serde(default)]
    pub blends: Blends,
    #[serde(default)]
    pub wpm_curve: WpmCurve,
    #[serde(default)]
    pub completeness_gate: CompletenessGate,
    #[serde(default)]
    pub summary: SummaryBands,
}

fn default_pass_percentage() -> f64 {
    60.0
}

/// A validated scale profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileSpec", into = "ProfileSpec")]
pub struct ScaleProfile(ProfileSpec);

impl TryFrom<ProfileSpec> for ScaleProfile {
    type Error = ProfileError;

    fn try_from(spec: ProfileSpec) -> Result<Self, Self::Error> {
        ScaleProfile::new(spec)
    }
}

impl From<ScaleProfile> for ProfileSpec {
    fn from(profile: ScaleProfile) -> Self {
        profile.0
    }
}

impl ScaleProfile {
    /// Validate a specification into a profile.
    pub fn new(spec: ProfileSpec) -> Result<Self, ProfileError> {
        validate(&spec)?;
        Ok(Self(spec))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn description(&self) -> &str {
        &self.0.description
    }

    pub fn overall_max(&self) -> f64 {
        self.0.overall_max
    }

    pub fn pass_percentage(&self) -> f64 {
        self.0.pass_percentage
    }

    /// Allotments in declaration order.
    pub fn allotments(&self) -> &[Allotment] {
        &self.0.allotments
    }

    pub fn allotment(&self, metric: Metric) -> Option<&Allotment> {
        self.0.allotments.iter().find(|a| a.metric == metric)
    }

    pub fn blends(&self) -> &Blends {
        &self.0.blends
    }

    pub fn wpm_curve(&self) -> &WpmCurve {
        &self.0.wpm_curve
    }

    pub fn completeness_gate(&self) -> &CompletenessGate {
        &self.0.completeness_gate
    }

    pub fn summary(&self) -> &SummaryBands {
        &self.0.summary
    }

    pub fn spec(&self) -> &ProfileSpec {
        &self.0
    }

    // -----------------------------------------------------------------------
    // Built-in profiles
    // -----------------------------------------------------------------------

    /// Names accepted by [`ScaleProfile::builtin`].
    pub const BUILTIN_NAMES: [&'static str; 3] = ["pass-fail-9", "weighted-100", "speaking-100"];

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "pass-fail-9" => Some(Self::pass_fail_9()),
            "weighted-100" => Some(Self::weighted_100()),
            "speaking-100" => Some(Self::speaking_100()),
            _ => None,
        }
    }

    pub fn builtins() -> Vec<Self> {
        vec![
            Self::pass_fail_9(),
            Self::weighted_100(),
            Self::speaking_100(),
        ]
    }

    /// Nine-point pass/fail speaking task: keep talking for 30 seconds.
    pub fn pass_fail_9() -> Self {
        Self(ProfileSpec {
            name: "pass-fail-9".into(),
            description: "Nine-point pass/fail speaking task with a 30 second duration goal".into(),
            overall_max: 9.0,
            pass_percentage: 70.0,
            allotments: vec![
                Allotment::labelled(Metric::Completeness, "duration", 5.0),
                Allotment::new(Metric::Attempt, 1.0),
                Allotment::new(Metric::Pronunciation, 1.0),
                Allotment::labelled(Metric::Accuracy, "pattern", 1.0),
                Allotment::labelled(Metric::Fluency, "pace", 1.0),
            ],
            blends: Blends::default(),
            wpm_curve: WpmCurve::default(),
            completeness_gate: CompletenessGate::MinimumDuration {
                seconds: 30.0,
                completion_threshold: 0.9,
            },
            summary: SummaryBands::default(),
        })
    }

    /// Hundred-point reading-aloud profile.
    pub fn weighted_100() -> Self {
        Self(ProfileSpec {
            name: "weighted-100".into(),
            description: "Reading aloud: accuracy 30, fluency 30, pronunciation 15, completeness 15, prosody 10".into(),
            overall_max: 100.0,
            pass_percentage: 60.0,
            allotments: vec![
                Allotment::new(Metric::Accuracy, 30.0),
                Allotment::new(Metric::Fluency, 30.0),
                Allotment::new(Metric::Pronunciation, 15.0),
                Allotment::new(Metric::Completeness, 15.0),
                Allotment::new(Metric::Prosody, 10.0),
            ],
            blends: Blends::default(),
            wpm_curve: WpmCurve::default(),
            completeness_gate: CompletenessGate::None,
            summary: SummaryBands::default(),
        })
    }

    /// Hundred-point free-speaking profile with more weight on pronunciation.
    pub fn speaking_100() -> Self {
        Self(ProfileSpec {
            name: "speaking-100".into(),
            description: "Speaking: accuracy 30, fluency 30, pronunciation 20, completeness 10, prosody 10".into(),
            overall_max: 100.0,
            pass_percentage: 60.0,
            allotments: vec![
                Allotment::new(Metric::Accuracy, 30.0),
                Allotment::new(Metric::Fluency, 30.0),
                Allotment::new(Metric::Pronunciation, 20.0),
                Allotment::new(Metric::Completeness, 10.0),
                Allotment::new(Metric::Prosody, 10.0),
            ],
            blends: Blends::default(),
            wpm_curve: WpmCurve::default(),
            completeness_gate: CompletenessGate::None,
            summary: SummaryBands::default(),
        })
    }
}

fn validate(spec: &ProfileSpec) -> Result<(), ProfileError> {
    let profile = || spec.name.clone();

    if !(spec.overall_max.is_finite() && spec.overall_max > 0.0) {
        return Err(ProfileError::InvalidMaximum {
            profile: profile(),
            overall_max: spec.overall_max,
        });
    }
    if spec.allotments.is_empty() {
        return Err(ProfileError::Empty { profile: profile() });
    }

    let mut seen = Vec::with_capacity(spec.allotments.len());
    for allotment in &spec.allotments {
        if !(allotment.points.is_finite() && allotment.points > 0.0) {
            return Err(ProfileError::InvalidPoints {
                profile: profile(),
                metric: allotment.metric,
                points: allotment.points,
            });
        }
        if seen.contains(&allotment.metric) {
            return Err(ProfileError::DuplicateMetric {
                profile: profile(),
                metric: allotment.metric,
            });
        }
        seen.push(allotment.metric);
    }

    let allotted: f64 = spec.allotments.iter().map(|a| a.points).sum();
    if (allotted - spec.overall_max).abs() > TOLERANCE * spec.overall_max.max(1.0) {
        return Err(ProfileError::MaximumMismatch {
            profile: profile(),
            declared: spec.overall_max,
            allotted,
        });
    }

    let blends = &spec.blends;
    let weights = [
        (
            Metric::Accuracy,
            vec![blends.accuracy.word, blends.accuracy.character],
        ),
        (
            Metric::Fluency,
            vec![blends.fluency.pace, blends.fluency.pauses, blends.fluency.fillers],
        ),
        (
            Metric::Completeness,
            vec![
                blends.completeness.coverage,
                blends.completeness.skipped,
                blends.completeness.extra,
            ],
        ),
        (
            Metric::Prosody,
            vec![blends.prosody.fluency, blends.prosody.accuracy],
        ),
    ];
    for (metric, parts) in weights {
        let sum: f64 = parts.iter().sum();
        let usable = parts.iter().all(|w| w.is_finite() && *w >= 0.0);
        if !usable || (sum - 1.0).abs() > TOLERANCE {
            return Err(ProfileError::BlendWeights {
                profile: profile(),
                metric,
                sum,
            });
        }
    }

    spec.wpm_curve
        .check()
        .map_err(|reason| ProfileError::WpmCurve {
            profile: profile(),
            reason,
        })?;
    spec.completeness_gate
        .check()
        .map_err(|reason| ProfileError::Gate {
            profile: profile(),
            reason,
        })?;

    if !(spec.pass_percentage.is_finite() && (0.0..=100.0).contains(&spec.pass_percentage)) {
        return Err(ProfileError::PassPercentage {
            profile: profile(),
            value: spec.pass_percentage,
        });
    }

    let mut previous = f64::INFINITY;
    for band in &spec.summary.bands {
        if !(0.0..=100.0).contains(&band.min_percentage) {
            return Err(ProfileError::SummaryBands {
                profile: profile(),
                reason: format!("threshold {} is outside 0..=100", band.min_percentage),
            });
        }
        if band.min_percentage >= previous {
            return Err(ProfileError::SummaryBands {
                profile: profile(),
                reason: "thresholds must be strictly descending".into(),
            });
        }
        previous = band.min_percentage;
    }

    Ok(())
}
