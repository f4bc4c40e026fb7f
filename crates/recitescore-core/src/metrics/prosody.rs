//! Prosody approximation.
//!
//! There is no audio signal behind this metric. It is a fixed blend of the
//! fluency and accuracy measurements and is always labelled as an
//! approximation in diagnostics.

use serde::{Deserialize, Serialize};

use crate::metrics::accuracy::{self, AccuracyBlend};
use crate::metrics::fluency::{self, FluencyBlend, WpmCurve};
use crate::metrics::{points, Diagnostics, MetricInput, MetricScore};

/// Weights of the fluency and accuracy ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProsodyBlend {
    #[serde(default = "default_fluency")]
    pub fluency: f64,
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,
}

fn default_fluency() -> f64 {
    0.6
}
fn default_accuracy() -> f64 {
    0.4
}

impl Default for ProsodyBlend {
    fn default() -> Self {
        Self {
            fluency: default_fluency(),
            accuracy: default_accuracy(),
        }
    }
}

impl ProsodyBlend {
    pub fn sum(&self) -> f64 {
        self.fluency + self.accuracy
    }
}

/// Blends every prosody input depends on.
#[derive(Debug, Clone, Copy)]
pub struct ProsodySources<'a> {
    pub accuracy: &'a AccuracyBlend,
    pub fluency: &'a FluencyBlend,
    pub curve: &'a WpmCurve,
}

pub fn prosody(
    input: &MetricInput<'_>,
    blend: &ProsodyBlend,
    sources: ProsodySources<'_>,
    max: f64,
) -> MetricScore {
    let fluency_ratio = fluency::blend_value(input, sources.fluency, sources.curve);
    let accuracy_ratio = accuracy::blend_value(input, sources.accuracy);

    let mut diagnostics = Diagnostics::new();
    diagnostics.insert("approximation".into(), true.into());
    diagnostics.insert(
        "source".into(),
        "derived from fluency and accuracy, not measured from audio".into(),
    );
    diagnostics.insert("fluency_ratio".into(), fluency_ratio.into());
    diagnostics.insert("accuracy_ratio".into(), accuracy_ratio.into());
    input.timing.annotate(&mut diagnostics);

    if input.candidate.is_empty() || input.reference.is_empty() {
        return MetricScore::zero(max, diagnostics);
    }
    let raw = points(
        fluency_ratio * blend.fluency + accuracy_ratio * blend.accuracy,
        max,
    );
    MetricScore::new(raw, max, diagnostics)
}
