//! Score aggregation under a scale profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metrics::{Diagnostics, Metric, MetricScore};
use crate::profile::ScaleProfile;

/// The combined result of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    /// One entry per metric the profile allots points to.
    pub sub_scores: BTreeMap<Metric, MetricScore>,
    /// Sum of sub-score raws.
    pub overall: f64,
    /// `overall / overall_max * 100`, rounded and clamped to `[0, 100]`.
    pub percentage: f64,
    /// Whether `percentage` reaches the profile's pass threshold.
    pub passed: bool,
    pub profile: ScaleProfile,
}

impl CompositeScore {
    pub fn sub_score(&self, metric: Metric) -> Option<&MetricScore> {
        self.sub_scores.get(&metric)
    }

    /// Sub-scores in the order the profile declares its allotments.
    pub fn in_profile_order(&self) -> impl Iterator<Item = (Metric, &MetricScore)> {
        self.profile
            .allotments()
            .iter()
            .filter_map(|a| self.sub_scores.get(&a.metric).map(|s| (a.metric, s)))
    }

    pub fn max_possible(&self) -> f64 {
        self.profile.overall_max()
    }
}

/// Combine computed sub-scores into a composite score.
///
/// Each sub-score is re-bounded by the points its allotment grants. Metrics
/// the profile allots but that were not computed count as zero; computed
/// metrics the profile does not allot are dropped.
pub fn aggregate(profile: &ScaleProfile, computed: BTreeMap<Metric, MetricScore>) -> CompositeScore {
    let mut computed = computed;
    let mut sub_scores = BTreeMap::new();

    for allotment in profile.allotments() {
        let score = match computed.remove(&allotment.metric) {
            Some(score) => MetricScore::new(score.raw, allotment.points, score.diagnostics),
            None => MetricScore::zero(allotment.points, Diagnostics::new()),
        };
        sub_scores.insert(allotment.metric, score);
    }

    let overall: f64 = sub_scores.values().map(|s| s.raw).sum();
    let percentage = percentage_of(overall, profile.overall_max());

    CompositeScore {
        sub_scores,
        overall,
        percentage,
        passed: percentage >= profile.pass_percentage(),
        profile: profile.clone(),
    }
}

fn percentage_of(overall: f64, max: f64) -> f64 {
    if max <= 0.0 || !overall.is_finite() {
        return 0.0;
    }
    (overall / max * 100.0).round().clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(raw: f64, max: f64) -> MetricScore {
        MetricScore::new(raw, max, Diagnostics::new())
    }

    #[test]
    fn sums_and_rounds_percentage() {
        let profile = ScaleProfile::pass_fail_9();
        let computed = BTreeMap::from([
            (Metric::Completeness, score(3.0, 5.0)),
            (Metric::Attempt, score(1.0, 1.0)),
            (Metric::Pronunciation, score(1.0, 1.0)),
            (Metric::Accuracy, score(1.0, 1.0)),
            (Metric::Fluency, score(0.0, 1.0)),
        ]);
        let composite = aggregate(&profile, computed);
        assert_eq!(composite.overall, 6.0);
        // 6 / 9 = 66.67%
        assert_eq!(composite.percentage, 67.0);
        assert!(!composite.passed);
    }

    #[test]
    fn missing_metrics_count_as_zero() {
        let profile = ScaleProfile::weighted_100();
        let computed = BTreeMap::from([(Metric::Accuracy, score(30.0, 30.0))]);
        let composite = aggregate(&profile, computed);
        assert_eq!(composite.sub_scores.len(), 5);
        assert_eq!(composite.sub_score(Metric::Prosody).unwrap().raw, 0.0);
        assert_eq!(composite.overall, 30.0);
        assert_eq!(composite.percentage, 30.0);
    }

    #[test]
    fn sub_scores_are_bounded_by_allotment() {
        let profile = ScaleProfile::weighted_100();
        let computed = BTreeMap::from([
            (Metric::Accuracy, score(80.0, 80.0)),
            (Metric::Attempt, score(1.0, 1.0)),
        ]);
        let composite = aggregate(&profile, computed);
        assert_eq!(composite.sub_score(Metric::Accuracy).unwrap().raw, 30.0);
        assert!(composite.sub_score(Metric::Attempt).is_none());
        assert!(composite.percentage <= 100.0);
    }

    #[test]
    fn profile_order_is_preserved() {
        let profile = ScaleProfile::pass_fail_9();
        let composite = aggregate(&profile, BTreeMap::new());
        let order: Vec<Metric> = composite.in_profile_order().map(|(m, _)| m).collect();
        assert_eq!(
            order,
            vec![
                Metric::Completeness,
                Metric::Attempt,
                Metric::Pronunciation,
                Metric::Accuracy,
                Metric::Fluency,
            ]
        );
        assert_eq!(composite.percentage, 0.0);
    }

    #[test]
    fn passed_at_threshold() {
        let profile = ScaleProfile::weighted_100();
        let computed = BTreeMap::from([
            (Metric::Accuracy, score(30.0, 30.0)),
            (Metric::Fluency, score(30.0, 30.0)),
        ]);
        let composite = aggregate(&profile, computed);
        assert_eq!(composite.percentage, 60.0);
        assert!(composite.passed);
    }
}
