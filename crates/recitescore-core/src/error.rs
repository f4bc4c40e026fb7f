//! Error types.
//!
//! Profile errors are configuration errors: they are raised when a
//! [`ScaleProfile`](crate::profile::ScaleProfile) is built and never while
//! scoring. History errors cover attempt persistence.

use std::path::PathBuf;

use thiserror::Error;

use crate::metrics::Metric;

/// Ways a scale profile can be malformed.
#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    /// The profile allots no metrics at all.
    #[error("profile '{profile}' allots no metrics")]
    Empty { profile: String },

    /// The declared overall maximum is zero, negative, or not finite.
    #[error("profile '{profile}' has invalid overall maximum {overall_max}")]
    InvalidMaximum { profile: String, overall_max: f64 },

    /// The per-metric maxima do not add up to the declared overall maximum.
    #[error("profile '{profile}' allots {allotted} points but declares a maximum of {declared}")]
    MaximumMismatch {
        profile: String,
        declared: f64,
        allotted: f64,
    },

    /// A metric appears more than once.
    #[error("profile '{profile}' allots {metric} more than once")]
    DuplicateMetric { profile: String, metric: Metric },

    /// A metric is allotted zero, negative, or non-finite points.
    #[error("profile '{profile}' allots {points} points to {metric}")]
    InvalidPoints {
        profile: String,
        metric: Metric,
        points: f64,
    },

    /// Internal blend weights of a metric do not sum to 1.
    #[error("profile '{profile}': {metric} blend weights sum to {sum}, expected 1")]
    BlendWeights {
        profile: String,
        metric: Metric,
        sum: f64,
    },

    /// The words-per-minute curve is not ordered.
    #[error("profile '{profile}': invalid WPM curve: {reason}")]
    WpmCurve { profile: String, reason: String },

    /// The completeness gate has an unusable limit or threshold.
    #[error("profile '{profile}': invalid completeness gate: {reason}")]
    Gate { profile: String, reason: String },

    /// The pass threshold is outside 0..=100.
    #[error("profile '{profile}': pass percentage {value} is outside 0..=100")]
    PassPercentage { profile: String, value: f64 },

    /// Summary bands are out of range or not in descending order.
    #[error("profile '{profile}': invalid summary bands: {reason}")]
    SummaryBands { profile: String, reason: String },
}

/// Errors raised while persisting or loading attempt history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read history from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write history to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl HistoryError {
    /// Returns `true` if the failure came from the filesystem rather than
    /// from the content of the history.
    pub fn is_io(&self) -> bool {
        matches!(self, HistoryError::Read { .. } | HistoryError::Write { .. })
    }
}
