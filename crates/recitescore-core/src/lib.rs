//! recitescore-core: response evaluation engine.
//!
//! Scores a learner's transcript against a reference text: token alignment,
//! word matching, per-metric calculators, scale-profile aggregation, and
//! deterministic feedback. Attempt history and configuration live here too
//! so that every front end shares one implementation.

pub mod aggregate;
pub mod alignment;
pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod history;
pub mod matcher;
pub mod metrics;
pub mod model;
pub mod parser;
pub mod profile;
pub mod text;
pub mod traits;

pub use aggregate::CompositeScore;
pub use engine::{EvaluationEngine, EvaluationEngineConfig};
pub use error::{HistoryError, ProfileError};
pub use feedback::Feedback;
pub use metrics::{Metric, MetricScore};
pub use model::{CandidateTranscript, EvaluationOutcome, EvaluationRequest, ReferenceText, TimingInfo};
pub use profile::ScaleProfile;
