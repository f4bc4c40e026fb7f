//! Attempt history.
//!
//! Ordered per-user, per-exercise records of evaluation outcomes, with best
//! attempt selection, summaries, attempt-to-attempt comparison, and JSON
//! persistence. The engine never touches any of this; callers record
//! outcomes after scoring.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::HistoryError;
use crate::metrics::Metric;
use crate::model::EvaluationOutcome;
use crate::traits::AttemptRecorder;

/// One recorded attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: Uuid,
    pub user_id: String,
    pub exercise_id: String,
    pub recorded_at: DateTime<Utc>,
    pub outcome: EvaluationOutcome,
}

impl AttemptRecord {
    pub fn new(user_id: &str, exercise_id: &str, outcome: EvaluationOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            exercise_id: exercise_id.to_string(),
            recorded_at: Utc::now(),
            outcome,
        }
    }

    pub fn overall(&self) -> f64 {
        self.outcome.score.overall
    }

    pub fn percentage(&self) -> f64 {
        self.outcome.score.percentage
    }

    fn belongs_to(&self, user_id: &str, exercise_id: &str) -> bool {
        self.user_id == user_id && self.exercise_id == exercise_id
    }
}

/// The record with the highest overall score. The earliest record wins ties.
pub fn best_of<'a, I>(records: I) -> Option<&'a AttemptRecord>
where
    I: IntoIterator<Item = &'a AttemptRecord>,
{
    let mut best: Option<&AttemptRecord> = None;
    for record in records {
        match best {
            Some(current) if record.overall() <= current.overall() => {}
            _ => best = Some(record),
        }
    }
    best
}

/// Summary statistics over a sequence of attempts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistorySummary {
    pub attempts: usize,
    pub passed: usize,
    pub best_percentage: Option<f64>,
    pub average_percentage: Option<f64>,
    pub latest_percentage: Option<f64>,
}

impl HistorySummary {
    /// Summarize attempts given oldest first.
    pub fn from_attempts<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AttemptRecord>,
    {
        let percentages: Vec<(f64, bool)> = records
            .into_iter()
            .map(|r| (r.percentage(), r.outcome.score.passed))
            .collect();
        if percentages.is_empty() {
            return Self::default();
        }

        let attempts = percentages.len();
        let total: f64 = percentages.iter().map(|(p, _)| p).sum();
        Self {
            attempts,
            passed: percentages.iter().filter(|(_, passed)| *passed).count(),
            best_percentage: percentages.iter().map(|(p, _)| *p).reduce(f64::max),
            average_percentage: Some(total / attempts as f64),
            latest_percentage: percentages.last().map(|(p, _)| *p),
        }
    }
}

/// Change between two attempts at the same exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptComparison {
    pub earlier: Uuid,
    pub later: Uuid,
    pub overall_delta: f64,
    pub percentage_delta: f64,
    /// Raw sub-score change per metric; a metric missing on one side counts as 0 there.
    pub metric_deltas: BTreeMap<Metric, f64>,
}

impl AttemptComparison {
    pub fn between(earlier: &AttemptRecord, later: &AttemptRecord) -> Self {
        let before = &earlier.outcome.score.sub_scores;
        let after = &later.outcome.score.sub_scores;

        let mut metric_deltas = BTreeMap::new();
        for metric in before.keys().chain(after.keys()) {
            let old = before.get(metric).map_or(0.0, |s| s.raw);
            let new = after.get(metric).map_or(0.0, |s| s.raw);
            metric_deltas.insert(*metric, new - old);
        }

        Self {
            earlier: earlier.id,
            later: later.id,
            overall_delta: later.overall() - earlier.overall(),
            percentage_delta: later.percentage() - earlier.percentage(),
            metric_deltas,
        }
    }

    pub fn improved(&self) -> bool {
        self.overall_delta > 0.0
    }
}

/// All recorded attempts, oldest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttemptHistory {
    #[serde(default)]
    pub records: Vec<AttemptRecord>,
}

impl AttemptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: AttemptRecord) {
        self.records.push(record);
    }

    /// Attempts of one user at one exercise, oldest first.
    pub fn attempts_for(&self, user_id: &str, exercise_id: &str) -> Vec<&AttemptRecord> {
        self.records
            .iter()
            .filter(|r| r.belongs_to(user_id, exercise_id))
            .collect()
    }

    pub fn best_attempt(&self, user_id: &str, exercise_id: &str) -> Option<&AttemptRecord> {
        best_of(self.attempts_for(user_id, exercise_id))
    }

    pub fn summary(&self, user_id: &str, exercise_id: &str) -> HistorySummary {
        HistorySummary::from_attempts(self.attempts_for(user_id, exercise_id))
    }

    /// Compare the two most recent attempts, if there are two.
    pub fn latest_change(&self, user_id: &str, exercise_id: &str) -> Option<AttemptComparison> {
        match self.attempts_for(user_id, exercise_id).as_slice() {
            [.., earlier, later] => Some(AttemptComparison::between(earlier, later)),
            _ => None,
        }
    }

    /// Save the history as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(self).map_err(HistoryError::Serialize)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| HistoryError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| HistoryError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a history from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, HistoryError> {
        let content = std::fs::read_to_string(path).map_err(|source| HistoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    /// Load a history, treating a missing file as empty.
    pub fn load_or_default(path: &Path) -> Result<Self, HistoryError> {
        if path.exists() {
            Self::load_json(path)
        } else {
            Ok(Self::default())
        }
    }

    fn from_json(content: &str, path: &Path) -> Result<Self, HistoryError> {
        serde_json::from_str(content).map_err(|source| HistoryError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Recorders
// ---------------------------------------------------------------------------

/// Recorder that keeps attempts in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    history: Mutex<AttemptHistory>,
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub async fn snapshot(&self) -> AttemptHistory {
        self.history.lock().await.clone()
    }
}

#[async_trait]
impl AttemptRecorder for InMemoryRecorder {
    async fn append(&self, record: AttemptRecord) -> Result<()> {
        tracing::info!(
            user = %record.user_id,
            exercise = %record.exercise_id,
            overall = record.overall(),
            "recorded attempt"
        );
        self.history.lock().await.record(record);
        Ok(())
    }

    async fn attempts(&self, user_id: &str, exercise_id: &str) -> Result<Vec<AttemptRecord>> {
        Ok(self
            .history
            .lock()
            .await
            .attempts_for(user_id, exercise_id)
            .into_iter()
            .cloned()
            .collect())
    }
}

/// Recorder backed by a JSON file, rewritten on every append.
#[derive(Debug)]
pub struct JsonFileRecorder {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<AttemptHistory> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(AttemptHistory::from_json(&content, &self.path)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AttemptHistory::default()),
            Err(source) => Err(HistoryError::Read {
                path: self.path.clone(),
                source,
            }
            .into()),
        }
    }
}

#[async_trait]
impl AttemptRecorder for JsonFileRecorder {
    async fn append(&self, record: AttemptRecord) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut history = self.read().await?;
        tracing::info!(
            user = %record.user_id,
            exercise = %record.exercise_id,
            overall = record.overall(),
            path = %self.path.display(),
            "recorded attempt"
        );
        history.record(record);

        let json = serde_json::to_string_pretty(&history).map_err(HistoryError::Serialize)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| HistoryError::Write {
                    path: self.path.clone(),
                    source,
                })?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| HistoryError::Write {
                path: self.path.clone(),
                source,
            })
            .with_context(|| format!("failed to append attempt to {}", self.path.display()))
    }

    async fn attempts(&self, user_id: &str, exercise_id: &str) -> Result<Vec<AttemptRecord>> {
        let _guard = self.lock.lock().await;
        let history = self.read().await?;
        Ok(history
            .attempts_for(user_id, exercise_id)
            .into_iter()
            .cloned()
            .collect())
    }
}
