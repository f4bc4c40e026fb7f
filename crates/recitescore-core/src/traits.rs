//! Seams between the engine and swappable collaborators.
//!
//! `WordSimilarity` decides when two words count as a near match, so that
//! string heuristics can be replaced (for example by a phonetic distance)
//! without touching the metrics. `AttemptRecorder` is the async persistence
//! boundary for evaluation outcomes; the engine itself never calls it.

use async_trait::async_trait;

use crate::history::{AttemptRecord, HistorySummary};

// ---------------------------------------------------------------------------
// Word similarity
// ---------------------------------------------------------------------------

/// Near-match rule used by the word matcher.
///
/// Implementations receive bare, lowercased tokens and must be pure.
pub trait WordSimilarity: Send + Sync {
    /// Short identifier reported in diagnostics.
    fn name(&self) -> &str;

    /// Whether `actual` is close enough to `expected` to count as a near match.
    fn is_near(&self, expected: &str, actual: &str) -> bool;
}

// ---------------------------------------------------------------------------
// Attempt recorder
// ---------------------------------------------------------------------------

/// Stores evaluation outcomes per user and exercise.
#[async_trait]
pub trait AttemptRecorder: Send + Sync {
    /// Append a record to the end of its user/exercise history.
    async fn append(&self, record: AttemptRecord) -> anyhow::Result<()>;

    /// All records for a user and exercise, oldest first.
    async fn attempts(&self, user_id: &str, exercise_id: &str)
        -> anyhow::Result<Vec<AttemptRecord>>;

    /// The attempt with the highest overall score; earliest wins ties.
    async fn best_attempt(
        &self,
        user_id: &str,
        exercise_id: &str,
    ) -> anyhow::Result<Option<AttemptRecord>> {
        let attempts = self.attempts(user_id, exercise_id).await?;
        Ok(crate::history::best_of(&attempts).cloned())
    }

    /// Summary statistics over a user's attempts at one exercise.
    async fn summary(&self, user_id: &str, exercise_id: &str) -> anyhow::Result<HistorySummary> {
        let attempts = self.attempts(user_id, exercise_id).await?;
        Ok(HistorySummary::from_attempts(&attempts))
    }
}
