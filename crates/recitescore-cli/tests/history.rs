//! Attempt history persistence across recorder instances.

use std::sync::Arc;

use recitescore_core::history::{AttemptHistory, AttemptRecord, InMemoryRecorder, JsonFileRecorder};
use recitescore_core::traits::AttemptRecorder;
use recitescore_core::{
    CandidateTranscript, EvaluationEngine, EvaluationRequest, ReferenceText, ScaleProfile,
    TimingInfo,
};

const PASSAGE: &str = "Reading aloud every day builds confidence, fluency, and vocabulary.";

fn attempt(user: &str, candidate: &str, seconds: f64) -> AttemptRecord {
    let outcome = EvaluationEngine::default().evaluate(&EvaluationRequest {
        reference: ReferenceText::new(PASSAGE),
        candidate: CandidateTranscript::new(candidate),
        timing: TimingInfo::new(seconds),
        profile: ScaleProfile::weighted_100(),
    });
    AttemptRecord::new(user, "daily-reading", outcome)
}

async fn exercise_recorder(recorder: Arc<dyn AttemptRecorder>) {
    recorder
        .append(attempt("ana", "reading aloud every day builds", 4.0))
        .await
        .unwrap();
    recorder
        .append(attempt("ana", PASSAGE, 5.0))
        .await
        .unwrap();
    recorder
        .append(attempt("ana", "reading every day builds confidence", 5.0))
        .await
        .unwrap();
    recorder
        .append(attempt("ben", PASSAGE, 5.0))
        .await
        .unwrap();

    let attempts = recorder.attempts("ana", "daily-reading").await.unwrap();
    assert_eq!(attempts.len(), 3);
    assert!(attempts
        .windows(2)
        .all(|w| w[0].recorded_at <= w[1].recorded_at));

    let best = recorder
        .best_attempt("ana", "daily-reading")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(best.id, attempts[1].id);

    let summary = recorder.summary("ana", "daily-reading").await.unwrap();
    assert_eq!(summary.attempts, 3);
    assert_eq!(summary.best_percentage, Some(best.percentage()));
    assert_eq!(summary.latest_percentage, Some(attempts[2].percentage()));

    assert!(recorder
        .attempts("ana", "other-exercise")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn in_memory_recorder_tracks_attempts() {
    exercise_recorder(Arc::new(InMemoryRecorder::new())).await;
}

#[tokio::test]
async fn json_recorder_tracks_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    exercise_recorder(Arc::new(JsonFileRecorder::new(&path))).await;

    let history = AttemptHistory::load_json(&path).unwrap();
    assert_eq!(history.records.len(), 4);
    assert_eq!(history.attempts_for("ben", "daily-reading").len(), 1);
}

#[tokio::test]
async fn concurrent_appends_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let recorder = Arc::new(JsonFileRecorder::new(dir.path().join("history.json")));

    let mut handles = Vec::new();
    for i in 0..8 {
        let recorder = Arc::clone(&recorder);
        handles.push(tokio::spawn(async move {
            let user = format!("user-{i}");
            recorder.append(attempt(&user, PASSAGE, 5.0)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let history = AttemptHistory::load_json(recorder.path()).unwrap();
    assert_eq!(history.records.len(), 8);
}
