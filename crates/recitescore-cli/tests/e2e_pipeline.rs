//! End-to-end pipeline tests through the public engine API.
//!
//! These tests drive tokenize → align → match → metrics → aggregate →
//! feedback with realistic readings and check the observable outcome.

use recitescore_core::metrics::{CompletenessGate, Metric, WpmCurve};
use recitescore_core::parser::parse_profile;
use recitescore_core::profile::{Allotment, Blends, ProfileSpec, SummaryBands};
use recitescore_core::{
    CandidateTranscript, EvaluationEngine, EvaluationOutcome, EvaluationRequest, ProfileError,
    ReferenceText, ScaleProfile, TimingInfo,
};

const FOX: &str = "the quick brown fox jumps over the lazy dog";

fn evaluate(
    reference: &str,
    candidate: &str,
    timing: TimingInfo,
    profile: ScaleProfile,
) -> EvaluationOutcome {
    EvaluationEngine::default().evaluate(&EvaluationRequest {
        reference: ReferenceText::new(reference),
        candidate: CandidateTranscript::new(candidate),
        timing,
        profile,
    })
}

fn diag_f64(outcome: &EvaluationOutcome, metric: Metric, key: &str) -> f64 {
    outcome
        .score
        .sub_score(metric)
        .and_then(|s| s.diagnostic(key))
        .and_then(|v| v.as_f64())
        .unwrap()
}

/// Fifty words with the given fillers spliced in place of plain words.
fn fifty_words(fillers: &[&str]) -> String {
    let mut words: Vec<&str> = "we walked along the river and talked about the weather"
        .split_whitespace()
        .cycle()
        .take(50)
        .collect();
    for (i, filler) in fillers.iter().enumerate() {
        words[5 + i * 15] = filler;
    }
    words.join(" ")
}

// --- Scenario A: a perfect reading ---

#[test]
fn identical_reading_is_perfect() {
    let outcome = evaluate(FOX, FOX, TimingInfo::new(4.5), ScaleProfile::weighted_100());
    let accuracy = outcome.score.sub_score(Metric::Accuracy).unwrap();

    assert_eq!(diag_f64(&outcome, Metric::Accuracy, "correct_words"), 9.0);
    assert_eq!(diag_f64(&outcome, Metric::Accuracy, "wer"), 0.0);
    assert_eq!(diag_f64(&outcome, Metric::Accuracy, "cer"), 0.0);
    assert_eq!(accuracy.raw, accuracy.max);
    assert!(outcome.feedback.improvements.is_empty());
}

#[test]
fn normalization_ignores_case_and_punctuation() {
    let outcome = evaluate(
        FOX,
        "The QUICK brown fox -- jumps over the lazy dog!",
        TimingInfo::new(4.5),
        ScaleProfile::weighted_100(),
    );
    assert_eq!(diag_f64(&outcome, Metric::Accuracy, "wer"), 0.0);
    assert_eq!(diag_f64(&outcome, Metric::Accuracy, "correct_words"), 9.0);
}

// --- Scenario B: partial reading against a 30 second duration goal ---

#[test]
fn partial_reading_below_duration_gate() {
    let outcome = evaluate(
        FOX,
        "the quick brown fox",
        TimingInfo::new(15.0),
        ScaleProfile::pass_fail_9(),
    );
    let completeness = outcome.score.sub_score(Metric::Completeness).unwrap();

    assert!((diag_f64(&outcome, Metric::Completeness, "coverage") - 4.0 / 9.0).abs() < 1e-12);
    // round(15 / 30 * 5) = round(2.5) = 3
    assert_eq!(completeness.raw, 3.0);
    assert_eq!(outcome.score.overall, 6.0);
    assert!(outcome.score.percentage < outcome.score.profile.pass_percentage());
    assert!(!outcome.score.passed);
    assert!(outcome.feedback.improvements.iter().any(|i| i
        == "Duration: keep speaking for at least 30 seconds; you spoke for 15 seconds."));
}

#[test]
fn expected_duration_overrides_gate() {
    let outcome = evaluate(
        FOX,
        FOX,
        TimingInfo::new(20.0).with_expected(20.0),
        ScaleProfile::pass_fail_9(),
    );
    assert_eq!(outcome.score.sub_score(Metric::Completeness).unwrap().raw, 5.0);
    assert_eq!(diag_f64(&outcome, Metric::Completeness, "gate_seconds"), 20.0);
}

// --- Scenario C: fillers ---

#[test]
fn fillers_lower_fluency() {
    let reference = fifty_words(&[]);
    let with_fillers = fifty_words(&["um", "like", "uh"]);
    // 50 words in 25 seconds = 120 WPM for both
    let timing = TimingInfo::new(25.0);

    let filled = evaluate(&reference, &with_fillers, timing, ScaleProfile::weighted_100());
    let clean = evaluate(&reference, &reference, timing, ScaleProfile::weighted_100());

    assert_eq!(diag_f64(&filled, Metric::Fluency, "filler_count"), 3.0);
    assert!((diag_f64(&filled, Metric::Fluency, "filler_penalty") - 0.3).abs() < 1e-12);
    assert_eq!(
        diag_f64(&filled, Metric::Fluency, "wpm"),
        diag_f64(&clean, Metric::Fluency, "wpm")
    );
    assert!(
        filled.score.sub_score(Metric::Fluency).unwrap().raw
            < clean.score.sub_score(Metric::Fluency).unwrap().raw
    );
}

// --- Edge cases ---

#[test]
fn empty_candidate_earns_nothing() {
    for profile in ScaleProfile::builtins() {
        let outcome = evaluate(FOX, "", TimingInfo::new(10.0), profile);
        assert_eq!(outcome.score.overall, 0.0);
        assert_eq!(outcome.score.percentage, 0.0);
        assert_eq!(diag_f64(&outcome, Metric::Completeness, "coverage"), 0.0);
        assert_eq!(outcome.feedback.strengths.len(), 0);
    }
}

#[test]
fn empty_reference_does_not_panic() {
    let outcome = evaluate("", "some words here", TimingInfo::new(5.0), ScaleProfile::weighted_100());
    assert_eq!(outcome.score.sub_score(Metric::Accuracy).unwrap().raw, 0.0);
    for (_, sub) in outcome.score.in_profile_order() {
        assert_eq!(sub.raw, 0.0);
    }
    assert_eq!(outcome.score.overall, 0.0);
    assert!(!outcome.score.passed);

    // Only the attempt point survives when there is nothing to read.
    let outcome = evaluate("", "some words here", TimingInfo::new(5.0), ScaleProfile::pass_fail_9());
    assert_eq!(outcome.score.overall, 1.0);
    assert_eq!(outcome.score.sub_score(Metric::Attempt).unwrap().raw, 1.0);
}

#[test]
fn missing_timing_is_estimated() {
    for timing in [TimingInfo::default(), TimingInfo::new(f64::NAN)] {
        let outcome = evaluate(FOX, FOX, timing, ScaleProfile::weighted_100());
        let fluency = outcome.score.sub_score(Metric::Fluency).unwrap();
        assert_eq!(
            fluency.diagnostic("timing").and_then(|v| v.as_str()),
            Some("estimated")
        );
        assert_eq!(diag_f64(&outcome, Metric::Fluency, "duration_secs"), 60.0);
        let prosody = outcome.score.sub_score(Metric::Prosody).unwrap();
        assert_eq!(
            prosody.diagnostic("timing").and_then(|v| v.as_str()),
            Some("estimated")
        );
        assert_eq!(diag_f64(&outcome, Metric::Prosody, "duration_secs"), 60.0);
    }
}

#[test]
fn pathological_candidate_stays_clamped() {
    let noise = "supercalifragilistic ".repeat(300);
    let outcome = evaluate(FOX, &noise, TimingInfo::new(0.5), ScaleProfile::speaking_100());
    for (_, sub) in outcome.score.in_profile_order() {
        assert!(sub.raw >= 0.0 && sub.raw <= sub.max);
    }
    assert!((0.0..=100.0).contains(&outcome.score.percentage));
}

#[test]
fn prosody_is_labelled_an_approximation() {
    let outcome = evaluate(FOX, FOX, TimingInfo::new(4.5), ScaleProfile::weighted_100());
    let prosody = outcome.score.sub_score(Metric::Prosody).unwrap();
    assert_eq!(
        prosody.diagnostic("approximation").and_then(|v| v.as_bool()),
        Some(true)
    );
}

// --- Determinism ---

#[test]
fn identical_inputs_give_identical_outcomes() {
    let reference = "Mary had a little lamb. Its fleece was white as snow; and everywhere that Mary went, the lamb was sure to go.";
    let candidate = "mary had a litle lamb um its fleece was white as snow and everywhere mary went the lamb was sure to go";

    let first = evaluate(reference, candidate, TimingInfo::new(9.0), ScaleProfile::speaking_100());
    let second = evaluate(reference, candidate, TimingInfo::new(9.0), ScaleProfile::speaking_100());

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn outcome_survives_json() {
    let outcome = evaluate(FOX, "the quick brown fox", TimingInfo::new(15.0), ScaleProfile::pass_fail_9());
    let json = serde_json::to_string(&outcome).unwrap();
    let back: EvaluationOutcome = serde_json::from_str(&json).unwrap();
    assert_eq!(back.feedback, outcome.feedback);
    assert_eq!(back.score.profile, outcome.score.profile);
    assert_eq!(back.score.overall, outcome.score.overall);
}

#[test]
fn long_talk_without_reading_misses_the_duration_points() {
    let outcome = evaluate(FOX, "the", TimingInfo::new(60.0), ScaleProfile::pass_fail_9());
    let completeness = outcome.score.sub_score(Metric::Completeness).unwrap();
    assert_eq!(
        completeness.diagnostic("full_credit").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert!(completeness.raw < completeness.max);
    assert!(outcome
        .feedback
        .strengths
        .contains(&"Duration: you read 1 of 9 words.".to_string()));
}

// --- Profiles ---

#[test]
fn malformed_profile_fails_before_scoring() {
    let spec = ProfileSpec {
        name: "nine-ish".into(),
        description: String::new(),
        overall_max: 9.0,
        pass_percentage: 70.0,
        allotments: vec![
            Allotment::new(Metric::Completeness, 5.0),
            Allotment::new(Metric::Attempt, 1.0),
            Allotment::new(Metric::Pronunciation, 1.0),
        ],
        blends: Blends::default(),
        wpm_curve: WpmCurve::default(),
        completeness_gate: CompletenessGate::None,
        summary: SummaryBands::default(),
    };
    assert_eq!(
        ScaleProfile::new(spec).unwrap_err(),
        ProfileError::MaximumMismatch {
            profile: "nine-ish".into(),
            declared: 9.0,
            allotted: 7.0,
        }
    );
}

#[test]
fn repository_profiles_score_end_to_end() {
    let dictation = parse_profile("../../profiles/dictation.toml".as_ref()).unwrap();
    let outcome = evaluate(FOX, "the quick brown fox jumps over the lazy dog", TimingInfo::default(), dictation);
    assert_eq!(outcome.score.overall, 20.0);
    assert!(outcome.feedback.strengths[0].starts_with("Spelling: "));

    let speaking = parse_profile("../../profiles/speaking-task.toml".as_ref()).unwrap();
    let outcome = evaluate(FOX, "the quick brown fox", TimingInfo::new(20.0), speaking);
    assert!(!outcome.score.passed);
    assert!(outcome.feedback.improvements[0].contains("at least 45 seconds"));
}
