//! Rule-based feedback from a composite score.
//!
//! Everything here is a pure function of the [`CompositeScore`]: messages
//! are chosen by thresholds and filled from sub-score diagnostics, so the
//! same score always renders the same feedback.

use serde::{Deserialize, Serialize};

use crate::aggregate::CompositeScore;
use crate::metrics::{Metric, MetricScore};
use crate::profile::Allotment;

/// Ratio at or above which a sub-score counts as a strength.
pub const STRENGTH_RATIO: f64 = 0.75;

/// Example words quoted in an improvement bullet.
const MAX_EXAMPLE_WORDS: usize = 3;

/// Learner-facing feedback for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

/// Render feedback for a composite score.
pub fn synthesize(score: &CompositeScore) -> Feedback {
    let band = score.profile.summary().message_for(score.percentage);
    let summary = format!(
        "{band} You scored {}% ({} of {} points).",
        number(score.percentage),
        number(score.overall),
        number(score.max_possible()),
    );

    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    for allotment in score.profile.allotments() {
        let Some(sub) = score.sub_score(allotment.metric) else {
            continue;
        };
        let label = capitalize(&allotment.label());
        if sub.ratio() >= STRENGTH_RATIO {
            strengths.push(format!("{label}: {}", strength(allotment, sub)));
        } else {
            improvements.push(format!("{label}: {}", improvement(allotment, sub)));
        }
    }

    Feedback {
        summary,
        strengths,
        improvements,
    }
}

fn strength(allotment: &Allotment, sub: &MetricScore) -> String {
    match allotment.metric {
        Metric::Accuracy => format!(
            "{} of {} words matched the text exactly.",
            int(sub, "correct_words"),
            int(sub, "reference_words"),
        ),
        Metric::Fluency => fluency_strength(sub),
        Metric::Pronunciation => match int(sub, "issues") {
            0 => "the difficult words came through cleanly.".to_string(),
            _ => "most difficult words came through cleanly.".to_string(),
        },
        Metric::Completeness => completeness_strength(sub),
        Metric::Prosody => {
            "natural-sounding delivery (approximate, derived from pace and accuracy).".to_string()
        }
        Metric::Attempt => "you completed the attempt.".to_string(),
    }
}

fn fluency_strength(sub: &MetricScore) -> String {
    let wpm = float(sub, "wpm");
    if wpm > 0.0 && (float(sub, "ideal_wpm_low")..=float(sub, "ideal_wpm_high")).contains(&wpm) {
        format!(
            "comfortable pace at {} words per minute.",
            number(wpm.round())
        )
    } else {
        "fluency meets the target for this exercise.".to_string()
    }
}

fn completeness_strength(sub: &MetricScore) -> String {
    let full_credit = sub.diagnostic("full_credit").and_then(|v| v.as_bool());
    match (gate(sub), sub.diagnostic("gate_seconds").and_then(|v| v.as_f64())) {
        ("minimum_duration", Some(seconds)) if full_credit == Some(true) => {
            format!("you kept going for the full {} seconds.", number(seconds))
        }
        ("time_limit", Some(seconds)) if full_credit == Some(true) => {
            format!("you finished within {} seconds.", number(seconds))
        }
        ("none", _) => "you covered the passage.".to_string(),
        _ => format!(
            "you read {} of {} words.",
            int(sub, "candidate_words"),
            int(sub, "reference_words"),
        ),
    }
}

fn improvement(allotment: &Allotment, sub: &MetricScore) -> String {
    match allotment.metric {
        Metric::Accuracy => {
            let mut message = format!(
                "follow the text more closely; {} of {} words matched exactly.",
                int(sub, "correct_words"),
                int(sub, "reference_words"),
            );
            push_examples(&mut message, "Check", &sub.diagnostic_words("problem_words"));
            message
        }
        Metric::Fluency => fluency_improvement(sub),
        Metric::Pronunciation => {
            let issues = sub.diagnostic_words("issue_words");
            if issues.is_empty() {
                "practice saying the longer words aloud.".to_string()
            } else {
                let mut message = "practice the harder words.".to_string();
                push_examples(&mut message, "Try", &issues);
                message
            }
        }
        Metric::Completeness => completeness_improvement(sub),
        Metric::Prosody => "work on rhythm and phrasing; this is an approximate measure derived from pace and accuracy.".to_string(),
        Metric::Attempt => "record or type a response to receive attempt credit.".to_string(),
    }
}

fn fluency_improvement(sub: &MetricScore) -> String {
    let measured = float(sub, "wpm");
    let wpm = number(measured.round());
    let low = number(float(sub, "ideal_wpm_low"));
    let high = number(float(sub, "ideal_wpm_high"));

    let mut parts = Vec::new();
    if measured == 0.0 {
        parts.push("say more of the text so your pace can be measured.".to_string());
    } else if measured < float(sub, "ideal_wpm_low") {
        parts.push(format!(
            "speed up a little; you read at {wpm} words per minute, aim for {low}-{high}."
        ));
    } else if measured > float(sub, "ideal_wpm_high") {
        parts.push(format!(
            "slow down a little; you read at {wpm} words per minute, aim for {low}-{high}."
        ));
    } else {
        parts.push(format!("keep your {wpm} words per minute pace steady."));
    }

    let expected = int(sub, "expected_pauses");
    let observed = int(sub, "observed_pauses");
    if observed < expected {
        parts.push(format!(
            "Pause at punctuation ({observed} of {expected} pauses)."
        ));
    }
    let fillers = int(sub, "filler_count");
    if fillers > 0 {
        parts.push(format!("Avoid filler words ({fillers} heard)."));
    }

    let mut message = parts.join(" ");
    push_estimated(&mut message, sub);
    message
}

fn completeness_improvement(sub: &MetricScore) -> String {
    let duration = number(float(sub, "duration_secs"));
    let mut message = match (gate(sub), sub.diagnostic("gate_seconds").and_then(|v| v.as_f64())) {
        ("minimum_duration", Some(seconds)) => format!(
            "keep speaking for at least {} seconds; you spoke for {duration} seconds.",
            number(seconds)
        ),
        ("time_limit", Some(seconds)) => format!(
            "cover the text within {} seconds; you read {} of {} words in {duration} seconds.",
            number(seconds),
            int(sub, "candidate_words"),
            int(sub, "reference_words"),
        ),
        _ => {
            let mut message = format!(
                "cover the whole passage; you read {} of {} words.",
                int(sub, "candidate_words"),
                int(sub, "reference_words"),
            );
            push_examples(&mut message, "Skipped", &sub.diagnostic_words("skipped"));
            message
        }
    };
    push_estimated(&mut message, sub);
    message
}

fn push_examples(message: &mut String, lead: &str, words: &[String]) {
    if words.is_empty() {
        return;
    }
    let examples: Vec<&str> = words
        .iter()
        .take(MAX_EXAMPLE_WORDS)
        .map(String::as_str)
        .collect();
    message.push_str(&format!(" {lead}: {}.", examples.join(", ")));
}

fn push_estimated(message: &mut String, sub: &MetricScore) {
    if sub.diagnostic("timing").and_then(|v| v.as_str()) == Some("estimated") {
        message.push_str(" (duration estimated)");
    }
}

fn gate(sub: &MetricScore) -> &str {
    sub.diagnostic("gate")
        .and_then(|v| v.as_str())
        .unwrap_or("none")
}

fn int(sub: &MetricScore, key: &str) -> u64 {
    sub.diagnostic(key).and_then(|v| v.as_u64()).unwrap_or(0)
}

fn float(sub: &MetricScore, key: &str) -> f64 {
    sub.diagnostic(key).and_then(|v| v.as_f64()).unwrap_or(0.0)
}

/// Whole numbers without a fraction, everything else to two places.
fn number(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{x:.0}")
    } else {
        format!("{x:.2}")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
