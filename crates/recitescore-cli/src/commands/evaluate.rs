//! The `recitescore evaluate` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use recitescore_core::config::load_config_from;
use recitescore_core::history::{AttemptRecord, JsonFileRecorder};
use recitescore_core::matcher::{JaroWinklerSimilarity, PrefixEditSimilarity};
use recitescore_core::parser::resolve_profile;
use recitescore_core::traits::{AttemptRecorder, WordSimilarity};
use recitescore_core::{
    CandidateTranscript, EvaluationEngine, EvaluationOutcome, EvaluationRequest, ReferenceText,
    TimingInfo,
};

pub struct EvaluateArgs {
    pub reference: String,
    pub candidate: String,
    pub duration: Option<f64>,
    pub expected_duration: Option<f64>,
    pub profile: Option<String>,
    pub similarity: String,
    pub format: String,
    pub record: bool,
    pub user: String,
    pub exercise: String,
    pub history_file: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: EvaluateArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let profile_name = args
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile.clone());
    let profile = resolve_profile(&profile_name, config.profiles_dir.as_deref())?;
    tracing::debug!(profile = profile.name(), similarity = %args.similarity, "resolved profile");

    let similarity: Arc<dyn WordSimilarity> = match args.similarity.as_str() {
        "prefix-edit" => Arc::new(PrefixEditSimilarity::default()),
        "jaro-winkler" => Arc::new(JaroWinklerSimilarity::default()),
        other => anyhow::bail!("unknown similarity: {other} (expected prefix-edit or jaro-winkler)"),
    };

    let request = EvaluationRequest {
        reference: ReferenceText::new(read_text_arg(&args.reference)?),
        candidate: CandidateTranscript::new(read_text_arg(&args.candidate)?),
        timing: TimingInfo {
            duration_seconds: args.duration,
            expected_duration_seconds: args.expected_duration,
        },
        profile,
    };

    let engine = EvaluationEngine::new(config.engine_config()).with_similarity(similarity);
    let outcome = engine.evaluate(&request);

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&outcome)?),
        "text" => print_outcome(&outcome),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    if args.record {
        let path = args.history_file.unwrap_or(config.history_file);
        let recorder = JsonFileRecorder::new(&path);
        let record = AttemptRecord::new(&args.user, &args.exercise, outcome);
        let id = record.id;
        recorder.append(record).await?;
        eprintln!(
            "Recorded attempt {id} for {}/{} in {}",
            args.user,
            args.exercise,
            path.display()
        );
    }

    Ok(())
}

/// `@path` reads the text from a file; anything else is the text itself.
fn read_text_arg(value: &str) -> Result<String> {
    match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read text file: {path}")),
        None => Ok(value.to_string()),
    }
}

fn print_outcome(outcome: &EvaluationOutcome) {
    use comfy_table::{Cell, Table};

    let score = &outcome.score;
    println!(
        "Profile: {} (max {})",
        score.profile.name(),
        score.max_possible()
    );

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Label", "Score", "Max", "Ratio"]);
    for allotment in score.profile.allotments() {
        let Some(sub) = score.sub_score(allotment.metric) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(allotment.metric),
            Cell::new(allotment.label()),
            Cell::new(sub.raw),
            Cell::new(sub.max),
            Cell::new(format!("{:.0}%", sub.ratio() * 100.0)),
        ]);
    }
    println!("{table}");

    println!(
        "Overall: {} / {} ({}%) {}",
        score.overall,
        score.max_possible(),
        score.percentage,
        if score.passed { "PASSED" } else { "NOT PASSED" }
    );

    let feedback = &outcome.feedback;
    println!("\n{}", feedback.summary);
    if !feedback.strengths.is_empty() {
        println!("\nStrengths:");
        for s in &feedback.strengths {
            println!("  + {s}");
        }
    }
    if !feedback.improvements.is_empty() {
        println!("\nImprovements:");
        for s in &feedback.improvements {
            println!("  - {s}");
        }
    }
}
