//! The `recitescore history` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use recitescore_core::config::load_config_from;
use recitescore_core::history::{
    AttemptComparison, AttemptRecord, HistorySummary, JsonFileRecorder,
};
use recitescore_core::traits::AttemptRecorder;

#[derive(Serialize)]
struct HistoryView {
    user_id: String,
    exercise_id: String,
    attempts: Vec<AttemptRecord>,
    best_attempt: Option<String>,
    summary: HistorySummary,
    latest_change: Option<AttemptComparison>,
}

pub async fn execute(
    user: String,
    exercise: String,
    file: Option<PathBuf>,
    format: String,
    config: Option<PathBuf>,
) -> Result<()> {
    let path = match file {
        Some(path) => path,
        None => load_config_from(config.as_deref())?.history_file,
    };
    let recorder = JsonFileRecorder::new(&path);

    let attempts = recorder.attempts(&user, &exercise).await?;
    let best = recorder.best_attempt(&user, &exercise).await?;
    let summary = recorder.summary(&user, &exercise).await?;
    let latest_change = match attempts.as_slice() {
        [.., earlier, later] => Some(AttemptComparison::between(earlier, later)),
        _ => None,
    };

    match format.as_str() {
        "json" => {
            let view = HistoryView {
                user_id: user,
                exercise_id: exercise,
                best_attempt: best.map(|b| b.id.to_string()),
                attempts,
                summary,
                latest_change,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        "text" => {
            if attempts.is_empty() {
                println!("No attempts recorded for {user}/{exercise} in {}.", path.display());
                return Ok(());
            }
            print_attempts(&attempts, best.as_ref());
            print_summary(&summary, latest_change.as_ref());
        }
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}

fn print_attempts(attempts: &[AttemptRecord], best: Option<&AttemptRecord>) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Recorded", "Profile", "Overall", "Percentage", "Passed", ""]);
    for (i, attempt) in attempts.iter().enumerate() {
        let score = &attempt.outcome.score;
        let marker = if best.is_some_and(|b| b.id == attempt.id) {
            "best"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(attempt.recorded_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(score.profile.name()),
            Cell::new(format!("{} / {}", score.overall, score.max_possible())),
            Cell::new(format!("{}%", score.percentage)),
            Cell::new(if score.passed { "yes" } else { "no" }),
            Cell::new(marker),
        ]);
    }
    println!("{table}");
}

fn print_summary(summary: &HistorySummary, latest_change: Option<&AttemptComparison>) {
    println!(
        "\n{} attempt(s), {} passed",
        summary.attempts, summary.passed
    );
    if let (Some(best), Some(avg), Some(latest)) = (
        summary.best_percentage,
        summary.average_percentage,
        summary.latest_percentage,
    ) {
        println!("Best: {best}%  Average: {avg:.1}%  Latest: {latest}%");
    }

    if let Some(change) = latest_change {
        let direction = if change.improved() {
            "improved"
        } else if change.overall_delta < 0.0 {
            "dropped"
        } else {
            "unchanged"
        };
        println!(
            "Since the previous attempt: {direction} ({:+} points)",
            change.overall_delta
        );
        for (metric, delta) in &change.metric_deltas {
            if *delta != 0.0 {
                println!("  {metric}: {delta:+}");
            }
        }
    }
}
