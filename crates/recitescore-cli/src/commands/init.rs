//! The `recitescore init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create recitescore.toml
    if std::path::Path::new("recitescore.toml").exists() {
        println!("recitescore.toml already exists, skipping.");
    } else {
        std::fs::write("recitescore.toml", SAMPLE_CONFIG)?;
        println!("Created recitescore.toml");
    }

    // Create example profile
    std::fs::create_dir_all("profiles")?;
    let example_path = std::path::Path::new("profiles/example.toml");
    if example_path.exists() {
        println!("profiles/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_PROFILE)?;
        println!("Created profiles/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit profiles/example.toml to match your exercise");
    println!("  2. Run: recitescore validate --profile profiles");
    println!(
        "  3. Run: recitescore evaluate --profile reading-drill --reference @passage.txt --candidate @transcript.txt --duration 42"
    );

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# recitescore configuration

# Duration assumed when an attempt has no usable timing.
default_duration_secs = 60.0

# Longest token sequence (in words) aligned per attempt.
max_words = 400

# Used when --profile is not given. RECITESCORE_PROFILE overrides this.
default_profile = "weighted-100"

profiles_dir = "profiles"
history_file = "./recitescore-history.json"
"#;

const EXAMPLE_PROFILE: &str = r#"[profile]
name = "reading-drill"
description = "Read the passage aloud within one minute"
overall_max = 50
pass_percentage = 65

[[profile.allotments]]
metric = "accuracy"
points = 20

[[profile.allotments]]
metric = "fluency"
label = "pace"
points = 15

[[profile.allotments]]
metric = "completeness"
points = 10

[[profile.allotments]]
metric = "pronunciation"
points = 5

[profile.completeness_gate]
type = "time_limit"
seconds = 60
completion_threshold = 0.9

[profile.wpm_curve]
floor = 50
ideal_low = 100
ideal_high = 150
ceiling = 200

[profile.blends.fluency]
pace = 0.6
pauses = 0.2
fillers = 0.2

[[profile.summary.bands]]
min_percentage = 85
message = "Outstanding reading!"

[[profile.summary.bands]]
min_percentage = 65
message = "Nice reading."
"#;
