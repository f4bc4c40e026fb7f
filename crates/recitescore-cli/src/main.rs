//! recitescore CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "recitescore",
    version,
    about = "Score reading and speaking responses against a reference text"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a transcript against a reference text
    Evaluate {
        /// Reference text, or @path to read it from a file
        #[arg(long)]
        reference: String,

        /// Candidate transcript, or @path to read it from a file
        #[arg(long)]
        candidate: String,

        /// Measured duration of the attempt in seconds
        #[arg(long)]
        duration: Option<f64>,

        /// Expected duration in seconds (overrides a profile's duration gate)
        #[arg(long)]
        expected_duration: Option<f64>,

        /// Profile name (built-in or from profiles_dir) or path to a profile TOML
        #[arg(long)]
        profile: Option<String>,

        /// Near-match rule: prefix-edit, jaro-winkler
        #[arg(long, default_value = "prefix-edit")]
        similarity: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Append the outcome to the attempt history
        #[arg(long)]
        record: bool,

        /// User the attempt is recorded for
        #[arg(long, default_value = "anonymous")]
        user: String,

        /// Exercise the attempt is recorded for
        #[arg(long, default_value = "default")]
        exercise: String,

        /// History file (defaults to the configured history_file)
        #[arg(long)]
        history_file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate scale profile TOML files
    Validate {
        /// Path to profile file or directory
        #[arg(long)]
        profile: PathBuf,
    },

    /// List available scale profiles
    Profiles {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show recorded attempts for a user and exercise
    History {
        /// User to show attempts for
        #[arg(long)]
        user: String,

        /// Exercise to show attempts for
        #[arg(long, default_value = "default")]
        exercise: String,

        /// History file (defaults to the configured history_file)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example profile
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("recitescore=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            reference,
            candidate,
            duration,
            expected_duration,
            profile,
            similarity,
            format,
            record,
            user,
            exercise,
            history_file,
            config,
        } => {
            commands::evaluate::execute(commands::evaluate::EvaluateArgs {
                reference,
                candidate,
                duration,
                expected_duration,
                profile,
                similarity,
                format,
                record,
                user,
                exercise,
                history_file,
                config,
            })
            .await
        }
        Commands::Validate { profile } => commands::validate::execute(profile),
        Commands::Profiles { config } => commands::profiles::execute(config),
        Commands::History {
            user,
            exercise,
            file,
            format,
            config,
        } => commands::history::execute(user, exercise, file, format, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
