//! pdgrade CLI — grade physical-design interview answers from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "pdgrade",
    version,
    about = "Heuristic grader for physical-design interview answers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade submission files
    Score {
        /// Path to a .toml submission or a directory of them
        #[arg(long)]
        submission: PathBuf,

        /// Extra TOML dictionary layered over the built-in topics
        #[arg(long)]
        dictionary: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Max concurrent submissions
        #[arg(long)]
        parallelism: Option<usize>,

        /// Fail submissions whose topic is unknown
        #[arg(long)]
        strict: bool,

        /// Output directory for json/html reports
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, markdown, html, all
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Score a single answer
    Answer {
        /// Topic, e.g. floorplanning, placement, routing
        #[arg(long)]
        topic: String,

        /// Answer text
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the answer from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Extra TOML dictionary layered over the built-in topics
        #[arg(long)]
        dictionary: Option<PathBuf>,

        /// Print the score as JSON
        #[arg(long)]
        json: bool,
    },

    /// List topics, or the terms and concepts of one topic
    Topics {
        /// Show a single topic in detail
        #[arg(long)]
        topic: Option<String>,

        /// Extra TOML dictionary layered over the built-in topics
        #[arg(long)]
        dictionary: Option<PathBuf>,
    },

    /// Validate dictionary or submission files
    Validate {
        /// Dictionary TOML file
        #[arg(long, required_unless_present = "submission")]
        dictionary: Option<PathBuf>,

        /// Submission file or directory
        #[arg(long)]
        submission: Option<PathBuf>,
    },

    /// Create starter config and example submission
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pdgrade=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            submission,
            dictionary,
            config,
            parallelism,
            strict,
            output,
            format,
        } => {
            commands::score::execute(commands::score::ScoreArgs {
                submission,
                dictionary,
                config,
                parallelism,
                strict,
                output,
                format,
            })
            .await
        }
        Commands::Answer {
            topic,
            text,
            file,
            dictionary,
            json,
        } => commands::answer::execute(topic, text, file, dictionary, json),
        Commands::Topics { topic, dictionary } => commands::topics::execute(topic, dictionary),
        Commands::Validate {
            dictionary,
            submission,
        } => commands::validate::execute(dictionary, submission),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
