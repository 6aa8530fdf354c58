//! secstudy CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "secstudy",
    version,
    about = "AI tutoring assistant for learning cybersecurity"
)]
struct Cli {
    /// Config file path (defaults to secstudy.toml, then ~/.config/secstudy/)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive tutoring session
    Chat,

    /// Explain a security topic in beginner terms
    Explain {
        /// Topic to explain (e.g. "phishing")
        #[arg(required = true)]
        topic: Vec<String>,
    },

    /// Generate and take a practice quiz
    Quiz {
        /// Topic to be quizzed on
        #[arg(required = true)]
        topic: Vec<String>,

        /// Number of questions (clamped to 1-10)
        #[arg(long, default_value_t = 5)]
        count: u32,
    },

    /// Show study progress and recommendations
    Progress,

    /// Create a starter secstudy.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("secstudy=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Chat => commands::chat::execute(config_path).await,
        Commands::Explain { topic } => {
            commands::explain::execute(config_path, &topic.join(" ")).await
        }
        Commands::Quiz { topic, count } => {
            commands::quiz::execute(config_path, &topic.join(" "), count).await
        }
        Commands::Progress => commands::progress::execute(config_path),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
