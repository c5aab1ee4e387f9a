//! rehearse CLI: interview practice from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use rehearse_core::model::QuestionKind;

mod commands;

#[derive(Parser)]
#[command(
    name = "rehearse",
    version,
    about = "Practice technical interview questions generated by an LLM"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer generated questions interactively and track mastery
    Practice {
        /// First topic to practise (e.g. "Rust ownership")
        #[arg(long)]
        topic: String,

        /// Questions per round (default: question_count from config)
        #[arg(long)]
        count: Option<u32>,

        /// Question kind: mcq or theory
        #[arg(long, default_value = "theory")]
        kind: QuestionKind,

        /// Model as provider/model (e.g. "ollama/llama3.1:8b")
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for the saved session (default: output_dir from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Session output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Ask the model for a study plan at the end
        #[arg(long)]
        analyze: bool,
    },

    /// Generate one batch of questions and print them as JSON
    Generate {
        #[arg(long)]
        topic: String,

        #[arg(long)]
        count: Option<u32>,

        /// Question kind: mcq or theory
        #[arg(long, default_value = "theory")]
        kind: QuestionKind,

        /// Model as provider/model
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Extract questions from a saved model response (no network)
    Extract {
        /// File holding the raw response, or "-" for stdin
        #[arg(long)]
        input: PathBuf,

        /// Question kind: mcq or theory
        #[arg(long)]
        kind: QuestionKind,
    },

    /// Render a saved session
    Report {
        /// Session JSON written by `rehearse practice`
        #[arg(long)]
        session: PathBuf,

        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter rehearse.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rehearse=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Practice {
            topic,
            count,
            kind,
            model,
            config,
            output,
            format,
            analyze,
        } => {
            commands::practice::execute(topic, count, kind, model, config, output, format, analyze)
                .await
        }
        Commands::Generate {
            topic,
            count,
            kind,
            model,
            config,
        } => commands::generate::execute(topic, count, kind, model, config).await,
        Commands::Extract { input, kind } => commands::extract::execute(input, kind),
        Commands::Report {
            session,
            format,
            output,
        } => commands::report::execute(session, format, output),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
