//! Dictamen CLI: the main entry point.
//!
//! Commands:
//! - `analyze`: Review one award document and write its Dictamen
//! - `search`: Look up gold precedents for a text
//! - `catalog`: Show the risk catalog
//! - `onboard`: Initialize config, templates and directories
//! - `doctor`: Diagnose configuration and the gold index

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod documents;
mod report;

#[derive(Parser)]
#[command(
    name = "dictamen",
    about = "Dictamen: risk review of public-procurement award documents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.dictamen/config.toml)
    #[arg(short, long, global = true, env = "DICTAMEN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Review one document from a cleaned-records JSONL file
    Analyze {
        /// JSONL with one record per line (archivo, texto_limpio, doc_id)
        #[arg(long)]
        jsonl: PathBuf,

        /// Substring of `archivo` to select the record by
        #[arg(long = "match")]
        pattern: Option<String>,

        /// Select the record by `doc_id`
        #[arg(long)]
        doc_id: Option<String>,

        /// Pick among several matches (0-based)
        #[arg(long)]
        index_pos: Option<usize>,

        /// Output directory for the report files
        #[arg(long, default_value = "outputs")]
        outdir: PathBuf,

        /// Override the planner step budget
        #[arg(long)]
        max_steps: Option<usize>,

        /// Override the initial retrieval width
        #[arg(long)]
        k: Option<usize>,
    },

    /// Search the gold precedents
    Search {
        /// Query text
        #[arg(short, long)]
        text: String,

        /// Number of precedents
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Show the active risk catalog
    Catalog,

    /// Initialize configuration and prompt templates
    Onboard,

    /// Diagnose configuration and the gold index
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Analyze {
            jsonl,
            pattern,
            doc_id,
            index_pos,
            outdir,
            max_steps,
            k,
        } => {
            commands::analyze::run(
                config,
                commands::analyze::AnalyzeArgs {
                    jsonl,
                    pattern,
                    doc_id,
                    index_pos,
                    outdir,
                    max_steps,
                    k,
                },
            )
            .await?
        }
        Commands::Search { text, k } => commands::search::run(config, text, k).await?,
        Commands::Catalog => commands::catalog::run(config).await?,
        Commands::Onboard => commands::onboard::run(config).await?,
        Commands::Doctor => commands::doctor::run(config).await?,
    }

    Ok(())
}
