//! Thyro CLI - balanced dataset generation and batch evaluation for thyroid
//! ultrasound classifiers.
//!
//! # Usage
//!
//! ```bash
//! # Build a balanced supervised fine-tuning dataset
//! thyro dataset generate --image-dir ./trainset --output-dir ./data
//!
//! # Preference pairs instead
//! thyro dataset generate --image-dir ./trainset --output-dir ./data --format dpo
//!
//! # Score 10 test images against a served model
//! thyro evaluate --image-dir ./testset --limit 10 --output results.json
//!
//! # View configuration
//! thyro config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Thyro - balanced datasets and evaluation for thyroid ultrasound classifiers.
#[derive(Parser, Debug)]
#[command(name = "thyro")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "THYRO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate or re-balance training datasets
    Dataset(cli::dataset::DatasetArgs),

    /// Score images against an inference endpoint
    Evaluate(cli::evaluate::EvaluateArgs),

    /// Move or de-duplicate image files
    Files(cli::files::FilesArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // An explicit --config must load; the default location falls back to defaults.
    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match &cli.config {
        Some(path) => thyro_core::Config::load_from(path)?,
        None => match thyro_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `thyro config path`."
                );
                thyro_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Thyro v{}", thyro_core::VERSION);

    match cli.command {
        Commands::Dataset(args) => cli::dataset::execute(args, &config),
        Commands::Evaluate(args) => cli::evaluate::execute(args, config).await,
        Commands::Files(args) => cli::files::execute(args),
        Commands::Config(args) => cli::config::execute(args, &config),
    }
}
