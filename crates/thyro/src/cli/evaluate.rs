//! The `thyro evaluate` command: score images against a served model.

use clap::Args;
use std::path::PathBuf;

use thyro_core::{
    ChatCompletionsProvider, Config, EvalOptions, EvaluationReport, Evaluator, ImageDiscovery,
    LabelRule,
};

/// Arguments for the `evaluate` command.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory containing the test images
    #[arg(long, required = true)]
    pub image_dir: PathBuf,

    /// Number of images to evaluate (first N in sorted order)
    #[arg(long, required = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,

    /// Where to write predictions and metrics
    #[arg(short, long, default_value = "evaluation_results.json")]
    pub output: PathBuf,

    /// Inference API base URL (overrides config)
    #[arg(long, env = "THYRO_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Model name (overrides config)
    #[arg(long)]
    pub model: Option<String>,

    /// API key (overrides config)
    #[arg(long, env = "THYRO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Execute the evaluate command.
pub async fn execute(args: EvaluateArgs, mut config: Config) -> anyhow::Result<()> {
    if !args.image_dir.is_dir() {
        anyhow::bail!(
            "Image directory does not exist: {:?}\n\n  Hint: Check the path and try again.",
            args.image_dir
        );
    }

    if let Some(endpoint) = args.endpoint {
        config.inference.endpoint = endpoint;
    }
    if let Some(model) = args.model {
        config.inference.model = model;
    }
    if let Some(key) = args.api_key {
        config.inference.api_key = key;
    }

    let mut images = ImageDiscovery::from_config(&config.dataset).discover(&args.image_dir)?;
    images.truncate(args.limit as usize);
    if images.is_empty() {
        tracing::warn!("No images found in {:?}", args.image_dir);
    }

    let provider = ChatCompletionsProvider::from_config(&config.inference);
    tracing::info!(
        "Sending requests to {} (model {})",
        provider.endpoint(),
        config.inference.model
    );

    let evaluator = Evaluator::new(
        Box::new(provider),
        config.prompt_set()?,
        LabelRule::from_config(&config.labels),
        EvalOptions::from_config(&config.inference),
    );

    let progress = create_progress_bar(images.len() as u64);
    let mut failed = 0u64;
    let predictions = evaluator
        .run(&images, |prediction| {
            if !prediction.success {
                failed += 1;
            }
            progress.inc(1);
            progress.set_message(format!("{failed} failed"));
        })
        .await;
    progress.finish_and_clear();

    let report = EvaluationReport::from_predictions(predictions);
    if let Err(e) = report.write(&args.output) {
        anyhow::bail!("Error writing results: {e}");
    }

    println!("\n{}", report.metrics.summary());
    println!(
        "Results file written and verified successfully: {}",
        args.output.display()
    );
    tracing::info!(
        "{} of {} requests succeeded, {} scored",
        report.succeeded(),
        report.predictions.len(),
        report.metrics.total_samples
    );

    Ok(())
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}
