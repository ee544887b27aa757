//! The `thyro dataset` command: balanced generation and re-balancing.

use clap::{Args, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

use thyro_core::dataset::rebalance_records;
use thyro_core::{output, Config, DatasetGenerator, ImageDiscovery, LabelRule, RecordFormat};

use super::make_rng;

/// Arguments for the `dataset` command.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    #[command(subcommand)]
    pub command: DatasetCommand,
}

#[derive(Subcommand, Debug)]
pub enum DatasetCommand {
    /// Build a class-balanced training dataset from an image directory
    Generate(GenerateArgs),

    /// Downsample an existing record file with `output` classifications
    Rebalance(RebalanceArgs),
}

/// Record shape to emit.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// Supervised pair with system prompt
    Sft,
    /// Preference pair (chosen / rejected)
    Dpo,
    /// Role/content messages
    Legacy,
}

impl From<FormatArg> for RecordFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Sft => RecordFormat::Sft,
            FormatArg::Dpo => RecordFormat::Dpo,
            FormatArg::Legacy => RecordFormat::Legacy,
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory containing the labeled images
    #[arg(long, required = true)]
    pub image_dir: PathBuf,

    /// Directory to save the output JSON file
    #[arg(long, required = true)]
    pub output_dir: PathBuf,

    /// Name of the output JSON file (default depends on the format)
    #[arg(long)]
    pub output_name: Option<String>,

    /// Record shape (defaults to `dataset.format` from config)
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Random seed for reproducible sampling and shuffling
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RebalanceArgs {
    /// Input JSON array of records
    #[arg(long, required = true)]
    pub input: PathBuf,

    /// Where to write the balanced records
    #[arg(long, required = true)]
    pub output: PathBuf,

    /// Random seed for reproducible sampling and shuffling
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Execute the dataset command.
pub fn execute(args: DatasetArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        DatasetCommand::Generate(args) => generate(args, config),
        DatasetCommand::Rebalance(args) => rebalance(args),
    }
}

fn generate(args: GenerateArgs, config: &Config) -> anyhow::Result<()> {
    if !args.image_dir.is_dir() {
        anyhow::bail!(
            "Image directory does not exist: {:?}\n\n  Hint: Check the path and try again.",
            args.image_dir
        );
    }

    // Validated on load, so the fallback only covers hand-built configs.
    let format = args
        .format
        .map(RecordFormat::from)
        .or_else(|| RecordFormat::parse(&config.dataset.format))
        .unwrap_or(RecordFormat::Sft);

    let generator =
        DatasetGenerator::new(config.prompt_set()?, LabelRule::from_config(&config.labels))?;
    let files = ImageDiscovery::from_config(&config.dataset).discover(&args.image_dir)?;
    let mut rng = make_rng(args.seed);

    let dataset = generator.generate(&files, format, &mut rng);

    let output_name = args
        .output_name
        .unwrap_or_else(|| format.default_output_name().to_string());
    let output_path = args.output_dir.join(output_name);
    dataset.write(&output_path)?;

    let (normal, diseased) = generator.class_counts(&dataset.records);
    tracing::info!(
        "Wrote {} {} records to {:?}",
        dataset.len(),
        format.as_str(),
        output_path
    );
    println!("Dataset saved to: {}", output_path.display());
    println!("Samples per class: {}", dataset.per_class);
    println!("Total samples: {}", dataset.len());
    println!("Normal samples: {normal}");
    println!("Diseased samples: {diseased}");

    Ok(())
}

fn rebalance(args: RebalanceArgs) -> anyhow::Result<()> {
    let items: Vec<Value> = output::read_json(&args.input)?;
    let mut rng = make_rng(args.seed);

    let (balanced, stats) = rebalance_records(items, &mut rng);
    output::write_json_pretty(&args.output, &balanced)?;

    println!("Original dataset:");
    println!("Normal: {}", stats.normal_before);
    println!("Diseased: {}", stats.diseased_before);
    if stats.skipped > 0 {
        println!("Skipped (no classification): {}", stats.skipped);
    }
    println!("\nBalanced dataset:");
    println!("Normal: {}", stats.per_class);
    println!("Diseased: {}", stats.per_class);
    println!("Total samples: {}", balanced.len());
    println!("Saved to: {}", args.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use thyro_core::TrainingRecord;

    fn touch(dir: &std::path::Path, name: &str) {
        std::fs::write(dir.join(name), b"png").unwrap();
    }

    #[test]
    fn test_generate_writes_balanced_file() {
        let images = tempfile::tempdir().unwrap();
        for i in 0..3 {
            touch(images.path(), &format!("A{i}-P0_1.png"));
        }
        for i in 0..7 {
            touch(images.path(), &format!("B{i}-P2_1.png"));
        }
        touch(images.path(), "notes.txt");
        let out = tempfile::tempdir().unwrap();

        let args = GenerateArgs {
            image_dir: images.path().to_path_buf(),
            output_dir: out.path().join("data"),
            output_name: None,
            format: Some(FormatArg::Dpo),
            seed: Some(42),
        };
        generate(args, &Config::default()).unwrap();

        let path = out.path().join("data").join("thyroid_dpo.json");
        let records: Vec<TrainingRecord> = output::read_json(&path).unwrap();
        assert_eq!(records.len(), 6);
        assert!(records
            .iter()
            .all(|r| matches!(r, TrainingRecord::Preference(_))));
    }

    #[test]
    fn test_generate_missing_directory_fails() {
        let out = tempfile::tempdir().unwrap();
        let args = GenerateArgs {
            image_dir: PathBuf::from("/nonexistent/images"),
            output_dir: out.path().to_path_buf(),
            output_name: Some("x.json".to_string()),
            format: None,
            seed: None,
        };
        assert!(generate(args, &Config::default()).is_err());
        assert!(!out.path().join("x.json").exists());
    }

    #[test]
    fn test_rebalance_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let items: Vec<Value> = (0..5)
            .map(|i| {
                let class = if i < 2 { "normal" } else { "diseased" };
                serde_json::json!({ "output": format!("{{\"classification\": \"{class}\"}}") })
            })
            .collect();
        output::write_json_pretty(&input, &items).unwrap();

        let out = dir.path().join("out.json");
        rebalance(RebalanceArgs {
            input,
            output: out.clone(),
            seed: Some(3),
        })
        .unwrap();

        let balanced: Vec<Value> = output::read_json(&out).unwrap();
        assert_eq!(balanced.len(), 4);
    }
}
