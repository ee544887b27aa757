//! Thyro Core - balanced datasets and evaluation for thyroid ultrasound classifiers.
//!
//! Two independent pipelines share one labeling rule and one prompt set:
//!
//! ```text
//! Dataset:  Images → Label → Stratified sample → Shuffle → Training records (JSON)
//! Evaluate: Images → Inference endpoint → Predictions → Confusion matrix + report (JSON)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use thyro_core::{Config, DatasetGenerator, ImageDiscovery, LabelRule, RecordFormat};
//!
//! let config = Config::load()?;
//! let rule = LabelRule::from_config(&config.labels);
//! let generator = DatasetGenerator::new(config.prompt_set()?, rule)?;
//! let files = ImageDiscovery::from_config(&config.dataset).discover("./trainset".as_ref())?;
//! let dataset = generator.generate(&files, RecordFormat::Sft, &mut rand::thread_rng());
//! ```

pub mod config;
pub mod dataset;
pub mod discovery;
pub mod error;
pub mod evaluate;
pub mod files;
pub mod inference;
pub mod label;
pub mod metrics;
pub mod output;
pub mod prompts;

pub use config::Config;
pub use dataset::{BalancedDataset, DatasetGenerator, RecordFormat, TrainingRecord};
pub use discovery::ImageDiscovery;
pub use error::{ConfigError, PipelineError, PipelineResult, Result, ThyroError};
pub use evaluate::{EvalOptions, EvaluationReport, Evaluator, Prediction};
pub use files::FileOpSummary;
pub use inference::{ChatCompletionsProvider, InferenceProvider};
pub use label::{Label, LabelRule};
pub use metrics::{ClassificationReport, ConfusionMatrix, Metrics};
pub use prompts::PromptSet;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
