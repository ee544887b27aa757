//! Sequential evaluation of images against an inference endpoint.
//!
//! Each image is sent on its own, one after another. A failed call never
//! aborts the run: it is recorded as an unsuccessful [`Prediction`] and the
//! loop moves on. Scoring happens afterwards in [`crate::metrics`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::InferenceConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::inference::{retry, ImageInput, InferenceProvider, InferenceRequest};
use crate::label::{Label, LabelRule};
use crate::metrics::Metrics;
use crate::output;
use crate::prompts::PromptSet;

/// Raw outcome for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub image_path: String,
    pub true_label: Label,
    /// Model text verbatim, or `Error: ...` when the call failed
    pub model_response: String,
    pub success: bool,
}

/// The persisted result of an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub predictions: Vec<Prediction>,
    pub metrics: Metrics,
}

impl EvaluationReport {
    pub fn from_predictions(predictions: Vec<Prediction>) -> Self {
        let metrics = Metrics::from_predictions(&predictions);
        Self {
            predictions,
            metrics,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.predictions.iter().filter(|p| p.success).count()
    }

    /// Write the report as pretty JSON and confirm it parses back.
    pub fn write(&self, path: &Path) -> PipelineResult<()> {
        output::write_json_pretty(path, self).map_err(|e| PipelineError::Output {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        output::verify_json_file(path)
    }
}

/// Call settings for the evaluator.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum retries per image
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self::from_config(&InferenceConfig::default())
    }
}

impl EvalOptions {
    pub fn from_config(config: &InferenceConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_ms: config.timeout_ms,
            retry_attempts: config.retry_attempts,
            retry_delay_ms: config.retry_delay_ms,
        }
    }
}

/// Scores images one at a time against a provider.
pub struct Evaluator {
    provider: Box<dyn InferenceProvider>,
    prompts: PromptSet,
    rule: LabelRule,
    options: EvalOptions,
}

impl Evaluator {
    pub fn new(
        provider: Box<dyn InferenceProvider>,
        prompts: PromptSet,
        rule: LabelRule,
        options: EvalOptions,
    ) -> Self {
        Self {
            provider,
            prompts,
            rule,
            options,
        }
    }

    /// Evaluate `images` in order, calling `on_result` after each one.
    pub async fn run<F>(&self, images: &[PathBuf], mut on_result: F) -> Vec<Prediction>
    where
        F: FnMut(&Prediction),
    {
        tracing::info!(
            "Evaluating {} images with provider '{}' (model: {})",
            images.len(),
            self.provider.name(),
            self.provider.model()
        );

        let mut predictions = Vec::with_capacity(images.len());
        for path in images {
            let prediction = self.evaluate_one(path).await;
            if prediction.success {
                tracing::debug!("{}: {}", prediction.image_path, prediction.model_response);
            } else {
                tracing::error!(
                    "Error processing {}: {}",
                    prediction.image_path,
                    prediction.model_response
                );
            }
            on_result(&prediction);
            predictions.push(prediction);
        }
        predictions
    }

    /// Evaluate a single image. Never fails: errors become an unsuccessful
    /// prediction.
    pub async fn evaluate_one(&self, path: &Path) -> Prediction {
        let true_label = self.rule.classify(path);
        let image_path = path.to_string_lossy().into_owned();

        match self.infer(path).await {
            Ok(text) => Prediction {
                image_path,
                true_label,
                model_response: text,
                success: true,
            },
            Err(e) => Prediction {
                image_path,
                true_label,
                model_response: format!("Error: {e}"),
                success: false,
            },
        }
    }

    async fn infer(&self, path: &Path) -> PipelineResult<String> {
        let image = ImageInput::from_path(path).await?;
        let request = InferenceRequest::diagnose(
            image,
            &self.prompts,
            self.options.max_tokens,
            self.options.temperature,
        );

        let mut last_error = None;
        for attempt in 0..=self.options.retry_attempts {
            if attempt > 0 {
                let delay = retry::backoff_duration(attempt - 1, self.options.retry_delay_ms);
                tracing::debug!(
                    "Retry {attempt}/{} for {:?} after {delay:?}",
                    self.options.retry_attempts,
                    path
                );
                tokio::time::sleep(delay).await;
            }

            let err = match tokio::time::timeout(
                Duration::from_millis(self.options.timeout_ms),
                self.provider.classify(&request),
            )
            .await
            {
                Ok(Ok(response)) => return Ok(response.text),
                Ok(Err(e)) => e,
                Err(_) => PipelineError::Timeout {
                    path: path.to_path_buf(),
                    timeout_ms: self.options.timeout_ms,
                },
            };

            let retryable = retry::is_retryable(&err);
            last_error = Some(err);
            if !retryable {
                break;
            }
        }

        Err(last_error.unwrap_or_else(|| PipelineError::Inference {
            message: "no attempts made".to_string(),
            status_code: None,
        }))
    }
}
