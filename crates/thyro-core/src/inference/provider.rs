//! Inference provider trait and request/response types.

use async_trait::async_trait;
use base64::Engine;
use std::path::Path;

use crate::error::PipelineError;
use crate::prompts::PromptSet;

/// Base64-encoded image ready to send to an inference API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and a file extension.
    pub fn from_bytes(bytes: &[u8], extension: &str) -> Self {
        let media_type = match extension.to_lowercase().as_str() {
            "png" => "image/png",
            "jpeg" | "jpg" => "image/jpeg",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            other => {
                tracing::warn!("Unknown image extension '{other}', defaulting to image/png");
                "image/png"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Read and encode an image file. The handle is closed before returning.
    pub async fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::ImageRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        Ok(Self::from_bytes(&bytes, extension))
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A single classification request.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub image: ImageInput,
    /// Diagnostic instructions and output contract
    pub system_prompt: String,
    /// User question accompanying the image
    pub question: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl InferenceRequest {
    /// Build the fixed diagnostic request for an image.
    pub fn diagnose(
        image: ImageInput,
        prompts: &PromptSet,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            image,
            system_prompt: prompts.system.clone(),
            question: prompts.evaluation_question.clone(),
            max_tokens,
            temperature,
        }
    }
}

/// Raw model output for one request.
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    /// Generated text, unmodified
    pub text: String,
    /// Model identifier reported by the endpoint
    pub model: String,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all inference backends implement.
///
/// Uses `async_trait` so the evaluator can hold a `Box<dyn InferenceProvider>`.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Send one request and return the model's raw text.
    async fn classify(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, PipelineError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
