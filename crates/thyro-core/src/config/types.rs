//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Dataset generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Image extensions picked up from the input directory
    pub extensions: Vec<String>,

    /// Default record shape: "sft", "dpo" or "legacy"
    pub format: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["png".to_string()],
            format: "sft".to_string(),
        }
    }
}

/// Ground-truth labeling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Substring whose presence in a file name marks the image as normal
    pub marker: String,

    /// Match the marker with exact case
    pub case_sensitive: bool,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            marker: "-P0".to_string(),
            case_sensitive: false,
        }
    }
}

/// Inference endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name sent with each request
    pub model: String,

    /// Maximum tokens to generate per image
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Max retry attempts for transient failures
    pub retry_attempts: u32,

    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://0.0.0.0:8000/v1".to_string(),
            api_key: "${THYRO_API_KEY}".to_string(),
            model: "qwen2-vl".to_string(),
            max_tokens: 1000,
            temperature: 0.0,
            timeout_ms: 60_000,
            retry_attempts: 2,
            retry_delay_ms: 1000,
        }
    }
}

/// Prompt set location.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptConfig {
    /// Path to a TOML prompt set; empty uses the built-in prompts
    pub file: String,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
