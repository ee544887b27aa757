//! OpenAI-compatible Chat Completions provider.
//!
//! Works with any server exposing `/chat/completions` (vLLM, LLaMA-Factory's
//! API server, OpenAI itself). The image travels as a data URL in the user
//! message content array.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::provider::{resolve_env_var, InferenceProvider, InferenceRequest, InferenceResponse};
use crate::config::InferenceConfig;
use crate::error::PipelineError;

/// Provider speaking the Chat Completions protocol.
pub struct ChatCompletionsProvider {
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
    endpoint: String,
}

impl ChatCompletionsProvider {
    /// `base_url` is the API root, e.g. `http://localhost:8000/v1`.
    pub fn new(base_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            api_key,
            model: model.to_string(),
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Self {
        Self::new(
            &config.endpoint,
            resolve_env_var(&config.api_key),
            &config.model,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn build_body(model: &str, request: &InferenceRequest) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        messages: vec![
            ChatMessage {
                role: "system",
                content: vec![ChatContent::Text {
                    text: request.system_prompt.clone(),
                }],
            },
            ChatMessage {
                role: "user",
                content: vec![
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: request.image.data_url(),
                        },
                    },
                    ChatContent::Text {
                        text: request.question.clone(),
                    },
                ],
            },
        ],
    }
}

#[async_trait]
impl InferenceProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        "chat-completions"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn classify(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, PipelineError> {
        let start = Instant::now();
        let body = build_body(&self.model, request);

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send().await.map_err(|e| {
            let message = format!("request to {} failed: {e}", self.endpoint);
            if e.is_connect() || e.is_timeout() {
                PipelineError::Connection(message)
            } else {
                PipelineError::Inference {
                    message,
                    status_code: None,
                }
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Inference {
                message: format!("HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| PipelineError::Inference {
            message: format!("failed to parse chat completion: {e}"),
            status_code: None,
        })?;

        let text = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PipelineError::Inference {
                message: "endpoint returned no choices".to_string(),
                status_code: None,
            })?;

        Ok(InferenceResponse {
            text,
            model: chat_resp.model.unwrap_or_else(|| self.model.clone()),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
