//! Inference endpoint integration.
//!
//! A provider abstraction over the model-serving endpoint plus the retry
//! policy the evaluator applies to each call.

pub(crate) mod openai;
pub(crate) mod provider;
pub(crate) mod retry;

pub use openai::ChatCompletionsProvider;
pub use provider::{
    resolve_env_var, ImageInput, InferenceProvider, InferenceRequest, InferenceResponse,
};
pub use retry::{backoff_duration, is_retryable};
