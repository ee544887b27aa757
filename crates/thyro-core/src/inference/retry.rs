//! Retry policy for transient inference failures.

use crate::error::PipelineError;
use std::time::Duration;

/// Determine whether an inference error is worth retrying.
///
/// Retryable: timeouts, rate limits (429), server errors (5xx), connection
/// failures. Not retryable: auth failures, bad requests, malformed replies,
/// unreadable images.
pub fn is_retryable(error: &PipelineError) -> bool {
    match error {
        PipelineError::Timeout { .. } | PipelineError::Connection(_) => true,
        PipelineError::Inference {
            status_code: Some(code),
            ..
        } => *code == 429 || (500..=599).contains(code),
        _ => false,
    }
}

/// Exponential backoff: `base_delay * 2^attempt`, capped at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}
