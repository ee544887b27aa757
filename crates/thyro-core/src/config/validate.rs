//! Configuration validation with range checks.

use crate::dataset::RecordFormat;
use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.labels.marker.is_empty() {
            return Err(ConfigError::ValidationError(
                "labels.marker must not be empty".into(),
            ));
        }
        if self.dataset.extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "dataset.extensions must list at least one extension".into(),
            ));
        }
        if RecordFormat::parse(&self.dataset.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "dataset.format must be one of sft, dpo, legacy (got '{}')",
                self.dataset.format
            )));
        }
        if self.inference.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "inference.max_tokens must be > 0".into(),
            ));
        }
        if self.inference.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "inference.timeout_ms must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.inference.temperature) {
            return Err(ConfigError::ValidationError(
                "inference.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        Ok(())
    }
}
