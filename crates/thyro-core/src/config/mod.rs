//! Configuration management for thyro.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file is fine.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::prompts::PromptSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset generation settings
    pub dataset: DatasetConfig,

    /// Label derivation settings
    pub labels: LabelConfig,

    /// Inference endpoint settings
    pub inference: InferenceConfig,

    /// Prompt set settings
    pub prompts: PromptConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.thyro.thyro/config.toml
    /// - Linux: ~/.config/thyro/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\thyro\config\config.toml
    ///
    /// Falls back to ~/.thyro/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "thyro", "thyro")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".thyro").join("config.toml")
            })
    }

    /// Resolved prompt file path (with ~ expansion), if one is configured.
    pub fn prompt_file(&self) -> Option<PathBuf> {
        if self.prompts.file.trim().is_empty() {
            return None;
        }
        let expanded = shellexpand::tilde(&self.prompts.file);
        Some(PathBuf::from(expanded.into_owned()))
    }

    /// Load the configured prompt set, or the built-in one.
    pub fn prompt_set(&self) -> Result<PromptSet, ConfigError> {
        match self.prompt_file() {
            Some(path) => PromptSet::load_from(&path),
            None => Ok(PromptSet::default()),
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.labels.marker, "-P0");
        assert_eq!(config.dataset.extensions, vec!["png".to_string()]);
        assert_eq!(config.inference.max_tokens, 1000);
        assert!(config.prompt_file().is_none());
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[labels]"));
        assert!(toml.contains("[inference]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[labels]\nmarker = \"-N_\"\n\n[inference]\nmodel = \"local\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.labels.marker, "-N_");
        assert!(!config.labels.case_sensitive);
        assert_eq!(config.inference.model, "local");
        assert_eq!(config.inference.timeout_ms, 60_000);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[labels]\nmarker = \"\"").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("labels.marker"));
    }

    #[test]
    fn test_prompt_set_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.toml");
        std::fs::write(
            &path,
            r#"
system = "Classify the image."
evaluation_question = "Is it normal?"

[[languages]]
code = "en"
questions = ["Is it normal?"]
answers = { diseased = "sick", normal = "not sick" }
"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.prompts.file = path.to_string_lossy().into_owned();
        let prompts = config.prompt_set().unwrap();
        assert_eq!(prompts.system, "Classify the image.");
        assert_eq!(prompts.languages.len(), 1);
    }
}
