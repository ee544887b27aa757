//! Error types for dataset generation and evaluation.
//!
//! Errors are grouped by where they originate so that the CLI can tell a
//! misconfiguration (fatal, nothing written) apart from a per-image failure
//! (recorded and skipped).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for thyro operations.
#[derive(Error, Debug)]
pub enum ThyroError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while scanning, scoring, or persisting.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input directory does not exist or is not a directory
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// An image could not be read from disk
    #[error("Failed to read image {path}: {message}")]
    ImageRead { path: PathBuf, message: String },

    /// The inference endpoint failed or returned an unusable payload
    #[error("Inference error: {message}")]
    Inference {
        message: String,
        status_code: Option<u16>,
    },

    /// The endpoint could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// An inference call exceeded its deadline
    #[error("Timeout calling inference endpoint for {path} after {timeout_ms}ms")]
    Timeout { path: PathBuf, timeout_ms: u64 },

    /// A model response could not be turned into a label
    #[error("Unparseable classification: {0}")]
    Classification(String),

    /// An input record file is malformed
    #[error("Malformed records in {path}: {message}")]
    Records { path: PathBuf, message: String },

    /// An output file or directory could not be written
    #[error("Failed to write {path}: {message}")]
    Output { path: PathBuf, message: String },

    /// A written file failed to re-parse
    #[error("Output verification failed for {path}: {message}")]
    Verification { path: PathBuf, message: String },
}

/// Convenience type alias for thyro results.
pub type Result<T> = std::result::Result<T, ThyroError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
