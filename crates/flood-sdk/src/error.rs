//! SDK error types

use std::path::PathBuf;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A required input file or directory is absent
    #[error("{kind} not found: {}", .path.display())]
    MissingArtifact { kind: &'static str, path: PathBuf },

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] flood_runtime::RuntimeError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON read/write error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML config error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
