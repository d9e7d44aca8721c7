//! Runtime error types

use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Not enough distinct time buckets for a chronological split
    #[error("Not enough months to create train/validation/test chronological split: {found} distinct buckets, {required} required")]
    InsufficientHistory { found: usize, required: usize },

    /// A split partition came out empty
    #[error("Chronological split produced an empty {partition} partition")]
    EmptyPartition { partition: &'static str },

    /// No input rows
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Duplicate (tile, year, month) key in the feature table
    #[error("Duplicate record for tile '{tile_id}' at {year}-{month:02}")]
    DuplicateRecord { tile_id: String, year: i32, month: u32 },

    /// Matrix / vector dimensions disagree
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// NaN or infinite values in a model's training matrix or targets
    #[error("{0} training data contains non-finite values")]
    NonFiniteInput(&'static str),

    /// Fitting on zero rows
    #[error("Cannot fit {0} on an empty dataset")]
    EmptyInput(&'static str),

    /// The ridge normal equations could not be solved
    #[error("Singular linear system")]
    SingularSystem,

    /// Invalid model hyperparameters
    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),

    /// Core error
    #[error(transparent)]
    Core(#[from] flood_core::CoreError),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_history_display() {
        let err = RuntimeError::InsufficientHistory { found: 20, required: 24 };
        let msg = err.to_string();
        assert!(msg.contains("Not enough months"));
        assert!(msg.contains("20"));
    }

    #[test]
    fn test_empty_partition_display() {
        let err = RuntimeError::EmptyPartition { partition: "train" };
        assert_eq!(err.to_string(), "Chronological split produced an empty train partition");
    }

    #[test]
    fn test_non_finite_input_display() {
        let err = RuntimeError::NonFiniteInput("hist_gbrt");
        assert_eq!(err.to_string(), "hist_gbrt training data contains non-finite values");
    }

    #[test]
    fn test_core_error_conversion() {
        let err: RuntimeError = flood_core::CoreError::InvalidMonth(13).into();
        assert_eq!(err.to_string(), "Invalid month: 13");
    }
}
