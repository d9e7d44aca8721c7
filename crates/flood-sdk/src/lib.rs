//! Flood Pipeline SDK
//!
//! High-level API for building the feature dataset, training, scoring and
//! evaluating urban flood vulnerability models on disk.

pub mod builder;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod storage;

// Re-export main types
pub use builder::{FloodPipeline, PipelineBuilder, RunSummary};
pub use config::PipelineConfig;
pub use error::{Result, SdkError};
pub use pipeline::{EvaluationPipeline, FeatureBuildPipeline, InferencePipeline, TrainingPipeline};

// Re-export commonly used types from dependencies
pub use flood_core::{ScoredRow, TileMonthRecord};
pub use flood_runtime::{
    EvaluationReport, ModelSpec, SplitConfig, TrainerConfig, TrainingReport,
};
