//! Flood Runtime - Modeling engine for the flood vulnerability pipeline
//!
//! This crate turns tile-month records into ranked vulnerability scores:
//! feature table construction, temporal feature derivation, the
//! chronological split, model selection, scoring and evaluation.

pub mod error;
pub mod evaluation;
pub mod inference;
pub mod matrix;
pub mod metrics;
pub mod model;
pub mod split;
pub mod table;
pub mod temporal;
pub mod trainer;

// Re-export main types
pub use error::{Result, RuntimeError};
pub use evaluation::{evaluate_scores, historical_event_proxy, EvaluationReport, MonthlyScore};
pub use inference::{average_rank_descending, normalize_scores, score_rows};
pub use matrix::design_matrix;
pub use metrics::{mean_absolute_error, r2_score, RegressionMetrics};
pub use model::{BoostingParams, EarlyStopping, ForestParams, ModelSpec, Regressor, RidgeParams};
pub use split::{
    assign_partitions, chronological_split, ChronologicalSplit, Partition, PartitionCutoffs, SplitBoundaries,
    SplitConfig,
};
pub use table::{FeatureTable, FeatureTableBuilder};
pub use temporal::{derive_temporal_rows, inference_frame, training_frame, DerivedRow};
pub use trainer::{
    CandidateScore, FeatureImportance, ModelPaths, SplitInfo, TemporalMetrics, TemporalTrainer,
    TrainArtifacts, TrainerConfig, TrainingReport, DEFAULT_SEED, DEFAULT_TOP_IMPORTANCES,
};
