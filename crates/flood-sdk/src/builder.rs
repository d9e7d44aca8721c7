//! Builder pattern for FloodPipeline

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::{EvaluationPipeline, FeatureBuildPipeline, InferencePipeline, TrainingPipeline};
use flood_runtime::{EvaluationReport, ModelSpec, SplitConfig, TrainerConfig, TrainingReport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Builder for FloodPipeline
///
/// # Example
///
/// ```rust,ignore
/// use flood_sdk::PipelineBuilder;
///
/// let pipeline = PipelineBuilder::new()
///     .with_project_root("/srv/flood")
///     .with_city("bengaluru")
///     .with_seed(42)
///     .build()?;
///
/// let summary = pipeline.run_all()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.project_root = root.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.config.city = city.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Number of importances kept in the training metrics record
    pub fn with_top_n_importances(mut self, top_n: usize) -> Self {
        self.config.top_n_importances = top_n;
        self
    }

    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.config.split = split;
        self
    }

    pub fn with_trainer_config(mut self, trainer: TrainerConfig) -> Self {
        self.config.trainer = trainer;
        self
    }

    /// Replace the candidate grid, keeping the baseline settings
    pub fn with_candidates(mut self, candidates: Vec<ModelSpec>) -> Self {
        self.config.trainer.candidates = candidates;
        self
    }

    /// Validate the configuration and build the pipeline
    pub fn build(self) -> Result<FloodPipeline> {
        self.config.validate()?;
        Ok(FloodPipeline {
            config: self.config,
        })
    }
}

/// Outputs of a full pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub dataset_path: PathBuf,
    pub training: TrainingReport,
    pub scores_path: PathBuf,
    pub evaluation: EvaluationReport,
}

/// A configured pipeline; every stage can also be run on its own
#[derive(Debug, Clone)]
pub struct FloodPipeline {
    config: PipelineConfig,
}

impl FloodPipeline {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn build_features(&self) -> Result<PathBuf> {
        FeatureBuildPipeline::new(&self.config).run()
    }

    pub fn train(&self) -> Result<TrainingReport> {
        TrainingPipeline::new(&self.config).run()
    }

    pub fn infer(&self) -> Result<PathBuf> {
        InferencePipeline::new(&self.config).run()
    }

    pub fn evaluate(&self) -> Result<EvaluationReport> {
        EvaluationPipeline::new(&self.config).run()
    }

    /// Feature build, training, inference and evaluation in order
    pub fn run_all(&self) -> Result<RunSummary> {
        info!(
            "Running full pipeline for '{}' under {}",
            self.config.city,
            self.config.project_root.display()
        );
        let dataset_path = self.build_features()?;
        let training = self.train()?;
        let scores_path = self.infer()?;
        let evaluation = self.evaluate()?;
        Ok(RunSummary {
            dataset_path,
            training,
            scores_path,
            evaluation,
        })
    }
}
