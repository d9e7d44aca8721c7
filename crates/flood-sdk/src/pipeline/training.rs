//! Feature dataset → models and training metrics

use super::load_dataset;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::storage;
use flood_runtime::{ModelPaths, TemporalTrainer, TrainingReport};
use tracing::info;

pub struct TrainingPipeline<'a> {
    config: &'a PipelineConfig,
}

impl<'a> TrainingPipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<TrainingReport> {
        let table = load_dataset(self.config)?;
        let trainer = TemporalTrainer::new(self.config.trainer.clone())
            .with_split(self.config.split)
            .with_seed(self.config.seed);
        let artifacts = trainer.fit(&table)?;

        let baseline_path = self.config.baseline_model_path();
        let temporal_path = self.config.temporal_model_path();
        storage::write_json(&baseline_path, &artifacts.baseline_model)?;
        storage::write_json(&temporal_path, &artifacts.temporal_model)?;

        let report = artifacts.report(
            self.config.top_n_importances,
            ModelPaths {
                baseline: baseline_path.display().to_string(),
                temporal: temporal_path.display().to_string(),
            },
        );
        storage::write_json(&self.config.training_metrics_path(), &report)?;
        storage::write_json(&self.config.feature_importance_path(), &artifacts.feature_importance)?;

        info!(
            "Training complete: selected {} (test MAE {:.6}, baseline {:.6}); metrics at {}",
            report.selected_temporal_model_name,
            report.temporal.mae,
            report.baseline.mae,
            self.config.training_metrics_path().display()
        );
        Ok(report)
    }
}
