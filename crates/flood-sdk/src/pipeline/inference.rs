//! Feature dataset + temporal model → scored table

use super::load_dataset;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::storage;
use flood_runtime::{inference_frame, score_rows, Regressor};
use std::path::PathBuf;
use tracing::info;

pub struct InferencePipeline<'a> {
    config: &'a PipelineConfig,
}

impl<'a> InferencePipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<PathBuf> {
        let model_path = self.config.temporal_model_path();
        storage::require(&self.config.dataset_path(), "Dataset")?;
        storage::require(&model_path, "Trained model")?;

        let table = load_dataset(self.config)?;
        let model: Regressor = storage::read_json(&model_path)?;
        let rows = inference_frame(table.records())?;
        let scored = score_rows(&model, &rows)?;

        let out_path = self.config.scores_path();
        storage::write_records(&out_path, &scored)?;
        info!(
            "Wrote {} vulnerability scores to {}",
            scored.len(),
            out_path.display()
        );
        Ok(out_path)
    }
}
