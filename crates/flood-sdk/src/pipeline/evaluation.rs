//! Scored table → evaluation record

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::storage;
use flood_core::ScoredRow;
use flood_runtime::{evaluate_scores, EvaluationReport};

pub struct EvaluationPipeline<'a> {
    config: &'a PipelineConfig,
}

impl<'a> EvaluationPipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<EvaluationReport> {
        let scores_path = self.config.scores_path();
        storage::require(&scores_path, "Scores")?;

        let scores: Vec<ScoredRow> = storage::read_records(&scores_path)?;
        let report = evaluate_scores(&scores)?;
        storage::write_json(&self.config.evaluation_path(), &report)?;
        Ok(report)
    }
}
