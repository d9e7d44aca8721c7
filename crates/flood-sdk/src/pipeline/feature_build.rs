//! Processed frames → feature dataset

use crate::config::PipelineConfig;
use crate::error::{Result, SdkError};
use crate::storage;
use flood_core::TileMonthRecord;
use flood_runtime::FeatureTableBuilder;
use std::path::PathBuf;
use tracing::info;

pub struct FeatureBuildPipeline<'a> {
    config: &'a PipelineConfig,
}

impl<'a> FeatureBuildPipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Concatenate every processed frame of the city into the dataset
    pub fn run(&self) -> Result<PathBuf> {
        let processed = self.config.processed_dir();
        let files = storage::list_csv_files(&processed)?;
        if files.is_empty() {
            return Err(SdkError::MissingArtifact {
                kind: "Processed CSV frames",
                path: processed,
            });
        }

        let mut builder = FeatureTableBuilder::new();
        for file in &files {
            let frame: Vec<TileMonthRecord> = storage::read_records(file)?;
            builder = builder.add_frame(frame);
        }
        let table = builder.build()?;

        let out_path = self.config.dataset_path();
        storage::write_records(&out_path, table.records())?;
        info!(
            "Feature dataset created at {} ({} records, {} tiles, {} frames)",
            out_path.display(),
            table.len(),
            table.tile_count(),
            files.len()
        );
        Ok(out_path)
    }
}
