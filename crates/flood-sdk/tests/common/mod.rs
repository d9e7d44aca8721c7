//! Common test utilities for SDK integration tests

use flood_core::TileMonthRecord;
use flood_runtime::{BoostingParams, ForestParams, ModelSpec};
use flood_sdk::storage;
use flood_sdk::{FloodPipeline, PipelineBuilder, PipelineConfig};
use std::f64::consts::PI;
use std::path::Path;

pub const TILES: usize = 4;

/// One record per tile for the given month
pub fn frame_for(year: i32, month: u32, index: usize) -> Vec<TileMonthRecord> {
    let season = (2.0 * PI * (month as f64 - 6.0) / 12.0).sin().max(0.0);
    (0..TILES)
        .map(|t| {
            let tile = t as f64;
            let features = [
                (0.15 + 0.5 * season + 0.05 * tile).min(1.0),
                50.0 + 240.0 * season + 20.0 * tile + (index % 5) as f64,
                0.1 + 0.2 * tile,
                0.02 * ((index + t) % 6) as f64,
                0.25 + 0.15 * tile,
            ];
            TileMonthRecord::new(
                format!("tile_{}", t),
                year,
                month,
                77.5 + 0.01 * tile,
                12.9 + 0.01 * tile,
                features,
            )
            .unwrap()
        })
        .collect()
}

/// Write one `YYYY_MM.csv` frame per month starting January 2018
pub fn write_processed_frames(config: &PipelineConfig, months: usize) {
    let dir = config.processed_dir();
    for index in 0..months {
        let year = 2018 + (index / 12) as i32;
        let month = (index % 12) as u32 + 1;
        let path = dir.join(format!("{}_{:02}.csv", year, month));
        storage::write_records(&path, &frame_for(year, month, index)).unwrap();
    }
}

/// Small candidate grid so tests stay fast
pub fn small_candidates() -> Vec<ModelSpec> {
    vec![
        ModelSpec::RandomForest(ForestParams::new(10, Some(6), 2)),
        ModelSpec::ExtraTrees(ForestParams::new(10, None, 2)),
        ModelSpec::HistGbrt(BoostingParams::new(Some(3), 0.1, 25)),
    ]
}

pub fn test_pipeline(root: &Path) -> FloodPipeline {
    PipelineBuilder::new()
        .with_project_root(root)
        .with_city("testville")
        .with_candidates(small_candidates())
        .build()
        .unwrap()
}
