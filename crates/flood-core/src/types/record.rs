//! Tile-month records
//!
//! One record per (tile, year, month). The flat field layout doubles as the
//! CSV schema of processed frames and of the feature dataset.

use crate::error::Result;
use crate::time::TimeBucket;
use crate::types::feature::{FeatureColumn, RAW_FEATURE_COUNT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMonthRecord {
    pub tile_id: String,
    pub year: i32,
    pub month: u32,
    /// `YYYY_MM`
    pub year_month: String,
    pub lon: f64,
    pub lat: f64,

    pub sar_water_persistence: f64,
    pub rainfall_accumulation: f64,
    pub low_lying_score: f64,
    pub impervious_change_rate: f64,
    pub population_exposure: f64,

    /// Filled by the feature table builder
    #[serde(default)]
    pub time_window: Option<String>,

    /// Filled by the feature table builder
    #[serde(default)]
    pub imagery_reference: Option<String>,

    /// Filled by the feature table builder
    #[serde(default)]
    pub target_vulnerability_proxy: Option<f64>,
}

impl TileMonthRecord {
    /// Create a record with raw features in [`FeatureColumn::ALL`] order
    pub fn new(
        tile_id: impl Into<String>,
        year: i32,
        month: u32,
        lon: f64,
        lat: f64,
        features: [f64; RAW_FEATURE_COUNT],
    ) -> Result<Self> {
        let bucket = TimeBucket::new(year, month)?;
        Ok(Self {
            tile_id: tile_id.into(),
            year,
            month,
            year_month: bucket.year_month(),
            lon,
            lat,
            sar_water_persistence: features[0],
            rainfall_accumulation: features[1],
            low_lying_score: features[2],
            impervious_change_rate: features[3],
            population_exposure: features[4],
            time_window: None,
            imagery_reference: None,
            target_vulnerability_proxy: None,
        })
    }

    pub fn bucket(&self) -> Result<TimeBucket> {
        TimeBucket::new(self.year, self.month)
    }

    pub fn feature(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::SarWaterPersistence => self.sar_water_persistence,
            FeatureColumn::RainfallAccumulation => self.rainfall_accumulation,
            FeatureColumn::LowLyingScore => self.low_lying_score,
            FeatureColumn::ImperviousChangeRate => self.impervious_change_rate,
            FeatureColumn::PopulationExposure => self.population_exposure,
        }
    }

    /// Raw features in [`FeatureColumn::ALL`] order
    pub fn features(&self) -> [f64; RAW_FEATURE_COUNT] {
        FeatureColumn::ALL.map(|c| self.feature(c))
    }

    /// Sort key of the feature table
    pub fn sort_key(&self) -> (&str, i32, u32) {
        (self.tile_id.as_str(), self.year, self.month)
    }
}
