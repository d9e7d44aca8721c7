//! Temporal feature rows

use crate::types::feature::FeatureSet;
use serde::{Deserialize, Serialize};

/// A tile-month with its lag and rolling features attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalRow {
    pub tile_id: String,
    pub year: i32,
    pub month: u32,
    pub year_month: String,
    pub lon: f64,
    pub lat: f64,

    /// `year * 100 + month`
    pub time_id: i64,

    /// raw, lag1, lag2, lag3, roll3 blocks; see [`FeatureSet::column_names`]
    pub features: Vec<f64>,
}

impl TemporalRow {
    /// The slice of the feature vector a feature set consumes
    pub fn feature_slice(&self, set: FeatureSet) -> &[f64] {
        &self.features[..set.len().min(self.features.len())]
    }
}

/// A temporal row with its forward (next period) label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub row: TemporalRow,
    pub label: f64,
}

impl LabeledRow {
    pub fn time_id(&self) -> i64 {
        self.row.time_id
    }
}
