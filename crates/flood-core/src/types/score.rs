//! Scored output rows

use serde::{Deserialize, Serialize};

/// Normalized vulnerability score of one tile-month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    pub tile_id: String,
    pub year: i32,
    pub month: u32,
    pub year_month: String,
    pub lon: f64,
    pub lat: f64,
    /// Min-max normalized prediction, in [0, 1]
    pub vulnerability_score: f64,
    /// Descending average rank; 1.0 is the most vulnerable
    pub vulnerability_rank: f64,
}
