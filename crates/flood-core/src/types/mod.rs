//! Data model for the flood pipeline
//!
//! This module contains:
//! - Feature columns and feature sets
//! - Tile-month records
//! - Temporal (lagged) rows
//! - Scored rows

pub mod feature;
pub mod record;
pub mod score;
pub mod temporal;

pub use feature::{
    FeatureColumn, FeatureSet, LAGS, RAW_FEATURE_COUNT, ROLLING_WINDOW, TEMPORAL_FEATURE_COUNT,
};
pub use record::TileMonthRecord;
pub use score::ScoredRow;
pub use temporal::{LabeledRow, TemporalRow};
