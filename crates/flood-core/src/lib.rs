//! Flood Core - Core types and definitions for the flood vulnerability pipeline
//!
//! This crate provides the fundamental types used across the workspace:
//! - Feature columns and their canonical order
//! - Tile-month records and the derived temporal rows
//! - Scored output rows
//! - Time bucket helpers
//! - Error types

pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use time::{month_from_label, TimeBucket};
pub use types::{
    FeatureColumn, FeatureSet, LabeledRow, ScoredRow, TemporalRow, TileMonthRecord,
    LAGS, RAW_FEATURE_COUNT, ROLLING_WINDOW, TEMPORAL_FEATURE_COUNT,
};
