//! Feature table construction
//!
//! Concatenates monthly per-tile frames into one chronologically ordered
//! table and attaches the proxy vulnerability target.

use crate::error::{Result, RuntimeError};
use flood_core::{CoreError, FeatureColumn, TileMonthRecord};
use std::collections::BTreeSet;
use tracing::debug;

/// Guards the max-normalized proxy terms against an all-zero column
const PROXY_EPSILON: f64 = 1e-9;

/// A validated, sorted feature table
///
/// Records are ordered by (tile_id, year, month), keys are unique and every
/// record carries a proxy target.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    records: Vec<TileMonthRecord>,
}

impl FeatureTable {
    /// Wrap a previously built dataset (e.g. loaded from disk)
    pub fn from_dataset(mut records: Vec<TileMonthRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(RuntimeError::InsufficientData(
                "feature dataset contains no records".to_string(),
            ));
        }
        if let Some(r) = records.iter().find(|r| r.target_vulnerability_proxy.is_none()) {
            return Err(CoreError::InvalidValue(format!(
                "record for tile '{}' at {} has no proxy target",
                r.tile_id, r.year_month
            ))
            .into());
        }

        sort_records(&mut records);
        check_unique(&records)?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[TileMonthRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TileMonthRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn tile_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.tile_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Distinct `year * 100 + month` ids, ascending
    pub fn time_ids(&self) -> Vec<i64> {
        self.records
            .iter()
            .map(|r| r.year as i64 * 100 + r.month as i64)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Builder that concatenates monthly frames into a [`FeatureTable`]
#[derive(Debug, Default)]
pub struct FeatureTableBuilder {
    frames: Vec<Vec<TileMonthRecord>>,
}

impl FeatureTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one monthly frame
    pub fn add_frame(mut self, frame: Vec<TileMonthRecord>) -> Self {
        self.frames.push(frame);
        self
    }

    /// Add several frames at once
    pub fn add_frames(mut self, frames: impl IntoIterator<Item = Vec<TileMonthRecord>>) -> Self {
        self.frames.extend(frames);
        self
    }

    /// Concatenate, sort, validate and attach the derived columns
    pub fn build(self) -> Result<FeatureTable> {
        let frame_count = self.frames.len();
        let mut records: Vec<TileMonthRecord> = self.frames.into_iter().flatten().collect();
        if records.is_empty() {
            return Err(RuntimeError::InsufficientData(
                "no tile-month records to build a feature table from".to_string(),
            ));
        }

        for record in &records {
            record.bucket()?;
        }

        sort_records(&mut records);
        check_unique(&records)?;

        let rainfall_max = column_max(&records, FeatureColumn::RainfallAccumulation);
        let impervious_max = column_max(&records, FeatureColumn::ImperviousChangeRate);

        for record in &mut records {
            record.time_window = Some(record.year_month.clone());
            record.imagery_reference = Some(imagery_reference(record.year, record.month));
            record.target_vulnerability_proxy =
                Some(proxy_target(record, rainfall_max, impervious_max));
        }

        debug!(
            "Built feature table: {} records from {} frames",
            records.len(),
            frame_count
        );

        Ok(FeatureTable { records })
    }
}

/// Weighted proxy vulnerability target
///
/// Rainfall and impervious change are divided by their table-wide maximum
/// before weighting; the other columns are already in [0, 1].
pub fn proxy_target(record: &TileMonthRecord, rainfall_max: f64, impervious_max: f64) -> f64 {
    FeatureColumn::ALL
        .iter()
        .map(|&column| {
            let value = record.feature(column);
            let scaled = if column.scaled_by_table_max() {
                let table_max = match column {
                    FeatureColumn::RainfallAccumulation => rainfall_max,
                    _ => impervious_max,
                };
                value / (table_max + PROXY_EPSILON)
            } else {
                value
            };
            column.proxy_weight() * scaled
        })
        .sum()
}

/// Path of the SAR manifest a month's features were derived from
pub fn imagery_reference(year: i32, month: u32) -> String {
    format!("data/raw/sentinel_1/{:04}/{:02}/manifest.json", year, month)
}

fn column_max(records: &[TileMonthRecord], column: FeatureColumn) -> f64 {
    records
        .iter()
        .map(|r| r.feature(column))
        .fold(f64::NEG_INFINITY, f64::max)
}

fn sort_records(records: &mut [TileMonthRecord]) {
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

fn check_unique(sorted: &[TileMonthRecord]) -> Result<()> {
    for pair in sorted.windows(2) {
        if pair[0].sort_key() == pair[1].sort_key() {
            return Err(RuntimeError::DuplicateRecord {
                tile_id: pair[1].tile_id.clone(),
                year: pair[1].year,
                month: pair[1].month,
            });
        }
    }
    Ok(())
}
