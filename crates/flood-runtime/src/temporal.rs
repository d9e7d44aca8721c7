//! Temporal feature derivation
//!
//! For every tile's chronological series this attaches, per raw feature, the
//! values 1, 2 and 3 present rows earlier plus a trailing 3-row rolling mean,
//! and the proxy target one present row ahead as the forward label.
//!
//! Lags are positional within a tile, not calendar arithmetic: when a month
//! is missing from the input, lag-1 is the previous *present* row. Tiles
//! never share lag or rolling state.
//!
//! Training and inference go through the same derivation and the same
//! undefined-value filter; inference only strips the label afterwards.

use crate::error::Result;
use flood_core::{
    LabeledRow, TemporalRow, TileMonthRecord, TimeBucket, LAGS, RAW_FEATURE_COUNT, ROLLING_WINDOW,
    TEMPORAL_FEATURE_COUNT,
};
use tracing::debug;

/// Rows of history needed before every lag is defined
const MAX_LAG: usize = LAGS[LAGS.len() - 1];

/// A derived row whose forward label may be undefined
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub row: TemporalRow,
    pub label: Option<f64>,
}

/// Derive temporal rows for every (tile, period) with defined lag and
/// rolling values
///
/// Input order does not matter; records are stably sorted by
/// (tile_id, year, month) first. A tile with `n` present periods yields
/// `max(0, n - 3)` rows; the label of each tile's last period is `None`.
pub fn derive_temporal_rows(records: &[TileMonthRecord]) -> Result<Vec<DerivedRow>> {
    let mut sorted: Vec<&TileMonthRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut derived = Vec::with_capacity(sorted.len());
    for group in sorted.chunk_by(|a, b| a.tile_id == b.tile_id) {
        derive_tile(group, &mut derived)?;
    }

    debug!(
        "Derived {} temporal rows from {} records",
        derived.len(),
        records.len()
    );
    Ok(derived)
}

/// Labeled rows for training: derived rows whose forward label is defined
pub fn training_frame(records: &[TileMonthRecord]) -> Result<Vec<LabeledRow>> {
    Ok(derive_temporal_rows(records)?
        .into_iter()
        .filter_map(|d| d.label.map(|label| LabeledRow { row: d.row, label }))
        .collect())
}

/// Rows for inference: the training frame with the label column removed
pub fn inference_frame(records: &[TileMonthRecord]) -> Result<Vec<TemporalRow>> {
    Ok(training_frame(records)?.into_iter().map(|l| l.row).collect())
}

fn derive_tile(group: &[&TileMonthRecord], out: &mut Vec<DerivedRow>) -> Result<()> {
    let buckets = group
        .iter()
        .map(|r| r.bucket())
        .collect::<flood_core::Result<Vec<TimeBucket>>>()?;
    let raw: Vec<[f64; RAW_FEATURE_COUNT]> = group.iter().map(|r| r.features()).collect();

    for i in MAX_LAG..group.len() {
        let record = group[i];
        let mut features = Vec::with_capacity(TEMPORAL_FEATURE_COUNT);

        features.extend_from_slice(&raw[i]);
        for lag in LAGS {
            features.extend_from_slice(&raw[i - lag]);
        }
        for column in 0..RAW_FEATURE_COUNT {
            let window = &raw[i + 1 - ROLLING_WINDOW..=i];
            let sum: f64 = window.iter().map(|values| values[column]).sum();
            features.push(sum / ROLLING_WINDOW as f64);
        }

        if features.iter().any(|v| v.is_nan()) {
            continue;
        }

        let label = group
            .get(i + 1)
            .and_then(|next| next.target_vulnerability_proxy)
            .filter(|v| !v.is_nan());

        out.push(DerivedRow {
            row: TemporalRow {
                tile_id: record.tile_id.clone(),
                year: record.year,
                month: record.month,
                year_month: record.year_month.clone(),
                lon: record.lon,
                lat: record.lat,
                time_id: buckets[i].id(),
                features,
            },
            label,
        });
    }
    Ok(())
}
