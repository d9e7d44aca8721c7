//! Unit tests for flood-core data model types

use flood_core::types::TileMonthRecord;
use flood_core::{FeatureColumn, FeatureSet, ScoredRow, TemporalRow, TimeBucket};

fn temporal_row() -> TemporalRow {
    TemporalRow {
        tile_id: "tile_007".to_string(),
        year: 2022,
        month: 8,
        year_month: "2022_08".to_string(),
        lon: 77.6,
        lat: 12.97,
        time_id: 202208,
        features: (0..FeatureSet::Temporal.len()).map(|i| i as f64).collect(),
    }
}

// ========== Feature Set Tests ==========

#[test]
fn test_feature_slice_baseline() {
    let row = temporal_row();
    assert_eq!(row.feature_slice(FeatureSet::Baseline), &[0.0, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_feature_slice_temporal() {
    let row = temporal_row();
    let slice = row.feature_slice(FeatureSet::Temporal);
    assert_eq!(slice.len(), 25);
    assert_eq!(slice[24], 24.0);
}

#[test]
fn test_column_names_are_unique() {
    let names = FeatureSet::Temporal.column_names();
    let mut deduped = names.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), names.len());
}

// ========== Record Tests ==========

#[test]
fn test_record_features_follow_canonical_order() {
    let record = TileMonthRecord::new("t", 2020, 1, 0.0, 0.0, [0.9, 150.0, 0.3, 0.05, 0.7]).unwrap();
    for (i, column) in FeatureColumn::ALL.iter().enumerate() {
        assert_eq!(record.features()[i], record.feature(*column));
    }
}

#[test]
fn test_record_sort_key() {
    let a = TileMonthRecord::new("a", 2021, 12, 0.0, 0.0, [0.0; 5]).unwrap();
    let b = TileMonthRecord::new("a", 2022, 1, 0.0, 0.0, [0.0; 5]).unwrap();
    let c = TileMonthRecord::new("b", 2020, 1, 0.0, 0.0, [0.0; 5]).unwrap();
    assert!(a.sort_key() < b.sort_key());
    assert!(b.sort_key() < c.sort_key());
}

// ========== Time Bucket Tests ==========

#[test]
fn test_bucket_serializes_as_id() {
    let bucket = TimeBucket::new(2024, 11).unwrap();
    assert_eq!(serde_json::to_string(&bucket).unwrap(), "202411");
    let back: TimeBucket = serde_json::from_str("202411").unwrap();
    assert_eq!(back, bucket);
    assert_eq!(back.year_month(), "2024_11");
}

// ========== Scored Row Tests ==========

#[test]
fn test_scored_row_serde() {
    let row = ScoredRow {
        tile_id: "tile_001".to_string(),
        year: 2023,
        month: 9,
        year_month: "2023_09".to_string(),
        lon: 77.5,
        lat: 12.9,
        vulnerability_score: 0.75,
        vulnerability_rank: 2.5,
    };

    let json = serde_json::to_string(&row).unwrap();
    assert!(json.contains("vulnerability_score"));
    let back: ScoredRow = serde_json::from_str(&json).unwrap();
    assert_eq!(back, row);
}
