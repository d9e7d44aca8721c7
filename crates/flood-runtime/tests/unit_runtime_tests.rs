//! Unit tests for flood-runtime
//!
//! Exercises the table → temporal frame → split → selection → scoring →
//! evaluation chain on a small synthetic city.

use flood_core::{FeatureSet, TileMonthRecord, TEMPORAL_FEATURE_COUNT};
use flood_runtime::error::RuntimeError;
use flood_runtime::{
    average_rank_descending, derive_temporal_rows, design_matrix, evaluate_scores, inference_frame,
    normalize_scores, score_rows, training_frame, BoostingParams, FeatureTable, FeatureTableBuilder,
    ForestParams, ModelPaths, ModelSpec, RidgeParams, TemporalTrainer, TrainerConfig,
};
use std::f64::consts::PI;

// ========== Fixtures ==========

const TILES: usize = 3;

/// One frame per month starting January 2018
fn synthetic_frames(months: usize) -> Vec<Vec<TileMonthRecord>> {
    (0..months)
        .map(|k| {
            let year = 2018 + (k / 12) as i32;
            let month = (k % 12) as u32 + 1;
            let season = (2.0 * PI * (month as f64 - 6.0) / 12.0).sin().max(0.0);
            (0..TILES)
                .map(|t| {
                    let tile = t as f64;
                    let features = [
                        (0.1 + 0.5 * season + 0.05 * tile).min(1.0),
                        60.0 + 220.0 * season + 15.0 * tile + (k % 4) as f64,
                        0.2 + 0.2 * tile,
                        0.01 * ((k + t) % 7) as f64,
                        0.3 + 0.1 * tile,
                    ];
                    TileMonthRecord::new(
                        &format!("tile_{}", t),
                        year,
                        month,
                        100.0 + 0.01 * tile,
                        13.0 + 0.01 * tile,
                        features,
                    )
                    .unwrap()
                })
                .collect()
        })
        .collect()
}

fn synthetic_table(months: usize) -> FeatureTable {
    FeatureTableBuilder::new()
        .add_frames(synthetic_frames(months))
        .build()
        .unwrap()
}

fn small_trainer() -> TemporalTrainer {
    TemporalTrainer::new(TrainerConfig::default().with_candidates(vec![
        ModelSpec::RandomForest(ForestParams::new(12, Some(6), 2)),
        ModelSpec::ExtraTrees(ForestParams::new(12, None, 2)),
        ModelSpec::HistGbrt(BoostingParams::new(Some(3), 0.1, 30)),
    ]))
}

// ========== Feature Table & Temporal Frame Tests ==========

#[test]
fn test_table_and_frames_sizes() {
    let table = synthetic_table(34);
    assert_eq!(table.len(), 34 * TILES);
    assert_eq!(table.tile_count(), TILES);

    let derived = derive_temporal_rows(table.records()).unwrap();
    assert_eq!(derived.len(), (34 - 3) * TILES);

    let labeled = training_frame(table.records()).unwrap();
    assert_eq!(labeled.len(), (34 - 4) * TILES);
    assert!(labeled.iter().all(|r| r.row.features.len() == TEMPORAL_FEATURE_COUNT));

    let inference = inference_frame(table.records()).unwrap();
    assert_eq!(inference.len(), labeled.len());
}

#[test]
fn test_label_is_next_period_proxy() {
    let table = synthetic_table(8);
    let labeled = training_frame(table.records()).unwrap();
    let first = &labeled[0];
    let next = table
        .records()
        .iter()
        .find(|r| r.tile_id == first.row.tile_id && r.year == 2018 && r.month == first.row.month + 1)
        .unwrap();
    assert_eq!(Some(first.label), next.target_vulnerability_proxy);
}

// ========== Training Tests ==========

#[test]
fn test_training_end_to_end() {
    let table = synthetic_table(34);
    let artifacts = small_trainer().fit(&table).unwrap();

    // 30 labeled buckets: 6 train, 12 validation, 12 test
    assert_eq!(artifacts.split_info.train_end, "201809");
    assert_eq!(artifacts.split_info.val_start, "201810");
    assert_eq!(artifacts.split_info.val_end, "201909");
    assert_eq!(artifacts.split_info.test_start, "201910");
    assert_eq!(artifacts.split_info.test_end, "202009");

    assert_eq!(artifacts.candidate_scores.len(), 3);
    assert!(["random_forest", "extra_trees", "hist_gbrt"]
        .contains(&artifacts.selected_temporal_model_name.as_str()));
    assert_eq!(
        artifacts.selected_temporal_config.family(),
        artifacts.selected_temporal_model_name
    );

    let best = artifacts
        .candidate_scores
        .iter()
        .map(|c| c.validation_mae)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(artifacts.temporal_metrics.validation_mae_for_selected_model, best);
    assert!(
        (artifacts.temporal_metrics.mae_improvement_over_baseline
            - (artifacts.baseline_metrics.mae - artifacts.temporal_metrics.mae))
            .abs()
            < 1e-12
    );

    match artifacts.temporal_model.feature_importances() {
        Some(_) => {
            assert_eq!(artifacts.feature_importance.len(), FeatureSet::Temporal.len());
            assert!(artifacts
                .feature_importance
                .windows(2)
                .all(|w| w[0].importance >= w[1].importance));
        }
        None => assert!(artifacts.feature_importance.is_empty()),
    }
}

#[test]
fn test_training_is_deterministic() {
    let table = synthetic_table(34);
    let first = small_trainer().fit(&table).unwrap();
    let second = small_trainer().fit(&table).unwrap();

    assert_eq!(first.selected_temporal_model_name, second.selected_temporal_model_name);
    assert_eq!(first.baseline_metrics, second.baseline_metrics);
    assert_eq!(first.temporal_metrics, second.temporal_metrics);
    assert_eq!(first.candidate_scores, second.candidate_scores);
    let order = |a: &flood_runtime::TrainArtifacts| {
        a.feature_importance.iter().map(|f| f.feature.clone()).collect::<Vec<_>>()
    };
    assert_eq!(order(&first), order(&second));
}

#[test]
fn test_report_truncates_importances() {
    let table = synthetic_table(34);
    let trainer = TemporalTrainer::new(
        TrainerConfig::default()
            .with_candidates(vec![ModelSpec::RandomForest(ForestParams::new(6, Some(4), 2))]),
    );
    let artifacts = trainer.fit(&table).unwrap();
    let report = artifacts.report(
        20,
        ModelPaths {
            baseline: "baseline_model.json".to_string(),
            temporal: "temporal_model.json".to_string(),
        },
    );

    assert_eq!(report.top_feature_importance.len(), 20);
    assert_eq!(report.top_feature_importance[..], artifacts.feature_importance[..20]);
    assert_eq!(report.selected_temporal_model_name, "random_forest");
    assert_eq!(report.candidate_scores, artifacts.candidate_scores);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["selected_temporal_config"]["n_estimators"], 6);
    assert_eq!(json["split_info"]["test_end"], "202009");
    assert!(json["baseline"]["mae"].is_number());
    assert_eq!(json["candidate_scores"][0]["name"], "random_forest");
    assert!(json["candidate_scores"][0]["validation_mae"].is_number());
}

#[test]
fn test_training_needs_24_buckets() {
    // 27 months -> 23 labeled buckets
    let table = synthetic_table(27);
    let err = small_trainer().fit(&table).unwrap_err();
    assert!(matches!(err, RuntimeError::InsufficientHistory { found: 23, required: 24 }));

    // 28 months -> exactly 24 labeled buckets, nothing left for train
    let table = synthetic_table(28);
    let err = small_trainer().fit(&table).unwrap_err();
    assert!(matches!(err, RuntimeError::EmptyPartition { partition: "train" }));
}

// ========== Inference & Evaluation Tests ==========

#[test]
fn test_scoring_properties() {
    let table = synthetic_table(34);
    let artifacts = small_trainer().fit(&table).unwrap();
    let rows = inference_frame(table.records()).unwrap();
    let scored = score_rows(&artifacts.temporal_model, &rows).unwrap();

    assert_eq!(scored.len(), rows.len());
    assert!(scored
        .iter()
        .all(|s| (0.0..=1.0).contains(&s.vulnerability_score)));

    let n = scored.len() as f64;
    let rank_sum: f64 = scored.iter().map(|s| s.vulnerability_rank).sum();
    assert!((rank_sum - n * (n + 1.0) / 2.0).abs() < 1e-6);

    let report = evaluate_scores(&scored).unwrap();
    assert_eq!(report.months_evaluated, 30);
    assert!(report.high_vs_low_vulnerability_gap >= 0.0);
}

#[test]
fn test_constant_predictions_score_zero() {
    let scores = normalize_scores(&[0.42; 6]);
    assert!(scores.iter().all(|&s| s == 0.0));
    assert_eq!(average_rank_descending(&scores), vec![3.5; 6]);
}

#[test]
fn test_constant_model_scores_every_row_zero() {
    let table = synthetic_table(34);
    let rows = inference_frame(table.records()).unwrap();
    let x = design_matrix(&rows, FeatureSet::Temporal).unwrap();
    let labels = vec![0.37; rows.len()];
    let model = ModelSpec::Ridge(RidgeParams::default())
        .fit(x.view(), &labels, 0)
        .unwrap();

    let predictions = model.predict(x.view()).unwrap();
    assert!(predictions.iter().all(|&p| p == predictions[0]));

    let scored = score_rows(&model, &rows).unwrap();
    let tied_rank = (rows.len() as f64 + 1.0) / 2.0;
    assert!(scored.iter().all(|s| s.vulnerability_score == 0.0));
    assert!(scored.iter().all(|s| s.vulnerability_rank == tied_rank));
}

#[test]
fn test_reload_feature_table() {
    let table = synthetic_table(6);
    let mut records = table.clone().into_records();
    records.reverse();
    assert_eq!(FeatureTable::from_dataset(records).unwrap(), table);
}
