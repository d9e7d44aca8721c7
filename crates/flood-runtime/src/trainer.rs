//! Baseline fit, candidate selection and held-out evaluation
//!
//! The trainer fits a ridge baseline on the raw features, scores every
//! candidate configuration on the validation partition, refits the winner
//! on train + validation and reports test metrics for both.

use crate::error::{Result, RuntimeError};
use crate::matrix::{design_matrix, labels};
use crate::metrics::{mean_absolute_error, RegressionMetrics};
use crate::model::{BoostingParams, ForestParams, ModelSpec, Regressor, RidgeParams};
use crate::split::{chronological_split, SplitBoundaries, SplitConfig};
use crate::table::FeatureTable;
use crate::temporal::training_frame;
use flood_core::{FeatureSet, LabeledRow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 42;

/// Number of importances carried in a [`TrainingReport`] by default
pub const DEFAULT_TOP_IMPORTANCES: usize = 20;

/// Baseline and candidate grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    #[serde(default)]
    pub baseline: RidgeParams,

    /// Candidates in tie-break order
    #[serde(default = "TrainerConfig::default_candidates")]
    pub candidates: Vec<ModelSpec>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            baseline: RidgeParams::default(),
            candidates: Self::default_candidates(),
        }
    }
}

impl TrainerConfig {
    pub fn default_candidates() -> Vec<ModelSpec> {
        vec![
            ModelSpec::RandomForest(ForestParams::new(400, None, 2)),
            ModelSpec::RandomForest(ForestParams::new(700, Some(20), 1)),
            ModelSpec::ExtraTrees(ForestParams::new(600, None, 2)),
            ModelSpec::ExtraTrees(ForestParams::new(900, Some(24), 1)),
            ModelSpec::HistGbrt(BoostingParams::new(Some(8), 0.05, 500)),
            ModelSpec::HistGbrt(BoostingParams::new(Some(12), 0.03, 900)),
        ]
    }

    pub fn with_candidates(mut self, candidates: Vec<ModelSpec>) -> Self {
        self.candidates = candidates;
        self
    }
}

/// Validation score of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub name: String,
    pub config: ModelSpec,
    pub validation_mae: f64,
}

/// Test metrics of the selected model, with deltas against the baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalMetrics {
    pub mae: f64,
    pub r2: f64,
    pub validation_mae_for_selected_model: f64,
    /// baseline MAE - temporal MAE
    pub mae_improvement_over_baseline: f64,
    /// temporal R² - baseline R²
    pub r2_improvement_over_baseline: f64,
}

impl TemporalMetrics {
    fn compare(temporal: RegressionMetrics, baseline: RegressionMetrics, validation_mae: f64) -> Self {
        Self {
            mae: temporal.mae,
            r2: temporal.r2,
            validation_mae_for_selected_model: validation_mae,
            mae_improvement_over_baseline: baseline.mae - temporal.mae,
            r2_improvement_over_baseline: temporal.r2 - baseline.r2,
        }
    }
}

/// Split boundaries as reported (bucket ids rendered as strings)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitInfo {
    pub train_end: String,
    pub val_start: String,
    pub val_end: String,
    pub test_start: String,
    pub test_end: String,
}

impl From<SplitBoundaries> for SplitInfo {
    fn from(b: SplitBoundaries) -> Self {
        Self {
            train_end: b.train_end.to_string(),
            val_start: b.val_start.to_string(),
            val_end: b.val_end.to_string(),
            test_start: b.test_start.to_string(),
            test_end: b.test_end.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Everything a training run produces
#[derive(Debug, Clone)]
pub struct TrainArtifacts {
    pub baseline_model: Regressor,
    pub temporal_model: Regressor,
    pub baseline_metrics: RegressionMetrics,
    pub temporal_metrics: TemporalMetrics,
    pub selected_temporal_model_name: String,
    pub selected_temporal_config: ModelSpec,
    pub split_info: SplitInfo,
    /// Sorted by importance, descending; empty for models without importances
    pub feature_importance: Vec<FeatureImportance>,
    pub candidate_scores: Vec<CandidateScore>,
}

/// Where the fitted models were persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPaths {
    pub baseline: String,
    pub temporal: String,
}

/// Serializable metrics record of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub baseline: RegressionMetrics,
    pub temporal: TemporalMetrics,
    pub selected_temporal_model_name: String,
    pub selected_temporal_config: ModelSpec,
    pub split_info: SplitInfo,
    pub top_feature_importance: Vec<FeatureImportance>,
    /// Validation MAE of every candidate, in grid order
    pub candidate_scores: Vec<CandidateScore>,
    pub model_paths: ModelPaths,
}

impl TrainArtifacts {
    pub fn report(&self, top_n: usize, model_paths: ModelPaths) -> TrainingReport {
        TrainingReport {
            baseline: self.baseline_metrics,
            temporal: self.temporal_metrics,
            selected_temporal_model_name: self.selected_temporal_model_name.clone(),
            selected_temporal_config: self.selected_temporal_config,
            split_info: self.split_info.clone(),
            top_feature_importance: self.feature_importance.iter().take(top_n).cloned().collect(),
            candidate_scores: self.candidate_scores.clone(),
            model_paths,
        }
    }
}

/// Model selector over a chronological split
#[derive(Debug, Clone)]
pub struct TemporalTrainer {
    config: TrainerConfig,
    split: SplitConfig,
    seed: u64,
}

impl Default for TemporalTrainer {
    fn default() -> Self {
        Self::new(TrainerConfig::default())
    }
}

impl TemporalTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self {
            config,
            split: SplitConfig::default(),
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Derive the training frame from a feature table and fit
    pub fn fit(&self, table: &FeatureTable) -> Result<TrainArtifacts> {
        let rows = training_frame(table.records())?;
        info!(
            "Training frame: {} labeled rows from {} records ({} tiles)",
            rows.len(),
            table.len(),
            table.tile_count()
        );
        self.fit_rows(rows)
    }

    /// Fit on an already derived training frame
    pub fn fit_rows(&self, rows: Vec<LabeledRow>) -> Result<TrainArtifacts> {
        if self.config.candidates.is_empty() {
            return Err(RuntimeError::InvalidConfig(
                "candidate grid is empty".to_string(),
            ));
        }
        if rows.is_empty() {
            return Err(RuntimeError::InsufficientData(
                "no labeled temporal rows; every tile needs at least 5 periods".to_string(),
            ));
        }

        let split = chronological_split(rows, &self.split)?;
        let train_validation = split.train_validation();
        let y_train_validation = labels(train_validation.iter().copied());
        let y_train = labels(&split.train);
        let y_validation = labels(&split.validation);
        let y_test = labels(&split.test);

        // Baseline: raw columns only
        let baseline_spec = ModelSpec::Ridge(self.config.baseline);
        let x_fit = design_matrix(train_validation.iter().map(|r| &r.row), FeatureSet::Baseline)?;
        let x_test = design_matrix(split.test.iter().map(|r| &r.row), FeatureSet::Baseline)?;
        let baseline_model = baseline_spec.fit(x_fit.view(), &y_train_validation, self.seed)?;
        let baseline_metrics = RegressionMetrics::evaluate(&y_test, &baseline_model.predict(x_test.view())?)?;
        info!(
            "Baseline {}: test MAE={:.6}, R2={:.6}",
            baseline_spec, baseline_metrics.mae, baseline_metrics.r2
        );

        // Candidates: fit on train, score on validation
        let x_train = design_matrix(split.train.iter().map(|r| &r.row), FeatureSet::Temporal)?;
        let x_validation = design_matrix(split.validation.iter().map(|r| &r.row), FeatureSet::Temporal)?;
        let mut candidate_scores = Vec::with_capacity(self.config.candidates.len());
        for spec in &self.config.candidates {
            let model = spec.fit(x_train.view(), &y_train, self.seed)?;
            let validation_mae = mean_absolute_error(&y_validation, &model.predict(x_validation.view())?)?;
            info!("Candidate {}: validation MAE={:.6}", spec, validation_mae);
            candidate_scores.push(CandidateScore {
                name: spec.family().to_string(),
                config: *spec,
                validation_mae,
            });
        }

        let best = select_best(&candidate_scores)
            .ok_or_else(|| RuntimeError::InvalidConfig("no candidate could be scored".to_string()))?;
        let selected = candidate_scores[best].clone();
        info!(
            "Selected {} (validation MAE={:.6})",
            selected.config, selected.validation_mae
        );

        // Refit the winner on train + validation
        let x_fit = design_matrix(train_validation.iter().map(|r| &r.row), FeatureSet::Temporal)?;
        let x_test = design_matrix(split.test.iter().map(|r| &r.row), FeatureSet::Temporal)?;
        let temporal_model = selected.config.fit(x_fit.view(), &y_train_validation, self.seed)?;
        let temporal_test = RegressionMetrics::evaluate(&y_test, &temporal_model.predict(x_test.view())?)?;
        let temporal_metrics = TemporalMetrics::compare(temporal_test, baseline_metrics, selected.validation_mae);
        info!(
            "Temporal model: test MAE={:.6}, R2={:.6} (MAE improvement {:+.6})",
            temporal_metrics.mae, temporal_metrics.r2, temporal_metrics.mae_improvement_over_baseline
        );

        let feature_importance = temporal_model
            .feature_importances()
            .map(|values| rank_importances(&FeatureSet::Temporal.column_names(), &values))
            .unwrap_or_default();
        debug!("{} feature importances", feature_importance.len());

        Ok(TrainArtifacts {
            baseline_model,
            temporal_model,
            baseline_metrics,
            temporal_metrics,
            selected_temporal_model_name: selected.name,
            selected_temporal_config: selected.config,
            split_info: split.boundaries.into(),
            feature_importance,
            candidate_scores,
        })
    }
}

/// Index of the lowest validation MAE; the earliest candidate wins ties
pub fn select_best(scores: &[CandidateScore]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, score) in scores.iter().enumerate() {
        if best.map_or(true, |(_, mae)| score.validation_mae < mae) {
            best = Some((index, score.validation_mae));
        }
    }
    best.map(|(index, _)| index)
}

/// Pair importances with column names and sort descending (stable)
pub fn rank_importances(columns: &[String], values: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = columns
        .iter()
        .zip(values)
        .map(|(feature, &importance)| FeatureImportance {
            feature: feature.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(name: &str, validation_mae: f64) -> CandidateScore {
        CandidateScore {
            name: name.to_string(),
            config: ModelSpec::Ridge(RidgeParams::default()),
            validation_mae,
        }
    }

    #[test]
    fn test_default_grid_order() {
        let families: Vec<&str> = TrainerConfig::default()
            .candidates
            .iter()
            .map(|c| c.family())
            .collect();
        assert_eq!(
            families,
            vec!["random_forest", "random_forest", "extra_trees", "extra_trees", "hist_gbrt", "hist_gbrt"]
        );
    }

    #[test]
    fn test_select_best_first_seen_wins_ties() {
        let scores = vec![score("a", 0.3), score("b", 0.1), score("c", 0.1), score("d", 0.2)];
        assert_eq!(select_best(&scores), Some(1));
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn test_rank_importances_stable_descending() {
        let columns: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let ranked = rank_importances(&columns, &[0.1, 0.4, 0.1, 0.4]);
        let order: Vec<&str> = ranked.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_split_info_strings() {
        let info: SplitInfo = SplitBoundaries {
            train_end: 201806,
            val_start: 201807,
            val_end: 201906,
            test_start: 201907,
            test_end: 202006,
        }
        .into();
        assert_eq!(info.train_end, "201806");
        assert_eq!(info.test_end, "202006");
    }

    #[test]
    fn test_metrics_deltas() {
        let baseline = RegressionMetrics { mae: 0.2, r2: 0.5 };
        let temporal = RegressionMetrics { mae: 0.15, r2: 0.7 };
        let m = TemporalMetrics::compare(temporal, baseline, 0.12);
        assert!((m.mae_improvement_over_baseline - 0.05).abs() < 1e-12);
        assert!((m.r2_improvement_over_baseline - 0.2).abs() < 1e-12);
        assert_eq!(m.validation_mae_for_selected_model, 0.12);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let trainer = TemporalTrainer::new(TrainerConfig::default().with_candidates(Vec::new()));
        assert!(matches!(trainer.fit_rows(Vec::new()), Err(RuntimeError::InvalidConfig(_))));
    }

    #[test]
    fn test_no_rows_rejected() {
        let trainer = TemporalTrainer::default();
        assert!(matches!(trainer.fit_rows(Vec::new()), Err(RuntimeError::InsufficientData(_))));
    }
}
