//! Regression model families
//!
//! [`ModelSpec`] is a hyperparameter configuration, [`Regressor`] a fitted
//! model. Both are closed enums over the four families the trainer knows
//! about and serialize with a `family` tag.

pub mod boosting;
pub mod forest;
pub mod linear;
pub mod tree;

pub use boosting::{BoostingModel, BoostingParams, EarlyStopping};
pub use forest::{ForestModel, ForestParams};
pub use linear::{RidgeModel, RidgeParams};
pub use tree::{RegressionTree, SplitStrategy, TreeNode, TreeParams};

use crate::error::{Result, RuntimeError};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hyperparameters of one model configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelSpec {
    Ridge(RidgeParams),
    RandomForest(ForestParams),
    ExtraTrees(ForestParams),
    HistGbrt(BoostingParams),
}

impl ModelSpec {
    /// Family name used in reports
    pub fn family(&self) -> &'static str {
        match self {
            ModelSpec::Ridge(_) => "ridge",
            ModelSpec::RandomForest(_) => "random_forest",
            ModelSpec::ExtraTrees(_) => "extra_trees",
            ModelSpec::HistGbrt(_) => "hist_gbrt",
        }
    }

    /// Fit on a feature matrix and targets
    ///
    /// `seed` drives bootstrap sampling, random thresholds and the boosting
    /// early-stopping holdout; ridge ignores it.
    pub fn fit(&self, x: ArrayView2<f64>, y: &[f64], seed: u64) -> Result<Regressor> {
        check_fit_input(x, y, self.family())?;
        Ok(match *self {
            ModelSpec::Ridge(params) => Regressor::Ridge(RidgeModel::fit(params, x, y)?),
            ModelSpec::RandomForest(params) => {
                Regressor::RandomForest(ForestModel::fit_random_forest(params, x, y, seed)?)
            }
            ModelSpec::ExtraTrees(params) => {
                Regressor::ExtraTrees(ForestModel::fit_extra_trees(params, x, y, seed)?)
            }
            ModelSpec::HistGbrt(params) => Regressor::HistGbrt(BoostingModel::fit(params, x, y, seed)?),
        })
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSpec::Ridge(p) => write!(f, "ridge(alpha={})", p.alpha),
            ModelSpec::RandomForest(p) | ModelSpec::ExtraTrees(p) => write!(
                f,
                "{}(n_estimators={}, max_depth={}, min_samples_leaf={})",
                self.family(),
                p.n_estimators,
                depth_label(p.max_depth),
                p.min_samples_leaf
            ),
            ModelSpec::HistGbrt(p) => write!(
                f,
                "hist_gbrt(max_depth={}, learning_rate={}, max_iter={})",
                depth_label(p.max_depth),
                p.learning_rate,
                p.max_iter
            ),
        }
    }
}

fn depth_label(depth: Option<usize>) -> String {
    depth.map_or_else(|| "none".to_string(), |d| d.to_string())
}

/// A fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Regressor {
    Ridge(RidgeModel),
    RandomForest(ForestModel),
    ExtraTrees(ForestModel),
    HistGbrt(BoostingModel),
}

impl Regressor {
    /// The configuration this model was fitted with
    pub fn spec(&self) -> ModelSpec {
        match self {
            Regressor::Ridge(m) => ModelSpec::Ridge(m.params),
            Regressor::RandomForest(m) => ModelSpec::RandomForest(m.params),
            Regressor::ExtraTrees(m) => ModelSpec::ExtraTrees(m.params),
            Regressor::HistGbrt(m) => ModelSpec::HistGbrt(m.params),
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Regressor::Ridge(m) => m.coefficients.len(),
            Regressor::RandomForest(m) | Regressor::ExtraTrees(m) => m.n_features(),
            Regressor::HistGbrt(m) => m.n_features(),
        }
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<f64>> {
        match self {
            Regressor::Ridge(m) => m.predict(x),
            Regressor::RandomForest(m) | Regressor::ExtraTrees(m) => m.predict(x),
            Regressor::HistGbrt(m) => m.predict(x),
        }
    }

    /// Impurity-based importances; only the forest families expose them
    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        match self {
            Regressor::RandomForest(m) | Regressor::ExtraTrees(m) => Some(m.feature_importances()),
            Regressor::Ridge(_) | Regressor::HistGbrt(_) => None,
        }
    }
}

pub(crate) fn check_fit_input(x: ArrayView2<f64>, y: &[f64], family: &'static str) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(RuntimeError::EmptyInput(family));
    }
    if x.nrows() != y.len() {
        return Err(RuntimeError::ShapeMismatch(format!(
            "{} rows vs {} targets",
            x.nrows(),
            y.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(RuntimeError::NonFiniteInput(family));
    }
    Ok(())
}

pub(crate) fn check_predict_input(x: ArrayView2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(RuntimeError::ShapeMismatch(format!(
            "model expects {} features, got {}",
            n_features,
            x.ncols()
        )));
    }
    Ok(())
}
