//! Tree ensembles: random forest and extremely randomized trees
//!
//! Trees are fitted in parallel. Each tree owns a ChaCha8 stream seeded from
//! the model seed and the tree's index, so the fitted ensemble does not
//! depend on thread scheduling.

use super::check_predict_input;
use super::tree::{RegressionTree, SplitStrategy, TreeParams};
use crate::error::{Result, RuntimeError};
use ndarray::ArrayView2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
}

fn default_min_samples_leaf() -> usize {
    1
}

impl ForestParams {
    pub fn new(n_estimators: usize, max_depth: Option<usize>, min_samples_leaf: usize) -> Self {
        Self {
            n_estimators,
            max_depth,
            min_samples_leaf,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(RuntimeError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(RuntimeError::InvalidConfig(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A fitted ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub params: ForestParams,
    pub strategy: SplitStrategy,
    pub bootstrap: bool,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl ForestModel {
    /// Bootstrap samples, best split per feature
    pub fn fit_random_forest(params: ForestParams, x: ArrayView2<f64>, y: &[f64], seed: u64) -> Result<Self> {
        Self::fit(params, SplitStrategy::Best, true, x, y, seed)
    }

    /// Whole training set, random threshold per feature
    pub fn fit_extra_trees(params: ForestParams, x: ArrayView2<f64>, y: &[f64], seed: u64) -> Result<Self> {
        Self::fit(params, SplitStrategy::Random, false, x, y, seed)
    }

    fn fit(
        params: ForestParams,
        strategy: SplitStrategy,
        bootstrap: bool,
        x: ArrayView2<f64>,
        y: &[f64],
        seed: u64,
    ) -> Result<Self> {
        params.validate()?;
        let n = x.nrows();
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_leaf: params.min_samples_leaf,
            min_samples_split: 2,
            strategy,
        };

        let trees: Vec<RegressionTree> = (0..params.n_estimators)
            .into_par_iter()
            .map(|index| {
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed(seed, index));
                let samples: Vec<usize> = if bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(x, y, samples, &tree_params, &mut rng)
            })
            .collect();

        Ok(Self {
            params,
            strategy,
            bootstrap,
            n_features: x.ncols(),
            trees,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Mean of the per-tree predictions
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<f64>> {
        check_predict_input(x, self.n_features)?;
        let count = self.trees.len() as f64;
        Ok((0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / count
            })
            .collect())
    }

    /// Mean decrease in impurity, normalized to sum to 1
    ///
    /// Each tree's decreases are normalized first; trees that never split
    /// contribute zeros.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            let decrease = tree.impurity_decrease();
            let sum: f64 = decrease.iter().sum();
            if sum > 0.0 {
                for (total, d) in totals.iter_mut().zip(decrease) {
                    *total += d / sum;
                }
            }
        }

        let grand: f64 = totals.iter().sum();
        if grand > 0.0 {
            for total in &mut totals {
                *total /= grand;
            }
        }
        totals
    }
}

fn tree_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(index as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn dataset() -> (Array2<f64>, Vec<f64>) {
        let n = 120;
        let mut x = Array2::<f64>::zeros((n, 3));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let a = (i % 10) as f64 / 10.0;
            let b = ((i * 7) % 13) as f64 / 13.0;
            x[[i, 0]] = a;
            x[[i, 1]] = b;
            x[[i, 2]] = ((i / 10) % 3) as f64;
            y.push(3.0 * a + 0.2 * b);
        }
        (x, y)
    }

    #[test]
    fn test_same_seed_same_model() {
        let (x, y) = dataset();
        let params = ForestParams::new(8, None, 1);
        let first = ForestModel::fit_random_forest(params, x.view(), &y, 42).unwrap();
        let second = ForestModel::fit_random_forest(params, x.view(), &y, 42).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.predict(x.view()).unwrap(), second.predict(x.view()).unwrap());
    }

    #[test]
    fn test_extra_trees_deterministic_and_accurate() {
        let (x, y) = dataset();
        let params = ForestParams::new(10, None, 1);
        let first = ForestModel::fit_extra_trees(params, x.view(), &y, 3).unwrap();
        let second = ForestModel::fit_extra_trees(params, x.view(), &y, 3).unwrap();
        assert_eq!(first, second);

        let predicted = first.predict(x.view()).unwrap();
        let mae: f64 = predicted.iter().zip(&y).map(|(p, t)| (p - t).abs()).sum::<f64>() / y.len() as f64;
        assert!(mae < 0.05, "mae = {}", mae);
    }

    #[test]
    fn test_importances_favor_informative_feature() {
        let (x, y) = dataset();
        let model = ForestModel::fit_random_forest(ForestParams::new(16, None, 2), x.view(), &y, 42).unwrap();
        let importances = model.feature_importances();
        assert_eq!(importances.len(), 3);
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
        assert!(importances[0] > importances[2]);
    }

    #[test]
    fn test_invalid_params() {
        let (x, y) = dataset();
        assert!(matches!(
            ForestModel::fit_random_forest(ForestParams::new(0, None, 1), x.view(), &y, 0),
            Err(RuntimeError::InvalidConfig(_))
        ));
        assert!(matches!(
            ForestModel::fit_extra_trees(ForestParams::new(4, None, 0), x.view(), &y, 0),
            Err(RuntimeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_predict_checks_width() {
        let (x, y) = dataset();
        let model = ForestModel::fit_random_forest(ForestParams::new(2, Some(3), 1), x.view(), &y, 0).unwrap();
        let narrow = Array2::<f64>::zeros((2, 2));
        assert!(matches!(model.predict(narrow.view()), Err(RuntimeError::ShapeMismatch(_))));
    }
}
