//! L2-regularized linear regression

use super::check_predict_input;
use crate::error::{Result, RuntimeError};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RidgeParams {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_alpha() -> f64 {
    1.0
}

impl Default for RidgeParams {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
        }
    }
}

/// A fitted ridge model; the intercept is not penalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeModel {
    pub params: RidgeParams,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl RidgeModel {
    /// Solve `(Xcᵀ Xc + αI) w = Xcᵀ yc` on mean-centered data
    pub fn fit(params: RidgeParams, x: ArrayView2<f64>, y: &[f64]) -> Result<Self> {
        if params.alpha < 0.0 || !params.alpha.is_finite() {
            return Err(RuntimeError::InvalidConfig(format!(
                "ridge alpha must be a non-negative number, got {}",
                params.alpha
            )));
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or(RuntimeError::EmptyInput("ridge"))?;
        let y_mean = y.iter().sum::<f64>() / y.len() as f64;

        let centered = &x - &x_mean;
        let targets = Array1::from_iter(y.iter().map(|v| v - y_mean));

        let mut gram = centered.t().dot(&centered);
        for i in 0..gram.nrows() {
            gram[[i, i]] += params.alpha;
        }
        let rhs = centered.t().dot(&targets);

        let coefficients = solve(&gram, &rhs)?;
        let intercept = y_mean - coefficients.dot(&x_mean);

        Ok(Self {
            params,
            coefficients: coefficients.to_vec(),
            intercept,
        })
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<f64>> {
        check_predict_input(x, self.coefficients.len())?;
        let weights = Array1::from(self.coefficients.clone());
        Ok(x.dot(&weights).iter().map(|v| v + self.intercept).collect())
    }
}

/// Solve the symmetric positive definite system through its Cholesky factor
fn solve(gram: &Array2<f64>, rhs: &Array1<f64>) -> Result<Array1<f64>> {
    let n = rhs.len();
    let system = DMatrix::from_fn(n, n, |i, j| gram[[i, j]]);
    let target = DVector::from_iterator(n, rhs.iter().copied());
    let solution = system
        .cholesky()
        .ok_or(RuntimeError::SingularSystem)?
        .solve(&target);
    Ok(Array1::from_iter(solution.iter().copied()))
}
