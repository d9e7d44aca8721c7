//! Regression error metrics

use crate::error::{Result, RuntimeError};
use serde::{Deserialize, Serialize};

/// MAE and R² on one evaluation set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> Result<Self> {
        Ok(Self {
            mae: mean_absolute_error(y_true, y_pred)?,
            r2: r2_score(y_true, y_pred)?,
        })
    }
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let total: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()).sum();
    Ok(total / y_true.len() as f64)
}

/// Coefficient of determination
///
/// When the targets are constant the score is 1.0 for a perfect fit and
/// 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.is_empty() {
        return Err(RuntimeError::EmptyInput("metric"));
    }
    if y_true.len() != y_pred.len() {
        return Err(RuntimeError::ShapeMismatch(format!(
            "{} targets vs {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mae() {
        let mae = mean_absolute_error(&[1.0, 2.0, 3.0], &[1.5, 2.0, 2.0]).unwrap();
        assert!((mae - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_r2_perfect_and_mean() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert!((r2_score(&y, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!(r2_score(&y, &[2.5; 4]).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_r2_constant_targets() {
        assert_eq!(r2_score(&[2.0, 2.0], &[2.0, 2.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&[2.0, 2.0], &[1.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_shape_errors() {
        assert!(matches!(
            mean_absolute_error(&[1.0], &[1.0, 2.0]),
            Err(RuntimeError::ShapeMismatch(_))
        ));
        assert!(matches!(r2_score(&[], &[]), Err(RuntimeError::EmptyInput(_))));
    }
}
