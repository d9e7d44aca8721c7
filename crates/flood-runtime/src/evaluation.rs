//! Sanity evaluation of a scored table
//!
//! Compares monthly mean scores against a seasonal event-intensity proxy and
//! measures how far apart the top and bottom score quintiles sit.

use crate::error::{Result, RuntimeError};
use crate::inference::average_rank_descending;
use flood_core::{month_from_label, ScoredRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Seasonal flood-event intensity for a calendar month
///
/// Peak season (Aug-Oct) is 1.0, its shoulders (Jun, Jul, Nov) 0.35, the
/// rest of the year 0.1.
pub fn historical_event_proxy(month: u32) -> f64 {
    match month {
        8..=10 => 1.0,
        6 | 7 | 11 => 0.35,
        _ => 0.1,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyScore {
    pub year_month: String,
    pub mean_score: f64,
    pub historical_event_proxy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// `None` when either series is constant
    pub rank_correlation_spearman: Option<f64>,
    pub high_vs_low_vulnerability_gap: f64,
    pub high_vulnerability_mean: f64,
    pub low_vulnerability_mean: f64,
    pub months_evaluated: usize,
}

/// Mean score per `year_month`, ordered by label
pub fn monthly_mean_scores(rows: &[ScoredRow]) -> Result<Vec<MonthlyScore>> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = groups.entry(row.year_month.as_str()).or_insert((0.0, 0));
        entry.0 += row.vulnerability_score;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(label, (sum, count))| -> Result<MonthlyScore> {
            Ok(MonthlyScore {
                year_month: label.to_string(),
                mean_score: sum / count as f64,
                historical_event_proxy: historical_event_proxy(month_from_label(label)?),
            })
        })
        .collect()
}

/// Spearman rank correlation with average ranks for ties
pub fn spearman_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    pearson_correlation(&average_rank_descending(a), &average_rank_descending(b))
}

fn pearson_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a * var_b).sqrt())
}

/// Quantile of sorted values with linear interpolation between neighbours
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (position - lo as f64))
}

/// Evaluate a scored table
pub fn evaluate_scores(rows: &[ScoredRow]) -> Result<EvaluationReport> {
    if rows.is_empty() {
        return Err(RuntimeError::EmptyInput("evaluation"));
    }

    let monthly = monthly_mean_scores(rows)?;
    let means: Vec<f64> = monthly.iter().map(|m| m.mean_score).collect();
    let proxies: Vec<f64> = monthly.iter().map(|m| m.historical_event_proxy).collect();
    let rank_correlation_spearman = spearman_correlation(&means, &proxies);
    if rank_correlation_spearman.is_none() {
        warn!("Spearman correlation undefined over {} months", monthly.len());
    }

    let mut scores: Vec<f64> = rows.iter().map(|r| r.vulnerability_score).collect();
    scores.sort_by(f64::total_cmp);
    let (Some(q80), Some(q20)) = (quantile(&scores, 0.8), quantile(&scores, 0.2)) else {
        return Err(RuntimeError::EmptyInput("evaluation"));
    };

    let high_vulnerability_mean = mean_where(&scores, |s| s >= q80);
    let low_vulnerability_mean = mean_where(&scores, |s| s <= q20);

    let report = EvaluationReport {
        rank_correlation_spearman,
        high_vs_low_vulnerability_gap: high_vulnerability_mean - low_vulnerability_mean,
        high_vulnerability_mean,
        low_vulnerability_mean,
        months_evaluated: monthly.len(),
    };
    info!(
        "Evaluated {} months: spearman={:?}, high/low gap={:.6}",
        report.months_evaluated, report.rank_correlation_spearman, report.high_vs_low_vulnerability_gap
    );
    Ok(report)
}

fn mean_where(values: &[f64], keep: impl Fn(f64) -> bool) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|&&v| keep(v))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    sum / count as f64
}
