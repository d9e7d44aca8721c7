//! Score normalization and ranking

use crate::error::{Result, RuntimeError};
use crate::matrix::design_matrix;
use crate::model::Regressor;
use flood_core::{FeatureSet, ScoredRow, TemporalRow};
use tracing::info;

/// Added to the score range; only the denominator is protected
pub const SCORE_EPSILON: f64 = 1e-9;

/// Min-max normalize a batch of raw predictions
///
/// `(raw - min) / (max - min + 1e-9)`. When every prediction is equal all
/// scores are 0.
pub fn normalize_scores(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    raw.iter().map(|v| (v - min) / (max - min + SCORE_EPSILON)).collect()
}

/// 1-based ranks, highest score first; ties share the mean of their positions
pub fn average_rank_descending(scores: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // positions start+1 ..= end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = rank;
        }
        start = end;
    }
    ranks
}

/// Predict, normalize and rank a batch of inference rows
pub fn score_rows(model: &Regressor, rows: &[TemporalRow]) -> Result<Vec<ScoredRow>> {
    if rows.is_empty() {
        return Err(RuntimeError::EmptyInput("inference"));
    }

    let x = design_matrix(rows, FeatureSet::Temporal)?;
    let raw = model.predict(x.view())?;
    let scores = normalize_scores(&raw);
    let ranks = average_rank_descending(&scores);

    info!("Scored {} tile-months", rows.len());

    Ok(rows
        .iter()
        .zip(scores.into_iter().zip(ranks))
        .map(|(row, (score, rank))| ScoredRow {
            tile_id: row.tile_id.clone(),
            year: row.year,
            month: row.month,
            year_month: row.year_month.clone(),
            lon: row.lon,
            lat: row.lat,
            vulnerability_score: score,
            vulnerability_rank: rank,
        })
        .collect())
}
