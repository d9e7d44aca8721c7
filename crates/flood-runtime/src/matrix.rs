//! Design matrices from temporal rows

use crate::error::{Result, RuntimeError};
use flood_core::{FeatureSet, LabeledRow, TemporalRow};
use ndarray::Array2;

/// Stack the feature-set columns of each row into an `n x k` matrix
pub fn design_matrix<'a>(
    rows: impl IntoIterator<Item = &'a TemporalRow>,
    set: FeatureSet,
) -> Result<Array2<f64>> {
    let width = set.len();
    let mut values = Vec::new();
    let mut count = 0;

    for row in rows {
        let slice = row.feature_slice(set);
        if slice.len() != width {
            return Err(RuntimeError::ShapeMismatch(format!(
                "row for tile '{}' at {} has {} feature values, expected {}",
                row.tile_id,
                row.year_month,
                slice.len(),
                width
            )));
        }
        values.extend_from_slice(slice);
        count += 1;
    }

    Array2::from_shape_vec((count, width), values)
        .map_err(|e| RuntimeError::ShapeMismatch(e.to_string()))
}

pub fn labels<'a>(rows: impl IntoIterator<Item = &'a LabeledRow>) -> Vec<f64> {
    rows.into_iter().map(|r| r.label).collect()
}
