//! Feature columns
//!
//! The raw feature set is closed: five per-tile monthly signals, always
//! handled in the order of [`FeatureColumn::ALL`]. The temporal feature
//! vector is laid out as five blocks of that order:
//! raw, lag1, lag2, lag3, roll3.

use serde::{Deserialize, Serialize};

/// Number of raw feature columns
pub const RAW_FEATURE_COUNT: usize = 5;

/// Lag depths attached to every raw feature
pub const LAGS: [usize; 3] = [1, 2, 3];

/// Trailing window (current row included) of the rolling mean
pub const ROLLING_WINDOW: usize = 3;

/// raw + three lags + rolling mean, per raw feature
pub const TEMPORAL_FEATURE_COUNT: usize = RAW_FEATURE_COUNT * (1 + LAGS.len() + 1);

/// Raw per-tile monthly feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    /// Fraction of SAR acquisitions showing standing water, in [0, 1]
    SarWaterPersistence,
    /// Monthly rainfall total
    RainfallAccumulation,
    /// Terrain-derived low-lying score, in [0, 1]
    LowLyingScore,
    /// Impervious surface change rate, in [0, 0.2]
    ImperviousChangeRate,
    /// Population exposure, in [0, 1]
    PopulationExposure,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; RAW_FEATURE_COUNT] = [
        FeatureColumn::SarWaterPersistence,
        FeatureColumn::RainfallAccumulation,
        FeatureColumn::LowLyingScore,
        FeatureColumn::ImperviousChangeRate,
        FeatureColumn::PopulationExposure,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureColumn::SarWaterPersistence => "sar_water_persistence",
            FeatureColumn::RainfallAccumulation => "rainfall_accumulation",
            FeatureColumn::LowLyingScore => "low_lying_score",
            FeatureColumn::ImperviousChangeRate => "impervious_change_rate",
            FeatureColumn::PopulationExposure => "population_exposure",
        }
    }

    /// Weight in the proxy vulnerability target. Weights sum to 1.0.
    pub fn proxy_weight(&self) -> f64 {
        match self {
            FeatureColumn::SarWaterPersistence => 0.25,
            FeatureColumn::RainfallAccumulation => 0.35,
            FeatureColumn::LowLyingScore => 0.20,
            FeatureColumn::ImperviousChangeRate => 0.10,
            FeatureColumn::PopulationExposure => 0.10,
        }
    }

    /// Whether the proxy target divides this column by its table-wide maximum
    pub fn scaled_by_table_max(&self) -> bool {
        matches!(
            self,
            FeatureColumn::RainfallAccumulation | FeatureColumn::ImperviousChangeRate
        )
    }
}

/// Which columns of the temporal vector a model consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// Raw columns only
    Baseline,
    /// Raw columns plus every lag and rolling column
    Temporal,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        match self {
            FeatureSet::Baseline => RAW_FEATURE_COUNT,
            FeatureSet::Temporal => TEMPORAL_FEATURE_COUNT,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names in vector order
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = FeatureColumn::ALL.iter().map(|c| c.name().to_string()).collect();
        if *self == FeatureSet::Temporal {
            for lag in LAGS {
                names.extend(FeatureColumn::ALL.iter().map(|c| format!("{}_lag{}", c.name(), lag)));
            }
            names.extend(
                FeatureColumn::ALL
                    .iter()
                    .map(|c| format!("{}_roll{}", c.name(), ROLLING_WINDOW)),
            );
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_weights_sum_to_one() {
        let total: f64 = FeatureColumn::ALL.iter().map(|c| c.proxy_weight()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_temporal_column_layout() {
        let names = FeatureSet::Temporal.column_names();
        assert_eq!(names.len(), TEMPORAL_FEATURE_COUNT);
        assert_eq!(names[0], "sar_water_persistence");
        assert_eq!(names[5], "sar_water_persistence_lag1");
        assert_eq!(names[10], "sar_water_persistence_lag2");
        assert_eq!(names[15], "sar_water_persistence_lag3");
        assert_eq!(names[20], "sar_water_persistence_roll3");
        assert_eq!(names[24], "population_exposure_roll3");
    }

    #[test]
    fn test_baseline_is_raw_prefix() {
        let baseline = FeatureSet::Baseline.column_names();
        let temporal = FeatureSet::Temporal.column_names();
        assert_eq!(baseline.len(), 5);
        assert_eq!(&temporal[..5], &baseline[..]);
    }
}
