//! Chronological train/validation/test split
//!
//! Partitions labeled rows by time bucket so that validation and test
//! always lie strictly after the training period.

use crate::error::{Result, RuntimeError};
use flood_core::LabeledRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Number of trailing buckets per held-out partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_holdout_buckets")]
    pub validation_buckets: usize,
    #[serde(default = "default_holdout_buckets")]
    pub test_buckets: usize,
}

fn default_holdout_buckets() -> usize {
    12
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            validation_buckets: default_holdout_buckets(),
            test_buckets: default_holdout_buckets(),
        }
    }
}

impl SplitConfig {
    /// Distinct buckets needed before a split is attempted
    pub fn required_buckets(&self) -> usize {
        self.validation_buckets + self.test_buckets
    }
}

/// Partition a bucket is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Train,
    Validation,
    Test,
}

/// Boundary bucket ids of the three partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitBoundaries {
    pub train_end: i64,
    pub val_start: i64,
    pub val_end: i64,
    pub test_start: i64,
    pub test_end: i64,
}

/// The three disjoint row subsets
#[derive(Debug, Clone)]
pub struct ChronologicalSplit {
    pub train: Vec<LabeledRow>,
    pub validation: Vec<LabeledRow>,
    pub test: Vec<LabeledRow>,
    pub boundaries: SplitBoundaries,
}

impl ChronologicalSplit {
    /// Train and validation rows, in that order
    pub fn train_validation(&self) -> Vec<&LabeledRow> {
        self.train.iter().chain(self.validation.iter()).collect()
    }
}

/// First bucket ids of the two held-out partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionCutoffs {
    pub val_start: i64,
    pub test_start: i64,
}

impl PartitionCutoffs {
    /// Every id maps to exactly one partition, including ids that were not
    /// seen when the cutoffs were computed
    pub fn partition_of(&self, time_id: i64) -> Partition {
        if time_id >= self.test_start {
            Partition::Test
        } else if time_id >= self.val_start {
            Partition::Validation
        } else {
            Partition::Train
        }
    }
}

/// Cutoffs over the distinct bucket ids
///
/// The most recent `test_buckets` ids are test, the preceding
/// `validation_buckets` are validation, all earlier ids are train.
pub fn assign_partitions(time_ids: &BTreeSet<i64>, config: &SplitConfig) -> Result<PartitionCutoffs> {
    let required = config.required_buckets();
    if time_ids.len() < required {
        return Err(RuntimeError::InsufficientHistory {
            found: time_ids.len(),
            required,
        });
    }

    let held_out: Vec<i64> = time_ids.iter().copied().skip(time_ids.len() - required).collect();
    let test_start = *held_out
        .get(config.validation_buckets)
        .ok_or(RuntimeError::EmptyPartition { partition: "test" })?;
    Ok(PartitionCutoffs {
        val_start: held_out[0],
        test_start,
    })
}

/// Split labeled rows chronologically
///
/// Fails when fewer than `validation_buckets + test_buckets` distinct
/// buckets exist, or when any partition ends up empty (with exactly the
/// required number of buckets the train partition is empty).
pub fn chronological_split(rows: Vec<LabeledRow>, config: &SplitConfig) -> Result<ChronologicalSplit> {
    let time_ids: BTreeSet<i64> = rows.iter().map(|r| r.time_id()).collect();
    let cutoffs = assign_partitions(&time_ids, config)?;

    let mut train = Vec::new();
    let mut validation = Vec::new();
    let mut test = Vec::new();
    for row in rows {
        match cutoffs.partition_of(row.time_id()) {
            Partition::Train => train.push(row),
            Partition::Validation => validation.push(row),
            Partition::Test => test.push(row),
        }
    }

    let train_end = max_time(&train).ok_or(RuntimeError::EmptyPartition { partition: "train" })?;
    let (val_start, val_end) =
        time_range(&validation).ok_or(RuntimeError::EmptyPartition { partition: "validation" })?;
    let (test_start, test_end) =
        time_range(&test).ok_or(RuntimeError::EmptyPartition { partition: "test" })?;

    info!(
        "Chronological split: train={} rows (<= {}), validation={} rows ({}..={}), test={} rows ({}..={})",
        train.len(),
        train_end,
        validation.len(),
        val_start,
        val_end,
        test.len(),
        test_start,
        test_end
    );

    Ok(ChronologicalSplit {
        train,
        validation,
        test,
        boundaries: SplitBoundaries {
            train_end,
            val_start,
            val_end,
            test_start,
            test_end,
        },
    })
}

fn max_time(rows: &[LabeledRow]) -> Option<i64> {
    rows.iter().map(|r| r.time_id()).max()
}

fn time_range(rows: &[LabeledRow]) -> Option<(i64, i64)> {
    let min = rows.iter().map(|r| r.time_id()).min()?;
    let max = rows.iter().map(|r| r.time_id()).max()?;
    Some((min, max))
}
