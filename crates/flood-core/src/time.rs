//! Time bucket helpers
//!
//! A time bucket is a (year, month) pair encoded as `year * 100 + month`.
//! The encoding sorts the same way time does, which is what the
//! chronological splitter relies on.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Sortable (year, month) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeBucket(i64);

impl TimeBucket {
    /// Create a bucket from a year and a 1-based month
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidMonth(month));
        }
        Ok(Self(year as i64 * 100 + month as i64))
    }

    pub fn id(&self) -> i64 {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.div_euclid(100) as i32
    }

    pub fn month(&self) -> u32 {
        self.0.rem_euclid(100) as u32
    }

    /// `YYYY_MM` label used as the time window column
    pub fn year_month(&self) -> String {
        format!("{:04}_{:02}", self.year(), self.month())
    }
}

/// Parse the month out of a `YYYY_MM` label
pub fn month_from_label(label: &str) -> Result<u32> {
    let (_, month) = label
        .rsplit_once('_')
        .ok_or_else(|| CoreError::InvalidValue(format!("malformed year_month label '{}'", label)))?;
    let month: u32 = month
        .parse()
        .map_err(|_| CoreError::InvalidValue(format!("malformed year_month label '{}'", label)))?;
    if !(1..=12).contains(&month) {
        return Err(CoreError::InvalidMonth(month));
    }
    Ok(month)
}
