pub mod iv_rank;
pub mod trend;
pub mod bands;
pub mod realized;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Readings at or above this are treated as corrupt (1000% vol).
const MAX_SANE_IV: f64 = 10.0;

/// One historical volatility observation. Read-only input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvDataPoint {
    pub date: NaiveDate,
    /// Implied volatility as a fraction (0.22 = 22%).
    pub iv: f64,
    /// Underlying close on `date`, when the series carries one.
    #[serde(default)]
    pub close: Option<f64>,
}

impl IvDataPoint {
    /// Finite, strictly positive and below the sanity bound.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.iv.is_finite() && self.iv > 0.0 && self.iv < MAX_SANE_IV
    }
}

/// IV readings that pass the sanity filter, in input order.
pub fn valid_readings(history: &[IvDataPoint]) -> Vec<f64> {
    history.iter().filter(|p| p.is_valid()).map(|p| p.iv).collect()
}

/// Valid points ordered by date (stable for equal dates).
pub(crate) fn valid_points_by_date(history: &[IvDataPoint]) -> Vec<IvDataPoint> {
    let mut points: Vec<IvDataPoint> = history.iter().filter(|p| p.is_valid()).copied().collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Ascending sort for already-filtered (NaN-free) readings.
#[inline]
pub(crate) fn sort_readings(values: &mut [f64]) {
    values.sort_by(f64::total_cmp);
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::IvDataPoint;
    use chrono::{Days, NaiveDate};

    /// Consecutive daily points starting 2026-01-01.
    pub fn series(ivs: &[f64]) -> Vec<IvDataPoint> {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        ivs.iter()
            .enumerate()
            .map(|(i, &iv)| IvDataPoint {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                iv,
                close: None,
            })
            .collect()
    }
}
