use crate::errors::{require_finite, AnalyticsError, AnalyticsResult};
use crate::stats::{sort_readings, valid_readings, IvDataPoint};
use serde::Serialize;
use statrs::statistics::Statistics;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IvStatsResult {
    pub rank: f64,
    pub percentile: f64,
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub days_in_sample: usize,
}

/// Summarise `history` and place `current_iv` within it.
///
/// rank       = (current - min) / (max - min)     in [0, 1], 0.5 for a flat history
/// percentile = 100 * #{h <= current} / n          in [0, 100]
///
/// Mean and population standard deviation (divide by N) come from statrs;
/// the median averages the two middle readings when N is even.
///
/// Fails with `EmptyHistory` when no reading survives the sanity filter.
pub fn compute_stats(history: &[IvDataPoint], current_iv: f64) -> AnalyticsResult<IvStatsResult> {
    require_finite("current_iv", current_iv)?;

    let mut values = valid_readings(history);
    if values.is_empty() {
        return Err(AnalyticsError::EmptyHistory);
    }
    sort_readings(&mut values);

    let n = values.len();
    let min = values[0];
    let max = values[n - 1];

    let rank = if max == min {
        0.5
    } else {
        ((current_iv - min) / (max - min)).clamp(0.0, 1.0)
    };

    let at_or_below = values.iter().filter(|&&v| v <= current_iv).count();
    let percentile = (100.0 * at_or_below as f64 / n as f64).clamp(0.0, 100.0);

    let mean = values.iter().mean();
    let std_dev = values.iter().population_std_dev();

    tracing::debug!(n, current_iv, rank, percentile, "iv stats computed");

    Ok(IvStatsResult {
        rank,
        percentile,
        current: current_iv,
        min,
        max,
        mean,
        median: median_of_sorted(&values),
        std_dev,
        days_in_sample: n,
    })
}

/// Median of a non-empty ascending slice.
#[inline]
pub(crate) fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    } else {
        sorted[n / 2]
    }
}
