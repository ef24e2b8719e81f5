use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::stats::{sort_readings, valid_readings, IvDataPoint};
use serde::Serialize;

/// Historical IV distribution summarised at fixed percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileBands {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

/// 10/25/50/75/90th percentiles of the filtered history.
pub fn percentile_bands(history: &[IvDataPoint]) -> AnalyticsResult<PercentileBands> {
    let mut values = valid_readings(history);
    if values.is_empty() {
        return Err(AnalyticsError::EmptyHistory);
    }
    sort_readings(&mut values);

    Ok(PercentileBands {
        p10: interpolated_percentile(&values, 10.0),
        p25: interpolated_percentile(&values, 25.0),
        p50: interpolated_percentile(&values, 50.0),
        p75: interpolated_percentile(&values, 75.0),
        p90: interpolated_percentile(&values, 90.0),
    })
}

/// Linear-interpolated percentile of a non-empty ascending slice.
///
/// index = p/100 * (n-1), interpolated between floor(index) and ceil(index).
pub fn interpolated_percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let index = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = index.floor() as usize;
    let hi = index.ceil() as usize;
    let weight = index - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * weight
}
