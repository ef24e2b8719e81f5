use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::stats::{valid_points_by_date, IvDataPoint};
use serde::Serialize;

/// Change (in percent) beyond which the trend is directional.
const DIRECTION_THRESHOLD_PCT: f64 = 2.0;
/// Absolute change (in percent) below which a trend is weak.
const WEAK_BELOW_PCT: f64 = 5.0;
/// Absolute change (in percent) below which a trend is moderate.
const MODERATE_BELOW_PCT: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Expanding,
    Contracting,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStrength {
    Weak,
    Moderate,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolTrend {
    pub direction: TrendDirection,
    pub strength: TrendStrength,
    pub change_pct: f64,
    pub first: f64,
    pub last: f64,
    pub points_used: usize,
}

/// Direction and strength of the IV move over the most recent `lookback_days` points.
///
/// change = 100 * (last - first) / first over the window.
/// History is filtered and ordered by date first.
pub fn detect_trend(history: &[IvDataPoint], lookback_days: usize) -> AnalyticsResult<VolTrend> {
    if lookback_days == 0 {
        return Err(AnalyticsError::InvalidInput("lookback_days must be at least 1".into()));
    }

    let points = valid_points_by_date(history);
    if points.is_empty() {
        return Err(AnalyticsError::EmptyHistory);
    }

    let window = &points[points.len().saturating_sub(lookback_days)..];
    let first = window[0].iv;
    let last = window[window.len() - 1].iv;
    let change_pct = 100.0 * (last - first) / first;

    Ok(VolTrend {
        direction: classify_direction(change_pct),
        strength: classify_strength(change_pct),
        change_pct,
        first,
        last,
        points_used: window.len(),
    })
}

#[inline]
fn classify_direction(change_pct: f64) -> TrendDirection {
    if change_pct > DIRECTION_THRESHOLD_PCT {
        TrendDirection::Expanding
    } else if change_pct < -DIRECTION_THRESHOLD_PCT {
        TrendDirection::Contracting
    } else {
        TrendDirection::Stable
    }
}

#[inline]
fn classify_strength(change_pct: f64) -> TrendStrength {
    let magnitude = change_pct.abs();
    if magnitude < WEAK_BELOW_PCT {
        TrendStrength::Weak
    } else if magnitude < MODERATE_BELOW_PCT {
        TrendStrength::Moderate
    } else {
        TrendStrength::Strong
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures::series;

    #[test]
    fn test_expanding_strong() {
        // Only the last three points count: 0.20 -> 0.30 is +50%
        let history = series(&[0.50, 0.10, 0.20, 0.25, 0.30]);
        let t = detect_trend(&history, 3).unwrap();
        assert_eq!(t.direction, TrendDirection::Expanding);
        assert_eq!(t.strength, TrendStrength::Strong);
        assert_eq!(t.points_used, 3);
        assert!((t.change_pct - 50.0).abs() < 1e-9, "change={}", t.change_pct);
    }

    #[test]
    fn test_contracting_moderate() {
        let history = series(&[0.30, 0.29, 0.28, 0.27]);
        let t = detect_trend(&history, 10).unwrap();
        assert_eq!(t.direction, TrendDirection::Contracting);
        assert_eq!(t.strength, TrendStrength::Moderate);
        assert_eq!(t.points_used, 4);
    }

    #[test]
    fn test_stable_weak() {
        let history = series(&[0.200, 0.201, 0.203]);
        let t = detect_trend(&history, 3).unwrap();
        assert_eq!(t.direction, TrendDirection::Stable);
        assert_eq!(t.strength, TrendStrength::Weak);
    }

    #[test]
    fn test_directional_but_weak() {
        // +3%: past the direction threshold, still under the weak bound
        let t = detect_trend(&series(&[0.20, 0.206]), 2).unwrap();
        assert_eq!(t.direction, TrendDirection::Expanding);
        assert_eq!(t.strength, TrendStrength::Weak);
    }

    #[test]
    fn test_uses_date_order_not_input_order() {
        let mut history = series(&[0.20, 0.30]);
        history.reverse();
        let t = detect_trend(&history, 2).unwrap();
        assert_eq!(t.direction, TrendDirection::Expanding);
    }

    #[test]
    fn test_single_point_is_stable() {
        let t = detect_trend(&series(&[0.2]), 5).unwrap();
        assert_eq!(t.direction, TrendDirection::Stable);
        assert_eq!(t.change_pct, 0.0);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(detect_trend(&[], 5), Err(AnalyticsError::EmptyHistory)));
        assert!(matches!(detect_trend(&series(&[0.2, 0.3]), 0), Err(AnalyticsError::InvalidInput(_))));
    }
}
