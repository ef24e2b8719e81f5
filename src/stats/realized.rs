use crate::stats::IvDataPoint;
use serde::Serialize;

/// EWMA decay factor (lambda = 0.94 is the RiskMetrics daily standard)
pub const EWMA_LAMBDA: f64 = 0.94;

/// Trading days per year for annualising daily returns
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Minimum closes before a realized estimate is reported (two returns)
const MIN_CLOSES: usize = 3;

/// Annualised close-to-close realized volatility over the last `window` closes.
///
/// sigma = sqrt(252) * stdev(ln(C_t / C_{t-1}))   (sample stdev, n-1)
///
/// Points are ordered by date; missing, zero, negative or non-finite closes are skipped.
/// Returns None with fewer than three usable closes.
pub fn realized_volatility(history: &[IvDataPoint], window: usize) -> Option<f64> {
    let closes = closes_by_date(history);
    let closes = &closes[closes.len().saturating_sub(window)..];
    if closes.len() < MIN_CLOSES {
        return None;
    }

    let returns = log_returns(closes);
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / (n - 1.0);

    Some((var * TRADING_DAYS_PER_YEAR).sqrt())
}

/// Annualised EWMA volatility of daily log returns.
///
/// sigma_t^2 = lambda * sigma_{t-1}^2 + (1 - lambda) * r_t^2, seeded with the first squared return.
pub fn ewma_volatility(history: &[IvDataPoint], lambda: f64) -> Option<f64> {
    if !(lambda > 0.0 && lambda < 1.0) {
        return None;
    }
    let closes = closes_by_date(history);
    if closes.len() < MIN_CLOSES {
        return None;
    }

    let returns = log_returns(&closes);
    let mut var = returns[0] * returns[0];
    for r in &returns[1..] {
        var = lambda * var + (1.0 - lambda) * r * r;
    }

    Some((var * TRADING_DAYS_PER_YEAR).sqrt())
}

/// Implied versus realized volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolPremium {
    pub iv: f64,
    pub realized: f64,
    pub spread: f64,         // iv - realized
    pub ratio: Option<f64>,  // iv / realized, None when realized is zero
}

#[inline]
pub fn iv_premium(current_iv: f64, realized: f64) -> VolPremium {
    VolPremium {
        iv: current_iv,
        realized,
        spread: current_iv - realized,
        ratio: (realized > 0.0).then(|| current_iv / realized),
    }
}

fn closes_by_date(history: &[IvDataPoint]) -> Vec<f64> {
    let mut points: Vec<&IvDataPoint> = history
        .iter()
        .filter(|p| p.close.is_some_and(|c| c > 0.0 && c.is_finite()))
        .collect();
    points.sort_by_key(|p| p.date);
    points.iter().filter_map(|p| p.close).collect()
}

#[inline]
fn log_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}
