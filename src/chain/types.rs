use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Quote ──

/// One side (call or put) at one strike, as delivered by the market-data layer.
/// Every field is optional: vendors omit what they do not have.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionQuote {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub mid: Option<f64>,
    pub last: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    /// Vendor-reported implied volatility, as a fraction.
    #[serde(alias = "iv")]
    pub implied_volatility: Option<f64>,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub vega: Option<f64>,
}

impl OptionQuote {
    /// Best available mid price: vendor mid, else the bid/ask midpoint, else last trade.
    #[inline]
    pub fn mid_price(&self) -> Option<f64> {
        if let Some(mid) = positive(self.mid) {
            return Some(mid);
        }
        if let Some((bid, ask)) = self.bid_ask() {
            return Some(0.5 * (bid + ask));
        }
        positive(self.last)
    }

    /// Relative bid/ask spread, (ask - bid) / mid.
    #[inline]
    pub fn relative_spread(&self) -> Option<f64> {
        let (bid, ask) = self.bid_ask()?;
        let mid = self.mid_price()?;
        Some((ask - bid) / mid)
    }

    /// Vendor IV when it is a usable number.
    #[inline]
    pub fn reported_iv(&self) -> Option<f64> {
        positive(self.implied_volatility)
    }

    #[inline]
    pub fn volume_or_zero(&self) -> u64 {
        self.volume.unwrap_or(0)
    }

    /// A consistent two-sided market: finite, bid >= 0, ask > 0, ask >= bid.
    #[inline]
    fn bid_ask(&self) -> Option<(f64, f64)> {
        let bid = self.bid.filter(|b| b.is_finite() && *b >= 0.0)?;
        let ask = self.ask.filter(|a| a.is_finite() && *a > 0.0)?;
        (ask >= bid).then_some((bid, ask))
    }
}

#[inline]
fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

// ── Chain ──

/// The call and put listed at one strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeQuotes {
    pub strike: f64,
    #[serde(default)]
    pub call: Option<OptionQuote>,
    #[serde(default)]
    pub put: Option<OptionQuote>,
}

/// A single-expiry option chain at a point in time. Read-only input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChainSnapshot {
    #[serde(default)]
    pub symbol: String,
    pub spot: f64,
    /// Years to expiry.
    pub time_to_expiry: f64,
    #[serde(default)]
    pub expiration: Option<NaiveDate>,
    pub strikes: Vec<StrikeQuotes>,
}

impl OptionChainSnapshot {
    /// Strike values in chain order.
    pub fn strike_values(&self) -> Vec<f64> {
        self.strikes.iter().map(|s| s.strike).collect()
    }
}
