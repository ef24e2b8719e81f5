use crate::chain::types::{OptionChainSnapshot, OptionQuote};
use crate::errors::{require_positive, AnalyticsError, AnalyticsResult};
use crate::models::OptionSide;
use serde::Serialize;

/// Base volatility of the price-only fallback estimate.
const HEURISTIC_BASE_IV: f64 = 0.20;
/// Short-dated expiries (under ~one month) run hotter.
const SHORT_DATED_T: f64 = 30.0 / 365.0;
const SHORT_DATED_BUMP: f64 = 0.05;
/// Long-dated expiries (over ~six months) run cooler.
const LONG_DATED_T: f64 = 180.0 / 365.0;
const LONG_DATED_CUT: f64 = 0.03;
/// Reference time value per option, as a fraction of spot.
const TIME_VALUE_REFERENCE: f64 = 0.02;
const HEURISTIC_MIN_IV: f64 = 0.05;
const HEURISTIC_MAX_IV: f64 = 2.0;

// ── ATM Strike Selection ──

/// Position of the strike nearest `spot`.
///
/// Strict `<` comparison: on a tie the first strike in iteration order wins.
pub fn select_atm_index(strikes: &[f64], spot: f64) -> AnalyticsResult<usize> {
    if strikes.is_empty() {
        return Err(AnalyticsError::EmptyInput("strikes"));
    }
    require_positive("spot", spot)?;

    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &strike) in strikes.iter().enumerate() {
        require_positive("strike", strike)?;
        let dist = (strike - spot).abs();
        if dist < best_dist {
            best_idx = i;
            best_dist = dist;
        }
    }
    Ok(best_idx)
}

/// The strike nearest `spot`, first-encountered on ties.
#[inline]
pub fn select_atm_strike(strikes: &[f64], spot: f64) -> AnalyticsResult<f64> {
    select_atm_index(strikes, spot).map(|i| strikes[i])
}

// ── Implied Volatility Resolution ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IvSource {
    Averaged,
    Observed,
    Heuristic,
}

/// The single ATM volatility, tagged with where it came from.
/// `Heuristic` is a last-resort price-based estimate and grades as low confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ResolvedIv {
    Averaged { call_iv: f64, put_iv: f64 },
    Observed { side: OptionSide, iv: f64 },
    Heuristic { iv: f64 },
}

impl ResolvedIv {
    #[inline]
    pub fn value(&self) -> f64 {
        match *self {
            Self::Averaged { call_iv, put_iv } => 0.5 * (call_iv + put_iv),
            Self::Observed { iv, .. } | Self::Heuristic { iv } => iv,
        }
    }

    #[inline]
    pub fn source(&self) -> IvSource {
        match self {
            Self::Averaged { .. } => IvSource::Averaged,
            Self::Observed { .. } => IvSource::Observed,
            Self::Heuristic { .. } => IvSource::Heuristic,
        }
    }
}

// ── ATM Data ──

/// Everything the expected-move calculation needs from the ATM strike.
/// Computed per chain snapshot, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtmData {
    pub strike: f64,
    pub call_mid: f64,
    pub put_mid: f64,
    pub iv: ResolvedIv,
    pub time_to_expiry: f64,
    pub call: OptionQuote,
    pub put: OptionQuote,
}

/// Locate the ATM row of `chain` and resolve its prices and volatility.
///
/// Fails with `EmptyInput` on an empty chain, `InvalidInput` on a bad spot,
/// strike or expiry, and `MissingAtmData` when the ATM row lacks a priced call or put.
pub fn extract_atm_data(chain: &OptionChainSnapshot) -> AnalyticsResult<AtmData> {
    require_positive("time_to_expiry", chain.time_to_expiry)?;

    let idx = select_atm_index(&chain.strike_values(), chain.spot)?;
    let row = &chain.strikes[idx];

    let (call, put) = match (&row.call, &row.put) {
        (Some(c), Some(p)) => (c, p),
        _ => {
            return Err(AnalyticsError::MissingAtmData(format!(
                "strike {} needs both a call and a put",
                row.strike
            )))
        }
    };

    let call_mid = call.mid_price().ok_or_else(|| {
        AnalyticsError::MissingAtmData(format!("no call price at strike {}", row.strike))
    })?;
    let put_mid = put.mid_price().ok_or_else(|| {
        AnalyticsError::MissingAtmData(format!("no put price at strike {}", row.strike))
    })?;

    let iv = match (call.reported_iv(), put.reported_iv()) {
        (Some(call_iv), Some(put_iv)) => ResolvedIv::Averaged { call_iv, put_iv },
        (Some(iv), None) => ResolvedIv::Observed { side: OptionSide::Call, iv },
        (None, Some(iv)) => ResolvedIv::Observed { side: OptionSide::Put, iv },
        (None, None) => {
            let iv = heuristic_iv(chain.spot, row.strike, call_mid, put_mid, chain.time_to_expiry);
            tracing::warn!(
                symbol = %chain.symbol,
                strike = row.strike,
                iv,
                "no vendor IV at ATM strike, using price-based estimate"
            );
            ResolvedIv::Heuristic { iv }
        }
    };

    tracing::debug!(
        symbol = %chain.symbol,
        spot = chain.spot,
        strike = row.strike,
        call_mid,
        put_mid,
        iv = iv.value(),
        "ATM data resolved"
    );

    Ok(AtmData {
        strike: row.strike,
        call_mid,
        put_mid,
        iv,
        time_to_expiry: chain.time_to_expiry,
        call: call.clone(),
        put: put.clone(),
    })
}

/// Price-only volatility guess for when no side reports IV.
///
/// Starts at 20%, +5 points for short-dated, -3 points for long-dated expiries,
/// then scales by observed per-option time value over a 2%-of-spot reference.
/// Not calibrated. Clamped to [5%, 200%].
pub fn heuristic_iv(spot: f64, strike: f64, call_mid: f64, put_mid: f64, time_to_expiry: f64) -> f64 {
    let mut base = HEURISTIC_BASE_IV;
    if time_to_expiry < SHORT_DATED_T {
        base += SHORT_DATED_BUMP;
    } else if time_to_expiry > LONG_DATED_T {
        base -= LONG_DATED_CUT;
    }

    let call_tv = (call_mid - (spot - strike).max(0.0)).max(0.0);
    let put_tv = (put_mid - (strike - spot).max(0.0)).max(0.0);
    let time_value = 0.5 * (call_tv + put_tv);

    let iv = if time_value > 0.0 {
        base * time_value / (TIME_VALUE_REFERENCE * spot)
    } else {
        base
    };
    iv.clamp(HEURISTIC_MIN_IV, HEURISTIC_MAX_IV)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::types::StrikeQuotes;

    const STRIKES: [f64; 4] = [95.0, 100.0, 105.0, 110.0];

    fn quote(mid: f64, iv: Option<f64>) -> OptionQuote {
        OptionQuote { mid: Some(mid), implied_volatility: iv, ..Default::default() }
    }

    fn chain(rows: Vec<StrikeQuotes>) -> OptionChainSnapshot {
        OptionChainSnapshot {
            symbol: "TEST".into(),
            spot: 101.0,
            time_to_expiry: 0.1,
            expiration: None,
            strikes: rows,
        }
    }

    fn row(strike: f64, call: Option<OptionQuote>, put: Option<OptionQuote>) -> StrikeQuotes {
        StrikeQuotes { strike, call, put }
    }

    #[test]
    fn test_select_nearest() {
        assert_eq!(select_atm_strike(&STRIKES, 100.0).unwrap(), 100.0);
        assert_eq!(select_atm_strike(&STRIKES, 102.0).unwrap(), 100.0);
        assert_eq!(select_atm_strike(&STRIKES, 103.0).unwrap(), 105.0);
        assert_eq!(select_atm_strike(&STRIKES, 500.0).unwrap(), 110.0);
    }

    #[test]
    fn test_tie_goes_to_first_encountered() {
        assert_eq!(select_atm_strike(&[100.0, 105.0], 102.5).unwrap(), 100.0);
        assert_eq!(select_atm_strike(&[105.0, 100.0], 102.5).unwrap(), 105.0);
        assert_eq!(select_atm_index(&[100.0, 100.0, 101.0], 100.0).unwrap(), 0);
    }

    #[test]
    fn test_select_empty_fails() {
        assert!(matches!(select_atm_strike(&[], 100.0), Err(AnalyticsError::EmptyInput(_))));
    }

    #[test]
    fn test_select_rejects_bad_strike() {
        assert!(matches!(
            select_atm_strike(&[100.0, -5.0], 100.0),
            Err(AnalyticsError::InvalidInput(_))
        ));
        assert!(matches!(select_atm_strike(&[100.0], 0.0), Err(AnalyticsError::InvalidInput(_))));
    }

    #[test]
    fn test_extract_averages_both_ivs() {
        let c = chain(vec![
            row(95.0, Some(quote(7.0, Some(0.30))), Some(quote(1.0, Some(0.34)))),
            row(100.0, Some(quote(3.2, Some(0.22))), Some(quote(2.4, Some(0.24)))),
        ]);
        let atm = extract_atm_data(&c).unwrap();
        assert_eq!(atm.strike, 100.0);
        assert_eq!(atm.call_mid, 3.2);
        assert_eq!(atm.put_mid, 2.4);
        assert_eq!(atm.iv.source(), IvSource::Averaged);
        assert!((atm.iv.value() - 0.23).abs() < 1e-12);
    }

    #[test]
    fn test_extract_single_side_iv() {
        let c = chain(vec![row(100.0, Some(quote(3.2, None)), Some(quote(2.4, Some(0.25))))]);
        let atm = extract_atm_data(&c).unwrap();
        assert_eq!(atm.iv, ResolvedIv::Observed { side: OptionSide::Put, iv: 0.25 });
    }

    #[test]
    fn test_extract_heuristic_when_no_iv() {
        let c = chain(vec![row(100.0, Some(quote(3.2, None)), Some(quote(2.4, None)))]);
        let atm = extract_atm_data(&c).unwrap();
        assert_eq!(atm.iv.source(), IvSource::Heuristic);
        let iv = atm.iv.value();
        assert!((0.05..=2.0).contains(&iv), "heuristic iv={iv}");
    }

    #[test]
    fn test_missing_side_fails() {
        let c = chain(vec![
            row(100.0, Some(quote(3.2, None)), None),
            row(110.0, Some(quote(0.5, None)), Some(quote(9.0, None))),
        ]);
        assert!(matches!(extract_atm_data(&c), Err(AnalyticsError::MissingAtmData(_))));

        let unpriced = chain(vec![row(100.0, Some(quote(3.2, None)), Some(OptionQuote::default()))]);
        assert!(matches!(extract_atm_data(&unpriced), Err(AnalyticsError::MissingAtmData(_))));
    }

    #[test]
    fn test_empty_chain_fails() {
        assert!(matches!(extract_atm_data(&chain(vec![])), Err(AnalyticsError::EmptyInput(_))));
    }

    #[test]
    fn test_heuristic_shape() {
        // ATM, per-option time value exactly at the 2% reference: base vol comes back
        assert!((heuristic_iv(100.0, 100.0, 2.0, 2.0, 0.25) - 0.20).abs() < 1e-12);
        assert!((heuristic_iv(100.0, 100.0, 2.0, 2.0, 0.05) - 0.25).abs() < 1e-12);
        assert!((heuristic_iv(100.0, 100.0, 2.0, 2.0, 1.0) - 0.17).abs() < 1e-12);
        // Doubling time value doubles the estimate
        assert!((heuristic_iv(100.0, 100.0, 4.0, 4.0, 0.25) - 0.40).abs() < 1e-12);
        // No time value: base only
        assert!((heuristic_iv(100.0, 95.0, 5.0, 0.0, 0.25) - 0.20).abs() < 1e-12);
        // Clamped
        assert_eq!(heuristic_iv(100.0, 100.0, 0.01, 0.01, 0.25), 0.05);
        assert_eq!(heuristic_iv(100.0, 100.0, 40.0, 40.0, 0.25), 2.0);
    }
}
