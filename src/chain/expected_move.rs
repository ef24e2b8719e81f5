use crate::chain::atm::{extract_atm_data, IvSource};
use crate::chain::confidence::{assess_confidence, MoveConfidence};
use crate::chain::types::OptionChainSnapshot;
use crate::errors::{require_positive, AnalyticsError, AnalyticsResult};
use serde::Serialize;

const DAYS_PER_YEAR: f64 = 365.0;

/// An absolute move and the same move as a percentage of spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveEstimate {
    pub amount: f64,
    pub percent: f64, // 100 * amount / spot
}

impl MoveEstimate {
    #[inline]
    fn new(amount: f64, spot: f64) -> Self {
        Self { amount, percent: 100.0 * amount / spot }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBands {
    pub one_sigma: Band,
    pub two_sigma: Band,
}

impl PriceBands {
    #[inline]
    pub fn around(spot: f64, move_amount: f64) -> Self {
        Self {
            one_sigma: Band { lower: spot - move_amount, upper: spot + move_amount },
            two_sigma: Band { lower: spot - 2.0 * move_amount, upper: spot + 2.0 * move_amount },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedMoveResult {
    pub symbol: String,
    pub spot: f64,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub iv: f64,
    pub iv_source: IvSource,
    pub straddle: MoveEstimate,
    pub iv_move: MoveEstimate,
    pub bands: PriceBands,
    pub confidence: MoveConfidence,
}

impl ExpectedMoveResult {
    /// Re-project this result's IV onto a horizon of `days` calendar days.
    pub fn project(&self, days: u32) -> AnalyticsResult<HorizonMove> {
        project_move(self.spot, self.iv, Horizon::Days(days))
    }
}

/// Compute straddle and IV expected moves, bands and confidence for `chain`.
///
/// Two independent estimates at the ATM strike:
///   straddle: move = call_mid + put_mid
///   iv:       move = spot * iv * sqrt(T)
///
/// Bands are spot +/- 1 and 2 IV moves. Each method carries its own grade.
///
/// Fails with `EmptyInput` on an empty chain, `InvalidInput` on a bad spot or
/// expiry, `MissingAtmData` when the ATM strike lacks a priced call or put.
pub fn compute_expected_move(chain: &OptionChainSnapshot) -> AnalyticsResult<ExpectedMoveResult> {
    let atm = extract_atm_data(chain)?;
    let spot = chain.spot;
    let iv = atm.iv.value();

    let straddle = MoveEstimate::new(atm.call_mid + atm.put_mid, spot);
    let iv_amount = spot * iv * atm.time_to_expiry.sqrt();
    let iv_move = MoveEstimate::new(iv_amount, spot);

    let confidence = assess_confidence(&atm.call, &atm.put, atm.time_to_expiry);

    tracing::debug!(
        symbol = %chain.symbol,
        straddle = straddle.amount,
        iv_move = iv_move.amount,
        straddle_confidence = %confidence.straddle,
        iv_confidence = %confidence.iv,
        "expected move computed"
    );

    Ok(ExpectedMoveResult {
        symbol: chain.symbol.clone(),
        spot,
        strike: atm.strike,
        time_to_expiry: atm.time_to_expiry,
        iv,
        iv_source: atm.iv.source(),
        straddle,
        iv_move,
        bands: PriceBands::around(spot, iv_amount),
        confidence,
    })
}

// ── Horizon Projection ──

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// Years to the chain's expiry.
    ToExpiry(f64),
    /// Calendar days from now.
    Days(u32),
}

impl Horizon {
    #[inline]
    pub fn years(&self) -> f64 {
        match *self {
            Self::ToExpiry(t) => t,
            Self::Days(d) => d as f64 / DAYS_PER_YEAR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizonMove {
    pub horizon: Horizon,
    pub iv_move: MoveEstimate,
    pub bands: PriceBands,
}

/// IV-method move over an arbitrary horizon: spot * iv * sqrt(years).
pub fn project_move(spot: f64, iv: f64, horizon: Horizon) -> AnalyticsResult<HorizonMove> {
    require_positive("spot", spot)?;
    require_positive("iv", iv)?;
    let years = horizon.years();
    if !(years > 0.0 && years.is_finite()) {
        return Err(AnalyticsError::InvalidInput(format!(
            "horizon must be positive, got {horizon:?}"
        )));
    }

    let amount = spot * iv * years.sqrt();
    Ok(HorizonMove {
        horizon,
        iv_move: MoveEstimate::new(amount, spot),
        bands: PriceBands::around(spot, amount),
    })
}
