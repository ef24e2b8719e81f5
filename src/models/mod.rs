pub mod normal;
pub mod black_scholes;
pub mod implied_vol;

use crate::errors::{require_finite, require_positive, AnalyticsResult};
use serde::{Deserialize, Serialize};

/// All pricing models implement this trait.
/// price() must be a pure function: deterministic output from inputs only.
/// Send + Sync so a single model instance can be shared across threads.
pub trait PricingModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Theoretical prices and Greeks for both sides of the contract.
    fn price(&self, params: &OptionParameters) -> AnalyticsResult<PricingResult>;

    /// Theoretical price of one side only.
    fn premium(&self, params: &OptionParameters, side: OptionSide) -> AnalyticsResult<f64> {
        Ok(self.price(params)?.premium(side))
    }
}

// ── Contract Inputs ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
}

impl std::fmt::Display for OptionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Everything needed to price a contract except volatility.
/// This is what the implied-volatility solver is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub spot: f64,           // Underlying price S
    pub strike: f64,         // Strike K
    pub time_to_expiry: f64, // T in years
    pub rate: f64,           // Continuously-compounded risk-free rate r
    pub dividend_yield: f64, // Continuous dividend / carry yield q
}

impl ContractTerms {
    pub fn new(spot: f64, strike: f64, time_to_expiry: f64, rate: f64, dividend_yield: f64) -> Self {
        Self { spot, strike, time_to_expiry, rate, dividend_yield }
    }

    #[inline]
    pub fn with_volatility(self, volatility: f64) -> OptionParameters {
        OptionParameters {
            spot: self.spot,
            strike: self.strike,
            time_to_expiry: self.time_to_expiry,
            rate: self.rate,
            dividend_yield: self.dividend_yield,
            volatility,
        }
    }

    /// Undiscounted intrinsic value: max(0, S-K) for calls, max(0, K-S) for puts.
    #[inline]
    pub fn intrinsic(&self, side: OptionSide) -> f64 {
        match side {
            OptionSide::Call => (self.spot - self.strike).max(0.0),
            OptionSide::Put => (self.strike - self.spot).max(0.0),
        }
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        require_positive("spot", self.spot)?;
        require_positive("strike", self.strike)?;
        require_positive("time_to_expiry", self.time_to_expiry)?;
        require_finite("rate", self.rate)?;
        require_finite("dividend_yield", self.dividend_yield)
    }
}

/// Full Black-Scholes-Merton parameter set. Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionParameters {
    pub spot: f64,
    pub strike: f64,
    pub time_to_expiry: f64,
    pub rate: f64,
    pub dividend_yield: f64,
    pub volatility: f64,
}

impl OptionParameters {
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        rate: f64,
        dividend_yield: f64,
        volatility: f64,
    ) -> Self {
        ContractTerms::new(spot, strike, time_to_expiry, rate, dividend_yield)
            .with_volatility(volatility)
    }

    #[inline]
    pub fn terms(&self) -> ContractTerms {
        ContractTerms::new(self.spot, self.strike, self.time_to_expiry, self.rate, self.dividend_yield)
    }

    /// S, K, T and volatility must be strictly positive; r and q finite.
    pub fn validate(&self) -> AnalyticsResult<()> {
        self.terms().validate()?;
        require_positive("volatility", self.volatility)
    }
}

// ── Pricing Output ──

/// A value reported separately for the call and the put.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallPut {
    pub call: f64,
    pub put: f64,
}

/// Theoretical prices and Greeks. Units follow trading-desk convention:
/// theta per calendar day, vega per vol point, rho per 1% rate move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub call: f64,
    pub put: f64,
    pub delta: CallPut,
    pub gamma: f64,
    pub theta: CallPut,
    pub vega: f64,
    pub rho: CallPut,
}

impl PricingResult {
    #[inline]
    pub fn premium(&self, side: OptionSide) -> f64 {
        match side {
            OptionSide::Call => self.call,
            OptionSide::Put => self.put,
        }
    }
}
