use crate::errors::AnalyticsResult;
use crate::models::normal::{norm_cdf, norm_pdf};
use crate::models::{CallPut, OptionParameters, OptionSide, PricingModel, PricingResult};

/// Calendar days per year used to express theta as daily decay.
const DAYS_PER_YEAR: f64 = 365.0;

/// Black-Scholes-Merton European pricing with continuous dividend yield.
///
/// d1 = (ln(S/K) + (r - q + sigma^2/2)*T) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
/// call = S*e^(-qT)*N(d1) - K*e^(-rT)*N(d2)
/// put  = K*e^(-rT)*N(-d2) - S*e^(-qT)*N(-d1)
///
/// Stateless. One instance can be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholesMerton;

impl BlackScholesMerton {
    pub fn new() -> Self {
        Self
    }
}

impl PricingModel for BlackScholesMerton {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes-Merton"
    }

    #[inline]
    fn price(&self, params: &OptionParameters) -> AnalyticsResult<PricingResult> {
        price(params)
    }

    /// Skips the Greeks; the solver calls this on every iteration.
    #[inline]
    fn premium(&self, params: &OptionParameters, side: OptionSide) -> AnalyticsResult<f64> {
        params.validate()?;
        let t = Terms::new(params);
        Ok(match side {
            OptionSide::Call => t.call(),
            OptionSide::Put => t.put(),
        })
    }
}

/// Price both sides and compute all Greeks.
///
/// Fails with `InvalidInput` when S, K, T or volatility is not strictly positive.
/// Pure function.
pub fn price(params: &OptionParameters) -> AnalyticsResult<PricingResult> {
    params.validate()?;

    let t = Terms::new(params);
    let OptionParameters { spot: s, strike: k, rate: r, dividend_yield: q, volatility: sigma, .. } =
        *params;

    let pdf_d1 = norm_pdf(t.d1);

    let delta = CallPut {
        call: t.div_df * t.n_d1,
        put: t.div_df * (t.n_d1 - 1.0),
    };

    let gamma = t.div_df * pdf_d1 / (s * t.sigma_sqrt_t);

    // Shared decay term, annualised
    let decay = -s * t.div_df * pdf_d1 * sigma / (2.0 * t.sqrt_t);
    let theta = CallPut {
        call: (decay - r * k * t.rate_df * t.n_d2 + q * s * t.div_df * t.n_d1) / DAYS_PER_YEAR,
        put: (decay + r * k * t.rate_df * t.n_neg_d2 - q * s * t.div_df * t.n_neg_d1) / DAYS_PER_YEAR,
    };

    let vega = s * t.div_df * pdf_d1 * t.sqrt_t / 100.0;

    let rho = CallPut {
        call: k * params.time_to_expiry * t.rate_df * t.n_d2 / 100.0,
        put: -k * params.time_to_expiry * t.rate_df * t.n_neg_d2 / 100.0,
    };

    Ok(PricingResult {
        call: t.call(),
        put: t.put(),
        delta,
        gamma,
        theta,
        vega,
        rho,
    })
}

/// Intermediate quantities shared by prices and Greeks. Stack-allocated.
struct Terms {
    spot: f64,
    strike: f64,
    sqrt_t: f64,
    sigma_sqrt_t: f64,
    d1: f64,
    div_df: f64,  // e^(-qT)
    rate_df: f64, // e^(-rT)
    n_d1: f64,
    n_d2: f64,
    n_neg_d1: f64,
    n_neg_d2: f64,
}

impl Terms {
    #[inline]
    fn new(p: &OptionParameters) -> Self {
        let sqrt_t = p.time_to_expiry.sqrt();
        let sigma_sqrt_t = p.volatility * sqrt_t;
        let d1 = ((p.spot / p.strike).ln()
            + (p.rate - p.dividend_yield + 0.5 * p.volatility * p.volatility) * p.time_to_expiry)
            / sigma_sqrt_t;
        let d2 = d1 - sigma_sqrt_t;

        Self {
            spot: p.spot,
            strike: p.strike,
            sqrt_t,
            sigma_sqrt_t,
            d1,
            div_df: (-p.dividend_yield * p.time_to_expiry).exp(),
            rate_df: (-p.rate * p.time_to_expiry).exp(),
            n_d1: norm_cdf(d1),
            n_d2: norm_cdf(d2),
            n_neg_d1: norm_cdf(-d1),
            n_neg_d2: norm_cdf(-d2),
        }
    }

    /// Floored at zero against round-off.
    #[inline]
    fn call(&self) -> f64 {
        (self.spot * self.div_df * self.n_d1 - self.strike * self.rate_df * self.n_d2).max(0.0)
    }

    #[inline]
    fn put(&self) -> f64 {
        (self.strike * self.rate_df * self.n_neg_d2 - self.spot * self.div_df * self.n_neg_d1).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnalyticsError;
    use approx::assert_abs_diff_eq;

    fn grid() -> Vec<OptionParameters> {
        let mut out = Vec::new();
        for s in [80.0, 100.0, 120.0] {
            for k in [90.0, 100.0, 110.0] {
                for t in [0.05, 0.25, 1.0] {
                    for sigma in [0.15, 0.3, 0.6] {
                        out.push(OptionParameters::new(s, k, t, 0.05, 0.02, sigma));
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_golden_atm_values() {
        let p = OptionParameters::new(100.0, 100.0, 1.0, 0.05, 0.0, 0.2);
        let res = price(&p).unwrap();
        assert_abs_diff_eq!(res.call, 10.4506, epsilon = 1e-3);
        assert_abs_diff_eq!(res.put, 5.5735, epsilon = 1e-3);
        assert_abs_diff_eq!(res.delta.call, 0.6368, epsilon = 1e-3);
        assert_abs_diff_eq!(res.gamma, 0.018762, epsilon = 1e-4);
        assert_abs_diff_eq!(res.vega, 0.37524, epsilon = 1e-3);
    }

    #[test]
    fn test_prices_non_negative() {
        for p in grid() {
            let res = price(&p).unwrap();
            assert!(res.call >= 0.0 && res.put >= 0.0, "negative price for {p:?}: {res:?}");
        }
    }

    #[test]
    fn test_put_call_parity() {
        for p in grid() {
            let res = price(&p).unwrap();
            let forward = p.spot * (-p.dividend_yield * p.time_to_expiry).exp()
                - p.strike * (-p.rate * p.time_to_expiry).exp();
            assert_abs_diff_eq!(res.call - res.put, forward, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_delta_parity() {
        for p in grid() {
            let res = price(&p).unwrap();
            let div_df = (-p.dividend_yield * p.time_to_expiry).exp();
            assert_abs_diff_eq!(res.delta.call - res.delta.put, div_df, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_near_atm_sanity() {
        let p = OptionParameters::new(100.0, 100.0, 0.25, 0.05, 0.02, 0.20);
        let res = price(&p).unwrap();
        assert!((res.call - res.put).abs() < 2.0, "call={} put={}", res.call, res.put);
        assert!(res.gamma > 0.0);
        assert!(res.vega > 0.0);
        assert!(res.theta.call < 0.0, "ATM call theta should decay: {}", res.theta.call);
        assert!(res.rho.call > 0.0 && res.rho.put < 0.0);
    }

    #[test]
    fn test_theta_is_per_calendar_day() {
        // Finite-difference check: one day of decay, all else equal
        let p = OptionParameters::new(100.0, 100.0, 0.5, 0.05, 0.01, 0.25);
        let later = OptionParameters { time_to_expiry: p.time_to_expiry - 1.0 / 365.0, ..p };
        let now = price(&p).unwrap();
        let next = price(&later).unwrap();
        assert_abs_diff_eq!(next.call - now.call, now.theta.call, epsilon = 2e-3);
        assert_abs_diff_eq!(next.put - now.put, now.theta.put, epsilon = 2e-3);
    }

    #[test]
    fn test_vega_and_rho_per_one_percent() {
        let p = OptionParameters::new(100.0, 105.0, 0.5, 0.04, 0.0, 0.3);
        let base = price(&p).unwrap();
        let bumped_vol = price(&OptionParameters { volatility: 0.31, ..p }).unwrap();
        let bumped_rate = price(&OptionParameters { rate: 0.05, ..p }).unwrap();
        assert_abs_diff_eq!(bumped_vol.call - base.call, base.vega, epsilon = 2e-3);
        assert_abs_diff_eq!(bumped_rate.call - base.call, base.rho.call, epsilon = 2e-3);
    }

    #[test]
    fn test_premium_matches_full_price() {
        let model = BlackScholesMerton::new();
        let p = OptionParameters::new(100.0, 95.0, 0.3, 0.05, 0.02, 0.35);
        let full = model.price(&p).unwrap();
        assert_eq!(model.premium(&p, OptionSide::Call).unwrap(), full.call);
        assert_eq!(model.premium(&p, OptionSide::Put).unwrap(), full.put);
    }

    #[test]
    fn test_invalid_inputs_fail() {
        let p = OptionParameters::new(100.0, 100.0, 0.25, 0.05, 0.02, 0.2);
        for bad in [
            OptionParameters { spot: 0.0, ..p },
            OptionParameters { strike: 0.0, ..p },
            OptionParameters { time_to_expiry: -0.1, ..p },
            OptionParameters { volatility: 0.0, ..p },
        ] {
            assert!(matches!(price(&bad), Err(AnalyticsError::InvalidInput(_))));
        }
    }
}
