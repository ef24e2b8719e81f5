use crate::config::{SolverConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::errors::{AnalyticsError, AnalyticsResult};
use crate::models::black_scholes::BlackScholesMerton;
use crate::models::{ContractTerms, OptionSide, PricingModel};
use serde::Serialize;

/// How the solver arrived at its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IvOutcome {
    /// Quote at or below intrinsic value; floor volatility returned.
    BelowIntrinsic,
    /// Quote at or below the price at the bracket floor.
    ClampedLow,
    /// Quote at or above the price at the bracket cap.
    ClampedHigh,
    Converged,
    /// Iteration budget exhausted; volatility is the best estimate.
    IterationLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IvSolution {
    pub volatility: f64,
    pub iterations: u32,
    pub outcome: IvOutcome,
}

impl IvSolution {
    #[inline]
    fn immediate(volatility: f64, outcome: IvOutcome) -> Self {
        Self { volatility, iterations: 0, outcome }
    }
}

/// Black-Scholes-Merton implied volatility with explicit tolerance and iteration cap.
///
/// Fails with `InvalidInput` when `market_price <= 0` or the terms are invalid.
pub fn implied_volatility(
    market_price: f64,
    terms: &ContractTerms,
    side: OptionSide,
    tolerance: f64,
    max_iterations: u32,
) -> AnalyticsResult<f64> {
    let config = SolverConfig {
        tolerance,
        max_iterations,
        ..SolverConfig::default()
    };
    solve_implied_volatility(&BlackScholesMerton, market_price, terms, side, &config)
        .map(|solution| solution.volatility)
}

/// `implied_volatility` with the default tolerance (1e-6) and cap (100 iterations).
pub fn implied_volatility_default(
    market_price: f64,
    terms: &ContractTerms,
    side: OptionSide,
) -> AnalyticsResult<f64> {
    implied_volatility(market_price, terms, side, DEFAULT_TOLERANCE, DEFAULT_MAX_ITERATIONS)
}

/// Invert `model` for the volatility that reproduces `market_price`.
///
/// Brent's method bracketed in `[vol_floor, vol_cap]` (default `[0.01, 5.0]`).
/// Quotes at or below intrinsic value, or outside the priceable bracket, are
/// answered without iterating. Running out of iterations returns the best
/// estimate tagged `IterationLimit`.
pub fn solve_implied_volatility<M: PricingModel>(
    model: &M,
    market_price: f64,
    terms: &ContractTerms,
    side: OptionSide,
    config: &SolverConfig,
) -> AnalyticsResult<IvSolution> {
    if !(market_price > 0.0 && market_price.is_finite()) {
        return Err(AnalyticsError::InvalidInput(format!(
            "market price must be positive, got {market_price}"
        )));
    }
    terms.validate()?;
    if !(config.tolerance > 0.0) || !(config.vol_floor > 0.0) || config.vol_cap <= config.vol_floor {
        return Err(AnalyticsError::InvalidInput(format!(
            "invalid solver config: {config:?}"
        )));
    }

    // Degenerate quote: nothing to invert
    if market_price <= terms.intrinsic(side) {
        tracing::debug!(market_price, %side, "quote at or below intrinsic, using floor vol");
        return Ok(IvSolution::immediate(config.vol_floor, IvOutcome::BelowIntrinsic));
    }

    let objective = |vol: f64| -> AnalyticsResult<f64> {
        Ok(model.premium(&terms.with_volatility(vol), side)? - market_price)
    };

    let lo = config.vol_floor;
    let hi = config.vol_cap;
    let f_lo = objective(lo)?;
    let f_hi = objective(hi)?;

    // Price is monotone in vol, so the bracket edge is the best in-range answer
    if f_lo >= 0.0 {
        return Ok(IvSolution::immediate(lo, IvOutcome::ClampedLow));
    }
    if f_hi <= 0.0 {
        return Ok(IvSolution::immediate(hi, IvOutcome::ClampedHigh));
    }

    let solution = brent(objective, lo, hi, f_lo, f_hi, config.tolerance, config.max_iterations)?;
    match solution.outcome {
        IvOutcome::IterationLimit => tracing::warn!(
            market_price,
            %side,
            vol = solution.volatility,
            iterations = solution.iterations,
            "implied vol did not converge, returning best estimate"
        ),
        _ => tracing::debug!(
            market_price,
            %side,
            vol = solution.volatility,
            iterations = solution.iterations,
            "implied vol converged"
        ),
    }
    Ok(solution)
}

/// Brent's method on a bracketed root: f(a) < 0 < f(b).
///
/// `b` always holds the best estimate (smallest |f|), `c` the contrapoint
/// keeping the root bracketed, `a` the previous `b`. Inverse quadratic
/// interpolation (or secant when only two distinct points exist) is accepted
/// only when it stays inside the bracket and shrinks faster than bisection.
fn brent<F>(
    f: F,
    lo: f64,
    hi: f64,
    f_lo: f64,
    f_hi: f64,
    tolerance: f64,
    max_iterations: u32,
) -> AnalyticsResult<IvSolution>
where
    F: Fn(f64) -> AnalyticsResult<f64>,
{
    let (mut a, mut b, mut c) = (lo, hi, hi);
    let (mut fa, mut fb, mut fc) = (f_lo, f_hi, f_hi);
    let mut d = b - a;
    let mut e = d;

    for iteration in 1..=max_iterations {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * tolerance * b.abs() + tolerance;
        let xm = 0.5 * (c - b);

        if fb.abs() < tolerance || xm.abs() <= tol1 {
            return Ok(IvSolution { volatility: b, iterations: iteration, outcome: IvOutcome::Converged });
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant
                (2.0 * xm * s, 1.0 - s)
            } else {
                // Inverse quadratic interpolation
                let q0 = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q0 * (q0 - r) - (b - a) * (r - 1.0)),
                    (q0 - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
        fb = f(b)?;
    }

    Ok(IvSolution { volatility: b, iterations: max_iterations, outcome: IvOutcome::IterationLimit })
}
