use std::f64::consts::{PI, SQRT_2};

// ── Abramowitz & Stegun 7.1.26 (max abs error ~1.5e-7) ──

const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;
const P: f64 = 0.3275911;

/// Standard normal cumulative distribution function N(x).
///
/// Prices and Greeks are pinned to the A&S erf below; do not swap in a library erf.
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// Standard normal probability density n(x) = e^(-x²/2) / √(2π).
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Error function, A&S 7.1.26. Odd symmetry is exact: erf(-x) == -erf(x).
#[inline]
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use statrs::distribution::{Continuous, ContinuousCDF, Normal};

    #[test]
    fn test_cdf_matches_reference_distribution() {
        let reference = Normal::standard();
        let mut x = -6.0;
        while x <= 6.0 {
            let diff = (norm_cdf(x) - reference.cdf(x)).abs();
            assert!(diff < 1.5e-7, "N({x}) off by {diff}");
            x += 0.05;
        }
    }

    #[test]
    fn test_pdf_matches_reference_distribution() {
        let reference = Normal::standard();
        for x in [-3.0, -1.0, 0.0, 0.5, 2.5] {
            assert_abs_diff_eq!(norm_pdf(x), reference.pdf(x), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cdf_symmetry() {
        for x in [0.1, 0.75, 1.5, 3.0] {
            assert_abs_diff_eq!(norm_cdf(x) + norm_cdf(-x), 1.0, epsilon = 1e-15);
        }
        assert_abs_diff_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_golden_values() {
        // Values of the approximation itself, not of the exact CDF.
        assert_abs_diff_eq!(norm_cdf(1.0), 0.841344746, epsilon = 2e-7);
        assert_abs_diff_eq!(norm_cdf(-1.96), 0.024997895, epsilon = 2e-7);
    }
}
