use crate::chain::types::OptionQuote;
use serde::Serialize;

/// Average relative spread below this upgrades straddle confidence.
const TIGHT_SPREAD: f64 = 0.10;
/// Average relative spread above this downgrades straddle confidence.
const WIDE_SPREAD: f64 = 0.25;
/// Combined ATM call+put volume above this nudges confidence up.
const HIGH_VOLUME: u64 = 100;
/// Combined ATM call+put volume below this nudges confidence down.
const LOW_VOLUME: u64 = 10;
/// Call/put IV agreement (absolute, as fractions) for a high grade.
const IV_AGREE: f64 = 0.02;
/// Call/put IV disagreement (absolute, as fractions) for a low grade.
const IV_DISAGREE: f64 = 0.05;
/// Float slack on both IV gap thresholds.
const IV_GAP_EPS: f64 = 1e-9;
/// Under one week to expiry both grades are capped one step down.
const NEAR_EXPIRY_T: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceGrade {
    Low,
    Medium,
    High,
}

impl ConfidenceGrade {
    /// One step better, capped at High.
    #[inline]
    pub fn upgrade(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::High => Self::High,
        }
    }

    /// One step worse, floored at Low.
    #[inline]
    pub fn downgrade(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }
}

impl std::fmt::Display for ConfidenceGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Independent grades for the two expected-move methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveConfidence {
    pub straddle: ConfidenceGrade,
    pub iv: ConfidenceGrade,
}

/// Grade both methods for one ATM strike.
///
/// Order is fixed and not commutative:
/// 1. spread check, 2. volume nudge (straddle only), 3. near-expiry cap.
pub fn assess_confidence(
    call: &OptionQuote,
    put: &OptionQuote,
    time_to_expiry: f64,
) -> MoveConfidence {
    let straddle = straddle_confidence(call, put);
    let iv = iv_confidence(call.reported_iv(), put.reported_iv());
    MoveConfidence {
        straddle: apply_expiry_cap(straddle, time_to_expiry),
        iv: apply_expiry_cap(iv, time_to_expiry),
    }
}

/// Straddle-method grade from market quality: tight, liquid markets price the straddle best.
pub fn straddle_confidence(call: &OptionQuote, put: &OptionQuote) -> ConfidenceGrade {
    let mut grade = ConfidenceGrade::Medium;

    // 1. Spread check (skipped when neither side has a two-sided market)
    let spreads: Vec<f64> = [call, put].iter().filter_map(|q| q.relative_spread()).collect();
    if !spreads.is_empty() {
        let avg_spread = spreads.iter().sum::<f64>() / spreads.len() as f64;
        if avg_spread < TIGHT_SPREAD {
            grade = grade.upgrade();
        } else if avg_spread > WIDE_SPREAD {
            grade = grade.downgrade();
        }
    }

    // 2. Volume nudge
    let volume = call.volume_or_zero().saturating_add(put.volume_or_zero());
    if volume > HIGH_VOLUME {
        grade = grade.upgrade();
    } else if volume < LOW_VOLUME {
        grade = grade.downgrade();
    }

    grade
}

/// IV-method grade from call/put IV agreement.
pub fn iv_confidence(call_iv: Option<f64>, put_iv: Option<f64>) -> ConfidenceGrade {
    match (call_iv, put_iv) {
        (Some(c), Some(p)) => {
            let gap = (c - p).abs();
            if gap <= IV_AGREE + IV_GAP_EPS {
                ConfidenceGrade::High
            } else if gap > IV_DISAGREE + IV_GAP_EPS {
                ConfidenceGrade::Low
            } else {
                ConfidenceGrade::Medium
            }
        }
        (Some(_), None) | (None, Some(_)) => ConfidenceGrade::Medium,
        (None, None) => ConfidenceGrade::Low,
    }
}

/// Near-expiry pricing is noisier: under one week, step the grade down once.
#[inline]
pub fn apply_expiry_cap(grade: ConfidenceGrade, time_to_expiry: f64) -> ConfidenceGrade {
    if time_to_expiry < NEAR_EXPIRY_T {
        grade.downgrade()
    } else {
        grade
    }
}
