/// Error taxonomy for the analytics core.
/// Every variant is a local precondition failure: the computations are
/// deterministic, so retrying the same call reproduces the same error.
/// Callers should surface these as data-quality problems with the upstream chain.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("missing ATM data: {0}")]
    MissingAtmData(String),

    #[error("empty history: no valid volatility readings after filtering")]
    EmptyHistory,

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        AnalyticsError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for AnalyticsError {
    fn from(e: std::io::Error) -> Self {
        AnalyticsError::Io(e.to_string())
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Fail with `InvalidInput` unless `value` is finite and strictly positive.
/// NaN fails the check.
#[inline]
pub(crate) fn require_positive(name: &str, value: f64) -> AnalyticsResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidInput(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

/// Fail with `InvalidInput` unless `value` is finite.
#[inline]
pub(crate) fn require_finite(name: &str, value: f64) -> AnalyticsResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidInput(format!(
            "{name} must be finite, got {value}"
        )))
    }
}
