use crate::errors::{AnalyticsError, AnalyticsResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default convergence tolerance on the price residual.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
/// Default Brent iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
/// Lower edge of the volatility search bracket (also the below-intrinsic answer).
pub const VOL_FLOOR: f64 = 0.01;
/// Upper edge of the volatility search bracket.
pub const VOL_CAP: f64 = 5.0;

/// Implied-volatility solver settings. Plain data, Copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: u32,
    pub vol_floor: f64,
    pub vol_cap: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            vol_floor: VOL_FLOOR,
            vol_cap: VOL_CAP,
        }
    }
}

/// Settings for the report driver binary. The library itself never reads these.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub chain_snapshot_path: PathBuf,
    pub iv_history_path: Option<PathBuf>,
    pub risk_free_rate: f64,
    pub dividend_yield: f64,
    pub trend_lookback_days: usize,
    pub realized_vol_window: usize,
    pub solver: SolverConfig,
}

impl AppConfig {
    pub fn from_env() -> AnalyticsResult<Self> {
        dotenvy::dotenv().ok();

        let risk_free_rate = env_var_or("RISK_FREE_RATE", "0.05")
            .parse::<f64>()
            .map_err(|e| AnalyticsError::Config(format!("RISK_FREE_RATE: {e}")))?;

        let dividend_yield = env_var_or("DIVIDEND_YIELD", "0.0")
            .parse::<f64>()
            .map_err(|e| AnalyticsError::Config(format!("DIVIDEND_YIELD: {e}")))?;

        let trend_lookback_days = env_var_or("TREND_LOOKBACK_DAYS", "20")
            .parse::<usize>()
            .map_err(|e| AnalyticsError::Config(format!("TREND_LOOKBACK_DAYS: {e}")))?;

        let realized_vol_window = env_var_or("REALIZED_VOL_WINDOW", "20")
            .parse::<usize>()
            .map_err(|e| AnalyticsError::Config(format!("REALIZED_VOL_WINDOW: {e}")))?;

        let tolerance = env_var_or("IV_TOLERANCE", "1e-6")
            .parse::<f64>()
            .map_err(|e| AnalyticsError::Config(format!("IV_TOLERANCE: {e}")))?;

        let max_iterations = env_var_or("IV_MAX_ITERATIONS", "100")
            .parse::<u32>()
            .map_err(|e| AnalyticsError::Config(format!("IV_MAX_ITERATIONS: {e}")))?;

        if !(tolerance > 0.0) {
            return Err(AnalyticsError::Config(format!(
                "IV_TOLERANCE: must be positive, got {tolerance}"
            )));
        }

        Ok(Self {
            chain_snapshot_path: PathBuf::from(env_var("CHAIN_SNAPSHOT_PATH")?),
            iv_history_path: std::env::var("IV_HISTORY_PATH").ok().map(PathBuf::from),
            risk_free_rate,
            dividend_yield,
            trend_lookback_days,
            realized_vol_window,
            solver: SolverConfig {
                tolerance,
                max_iterations,
                ..SolverConfig::default()
            },
        })
    }
}

fn env_var(key: &str) -> AnalyticsResult<String> {
    std::env::var(key).map_err(|_| AnalyticsError::Config(format!("missing env var: {key}")))
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
