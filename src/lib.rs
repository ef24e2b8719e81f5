pub mod config;
pub mod errors;
pub mod models;
pub mod chain;
pub mod stats;

pub use chain::atm::{extract_atm_data, select_atm_strike, AtmData, IvSource, ResolvedIv};
pub use chain::confidence::{ConfidenceGrade, MoveConfidence};
pub use chain::expected_move::{compute_expected_move, project_move, ExpectedMoveResult, Horizon};
pub use chain::types::{OptionChainSnapshot, OptionQuote, StrikeQuotes};
pub use config::SolverConfig;
pub use errors::{AnalyticsError, AnalyticsResult};
pub use models::black_scholes::{price, BlackScholesMerton};
pub use models::implied_vol::{implied_volatility, solve_implied_volatility, IvOutcome, IvSolution};
pub use models::{ContractTerms, OptionParameters, OptionSide, PricingModel, PricingResult};
pub use stats::bands::{percentile_bands, PercentileBands};
pub use stats::iv_rank::{compute_stats, IvStatsResult};
pub use stats::trend::{detect_trend, TrendDirection, TrendStrength, VolTrend};
pub use stats::IvDataPoint;
