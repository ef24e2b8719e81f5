use serde::Serialize;
use std::path::Path;
use vol_lens::config::AppConfig;
use vol_lens::models::black_scholes::BlackScholesMerton;
use vol_lens::stats::realized::{ewma_volatility, iv_premium, realized_volatility, VolPremium, EWMA_LAMBDA};
use vol_lens::{
    compute_expected_move, compute_stats, detect_trend, extract_atm_data, percentile_bands, price,
    solve_implied_volatility, AnalyticsResult, ContractTerms, ExpectedMoveResult, Horizon,
    IvDataPoint, IvSolution, IvStatsResult, OptionChainSnapshot, OptionSide, PercentileBands,
    PricingResult, VolTrend,
};

/// One JSON document per run, written to stdout.
#[derive(Debug, Serialize)]
struct Report {
    expected_move: ExpectedMoveResult,
    horizons: Vec<vol_lens::chain::expected_move::HorizonMove>,
    atm_pricing: PricingResult,
    call_iv: IvSolution,
    put_iv: IvSolution,
    history: Option<HistoryReport>,
}

#[derive(Debug, Serialize)]
struct HistoryReport {
    stats: IvStatsResult,
    trend: VolTrend,
    bands: PercentileBands,
    realized_vol: Option<f64>,
    ewma_vol: Option<f64>,
    premium: Option<VolPremium>,
}

fn main() {
    eprintln!("[vol_lens] starting, setting up logging...");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let report = match build_report(&cfg) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("analysis failed: {e}");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("failed to encode report: {e}");
            std::process::exit(1);
        }
    }
}

fn build_report(cfg: &AppConfig) -> AnalyticsResult<Report> {
    let chain: OptionChainSnapshot = read_json(&cfg.chain_snapshot_path)?;
    tracing::info!(
        symbol = %chain.symbol,
        spot = chain.spot,
        strikes = chain.strikes.len(),
        "chain snapshot loaded"
    );

    let expected_move = compute_expected_move(&chain)?;
    tracing::info!(
        straddle = expected_move.straddle.amount,
        iv_move = expected_move.iv_move.amount,
        iv = expected_move.iv,
        straddle_confidence = %expected_move.confidence.straddle,
        iv_confidence = %expected_move.confidence.iv,
        "expected move"
    );

    let horizons = vec![
        vol_lens::project_move(
            expected_move.spot,
            expected_move.iv,
            Horizon::ToExpiry(expected_move.time_to_expiry),
        )?,
        expected_move.project(1)?,
        expected_move.project(5)?,
    ];

    let atm = extract_atm_data(&chain)?;
    let terms = ContractTerms::new(
        chain.spot,
        atm.strike,
        chain.time_to_expiry,
        cfg.risk_free_rate,
        cfg.dividend_yield,
    );
    let atm_pricing = price(&terms.with_volatility(expected_move.iv))?;

    // Back out IV from the ATM mids under our own rate assumptions
    let call_iv = solve_implied_volatility(&BlackScholesMerton, atm.call_mid, &terms, OptionSide::Call, &cfg.solver)?;
    let put_iv = solve_implied_volatility(&BlackScholesMerton, atm.put_mid, &terms, OptionSide::Put, &cfg.solver)?;

    let history = match &cfg.iv_history_path {
        Some(path) => Some(history_report(cfg, path, expected_move.iv)?),
        None => None,
    };

    Ok(Report { expected_move, horizons, atm_pricing, call_iv, put_iv, history })
}

fn history_report(cfg: &AppConfig, path: &Path, current_iv: f64) -> AnalyticsResult<HistoryReport> {
    let points: Vec<IvDataPoint> = read_json(path)?;
    tracing::info!(points = points.len(), "iv history loaded");

    let stats = compute_stats(&points, current_iv)?;
    let trend = detect_trend(&points, cfg.trend_lookback_days)?;
    let bands = percentile_bands(&points)?;
    let realized_vol = realized_volatility(&points, cfg.realized_vol_window);
    let ewma_vol = ewma_volatility(&points, EWMA_LAMBDA);
    let premium = realized_vol.map(|hv| iv_premium(current_iv, hv));

    tracing::info!(
        rank = stats.rank,
        percentile = stats.percentile,
        trend = ?trend.direction,
        "iv context"
    );

    Ok(HistoryReport { stats, trend, bands, realized_vol, ewma_vol, premium })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> AnalyticsResult<T> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
