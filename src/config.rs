use crate::errors::{HedgeError, HedgeResult};
use std::path::PathBuf;
use std::str::FromStr;

/// Where the market-data collaborator reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketDataMode {
    /// Live Yahoo Finance chart + options endpoints.
    Yahoo,
    /// Previously saved JSON snapshots (`PRICES_FILE`, `CHAIN_FILE`).
    Files,
}

impl FromStr for MarketDataMode {
    type Err = HedgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "files" | "file" => Ok(Self::Files),
            other => Err(HedgeError::Config(format!(
                "MARKET_DATA: expected `yahoo` or `files`, got `{other}`"
            ))),
        }
    }
}

/// Numeric knobs for the core stages. Defaults reproduce the reference run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelConfig {
    pub calibration_window: usize,
    pub drift_trim: f64,
    pub n_sims: usize,
    pub seed: u64,
    pub grid_min: f64,
    pub grid_max: f64,
    pub grid_points: usize,
    pub target_floor: f64,
    pub target_cap: f64,
    pub target_scale: f64,
    pub max_bid_ask_spread: f64,
    pub min_open_interest: u64,
    pub report_top_n: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            calibration_window: 30,
            drift_trim: 0.10,
            n_sims: 50_000,
            seed: 42,
            grid_min: 0.60,
            grid_max: 1.40,
            grid_points: 250,
            target_floor: 0.85,
            target_cap: 1.00,
            target_scale: 1.0,
            max_bid_ask_spread: 1.00,
            min_open_interest: 50,
            report_top_n: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ticker: String,
    pub lookback: String,
    pub target_days: i64,
    pub market_data: MarketDataMode,
    pub yahoo_chart_url: String,
    pub yahoo_options_url: String,
    pub yahoo_cookie_url: String,
    pub yahoo_crumb_url: String,
    pub prices_file: PathBuf,
    pub chain_file: PathBuf,
    pub data_dir: PathBuf,
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn from_env() -> HedgeResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = ModelConfig::default();
        let model = ModelConfig {
            calibration_window: parse_or("CALIBRATION_WINDOW", defaults.calibration_window)?,
            drift_trim: parse_or("DRIFT_TRIM", defaults.drift_trim)?,
            n_sims: parse_or("N_SIMS", defaults.n_sims)?,
            seed: parse_or("SEED", defaults.seed)?,
            grid_min: parse_or("GRID_MIN", defaults.grid_min)?,
            grid_max: parse_or("GRID_MAX", defaults.grid_max)?,
            grid_points: parse_or("GRID_POINTS", defaults.grid_points)?,
            target_floor: parse_or("TARGET_FLOOR", defaults.target_floor)?,
            target_cap: parse_or("TARGET_CAP", defaults.target_cap)?,
            target_scale: parse_or("TARGET_SCALE", defaults.target_scale)?,
            max_bid_ask_spread: parse_or("MAX_BID_ASK_SPREAD", defaults.max_bid_ask_spread)?,
            min_open_interest: parse_or("MIN_OPEN_INTEREST", defaults.min_open_interest)?,
            report_top_n: parse_or("REPORT_TOP_N", defaults.report_top_n)?,
        };

        let data_dir = PathBuf::from(env_var_or("DATA_DIR", "data"));

        Ok(Self {
            ticker: env_var_or("TICKER", "SMH"),
            lookback: env_var_or("LOOKBACK", "2y"),
            target_days: parse_or("TARGET_DAYS", 30)?,
            market_data: env_var_or("MARKET_DATA", "yahoo").parse()?,
            yahoo_chart_url: env_var_or(
                "YAHOO_CHART_URL",
                "https://query1.finance.yahoo.com/v8/finance/chart",
            ),
            yahoo_options_url: env_var_or(
                "YAHOO_OPTIONS_URL",
                "https://query2.finance.yahoo.com/v7/finance/options",
            ),
            yahoo_cookie_url: env_var_or("YAHOO_COOKIE_URL", "https://fc.yahoo.com"),
            yahoo_crumb_url: env_var_or(
                "YAHOO_CRUMB_URL",
                "https://query1.finance.yahoo.com/v1/test/getcrumb",
            ),
            prices_file: std::env::var("PRICES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("prices.json")),
            chain_file: std::env::var("CHAIN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("chain.json")),
            data_dir,
            model,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> HedgeResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| HedgeError::Config(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
