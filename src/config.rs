//! Runtime configuration loaded from environment variables.
//!
//! Binaries call `dotenvy::dotenv()` first so a local `.env` file can supply
//! the same keys.

use crate::error::ConfigError;
use crate::models::candle::Timeframe;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Assets pegged to a fiat currency; never traded directionally.
pub const DEFAULT_PEGGED_ASSETS: &[&str] = &[
    "USDT", "USDC", "DAI", "BUSD", "TUSD", "FRAX", "USDD", "USDP", "GUSD", "PYUSD", "FDUSD",
    "UST", "USDN",
];

/// Deployment environment name (`MORPHEUS_ENV`), defaults to `sandbox`.
pub fn get_environment() -> String {
    env::var("MORPHEUS_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Timeframe the rule cascade runs on.
    pub fast_timeframe: Timeframe,
    /// Timeframe used as cross-check.
    pub slow_timeframe: Timeframe,
    /// Preferred source of the current price; falls back to the fast timeframe.
    pub price_timeframe: Timeframe,
    pub pegged_assets: Vec<String>,
    pub validity_hours: i64,
    /// |sentiment| below this is treated as no edge.
    pub min_sentiment_edge: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            fast_timeframe: Timeframe::FourHour,
            slow_timeframe: Timeframe::OneDay,
            price_timeframe: Timeframe::OneHour,
            pegged_assets: DEFAULT_PEGGED_ASSETS.iter().map(|s| s.to_string()).collect(),
            validity_hours: 48,
            min_sentiment_edge: 8.0,
        }
    }
}

impl SignalConfig {
    pub fn is_pegged(&self, symbol: &str) -> bool {
        self.pegged_assets
            .iter()
            .any(|pegged| pegged.eq_ignore_ascii_case(symbol.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// How far past entry (in percent) a price may be and still fill.
    pub entry_tolerance_pct: f64,
    pub inter_call_delay_ms: u64,
    pub max_failures: u32,
    pub cooldown_secs: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            entry_tolerance_pct: 0.5,
            inter_call_delay_ms: 250,
            max_failures: 5,
            cooldown_secs: 30 * 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Samples a key needs before its weight influences anything.
    pub min_samples: u32,
    /// Weight changes at or below this are ignored.
    pub noise_threshold: f64,
    /// Samples an asset needs to appear in performance analysis.
    pub asset_min_samples: u32,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            min_samples: 5,
            noise_threshold: 0.05,
            asset_min_samples: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestDefaults {
    pub initial_capital: f64,
    /// Percent of current capital committed per trade.
    pub position_size_pct: f64,
    pub warmup: usize,
}

impl Default for BacktestDefaults {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            position_size_pct: 10.0,
            warmup: 14,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub signal: SignalConfig,
    pub tracker: TrackerConfig,
    pub learning: LearningConfig,
    pub backtest: BacktestDefaults,
}

impl Config {
    /// Defaults overridden by any environment variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(list) = env::var("PEGGED_ASSETS") {
            config.signal.pegged_assets = list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(tf) = parse_var::<Timeframe>("FAST_TIMEFRAME")? {
            config.signal.fast_timeframe = tf;
        }
        if let Some(tf) = parse_var::<Timeframe>("SLOW_TIMEFRAME")? {
            config.signal.slow_timeframe = tf;
        }
        if let Some(hours) = parse_var("SIGNAL_VALIDITY_HOURS")? {
            config.signal.validity_hours = hours;
        }
        if let Some(pct) = parse_var("ENTRY_TOLERANCE_PCT")? {
            config.tracker.entry_tolerance_pct = pct;
        }
        if let Some(ms) = parse_var("TRACKER_DELAY_MS")? {
            config.tracker.inter_call_delay_ms = ms;
        }
        if let Some(max) = parse_var("TRACKER_MAX_FAILURES")? {
            config.tracker.max_failures = max;
        }
        if let Some(secs) = parse_var("TRACKER_COOLDOWN_SECS")? {
            config.tracker.cooldown_secs = secs;
        }
        if let Some(min) = parse_var("LEARNING_MIN_SAMPLES")? {
            config.learning.min_samples = min;
        }
        if let Some(threshold) = parse_var("LEARNING_NOISE_THRESHOLD")? {
            config.learning.noise_threshold = threshold;
        }
        if let Some(capital) = parse_var("BACKTEST_INITIAL_CAPITAL")? {
            config.backtest.initial_capital = capital;
        }
        if let Some(pct) = parse_var("BACKTEST_POSITION_SIZE_PCT")? {
            config.backtest.position_size_pct = pct;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}
