//! Error types shared across the crate

use thiserror::Error;

/// Failures reported by market data collaborators.
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// The provider could not answer right now; callers may retry later.
    #[error("market data temporarily unavailable for {asset}")]
    Unavailable { asset: String },
    #[error("market data provider error: {0}")]
    Provider(String),
}

impl MarketDataError {
    pub fn is_transient(&self) -> bool {
        matches!(self, MarketDataError::Unavailable { .. })
    }
}

/// Reasons a signal cannot be accepted for outcome tracking.
#[derive(Debug, Error, PartialEq)]
pub enum TrackingError {
    #[error("invalid entry price {0}")]
    InvalidEntry(f64),
    #[error("signal {0} has no direction to track")]
    NotDirectional(String),
    #[error("signal {0} is already tracked")]
    Duplicate(String),
}

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("failed to load candles: {0}")]
    DataLoad(#[from] MarketDataError),
    #[error("no candles available for {asset} in the requested range")]
    NoData { asset: String },
    #[error("invalid backtest configuration: {0}")]
    InvalidConfig(String),
    #[error("backtest worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
