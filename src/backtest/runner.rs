//! Loads candles from a provider and runs one or more strategies over them.

use crate::backtest::engine::{BacktestConfig, BacktestEngine};
use crate::config::BacktestDefaults;
use crate::error::{BacktestError, MarketDataError};
use crate::models::backtest::BacktestReport;
use crate::models::candle::{Candle, Timeframe};
use crate::models::strategy::Strategy;
use crate::services::market_data::MarketDataProvider;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

const LOAD_RETRIES: usize = 3;

pub struct BacktestRunner<P: MarketDataProvider> {
    provider: Arc<P>,
    defaults: BacktestDefaults,
}

impl<P: MarketDataProvider> BacktestRunner<P> {
    pub fn new(provider: Arc<P>, defaults: BacktestDefaults) -> Self {
        Self { provider, defaults }
    }

    /// Fetch candles, retrying transient provider failures.
    pub async fn load(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, BacktestError> {
        let provider = &self.provider;
        let mut candles = (|| async move { provider.get_candles(symbol, timeframe).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(200))
                    .with_max_times(LOAD_RETRIES),
            )
            .when(|e: &MarketDataError| e.is_transient())
            .notify(|e: &MarketDataError, delay: Duration| {
                warn!(asset = %symbol, error = %e, "BacktestRunner: retrying load in {:?}", delay);
            })
            .await?;

        candles.sort_by_key(|c| c.timestamp);
        if candles.is_empty() {
            return Err(BacktestError::NoData {
                asset: symbol.to_string(),
            });
        }
        Ok(candles)
    }

    pub async fn run(&self, config: BacktestConfig) -> Result<BacktestReport, BacktestError> {
        let candles = self.load(&config.symbol, config.timeframe).await?;
        BacktestEngine::new(config).run(&candles)
    }

    /// Load once and run every strategy over the same candles.
    ///
    /// Each strategy gets its own result; one failing run leaves the others
    /// untouched.
    pub async fn run_many(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        strategies: Vec<Strategy>,
        range: (Option<DateTime<Utc>>, Option<DateTime<Utc>>),
    ) -> Result<Vec<(String, Result<BacktestReport, BacktestError>)>, BacktestError> {
        let candles = self.load(symbol, timeframe).await?;
        let symbol = symbol.to_string();
        let defaults = self.defaults.clone();

        // Each bar recomputes indicators over the full prefix; keep the sweep
        // off the async workers.
        let results = tokio::task::spawn_blocking(move || {
            strategies
                .into_par_iter()
                .map(|strategy| {
                    let name = strategy.name.clone();
                    let config =
                        BacktestConfig::from_defaults(symbol.as_str(), timeframe, strategy, &defaults)
                            .with_range(range.0, range.1);
                    let result = BacktestEngine::new(config).run(&candles);
                    if let Err(e) = &result {
                        error!(asset = %symbol, strategy = %name, error = %e, "BacktestRunner: run failed");
                    }
                    (name, result)
                })
                .collect::<Vec<_>>()
        })
        .await?;
        Ok(results)
    }
}
