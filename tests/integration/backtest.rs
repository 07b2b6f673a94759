//! Backtest runs through the runner and provider

use crate::common::{candles_from_closes, flat_candles, ts, wave_closes};
use morpheus::backtest::{all_strategies, BacktestConfig, BacktestEngine, BacktestRunner};
use morpheus::config::BacktestDefaults;
use morpheus::error::{BacktestError, MarketDataError};
use morpheus::models::backtest::ExitReason;
use morpheus::models::candle::{Candle, Timeframe};
use morpheus::models::strategy::{Condition, RuleAction, Strategy, StrategyRule};
use morpheus::services::{InMemoryMarketData, MarketDataProvider};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Fails the first `failures` candle requests, then serves `candles`.
struct FlakyProvider {
    calls: AtomicUsize,
    failures: usize,
    transient: bool,
    candles: Vec<Candle>,
}

impl FlakyProvider {
    fn new(failures: usize, transient: bool, candles: Vec<Candle>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures,
            transient,
            candles,
        }
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for FlakyProvider {
    async fn get_candles(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            if self.transient {
                return Err(MarketDataError::Unavailable {
                    asset: symbol.to_string(),
                });
            }
            return Err(MarketDataError::Provider("bad request".to_string()));
        }
        Ok(self.candles.clone())
    }

    async fn get_current_price(&self, _symbol: &str) -> Result<Option<f64>, MarketDataError> {
        Ok(self.candles.last().map(|c| c.close))
    }
}

fn wave_candles(count: usize) -> Vec<Candle> {
    candles_from_closes(&wave_closes(count, 90.0, 110.0, 12))
}

fn always_long() -> Strategy {
    Strategy::new("Always Long", "test strategy")
        .with_rule(StrategyRule::new(RuleAction::Long, Condition::rsi_below(101.0), 60.0))
        .with_stop_loss(3.0)
        .with_take_profit(4.0)
}

#[test]
fn test_flat_series_produces_no_trades_for_any_preset() {
    let candles = flat_candles(120, 50.0);
    for strategy in all_strategies() {
        let name = strategy.name.clone();
        let report = BacktestEngine::new(BacktestConfig::new("FLAT", Timeframe::OneDay, strategy))
            .run(&candles)
            .unwrap();
        assert_eq!(report.metrics.total_trades, 0, "{}", name);
        assert_eq!(report.metrics.profit_factor, 0.0, "{}", name);
    }
}

#[test]
fn test_results_do_not_depend_on_future_bars() {
    let candles = wave_candles(150);
    let config = BacktestConfig::new("BTC", Timeframe::FourHour, always_long());

    let full = BacktestEngine::new(config.clone()).run(&candles).unwrap();
    let prefix = BacktestEngine::new(config).run(&candles[..100]).unwrap();

    let settled: Vec<_> = prefix
        .trades
        .iter()
        .filter(|t| t.exit_reason != Some(ExitReason::EndOfPeriod))
        .collect();
    assert!(!settled.is_empty());
    for (a, b) in settled.iter().zip(&full.trades) {
        assert_eq!(*a, b);
    }
    assert_eq!(prefix.equity_curve[..], full.equity_curve[..prefix.equity_curve.len()]);
}

#[test]
fn test_range_filter_limits_candles() {
    let candles = wave_candles(150);
    let config = BacktestConfig::new("BTC", Timeframe::FourHour, always_long())
        .with_range(Some(ts(50)), Some(ts(99)));
    let report = BacktestEngine::new(config).run(&candles).unwrap();

    assert_eq!(report.candles_processed, 50);
    assert_eq!(report.start, Some(ts(50)));
    assert_eq!(report.end, Some(ts(99)));
    assert!(report.trades.iter().all(|t| t.entry_time >= ts(50)));
}

#[tokio::test]
async fn test_runner_runs_every_preset() {
    let provider = InMemoryMarketData::new();
    provider
        .insert_candles("BTC", Timeframe::FourHour, wave_candles(200))
        .await;
    let runner = BacktestRunner::new(Arc::new(provider), BacktestDefaults::default());

    let results = runner
        .run_many("BTC", Timeframe::FourHour, all_strategies(), (None, None))
        .await
        .unwrap();
    assert_eq!(results.len(), 8);
    for (name, result) in &results {
        let report = result.as_ref().unwrap();
        assert_eq!(&report.strategy, name);
        assert_eq!(report.candles_processed, 200);
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_run_many_lets_other_tasks_progress() {
    let provider = InMemoryMarketData::new();
    provider
        .insert_candles("BTC", Timeframe::FourHour, wave_candles(200))
        .await;
    let runner = BacktestRunner::new(Arc::new(provider), BacktestDefaults::default());

    let ticked = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ticked);
    let ticker = tokio::spawn(async move {
        tokio::task::yield_now().await;
        flag.store(true, Ordering::SeqCst);
    });

    let results = runner
        .run_many("BTC", Timeframe::FourHour, all_strategies(), (None, None))
        .await
        .unwrap();
    assert_eq!(results.len(), 8);
    assert!(ticked.load(Ordering::SeqCst));
    ticker.await.unwrap();
}

#[tokio::test]
async fn test_runner_missing_data_is_no_data() {
    let runner = BacktestRunner::new(Arc::new(InMemoryMarketData::new()), BacktestDefaults::default());
    let config = BacktestConfig::new("NOPE", Timeframe::OneDay, always_long());
    assert!(matches!(
        runner.run(config).await,
        Err(BacktestError::NoData { .. })
    ));
}

#[tokio::test]
async fn test_runner_retries_transient_failures() {
    let provider = Arc::new(FlakyProvider::new(2, true, wave_candles(80)));
    let runner = BacktestRunner::new(provider.clone(), BacktestDefaults::default());

    let candles = runner.load("BTC", Timeframe::FourHour).await.unwrap();
    assert_eq!(candles.len(), 80);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_runner_does_not_retry_permanent_failures() {
    let provider = Arc::new(FlakyProvider::new(1, false, wave_candles(80)));
    let runner = BacktestRunner::new(provider.clone(), BacktestDefaults::default());

    let result = runner.load("BTC", Timeframe::FourHour).await;
    assert!(matches!(result, Err(BacktestError::DataLoad(_))));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}
