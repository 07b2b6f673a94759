//! Live tracking cycles against an in-memory provider

use crate::common::{long_signal, ts};
use chrono::Duration;
use morpheus::config::TrackerConfig;
use morpheus::error::MarketDataError;
use morpheus::models::candle::{Candle, Timeframe};
use morpheus::models::position::PositionStatus;
use morpheus::outcome::LiveTracker;
use morpheus::services::{InMemoryMarketData, MarketDataProvider};
use std::sync::Arc;

fn config() -> TrackerConfig {
    TrackerConfig {
        inter_call_delay_ms: 0,
        max_failures: 2,
        cooldown_secs: 600,
        ..TrackerConfig::default()
    }
}

/// Errors for one symbol, fixed price for everything else.
struct BrokenFeed {
    broken: &'static str,
    price: f64,
}

#[async_trait::async_trait]
impl MarketDataProvider for BrokenFeed {
    async fn get_candles(
        &self,
        _symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<Vec<Candle>, MarketDataError> {
        Ok(Vec::new())
    }

    async fn get_current_price(&self, symbol: &str) -> Result<Option<f64>, MarketDataError> {
        if symbol.eq_ignore_ascii_case(self.broken) {
            return Err(MarketDataError::Provider("upstream 500".to_string()));
        }
        Ok(Some(self.price))
    }
}

#[tokio::test]
async fn test_cycles_fill_and_resolve() {
    let provider = Arc::new(InMemoryMarketData::new());
    provider.set_price("BTC", 100.0).await;

    let mut live = LiveTracker::new(provider.clone(), config());
    live.tracker_mut().accept(long_signal("BTC", ts(0))).unwrap();

    let first = live.run_cycle(ts(1)).await;
    assert_eq!(first.checked, 1);
    assert_eq!(first.resolved, 0);
    assert_eq!(live.tracker().positions()[0].status, PositionStatus::Active);

    provider.set_price("BTC", 131.0).await;
    let second = live.run_cycle(ts(2)).await;
    assert_eq!(second.resolved, 1);
    assert_eq!(second.events[0].status, PositionStatus::Tp3Hit);

    let third = live.run_cycle(ts(3)).await;
    assert_eq!(third.checked, 0);
}

#[tokio::test]
async fn test_missing_prices_back_off_one_asset_only() {
    let provider = Arc::new(InMemoryMarketData::new());
    provider.set_price("BTC", 100.0).await;

    let mut live = LiveTracker::new(provider.clone(), config());
    live.tracker_mut().accept(long_signal("BTC", ts(0))).unwrap();
    live.tracker_mut().accept(long_signal("ETH", ts(0))).unwrap();

    let first = live.run_cycle(ts(1)).await;
    assert_eq!(first.checked, 2);
    assert_eq!(first.failures, 1);

    let second = live.run_cycle(ts(2)).await;
    assert_eq!(second.failures, 1);
    assert_eq!(live.backoff().failures("ETH"), 2);

    provider.set_price("BTC", 115.0).await;
    provider.set_price("ETH", 100.0).await;
    let during_cooldown = live.run_cycle(ts(2) + Duration::minutes(5)).await;
    assert_eq!(during_cooldown.skipped, 1);
    assert_eq!(during_cooldown.checked, 1);
    assert_eq!(during_cooldown.events[0].symbol, "BTC");

    let after_cooldown = live.run_cycle(ts(3)).await;
    assert_eq!(after_cooldown.skipped, 0);
    assert_eq!(after_cooldown.checked, 1);
    assert_eq!(live.backoff().failures("ETH"), 0);
    let eth = live.tracker().active().next().unwrap();
    assert_eq!(eth.symbol(), "ETH");
    assert_eq!(eth.status, PositionStatus::Active);
}

#[tokio::test]
async fn test_provider_errors_do_not_stop_the_cycle() {
    let feed = Arc::new(BrokenFeed {
        broken: "BAD",
        price: 100.0,
    });
    let mut live = LiveTracker::new(feed, config());
    live.tracker_mut().accept(long_signal("BAD", ts(0))).unwrap();
    live.tracker_mut().accept(long_signal("GOOD", ts(0))).unwrap();

    let summary = live.run_cycle(ts(1)).await;
    assert_eq!(summary.checked, 2);
    assert_eq!(summary.failures, 1);
    let statuses: Vec<PositionStatus> = live.tracker().positions().iter().map(|p| p.status).collect();
    assert_eq!(statuses, vec![PositionStatus::Waiting, PositionStatus::Active]);
}

#[tokio::test]
async fn test_overdue_positions_expire_without_price() {
    let provider = Arc::new(InMemoryMarketData::new());
    let mut live = LiveTracker::new(provider, config());
    live.tracker_mut().accept(long_signal("SOL", ts(0))).unwrap();

    let summary = live.run_cycle(ts(49)).await;
    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.checked, 0);
    assert_eq!(summary.events[0].status, PositionStatus::Expired);
    assert_eq!(summary.events[0].pnl_percent, 0.0);
}
