//! Unit tests for the signal generator

use crate::common::{base_time, by_timeframe, flat_candles, geometric_candles};
use chrono::Duration;
use morpheus::config::SignalConfig;
use morpheus::learning::LearningSnapshot;
use morpheus::models::candle::{Asset, Timeframe};
use morpheus::models::signal::{SignalAction, TradeSide};
use morpheus::signals::levels::levels_are_ordered;
use morpheus::signals::{SignalEngine, SignalGenerator, SignalRequest};
use std::collections::HashMap;

fn overbought_request(symbol: &str) -> SignalRequest {
    SignalRequest::new(
        Asset::new(symbol),
        by_timeframe(geometric_candles(60, 100.0, 1.0), geometric_candles(60, 100.0, 1.0)),
    )
}

#[test]
fn test_pegged_asset_yields_nothing() {
    let generator = SignalGenerator::new(SignalConfig::default());
    let request = overbought_request("USDT");
    assert!(generator.generate_at(&request, base_time()).is_none());
}

#[test]
fn test_overbought_rally_emits_short() {
    let generator = SignalGenerator::new(SignalConfig::default());
    let request = overbought_request("BTC");
    let now = base_time();

    let signal = generator.generate_at(&request, now).unwrap();
    assert_eq!(signal.action, SignalAction::Short);
    assert_eq!(signal.reasoning.rule, "extreme_rsi_short");
    assert!(signal.id.starts_with("sig_"));
    assert_eq!(signal.created_at, now);
    assert_eq!(signal.expires_at, now + Duration::hours(48));
    assert!(levels_are_ordered(
        TradeSide::Short,
        signal.entry,
        signal.stop_loss,
        &signal.targets
    ));
    assert!((25..=95).contains(&signal.confidence));
    assert!(signal.indicators.contains_key("rsi_4h"));
    assert!(signal.indicators.contains_key("rsi_1d"));
    assert!(signal.indicators.contains_key("macd_histogram"));
}

#[test]
fn test_entry_prefers_hourly_price() {
    let generator = SignalGenerator::new(SignalConfig::default());
    let mut request = overbought_request("ETH");
    let hourly = flat_candles(5, 150.0);
    request.candles.insert(Timeframe::OneHour, hourly);

    assert_eq!(generator.current_price(&request), Some(150.0));
    let signal = generator.generate_at(&request, base_time()).unwrap();
    assert_eq!(signal.entry, 150.0);
}

#[test]
fn test_flat_market_holds() {
    let generator = SignalGenerator::new(SignalConfig::default());
    let request = SignalRequest::new(
        Asset::new("SOL"),
        by_timeframe(flat_candles(60, 20.0), flat_candles(60, 20.0)),
    );
    assert!(generator.generate_at(&request, base_time()).is_none());
}

#[test]
fn test_missing_data_yields_nothing() {
    let generator = SignalGenerator::new(SignalConfig::default());
    let request = SignalRequest::new(Asset::new("BTC"), HashMap::new());
    assert_eq!(generator.current_price(&request), None);
    assert!(generator.generate_at(&request, base_time()).is_none());
}

#[test]
fn test_learning_multiplier_lowers_confidence() {
    let request = overbought_request("BTC");
    let plain = SignalGenerator::new(SignalConfig::default())
        .generate_at(&request, base_time())
        .unwrap();

    let mut multipliers = HashMap::new();
    multipliers.insert("asset_BTC".to_string(), 0.5);
    let learned = SignalGenerator::new(SignalConfig::default())
        .with_learning(LearningSnapshot::from_multipliers(multipliers))
        .generate_at(&request, base_time())
        .unwrap();

    assert!(learned.confidence < plain.confidence);
    assert_eq!(learned.reasoning.confidence.learning_multiplier, 0.5);
}

#[test]
fn test_context_text_is_carried() {
    let generator = SignalGenerator::new(SignalConfig::default());
    let request = overbought_request("BTC")
        .with_fundamental_context("ETF inflows slowing")
        .with_sentiment_context("Funding rates elevated");

    let signal = generator.generate_at(&request, base_time()).unwrap();
    assert_eq!(signal.reasoning.fundamental, "ETF inflows slowing");
    assert_eq!(signal.reasoning.sentiment, "Funding rates elevated");
    assert!(!signal.reasoning.technical.is_empty());
}

#[test]
fn test_scan_skips_holds_and_pegged() {
    let generator = SignalGenerator::new(SignalConfig::default());
    let requests = vec![
        overbought_request("BTC"),
        overbought_request("USDC"),
        SignalRequest::new(
            Asset::new("SOL"),
            by_timeframe(flat_candles(60, 20.0), flat_candles(60, 20.0)),
        ),
        overbought_request("ETH"),
    ];

    let signals = SignalEngine::scan_at(&generator, &requests, base_time());
    assert_eq!(signals.len(), 2);
    assert!(signals.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    assert_ne!(signals[0].id, signals[1].id);
}
