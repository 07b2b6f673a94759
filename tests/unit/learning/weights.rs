//! Unit tests for learned confidence weights

use crate::common::{long_signal, ts};
use morpheus::config::LearningConfig;
use morpheus::learning::{asset_key, indicator_key, LearningBook, LearningSnapshot};
use morpheus::models::learning::WeightCategory;
use morpheus::models::position::{OutcomeEvent, PositionStatus};
use morpheus::models::signal::SignalAction;
use std::collections::HashMap;

fn book() -> LearningBook {
    LearningBook::new(LearningConfig::default())
}

fn event(status: PositionStatus, pnl: f64) -> OutcomeEvent {
    OutcomeEvent {
        signal_id: "sig_test".to_string(),
        symbol: "BTC".to_string(),
        action: SignalAction::Long,
        status,
        exit_price: 100.0 + pnl,
        pnl_percent: pnl,
        time_to_resolution_secs: 3600,
        resolved_at: ts(1),
    }
}

#[test]
fn test_key_formats() {
    assert_eq!(indicator_key("rsi_4h", SignalAction::Long), "rsi_4h_LONG");
    assert_eq!(asset_key(" eth "), "asset_ETH");
}

#[test]
fn test_weight_needs_min_samples() {
    let mut book = book();
    for _ in 0..4 {
        assert!(book
            .record("rsi_4h_LONG", WeightCategory::Indicator, true, 5.0, ts(0))
            .is_none());
    }
    assert_eq!(book.get_confidence_multiplier("rsi_4h_LONG"), 1.0);

    let update = book
        .record("rsi_4h_LONG", WeightCategory::Indicator, true, 5.0, ts(1))
        .unwrap();
    assert_eq!(update.samples, 5);
    assert_eq!(update.old_weight, 1.0);
    assert_eq!(update.new_weight, 1.5);
    assert_eq!(book.get_confidence_multiplier("rsi_4h_LONG"), 1.5);
}

#[test]
fn test_changes_within_noise_are_ignored() {
    let mut book = book();
    for i in 0..20 {
        book.record("asset_BTC", WeightCategory::Asset, true, 1.0, ts(i));
    }
    assert_eq!(book.get_confidence_multiplier("asset_BTC"), 1.5);

    // 20/21 wins moves the candidate by less than the noise threshold
    let update = book.record("asset_BTC", WeightCategory::Asset, false, -1.0, ts(21));
    assert!(update.is_none());
    let weight = book.weight("asset_BTC").unwrap();
    assert_eq!(weight.samples(), 21);
    assert_eq!(weight.adjusted_weight, 1.5);
}

#[test]
fn test_losses_pull_weight_down() {
    let mut book = book();
    for i in 0..5 {
        book.record("macd_histogram_SHORT", WeightCategory::Indicator, false, -3.0, ts(i));
    }
    assert_eq!(book.get_confidence_multiplier("macd_histogram_SHORT"), 0.5);
    assert_eq!(book.weight("macd_histogram_SHORT").unwrap().avg_pnl(), -3.0);
}

#[test]
fn test_record_outcome_touches_every_key() {
    let mut book = book();
    let signal = long_signal("BTC", ts(0));
    book.record_outcome(&signal, &event(PositionStatus::Tp1Hit, 10.0));

    assert_eq!(book.len(), signal.indicators.len() + 1);
    assert!(book.weight("rsi_4h_LONG").is_some());
    assert!(book.weight("macd_histogram_LONG").is_some());
    assert_eq!(book.weight("asset_BTC").unwrap().win_count, 1);
}

#[test]
fn test_expired_counts_as_loss() {
    let mut book = book();
    let signal = long_signal("BTC", ts(0));
    book.record_outcome(&signal, &event(PositionStatus::Expired, 0.0));
    assert_eq!(book.weight("asset_BTC").unwrap().loss_count, 1);
}

#[test]
fn test_snapshot_holds_only_qualified_weights() {
    let mut book = book();
    for i in 0..5 {
        book.record("asset_BTC", WeightCategory::Asset, true, 2.0, ts(i));
    }
    book.record("asset_ETH", WeightCategory::Asset, true, 2.0, ts(0));

    let snapshot = book.snapshot();
    assert_eq!(snapshot.multiplier("asset_BTC"), Some(1.5));
    assert_eq!(snapshot.multiplier("asset_ETH"), None);

    // later updates do not leak into an existing snapshot
    for i in 0..5 {
        book.record("asset_BTC", WeightCategory::Asset, false, -2.0, ts(10 + i));
    }
    assert_eq!(snapshot.multiplier("asset_BTC"), Some(1.5));
}

#[test]
fn test_snapshot_multiplier_averages_known_keys() {
    let mut multipliers = HashMap::new();
    multipliers.insert("a".to_string(), 1.2);
    multipliers.insert("b".to_string(), 0.8);
    let snapshot = LearningSnapshot::from_multipliers(multipliers);

    let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    assert!((snapshot.multiplier_for(&keys) - 1.0).abs() < 1e-12);
    assert_eq!(snapshot.multiplier_for(&["c".to_string()]), 1.0);
    assert!(LearningSnapshot::default().is_empty());
}
