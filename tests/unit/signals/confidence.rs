//! Unit tests for confidence scoring and risk classification

use crate::common::bare_snapshot;
use morpheus::models::indicators::{RsiSignal, TrendDirection, TrendReading};
use morpheus::models::signal::RiskLevel;
use morpheus::signals::confidence::{apply_learning, calculate_confidence, risk_level, summarize};
use morpheus::signals::rules::RuleContext;

fn trend(direction: TrendDirection, strength: u32) -> TrendReading {
    let mut reading = TrendReading::sideways();
    reading.direction = direction;
    reading.strength = strength;
    reading
}

#[test]
fn test_neutral_inputs_score_baseline() {
    let fast = bare_snapshot(100.0);
    let slow = bare_snapshot(100.0);
    let breakdown = calculate_confidence(&RuleContext::new(&fast, &slow, 0.0));
    assert_eq!(breakdown.total, 50);
    assert!(breakdown.factors.is_empty());
    assert_eq!(breakdown.learning_multiplier, 1.0);
    assert_eq!(summarize(&breakdown, 3), "Confidence 50% from baseline only");
}

#[test]
fn test_aligned_oversold_adds_factors() {
    let mut fast = bare_snapshot(100.0);
    fast.rsi.value = 15.0;
    fast.rsi.signal = RsiSignal::Oversold;
    let mut slow = bare_snapshot(100.0);
    slow.rsi.value = 25.0;
    slow.rsi.signal = RsiSignal::Oversold;

    let breakdown = calculate_confidence(&RuleContext::new(&fast, &slow, 0.0));
    let names: Vec<&str> = breakdown.factors.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["extreme_rsi", "rsi_timeframe_agreement", "rsi_partial_agreement"]
    );
    assert_eq!(breakdown.total, 90);
    assert!(summarize(&breakdown, 1).contains("extreme rsi"));
}

#[test]
fn test_sentiment_magnitude_contributes() {
    let fast = bare_snapshot(100.0);
    let slow = bare_snapshot(100.0);
    let breakdown = calculate_confidence(&RuleContext::new(&fast, &slow, -40.0));
    assert_eq!(breakdown.total, 54);
}

#[test]
fn test_confidence_is_clamped() {
    let mut fast = bare_snapshot(100.0);
    fast.rsi.value = 10.0;
    fast.rsi.signal = RsiSignal::Oversold;
    fast.trend = trend(TrendDirection::Down, 80);
    let mut slow = bare_snapshot(100.0);
    slow.rsi.value = 10.0;
    slow.rsi.signal = RsiSignal::Oversold;
    slow.trend = trend(TrendDirection::Down, 80);

    let breakdown = calculate_confidence(&RuleContext::new(&fast, &slow, 100.0));
    assert_eq!(breakdown.total, 95);
}

#[test]
fn test_apply_learning_scales_and_clamps() {
    let fast = bare_snapshot(100.0);
    let slow = bare_snapshot(100.0);
    let base = calculate_confidence(&RuleContext::new(&fast, &slow, 0.0));

    let halved = apply_learning(base.clone(), 0.5);
    assert_eq!(halved.total, 25);
    assert_eq!(halved.learning_multiplier, 0.5);

    let boosted = apply_learning(base.clone(), 1.5);
    assert_eq!(boosted.total, 75);

    let ignored = apply_learning(base.clone(), f64::NAN);
    assert_eq!(ignored.total, 50);
    assert_eq!(ignored.learning_multiplier, 1.0);

    let floored = apply_learning(base, 0.1);
    assert_eq!(floored.total, 25);
}

#[test]
fn test_risk_levels() {
    assert_eq!(risk_level(80, &trend(TrendDirection::Up, 70)), RiskLevel::Low);
    assert_eq!(risk_level(80, &trend(TrendDirection::Up, 50)), RiskLevel::Medium);
    assert_eq!(risk_level(40, &trend(TrendDirection::Up, 70)), RiskLevel::High);
    assert_eq!(risk_level(60, &trend(TrendDirection::Sideways, 0)), RiskLevel::High);
    assert_eq!(risk_level(60, &trend(TrendDirection::Down, 40)), RiskLevel::Medium);
}
