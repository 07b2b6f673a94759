//! Unit tests for the rule cascade

use crate::common::bare_snapshot;
use morpheus::models::indicators::{Crossover, IndicatorSnapshot, MacdTrend, RsiSignal, TrendDirection};
use morpheus::models::signal::SignalAction;
use morpheus::signals::rules::{CascadeRule, RuleCascade, RuleContext, NO_EDGE, NO_MATCH};

#[test]
fn test_extreme_rsi_long_fires_unconditionally() {
    let mut fast = bare_snapshot(100.0);
    fast.rsi.value = 15.0;
    fast.rsi.signal = RsiSignal::Oversold;
    let slow = bare_snapshot(100.0);

    let decision = RuleCascade::standard(8.0).evaluate(&RuleContext::new(&fast, &slow, -50.0));
    assert_eq!(decision.action, SignalAction::Long);
    assert_eq!(decision.rule, "extreme_rsi_long");
}

#[test]
fn test_extreme_rsi_short_fires_unconditionally() {
    let mut fast = bare_snapshot(100.0);
    fast.rsi.value = 85.0;
    fast.rsi.signal = RsiSignal::Overbought;
    let slow = bare_snapshot(100.0);

    let decision = RuleCascade::default().evaluate(&RuleContext::new(&fast, &slow, 0.0));
    assert_eq!(decision.action, SignalAction::Short);
    assert_eq!(decision.rule, "extreme_rsi_short");
}

#[test]
fn test_oversold_needs_a_confirmation() {
    let mut fast = bare_snapshot(100.0);
    fast.rsi.value = 28.0;
    fast.rsi.signal = RsiSignal::Oversold;
    let mut slow = bare_snapshot(100.0);

    let cascade = RuleCascade::standard(8.0);
    let unconfirmed = cascade.evaluate(&RuleContext::new(&fast, &slow, 0.0));
    assert_eq!(unconfirmed.action, SignalAction::Hold);
    assert_eq!(unconfirmed.rule, NO_EDGE);

    slow.rsi.value = 35.0;
    let confirmed = cascade.evaluate(&RuleContext::new(&fast, &slow, 0.0));
    assert_eq!(confirmed.action, SignalAction::Long);
    assert_eq!(confirmed.rule, "confirmed_oversold");
}

#[test]
fn test_overbought_confirmed_by_negative_histogram() {
    let mut fast = bare_snapshot(100.0);
    fast.rsi.value = 72.0;
    fast.rsi.signal = RsiSignal::Overbought;
    fast.macd.histogram = -0.2;
    let slow = bare_snapshot(100.0);

    let decision = RuleCascade::standard(8.0).evaluate(&RuleContext::new(&fast, &slow, 0.0));
    assert_eq!(decision.action, SignalAction::Short);
    assert_eq!(decision.rule, "confirmed_overbought");
}

#[test]
fn test_macd_cross_long() {
    let mut fast = bare_snapshot(100.0);
    fast.macd.crossover = Some(Crossover::BullishCross);
    fast.macd.histogram = 0.01;
    let slow = bare_snapshot(100.0);

    let decision = RuleCascade::standard(8.0).evaluate(&RuleContext::new(&fast, &slow, 0.0));
    assert_eq!(decision.action, SignalAction::Long);
    assert_eq!(decision.rule, "macd_cross_long");
}

fn trending(direction: TrendDirection, strength: u32, rsi: f64) -> IndicatorSnapshot {
    let mut snapshot = bare_snapshot(100.0);
    snapshot.trend.direction = direction;
    snapshot.trend.strength = strength;
    snapshot.rsi.value = rsi;
    snapshot
}

fn decide(fast: &IndicatorSnapshot, slow: &IndicatorSnapshot, sentiment: f64) -> (SignalAction, &'static str) {
    let decision = RuleCascade::standard(8.0).evaluate(&RuleContext::new(fast, slow, sentiment));
    (decision.action, decision.rule)
}

#[test]
fn test_trend_following_long() {
    let mut fast = trending(TrendDirection::Up, 50, 45.0);
    fast.macd.trend = MacdTrend::Bullish;
    let slow = bare_snapshot(100.0);

    assert_eq!(decide(&fast, &slow, 15.0), (SignalAction::Long, "trend_following_long"));
}

#[test]
fn test_trend_following_short() {
    let mut fast = trending(TrendDirection::Down, 50, 50.0);
    fast.macd.trend = MacdTrend::Bearish;
    let slow = bare_snapshot(100.0);

    assert_eq!(decide(&fast, &slow, -15.0), (SignalAction::Short, "trend_following_short"));
}

#[test]
fn test_weak_trend_does_not_follow() {
    let mut fast = trending(TrendDirection::Up, 30, 45.0);
    fast.macd.trend = MacdTrend::Bullish;
    let slow = bare_snapshot(100.0);

    assert_eq!(decide(&fast, &slow, 15.0), (SignalAction::Hold, NO_MATCH));
}

#[test]
fn test_macd_cross_short() {
    let mut fast = bare_snapshot(100.0);
    fast.macd.crossover = Some(Crossover::BearishCross);
    fast.macd.histogram = -0.01;
    let slow = bare_snapshot(100.0);

    assert_eq!(decide(&fast, &slow, 0.0), (SignalAction::Short, "macd_cross_short"));
}

#[test]
fn test_mean_reversion_long() {
    let mut fast = bare_snapshot(100.0);
    fast.rsi.value = 33.0;
    fast.macd.histogram = 0.05;
    let mut slow = bare_snapshot(100.0);
    slow.rsi.value = 40.0;

    assert_eq!(decide(&fast, &slow, 0.0), (SignalAction::Long, "mean_reversion_long"));
}

#[test]
fn test_mean_reversion_short() {
    let mut fast = bare_snapshot(100.0);
    fast.rsi.value = 67.0;
    fast.macd.histogram = -0.05;
    let mut slow = bare_snapshot(100.0);
    slow.rsi.value = 60.0;

    assert_eq!(decide(&fast, &slow, 0.0), (SignalAction::Short, "mean_reversion_short"));
}

#[test]
fn test_momentum_long() {
    let fast = trending(TrendDirection::Up, 50, 55.0);
    let slow = bare_snapshot(100.0);

    assert_eq!(decide(&fast, &slow, 35.0), (SignalAction::Long, "momentum_long"));
}

#[test]
fn test_momentum_short() {
    let fast = trending(TrendDirection::Down, 50, 45.0);
    let slow = bare_snapshot(100.0);

    assert_eq!(decide(&fast, &slow, -35.0), (SignalAction::Short, "momentum_short"));
}

#[test]
fn test_trend_following_outranks_momentum() {
    let mut fast = trending(TrendDirection::Up, 50, 60.0);
    fast.macd.trend = MacdTrend::Bullish;
    let slow = bare_snapshot(100.0);

    // Both rules match; the earlier one wins.
    assert_eq!(decide(&fast, &slow, 40.0), (SignalAction::Long, "trend_following_long"));
    fast.macd.trend = MacdTrend::Neutral;
    assert_eq!(decide(&fast, &slow, 40.0), (SignalAction::Long, "momentum_long"));
}

#[test]
fn test_macd_cross_outranks_mean_reversion() {
    let mut fast = bare_snapshot(100.0);
    fast.rsi.value = 33.0;
    fast.macd.histogram = 0.05;
    fast.macd.crossover = Some(Crossover::BullishCross);
    let mut slow = bare_snapshot(100.0);
    slow.rsi.value = 40.0;

    assert_eq!(decide(&fast, &slow, 0.0), (SignalAction::Long, "macd_cross_long"));
}

#[test]
fn test_hold_reasons() {
    let fast = bare_snapshot(100.0);
    let slow = bare_snapshot(100.0);
    let cascade = RuleCascade::standard(8.0);

    assert_eq!(cascade.evaluate(&RuleContext::new(&fast, &slow, 3.0)).rule, NO_EDGE);
    assert_eq!(cascade.evaluate(&RuleContext::new(&fast, &slow, 20.0)).rule, NO_MATCH);
}

#[test]
fn test_inserted_rule_takes_priority() {
    let mut fast = bare_snapshot(100.0);
    fast.rsi.value = 15.0;
    let slow = bare_snapshot(100.0);

    let cascade = RuleCascade::standard(8.0).with_rule_at(
        0,
        CascadeRule::new("always_short", SignalAction::Short, |_| true),
    );
    assert_eq!(cascade.rules()[0].name, "always_short");

    let decision = cascade.evaluate(&RuleContext::new(&fast, &slow, 0.0));
    assert_eq!(decision.action, SignalAction::Short);
    assert_eq!(decision.rule, "always_short");
}

#[test]
fn test_out_of_range_priority_appends() {
    let cascade = RuleCascade::standard(8.0);
    let count = cascade.rules().len();
    let cascade = cascade.with_rule_at(
        999,
        CascadeRule::new("last_resort", SignalAction::Long, |_| true),
    );
    assert_eq!(cascade.rules().len(), count + 1);
    assert_eq!(cascade.rules()[count].name, "last_resort");
}
