//! Unit tests for preset strategies

use morpheus::backtest::{all_strategies, get_strategy, list_strategies};
use morpheus::models::strategy::RuleAction;

#[test]
fn test_eight_presets_with_unique_names() {
    let names = list_strategies();
    assert_eq!(names.len(), 8);
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), names.len());
}

#[test]
fn test_presets_are_well_formed() {
    for strategy in all_strategies() {
        assert!(strategy.entry_rules().next().is_some(), "{}", strategy.name);
        assert!(strategy.exit_rules().next().is_some(), "{}", strategy.name);
        assert!(strategy.stop_loss_pct > 0.0);
        assert!(strategy.take_profit_pct > strategy.stop_loss_pct);
    }
}

#[test]
fn test_get_strategy_is_case_insensitive() {
    let strategy = get_strategy("rsi oversold long").unwrap();
    assert_eq!(strategy.name, "RSI Oversold Long");
    assert_eq!(strategy.stop_loss_pct, 5.0);
    assert_eq!(strategy.take_profit_pct, 10.0);
    assert!(get_strategy("Unknown Strategy").is_none());
}

#[test]
fn test_overbought_short_preset_sells() {
    let strategy = get_strategy("RSI Overbought Short").unwrap();
    assert!(strategy.entry_rules().all(|r| r.action == RuleAction::Short));
}

#[test]
fn test_trend_alignment_needs_both_rules() {
    let strategy = get_strategy("RSI + Trend Alignment").unwrap();
    let weights: Vec<f64> = strategy.entry_rules().map(|r| r.weight).collect();
    assert_eq!(weights, vec![40.0, 30.0]);
    assert!(weights.iter().all(|w| *w < strategy.min_entry_score));
    assert!(weights.iter().sum::<f64>() >= strategy.min_entry_score);
}
