//! Preset strategies

use crate::models::indicators::TrendDirection;
use crate::models::strategy::{Comparison, Condition, RuleAction, Strategy, StrategyRule};

pub fn rsi_oversold_long() -> Strategy {
    Strategy::new(
        "RSI Oversold Long",
        "Buy when RSI drops below 30, sell when RSI exceeds 70 or the stop is hit",
    )
    .with_rule(StrategyRule::new(RuleAction::Long, Condition::rsi_below(30.0), 60.0))
    .with_rule(StrategyRule::new(RuleAction::Exit, Condition::rsi_above(70.0), 50.0))
    .with_stop_loss(5.0)
    .with_take_profit(10.0)
}

pub fn rsi_extreme_oversold() -> Strategy {
    Strategy::new(
        "RSI Extreme Oversold",
        "Buy only when RSI drops below 25",
    )
    .with_rule(StrategyRule::new(RuleAction::Long, Condition::rsi_below(25.0), 70.0))
    .with_rule(StrategyRule::new(RuleAction::Exit, Condition::rsi_above(65.0), 50.0))
    .with_stop_loss(7.0)
    .with_take_profit(15.0)
}

pub fn rsi_overbought_short() -> Strategy {
    Strategy::new(
        "RSI Overbought Short",
        "Short when RSI exceeds 70, cover when RSI drops below 30",
    )
    .with_rule(StrategyRule::new(RuleAction::Short, Condition::rsi_above(70.0), 60.0))
    .with_rule(StrategyRule::new(RuleAction::Exit, Condition::rsi_below(30.0), 50.0))
    .with_stop_loss(5.0)
    .with_take_profit(10.0)
}

pub fn rsi_trend_alignment() -> Strategy {
    Strategy::new(
        "RSI + Trend Alignment",
        "Buy oversold RSI only while the trend is up",
    )
    .with_rule(StrategyRule::new(RuleAction::Long, Condition::rsi_below(35.0), 40.0))
    .with_rule(StrategyRule::new(
        RuleAction::Long,
        Condition::Trend {
            direction: TrendDirection::Up,
        },
        30.0,
    ))
    .with_rule(StrategyRule::new(RuleAction::Exit, Condition::rsi_above(65.0), 50.0))
    .with_stop_loss(4.0)
    .with_take_profit(12.0)
}

pub fn macd_crossover() -> Strategy {
    Strategy::new(
        "MACD Crossover",
        "Buy when MACD crosses above its signal line, sell on the bearish cross",
    )
    .with_rule(StrategyRule::new(RuleAction::Long, Condition::MacdCrossAbove, 60.0))
    .with_rule(StrategyRule::new(RuleAction::Exit, Condition::MacdCrossBelow, 50.0))
    .with_stop_loss(6.0)
    .with_take_profit(12.0)
}

pub fn rsi_macd_combined() -> Strategy {
    Strategy::new(
        "RSI + MACD Combined",
        "Buy when RSI is oversold and MACD is above its signal line",
    )
    .with_rule(StrategyRule::new(RuleAction::Long, Condition::rsi_below(35.0), 35.0))
    .with_rule(StrategyRule::new(
        RuleAction::Long,
        Condition::MacdVsSignal {
            comparison: Comparison::GreaterThan,
        },
        35.0,
    ))
    .with_rule(StrategyRule::new(RuleAction::Exit, Condition::rsi_above(70.0), 50.0))
    .with_stop_loss(5.0)
    .with_take_profit(15.0)
}

pub fn conservative_rsi() -> Strategy {
    Strategy::new(
        "Conservative RSI",
        "Tight stops and modest targets",
    )
    .with_rule(StrategyRule::new(RuleAction::Long, Condition::rsi_below(30.0), 60.0))
    .with_rule(StrategyRule::new(RuleAction::Exit, Condition::rsi_above(55.0), 50.0))
    .with_stop_loss(3.0)
    .with_take_profit(6.0)
}

pub fn aggressive_rsi() -> Strategy {
    Strategy::new(
        "Aggressive RSI",
        "Wide stops and large targets",
    )
    .with_rule(StrategyRule::new(RuleAction::Long, Condition::rsi_below(30.0), 60.0))
    .with_rule(StrategyRule::new(RuleAction::Exit, Condition::rsi_above(75.0), 50.0))
    .with_stop_loss(8.0)
    .with_take_profit(20.0)
}

pub fn all_strategies() -> Vec<Strategy> {
    vec![
        rsi_oversold_long(),
        rsi_extreme_oversold(),
        rsi_overbought_short(),
        rsi_trend_alignment(),
        macd_crossover(),
        rsi_macd_combined(),
        conservative_rsi(),
        aggressive_rsi(),
    ]
}

/// Case-insensitive lookup by name.
pub fn get_strategy(name: &str) -> Option<Strategy> {
    all_strategies()
        .into_iter()
        .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
}

pub fn list_strategies() -> Vec<String> {
    all_strategies().into_iter().map(|s| s.name).collect()
}
