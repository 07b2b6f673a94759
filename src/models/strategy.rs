//! Weighted-rule strategies replayed by the backtest engine

use crate::models::indicators::TrendDirection;
use serde::{Deserialize, Serialize};

/// A named set of weighted entry and exit rules plus fixed-percent risk limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub description: String,
    pub rules: Vec<StrategyRule>,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    /// Aggregate weight of matching entry rules required to open a position.
    #[serde(default = "default_min_entry_score")]
    pub min_entry_score: f64,
}

fn default_min_entry_score() -> f64 {
    50.0
}

impl Strategy {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            rules: Vec::new(),
            stop_loss_pct: 5.0,
            take_profit_pct: 10.0,
            min_entry_score: default_min_entry_score(),
        }
    }

    pub fn with_rule(mut self, rule: StrategyRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_stop_loss(mut self, pct: f64) -> Self {
        self.stop_loss_pct = pct;
        self
    }

    pub fn with_take_profit(mut self, pct: f64) -> Self {
        self.take_profit_pct = pct;
        self
    }

    pub fn entry_rules(&self) -> impl Iterator<Item = &StrategyRule> {
        self.rules.iter().filter(|r| r.action != RuleAction::Exit)
    }

    pub fn exit_rules(&self) -> impl Iterator<Item = &StrategyRule> {
        self.rules.iter().filter(|r| r.action == RuleAction::Exit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRule {
    pub action: RuleAction,
    pub condition: Condition,
    pub weight: f64,
}

impl StrategyRule {
    pub fn new(action: RuleAction, condition: Condition, weight: f64) -> Self {
        Self {
            action,
            condition,
            weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    Long,
    Short,
    Exit,
}

/// Comparison operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Comparison {
    GreaterThan,
    LessThan,
}

impl Comparison {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::GreaterThan => value > threshold,
            Comparison::LessThan => value < threshold,
        }
    }
}

/// Indicator condition a rule tests on each bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "indicator", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    Rsi {
        comparison: Comparison,
        threshold: f64,
    },
    /// MACD line relative to its signal line.
    MacdVsSignal { comparison: Comparison },
    MacdCrossAbove,
    MacdCrossBelow,
    Trend { direction: TrendDirection },
}

impl Condition {
    pub fn rsi_below(threshold: f64) -> Self {
        Condition::Rsi {
            comparison: Comparison::LessThan,
            threshold,
        }
    }

    pub fn rsi_above(threshold: f64) -> Self {
        Condition::Rsi {
            comparison: Comparison::GreaterThan,
            threshold,
        }
    }
}
