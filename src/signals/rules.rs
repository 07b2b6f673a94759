//! Prioritized action rules.
//!
//! Rules are evaluated in order on the fast timeframe, with the slow
//! timeframe as cross-check; the first match decides the action. When nothing
//! matches the decision is HOLD.

use crate::models::indicators::{
    Crossover, IndicatorSnapshot, MacdTrend, RsiSignal, TrendDirection,
};
use crate::models::signal::SignalAction;

/// Inputs every rule sees.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub fast: &'a IndicatorSnapshot,
    pub slow: &'a IndicatorSnapshot,
    pub sentiment: f64,
}

impl<'a> RuleContext<'a> {
    pub fn new(fast: &'a IndicatorSnapshot, slow: &'a IndicatorSnapshot, sentiment: f64) -> Self {
        Self {
            fast,
            slow,
            sentiment,
        }
    }

    fn rsi(&self) -> f64 {
        self.fast.rsi.value
    }

    fn slow_rsi(&self) -> f64 {
        self.slow.rsi.value
    }

    fn rsi_signal(&self) -> RsiSignal {
        self.fast.rsi.signal
    }

    fn histogram(&self) -> f64 {
        self.fast.macd.histogram
    }

    fn crossover(&self) -> Option<Crossover> {
        self.fast.macd.crossover
    }

    fn direction(&self) -> TrendDirection {
        self.fast.trend.direction
    }
}

/// One predicate paired with the action it selects.
#[derive(Debug, Clone, Copy)]
pub struct CascadeRule {
    pub name: &'static str,
    pub action: SignalAction,
    predicate: fn(&RuleContext) -> bool,
}

impl CascadeRule {
    pub fn new(name: &'static str, action: SignalAction, predicate: fn(&RuleContext) -> bool) -> Self {
        Self {
            name,
            action,
            predicate,
        }
    }

    pub fn matches(&self, ctx: &RuleContext) -> bool {
        (self.predicate)(ctx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: SignalAction,
    pub rule: &'static str,
}

pub const NO_EDGE: &str = "no_edge";
pub const NO_MATCH: &str = "no_match";

#[derive(Debug, Clone)]
pub struct RuleCascade {
    rules: Vec<CascadeRule>,
    min_sentiment_edge: f64,
}

impl Default for RuleCascade {
    fn default() -> Self {
        Self::standard(8.0)
    }
}

impl RuleCascade {
    pub fn new(rules: Vec<CascadeRule>, min_sentiment_edge: f64) -> Self {
        Self {
            rules,
            min_sentiment_edge,
        }
    }

    /// The production rule set, highest priority first.
    pub fn standard(min_sentiment_edge: f64) -> Self {
        use SignalAction::{Long, Short};

        let rules = vec![
            // Extreme RSI, unconditional
            CascadeRule::new("extreme_rsi_long", Long, |c| c.rsi() <= 20.0),
            CascadeRule::new("extreme_rsi_short", Short, |c| c.rsi() >= 80.0),
            // RSI zone plus any one confirmation
            CascadeRule::new("confirmed_oversold", Long, |c| {
                c.rsi_signal() == RsiSignal::Oversold
                    && (c.sentiment > 0.0
                        || c.histogram() > 0.0
                        || c.crossover() == Some(Crossover::BullishCross)
                        || c.slow_rsi() < 40.0)
            }),
            CascadeRule::new("confirmed_overbought", Short, |c| {
                c.rsi_signal() == RsiSignal::Overbought
                    && (c.sentiment < 0.0
                        || c.histogram() < 0.0
                        || c.crossover() == Some(Crossover::BearishCross)
                        || c.slow_rsi() > 60.0)
            }),
            // High conviction
            CascadeRule::new("high_conviction_long", Long, |c| {
                c.sentiment > 25.0
                    && c.rsi_signal() == RsiSignal::Oversold
                    && c.direction() != TrendDirection::Down
            }),
            CascadeRule::new("high_conviction_short", Short, |c| {
                c.sentiment < -25.0
                    && c.rsi_signal() == RsiSignal::Overbought
                    && c.direction() != TrendDirection::Up
            }),
            // Trend following
            CascadeRule::new("trend_following_long", Long, |c| {
                c.direction() == TrendDirection::Up
                    && c.fast.trend.strength > 35
                    && c.fast.macd.trend == MacdTrend::Bullish
                    && c.sentiment > 10.0
            }),
            CascadeRule::new("trend_following_short", Short, |c| {
                c.direction() == TrendDirection::Down
                    && c.fast.trend.strength > 35
                    && c.fast.macd.trend == MacdTrend::Bearish
                    && c.sentiment < -10.0
            }),
            // MACD crossover
            CascadeRule::new("macd_cross_long", Long, |c| {
                c.crossover() == Some(Crossover::BullishCross)
                    && c.rsi() < 60.0
                    && c.direction() != TrendDirection::Down
            }),
            CascadeRule::new("macd_cross_short", Short, |c| {
                c.crossover() == Some(Crossover::BearishCross)
                    && c.rsi() > 40.0
                    && c.direction() != TrendDirection::Up
            }),
            // Mean reversion
            CascadeRule::new("mean_reversion_long", Long, |c| {
                c.rsi() < 35.0
                    && c.slow_rsi() < 45.0
                    && (c.crossover() == Some(Crossover::BullishCross) || c.histogram() > 0.0)
            }),
            CascadeRule::new("mean_reversion_short", Short, |c| {
                c.rsi() > 65.0
                    && c.slow_rsi() > 55.0
                    && (c.crossover() == Some(Crossover::BearishCross) || c.histogram() < 0.0)
            }),
            // Momentum
            CascadeRule::new("momentum_long", Long, |c| {
                c.sentiment > 30.0
                    && c.direction() == TrendDirection::Up
                    && c.rsi() > 50.0
                    && c.rsi() < 70.0
            }),
            CascadeRule::new("momentum_short", Short, |c| {
                c.sentiment < -30.0
                    && c.direction() == TrendDirection::Down
                    && c.rsi() < 50.0
                    && c.rsi() > 30.0
            }),
        ];

        Self::new(rules, min_sentiment_edge)
    }

    /// Insert a rule at `priority` (0 is highest); appends when out of range.
    pub fn with_rule_at(mut self, priority: usize, rule: CascadeRule) -> Self {
        let index = priority.min(self.rules.len());
        self.rules.insert(index, rule);
        self
    }

    pub fn rules(&self) -> &[CascadeRule] {
        &self.rules
    }

    pub fn evaluate(&self, ctx: &RuleContext) -> Decision {
        if let Some(rule) = self.rules.iter().find(|r| r.matches(ctx)) {
            return Decision {
                action: rule.action,
                rule: rule.name,
            };
        }

        let rule = if ctx.sentiment.abs() < self.min_sentiment_edge {
            NO_EDGE
        } else {
            NO_MATCH
        };
        Decision {
            action: SignalAction::Hold,
            rule,
        }
    }
}
