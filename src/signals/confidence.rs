//! Confidence scoring and risk classification

use crate::models::indicators::{MacdTrend, RsiSignal, TrendDirection, TrendReading};
use crate::models::signal::{ConfidenceBreakdown, ConfidenceFactor, RiskLevel};
use crate::signals::rules::RuleContext;

pub const BASE_CONFIDENCE: f64 = 50.0;
pub const MIN_CONFIDENCE: f64 = 25.0;
pub const MAX_CONFIDENCE: f64 = 95.0;

fn clamp_confidence(value: f64) -> u8 {
    value.round().clamp(MIN_CONFIDENCE, MAX_CONFIDENCE) as u8
}

/// Additive confidence from multi-indicator agreement, clamped to [25, 95].
pub fn calculate_confidence(ctx: &RuleContext) -> ConfidenceBreakdown {
    let fast = ctx.fast;
    let slow = ctx.slow;
    let mut factors = Vec::new();
    let mut push = |name: &str, contribution: f64| {
        if contribution != 0.0 {
            factors.push(ConfidenceFactor {
                name: name.to_string(),
                contribution,
            });
        }
    };

    let rsi = fast.rsi.value;
    let fast_zone = fast.rsi.signal;
    if rsi <= 20.0 || rsi >= 80.0 {
        push("extreme_rsi", 20.0);
    } else if rsi <= 25.0 || rsi >= 75.0 {
        push("strong_rsi", 15.0);
    } else if fast_zone != RsiSignal::Neutral {
        push("rsi_zone", 10.0);
    }

    if fast_zone != RsiSignal::Neutral && fast_zone == slow.rsi.signal {
        push("rsi_timeframe_agreement", 15.0);
    }
    let partial = match fast_zone {
        RsiSignal::Oversold => slow.rsi.value < 40.0,
        RsiSignal::Overbought => slow.rsi.value > 60.0,
        RsiSignal::Neutral => false,
    };
    if partial {
        push("rsi_partial_agreement", 5.0);
    }

    if fast.macd.trend != MacdTrend::Neutral && fast.macd.trend == slow.macd.trend {
        push("macd_agreement", 10.0);
    }

    if fast.trend.direction != TrendDirection::Sideways
        && fast.trend.direction == slow.trend.direction
    {
        push("trend_agreement", 15.0);
    }

    push("sentiment_magnitude", ctx.sentiment.abs() * 0.1);

    if fast.macd.crossover.is_some() {
        push("macd_crossover", 10.0);
    }

    let raw = BASE_CONFIDENCE + factors.iter().map(|f| f.contribution).sum::<f64>();

    ConfidenceBreakdown {
        base: BASE_CONFIDENCE,
        factors,
        learning_multiplier: 1.0,
        total: clamp_confidence(raw),
    }
}

/// Scale a score by a learned multiplier and re-clamp.
pub fn apply_learning(mut breakdown: ConfidenceBreakdown, multiplier: f64) -> ConfidenceBreakdown {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return breakdown;
    }
    breakdown.learning_multiplier = multiplier;
    breakdown.total = clamp_confidence(breakdown.total as f64 * multiplier);
    breakdown
}

pub fn risk_level(confidence: u8, trend: &TrendReading) -> RiskLevel {
    if confidence > 75 && trend.strength > 60 {
        RiskLevel::Low
    } else if confidence < 50 || trend.direction == TrendDirection::Sideways {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    }
}

/// Top contributing factors, largest first, as a short sentence.
pub fn summarize(breakdown: &ConfidenceBreakdown, limit: usize) -> String {
    let mut factors: Vec<&ConfidenceFactor> = breakdown.factors.iter().collect();
    factors.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));

    let parts: Vec<String> = factors
        .iter()
        .take(limit)
        .map(|f| format!("{} (+{:.1})", f.name.replace('_', " "), f.contribution))
        .collect();

    if parts.is_empty() {
        format!("Confidence {}% from baseline only", breakdown.total)
    } else {
        format!("Confidence {}% driven by {}", breakdown.total, parts.join(", "))
    }
}
