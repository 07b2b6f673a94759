//! Technical sentiment score
//!
//! A bounded scalar in [-100, 100] summarizing how bullish (positive) or
//! bearish (negative) one timeframe's indicators read. Consumed by the rule
//! cascade and confidence scoring, never stored on its own.

use crate::models::indicators::{IndicatorSnapshot, MacdTrend, RsiSignal, TrendDirection};

/// Score one timeframe.
///
/// - RSI zone: +20 oversold, -20 overbought, plus (rsi - 50) x 0.2
/// - MACD: +/-20 for trend, plus histogram x 100 capped at +/-10
/// - Trend: +/- strength x 0.4 when trending
pub fn technical_sentiment(snapshot: &IndicatorSnapshot) -> f64 {
    let mut score = 0.0;

    score += match snapshot.rsi.signal {
        RsiSignal::Oversold => 20.0,
        RsiSignal::Overbought => -20.0,
        RsiSignal::Neutral => 0.0,
    };
    score += (snapshot.rsi.value - 50.0) * 0.2;

    score += match snapshot.macd.trend {
        MacdTrend::Bullish => 20.0,
        MacdTrend::Bearish => -20.0,
        MacdTrend::Neutral => 0.0,
    };
    score += (snapshot.macd.histogram * 100.0).clamp(-10.0, 10.0);

    let strength = snapshot.trend.strength as f64;
    score += match snapshot.trend.direction {
        TrendDirection::Up => strength * 0.4,
        TrendDirection::Down => -strength * 0.4,
        TrendDirection::Sideways => 0.0,
    };

    score.round().clamp(-100.0, 100.0)
}

/// Mean of the fast and slow timeframe scores.
pub fn combined_sentiment(fast: &IndicatorSnapshot, slow: &IndicatorSnapshot) -> f64 {
    (technical_sentiment(fast) + technical_sentiment(slow)) / 2.0
}

pub fn describe_sentiment(score: f64) -> &'static str {
    if score >= 40.0 {
        "Strongly bullish technical sentiment"
    } else if score >= 10.0 {
        "Bullish technical sentiment"
    } else if score <= -40.0 {
        "Strongly bearish technical sentiment"
    } else if score <= -10.0 {
        "Bearish technical sentiment"
    } else {
        "Neutral technical sentiment"
    }
}
