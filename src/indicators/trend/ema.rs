//! EMA (Exponential Moving Average) stack and trend detection

use crate::indicators::math::{self, round_to};
use crate::models::candle::{closes, Candle};
use crate::models::indicators::{EmaAlignment, TrendDirection, TrendReading};

pub const TREND_WINDOW: usize = 20;
pub const EMA_PERIODS: [usize; 3] = [20, 50, 200];

/// Latest EMA of closes, rounded to 2 decimals.
///
/// Falls back to the mean of all closes when fewer than `period` exist.
pub fn calculate_ema(candles: &[Candle], period: usize) -> f64 {
    round_to(math::ema_or_mean(&closes(candles), period), 2)
}

/// Calculate multiple EMAs at once
pub fn calculate_emas(candles: &[Candle], periods: &[usize]) -> Vec<f64> {
    periods.iter().map(|&p| calculate_ema(candles, p)).collect()
}

pub fn ema_alignment(ema20: f64, ema50: f64, ema200: f64) -> EmaAlignment {
    if ema20 > ema50 && ema50 > ema200 {
        EmaAlignment::Bullish
    } else if ema20 < ema50 && ema50 < ema200 {
        EmaAlignment::Bearish
    } else {
        EmaAlignment::Mixed
    }
}

/// Detect trend direction and strength.
///
/// Direction comes from the close-to-close change over the last 20 bars
/// against a threshold of twice the return volatility. Strength scales the
/// change (x500, capped at 100) with bonuses for EMA alignment (+20) and for
/// price sitting beyond all three EMAs (+15). Sideways always has strength 0.
/// Fewer than 20 candles reads sideways.
pub fn detect_trend(candles: &[Candle]) -> TrendReading {
    if candles.len() < TREND_WINDOW {
        return TrendReading::sideways();
    }

    let prices = closes(candles);
    let current = prices[prices.len() - 1];
    let [ema20, ema50, ema200] = EMA_PERIODS.map(|p| round_to(math::ema_or_mean(&prices, p), 2));

    let alignment = ema_alignment(ema20, ema50, ema200);
    let above_all_emas = current > ema20 && current > ema50 && current > ema200;
    let below_all_emas = current < ema20 && current < ema50 && current < ema200;

    let recent = &prices[prices.len() - TREND_WINDOW..];
    let first = recent[0];
    let price_change = if first != 0.0 {
        (current - first) / first
    } else {
        0.0
    };

    let returns: Vec<f64> = recent
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    let threshold = math::std_dev(&returns) * 2.0;

    let direction = if price_change > threshold {
        TrendDirection::Up
    } else if price_change < -threshold {
        TrendDirection::Down
    } else {
        TrendDirection::Sideways
    };

    let strength = match direction {
        TrendDirection::Sideways => 0,
        _ => {
            let mut strength = ((price_change.abs() * 500.0).round() as u32).min(100);
            let aligned = matches!(
                (direction, alignment),
                (TrendDirection::Up, EmaAlignment::Bullish)
                    | (TrendDirection::Down, EmaAlignment::Bearish)
            );
            if aligned {
                strength = (strength + 20).min(100);
            }
            let beyond_emas = match direction {
                TrendDirection::Up => above_all_emas,
                _ => below_all_emas,
            };
            if beyond_emas {
                strength = (strength + 15).min(100);
            }
            strength
        }
    };

    TrendReading {
        direction,
        strength,
        ema20,
        ema50,
        ema200,
        alignment,
        above_all_emas,
        below_all_emas,
        price_change,
    }
}
