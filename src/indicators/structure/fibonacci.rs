//! Fibonacci retracement and extension levels from the recent swing

use crate::indicators::math;
use crate::models::candle::Candle;
use crate::models::indicators::{FibLevel, FibonacciLevels};

pub const FIB_LOOKBACK: usize = 50;
pub const RETRACEMENT_RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];
pub const EXTENSION_RATIOS: [f64; 3] = [0.272, 0.414, 0.618];
/// Default "near level" tolerance, percent.
pub const NEAR_TOLERANCE_PCT: f64 = 2.0;

/// Levels from the swing high/low of the last `lookback` candles.
///
/// Returns `None` with fewer than `lookback` candles.
pub fn calculate_fibonacci(candles: &[Candle], lookback: usize) -> Option<FibonacciLevels> {
    if lookback == 0 || candles.len() < lookback {
        return None;
    }

    let recent = &candles[candles.len() - lookback..];
    let high = math::max_of(recent.iter().map(|c| c.high))?;
    let low = math::min_of(recent.iter().map(|c| c.low))?;
    let range = high - low;
    let price = candles[candles.len() - 1].close;

    let retracements: Vec<FibLevel> = RETRACEMENT_RATIOS
        .iter()
        .map(|&ratio| FibLevel {
            ratio,
            price: high - range * ratio,
        })
        .collect();
    let extensions: Vec<FibLevel> = EXTENSION_RATIOS
        .iter()
        .map(|&ratio| FibLevel {
            ratio: 1.0 + ratio,
            price: high + range * ratio,
        })
        .collect();
    let downside_extensions: Vec<FibLevel> = EXTENSION_RATIOS
        .iter()
        .map(|&ratio| FibLevel {
            ratio: 1.0 + ratio,
            price: low - range * ratio,
        })
        .collect();

    let candidates = retracements
        .iter()
        .chain(&extensions)
        .map(|l| l.price)
        .chain([high, low]);
    let nearest_level = candidates
        .min_by(|a, b| (price - a).abs().total_cmp(&(price - b).abs()))
        .unwrap_or(high);

    let distance_pct = if nearest_level != 0.0 {
        (price - nearest_level) / nearest_level * 100.0
    } else {
        0.0
    };

    Some(FibonacciLevels {
        swing_high: high,
        swing_low: low,
        retracements,
        extensions,
        downside_extensions,
        nearest_level,
        distance_pct,
    })
}

/// Calculate Fibonacci levels with the default lookback (50)
pub fn calculate_fibonacci_default(candles: &[Candle]) -> Option<FibonacciLevels> {
    calculate_fibonacci(candles, FIB_LOOKBACK)
}
