//! Support and Resistance levels detection
//!
//! Levels come from pivot highs/lows (a bar strictly beyond every neighbour
//! within the pivot lookback) plus the extremes of the last 20 bars, then get
//! clustered so nearby prices collapse into one level.

use crate::indicators::math;
use crate::models::candle::Candle;
use crate::models::indicators::{PricePosition, SupportResistance};

pub const PIVOT_LOOKBACK: usize = 5;
pub const CLUSTER_THRESHOLD: f64 = 0.02;
pub const RECENT_WINDOW: usize = 20;
pub const MAX_LEVELS: usize = 5;
/// Distance (fraction of price) that counts as "near" a level.
pub const NEAR_LEVEL: f64 = 0.02;

/// Pivot highs and lows as (highs, lows).
pub fn find_pivots(candles: &[Candle], lookback: usize) -> (Vec<f64>, Vec<f64>) {
    let mut highs = Vec::new();
    let mut lows = Vec::new();

    if candles.len() < lookback * 2 + 1 {
        return (highs, lows);
    }

    for i in lookback..candles.len() - lookback {
        let current = &candles[i];
        let neighbours = candles[i - lookback..=i + lookback]
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != lookback)
            .map(|(_, c)| c);

        let mut is_high = true;
        let mut is_low = true;
        for other in neighbours {
            if other.high >= current.high {
                is_high = false;
            }
            if other.low <= current.low {
                is_low = false;
            }
        }

        if is_high {
            highs.push(current.high);
        }
        if is_low {
            lows.push(current.low);
        }
    }

    (highs, lows)
}

/// Merge ascending prices whose step to the previous member is within
/// `threshold` (fractional) into their mean. Output is ascending.
pub fn cluster_levels(prices: &[f64], threshold: f64) -> Vec<f64> {
    let mut sorted: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let mut levels = Vec::new();
    let mut cluster: Vec<f64> = Vec::new();

    for price in sorted {
        if let Some(&prev) = cluster.last() {
            let step = if prev != 0.0 { (price - prev) / prev } else { f64::INFINITY };
            if step > threshold {
                levels.extend(math::mean(&cluster));
                cluster.clear();
            }
        }
        cluster.push(price);
    }
    levels.extend(math::mean(&cluster));

    levels
}

/// Calculate support and resistance relative to the last close.
///
/// Requires `2 * lookback + 1` candles; shorter input yields no levels and
/// `MID_RANGE`.
pub fn calculate_support_resistance(candles: &[Candle], lookback: usize) -> SupportResistance {
    if candles.len() < lookback * 2 + 1 {
        return SupportResistance::empty();
    }

    let price = candles[candles.len() - 1].close;
    let (mut highs, mut lows) = find_pivots(candles, lookback);

    let recent = &candles[candles.len().saturating_sub(RECENT_WINDOW)..];
    highs.extend(math::max_of(recent.iter().map(|c| c.high)));
    lows.extend(math::min_of(recent.iter().map(|c| c.low)));

    highs.extend(lows);
    let levels = cluster_levels(&highs, CLUSTER_THRESHOLD);

    let support: Vec<f64> = levels.iter().copied().filter(|&l| l < price).collect();
    let resistance: Vec<f64> = levels.iter().copied().filter(|&l| l > price).collect();

    let nearest_support = support.last().copied();
    let nearest_resistance = resistance.first().copied();

    let mut position = PricePosition::MidRange;
    if let (Some(s), Some(r)) = (nearest_support, nearest_resistance) {
        if price != 0.0 {
            if (price - s) / price < NEAR_LEVEL {
                position = PricePosition::NearSupport;
            } else if (r - price) / price < NEAR_LEVEL {
                position = PricePosition::NearResistance;
            }
        }
    }

    SupportResistance {
        support: support[support.len().saturating_sub(MAX_LEVELS)..].to_vec(),
        resistance: resistance.into_iter().take(MAX_LEVELS).collect(),
        nearest_support,
        nearest_resistance,
        position,
    }
}

/// Calculate support/resistance with the default pivot lookback (5)
pub fn calculate_support_resistance_default(candles: &[Candle]) -> SupportResistance {
    calculate_support_resistance(candles, PIVOT_LOOKBACK)
}
