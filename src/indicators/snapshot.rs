//! Full indicator snapshot for one candle series

use crate::indicators::momentum::{calculate_macd_default, calculate_rsi_default};
use crate::indicators::structure::{calculate_fibonacci_default, calculate_support_resistance_default};
use crate::indicators::trend::detect_trend;
use crate::indicators::volume::analyze_volume_default;
use crate::models::candle::Candle;
use crate::models::indicators::IndicatorSnapshot;

/// Run every indicator with default parameters.
///
/// Pure: the same input always yields the same snapshot.
pub fn analyze(candles: &[Candle]) -> IndicatorSnapshot {
    IndicatorSnapshot {
        price: candles.last().map(|c| c.close).unwrap_or(0.0),
        candle_count: candles.len(),
        rsi: calculate_rsi_default(candles),
        macd: calculate_macd_default(candles),
        trend: detect_trend(candles),
        volume: analyze_volume_default(candles),
        levels: calculate_support_resistance_default(candles),
        fibonacci: calculate_fibonacci_default(candles),
    }
}
