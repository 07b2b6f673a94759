//! MACD (Moving Average Convergence Divergence) indicator

use crate::indicators::math::{ema_series, round_to};
use crate::models::candle::{closes, Candle};
use crate::models::indicators::{Crossover, MacdReading, MacdTrend};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// Aligned MACD line, signal line and histogram; all three share the
/// histogram's length after alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Build the full MACD series, or `None` when fewer than `slow + signal`
/// closes are available.
pub fn macd_series(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdSeries> {
    if fast == 0 || fast >= slow || signal == 0 || closes.len() < slow + signal {
        return None;
    }

    let fast_ema = ema_series(closes, fast);
    let slow_ema = ema_series(closes, slow);

    // fast_ema starts `slow - fast` bars before slow_ema.
    let offset = slow - fast;
    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .filter_map(|(i, slow_value)| fast_ema.get(i + offset).map(|f| f - slow_value))
        .collect();

    let signal_line = ema_series(&macd_line, signal);
    let signal_offset = macd_line.len() - signal_line.len();
    let aligned_macd = macd_line[signal_offset..].to_vec();

    let histogram = aligned_macd
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    Some(MacdSeries {
        macd: aligned_macd,
        signal: signal_line,
        histogram,
    })
}

/// Calculate MACD with custom periods.
///
/// Trend is bullish when the histogram is positive and rising, bearish when
/// negative and falling. A crossover is a histogram sign change on the last bar.
pub fn calculate_macd(candles: &[Candle], fast: usize, slow: usize, signal: usize) -> MacdReading {
    let periods = (fast, slow, signal);
    let Some(series) = macd_series(&closes(candles), fast, slow, signal) else {
        return MacdReading::neutral(periods);
    };

    let n = series.histogram.len();
    let current_hist = series.histogram[n - 1];
    let prev_hist = if n >= 2 { series.histogram[n - 2] } else { 0.0 };

    let trend = if current_hist > 0.0 && current_hist > prev_hist {
        MacdTrend::Bullish
    } else if current_hist < 0.0 && current_hist < prev_hist {
        MacdTrend::Bearish
    } else {
        MacdTrend::Neutral
    };

    let crossover = if n < 2 {
        None
    } else if prev_hist < 0.0 && current_hist > 0.0 {
        Some(Crossover::BullishCross)
    } else if prev_hist > 0.0 && current_hist < 0.0 {
        Some(Crossover::BearishCross)
    } else {
        None
    };

    MacdReading {
        macd: round_to(series.macd[n - 1], 4),
        signal: round_to(series.signal[n - 1], 4),
        histogram: round_to(current_hist, 4),
        trend,
        crossover,
        periods,
    }
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(candles: &[Candle]) -> MacdReading {
    calculate_macd(candles, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
