//! RSI (Relative Strength Index) with Wilder smoothing

use crate::indicators::math::{self, round_to};
use crate::models::candle::{closes, Candle};
use crate::models::indicators::{Divergence, RsiReading, RsiSignal};

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const OVERSOLD: f64 = 30.0;
pub const OVERBOUGHT: f64 = 70.0;
pub const DIVERGENCE_LOOKBACK: usize = 10;

/// RSI = 100 - 100 / (1 + avgGain / avgLoss)
///
/// No losses means 100 unless there were no gains either, in which case the
/// window carried no momentum and reads 50.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// RSI history for a close series, one value per close from index `period`
/// onward, each rounded to 2 decimals. Empty when fewer than `period + 1`
/// closes are available.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: f64| if c > 0.0 { c } else { 0.0 };
    let loss = |c: f64| if c < 0.0 { -c } else { 0.0 };

    let p = period as f64;
    let mut avg_gain = changes[..period].iter().map(|&c| gain(c)).sum::<f64>() / p;
    let mut avg_loss = changes[..period].iter().map(|&c| loss(c)).sum::<f64>() / p;

    let mut values = Vec::with_capacity(changes.len() - period + 1);
    values.push(round_to(rsi_from_averages(avg_gain, avg_loss), 2));

    for &change in &changes[period..] {
        avg_gain = (avg_gain * (p - 1.0) + gain(change)) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss(change)) / p;
        values.push(round_to(rsi_from_averages(avg_gain, avg_loss), 2));
    }

    values
}

pub fn classify_rsi(value: f64) -> RsiSignal {
    if value <= OVERSOLD {
        RsiSignal::Oversold
    } else if value >= OVERBOUGHT {
        RsiSignal::Overbought
    } else {
        RsiSignal::Neutral
    }
}

/// Calculate RSI over closing prices.
///
/// The reported value is the latest computed RSI, including a genuine 0.0
/// after an uninterrupted decline. Only a too-short input yields the neutral
/// default, which `RsiReading::has_data` reports as false.
pub fn calculate_rsi(candles: &[Candle], period: usize) -> RsiReading {
    let prices = closes(candles);
    let values = rsi_series(&prices, period);

    let Some(&value) = values.last() else {
        return RsiReading::neutral(period);
    };

    let divergence = detect_divergence(&prices, &values, DIVERGENCE_LOOKBACK);

    RsiReading {
        value,
        signal: classify_rsi(value),
        period,
        values,
        divergence,
    }
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(candles: &[Candle]) -> RsiReading {
    calculate_rsi(candles, DEFAULT_RSI_PERIOD)
}

/// Compare the two halves of the last `lookback` bars.
///
/// Bullish: price prints a lower low while RSI prints a higher low below 40.
/// Bearish: price prints a higher high while RSI prints a lower high above 60.
pub fn detect_divergence(prices: &[f64], rsi_values: &[f64], lookback: usize) -> Option<Divergence> {
    if lookback < 2 || prices.len() < lookback || rsi_values.len() < lookback {
        return None;
    }

    let recent_prices = &prices[prices.len() - lookback..];
    let recent_rsi = &rsi_values[rsi_values.len() - lookback..];
    let half = lookback / 2;

    let (price_first, price_second) = recent_prices.split_at(half);
    let (rsi_first, rsi_second) = recent_rsi.split_at(half);

    let price_low1 = math::min_of(price_first.iter().copied())?;
    let price_low2 = math::min_of(price_second.iter().copied())?;
    let rsi_low1 = math::min_of(rsi_first.iter().copied())?;
    let rsi_low2 = math::min_of(rsi_second.iter().copied())?;

    if price_low2 < price_low1 && rsi_low2 > rsi_low1 && rsi_low2 < 40.0 {
        return Some(Divergence::Bullish);
    }

    let price_high1 = math::max_of(price_first.iter().copied())?;
    let price_high2 = math::max_of(price_second.iter().copied())?;
    let rsi_high1 = math::max_of(rsi_first.iter().copied())?;
    let rsi_high2 = math::max_of(rsi_second.iter().copied())?;

    if price_high2 > price_high1 && rsi_high2 < rsi_high1 && rsi_high2 > 60.0 {
        return Some(Divergence::Bearish);
    }

    None
}
