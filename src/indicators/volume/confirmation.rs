//! Volume confirmation of the latest price move

use crate::indicators::math;
use crate::models::candle::Candle;
use crate::models::indicators::{VolumeConfirmation, VolumeReading, VolumeTrend};
use crate::models::signal::TradeSide;

pub const VOLUME_LOOKBACK: usize = 20;
/// Volume ratio above which a move counts as confirmed.
pub const STRONG_RATIO: f64 = 1.5;

/// Compare the latest bar's volume with the trailing average.
///
/// - price up, volume above average: STRONG when ratio > 1.5, else WEAK
/// - price down, volume above average: STRONG when ratio > 1.5, else WEAK
/// - price up, volume at or below average: DIVERGENCE
/// - price down, volume at or below average: WEAK
///
/// Fewer than two candles reads ratio 1, STABLE, WEAK.
pub fn analyze_volume(candles: &[Candle], lookback: usize) -> VolumeReading {
    if candles.len() < 2 || lookback < 2 {
        return VolumeReading::neutral();
    }

    let window = &candles[candles.len().saturating_sub(lookback)..];
    let volumes: Vec<f64> = window.iter().map(|c| c.volume).collect();
    let current = volumes[volumes.len() - 1];
    let average = math::mean(&volumes[..volumes.len() - 1]).unwrap_or(0.0);
    let ratio = if average > 0.0 { current / average } else { 1.0 };

    let recent = &volumes[volumes.len().saturating_sub(5)..];
    let older = &volumes[volumes.len().saturating_sub(10)..volumes.len().saturating_sub(5)];
    let trend = match (math::mean(recent), math::mean(older)) {
        (Some(r), Some(o)) if r > o * 1.2 => VolumeTrend::Increasing,
        (Some(r), Some(o)) if r < o * 0.8 => VolumeTrend::Decreasing,
        _ => VolumeTrend::Stable,
    };

    let prev_close = candles[candles.len() - 2].close;
    let last_close = candles[candles.len() - 1].close;
    let price_up = last_close > prev_close;
    let volume_up = ratio > 1.0;

    let confirmation = match (price_up, volume_up) {
        (_, true) if ratio > STRONG_RATIO => VolumeConfirmation::Strong,
        (_, true) => VolumeConfirmation::Weak,
        (true, false) => VolumeConfirmation::Divergence,
        (false, false) => VolumeConfirmation::Weak,
    };

    VolumeReading {
        current,
        average,
        ratio,
        trend,
        confirmation,
    }
}

/// Analyze volume with the default lookback (20)
pub fn analyze_volume_default(candles: &[Candle]) -> VolumeReading {
    analyze_volume(candles, VOLUME_LOOKBACK)
}

/// Volume support for a trade direction, clamped to [-20, 20].
pub fn volume_score(reading: &VolumeReading, side: TradeSide) -> i32 {
    let mut score = match reading.confirmation {
        VolumeConfirmation::Strong => 15,
        VolumeConfirmation::Weak => 2,
        VolumeConfirmation::Divergence => -10,
    };

    if reading.ratio > 2.0 {
        score += 5;
    } else if reading.ratio < 0.5 {
        score -= 5;
    }

    match (reading.trend, side) {
        (VolumeTrend::Increasing, TradeSide::Long) | (VolumeTrend::Decreasing, TradeSide::Short) => {
            score += 3
        }
        _ => {}
    }

    score.clamp(-20, 20)
}
