//! Indicator readings produced by the indicator engine.
//!
//! Every reading has a documented neutral default for short histories; the
//! `has_data` style accessors tell "no opinion" apart from a real value.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiSignal {
    Oversold,
    Neutral,
    Overbought,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Divergence {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    pub signal: RsiSignal,
    pub period: usize,
    /// Full RSI history, oldest first. Empty when the input was too short.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence: Option<Divergence>,
}

impl RsiReading {
    pub fn neutral(period: usize) -> Self {
        Self {
            value: 50.0,
            signal: RsiSignal::Neutral,
            period,
            values: Vec::new(),
            divergence: None,
        }
    }

    pub fn has_data(&self) -> bool {
        !self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MacdTrend {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Crossover {
    BullishCross,
    BearishCross,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub trend: MacdTrend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossover: Option<Crossover>,
    pub periods: (usize, usize, usize),
}

impl MacdReading {
    pub fn neutral(periods: (usize, usize, usize)) -> Self {
        Self {
            macd: 0.0,
            signal: 0.0,
            histogram: 0.0,
            trend: MacdTrend::Neutral,
            crossover: None,
            periods,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "UP",
            TrendDirection::Down => "DOWN",
            TrendDirection::Sideways => "SIDEWAYS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmaAlignment {
    Bullish,
    Bearish,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub direction: TrendDirection,
    /// 0-100
    pub strength: u32,
    pub ema20: f64,
    pub ema50: f64,
    pub ema200: f64,
    pub alignment: EmaAlignment,
    pub above_all_emas: bool,
    pub below_all_emas: bool,
    /// Fractional close-to-close change over the trend window.
    pub price_change: f64,
}

impl TrendReading {
    pub fn sideways() -> Self {
        Self {
            direction: TrendDirection::Sideways,
            strength: 0,
            ema20: 0.0,
            ema50: 0.0,
            ema200: 0.0,
            alignment: EmaAlignment::Mixed,
            above_all_emas: false,
            below_all_emas: false,
            price_change: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeConfirmation {
    Strong,
    Weak,
    Divergence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeReading {
    pub current: f64,
    pub average: f64,
    /// current / trailing average
    pub ratio: f64,
    pub trend: VolumeTrend,
    pub confirmation: VolumeConfirmation,
}

impl VolumeReading {
    pub fn neutral() -> Self {
        Self {
            current: 0.0,
            average: 0.0,
            ratio: 1.0,
            trend: VolumeTrend::Stable,
            confirmation: VolumeConfirmation::Weak,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub swing_high: f64,
    pub swing_low: f64,
    pub retracements: Vec<FibLevel>,
    /// Projections above the swing high.
    pub extensions: Vec<FibLevel>,
    /// Projections below the swing low.
    pub downside_extensions: Vec<FibLevel>,
    pub nearest_level: f64,
    /// Signed distance from price to the nearest level, in percent of that level.
    pub distance_pct: f64,
}

impl FibonacciLevels {
    pub fn range(&self) -> f64 {
        self.swing_high - self.swing_low
    }

    pub fn is_near_level(&self, tolerance_pct: f64) -> bool {
        self.distance_pct.abs() <= tolerance_pct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricePosition {
    NearSupport,
    NearResistance,
    MidRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    /// Ascending, all below price.
    pub support: Vec<f64>,
    /// Ascending, all above price.
    pub resistance: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_support: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_resistance: Option<f64>,
    pub position: PricePosition,
}

impl SupportResistance {
    pub fn empty() -> Self {
        Self {
            support: Vec::new(),
            resistance: Vec::new(),
            nearest_support: None,
            nearest_resistance: None,
            position: PricePosition::MidRange,
        }
    }
}

/// All indicator readings for one asset on one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub price: f64,
    pub candle_count: usize,
    pub rsi: RsiReading,
    pub macd: MacdReading,
    pub trend: TrendReading,
    pub volume: VolumeReading,
    pub levels: SupportResistance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fibonacci: Option<FibonacciLevels>,
}
