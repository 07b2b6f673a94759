//! Trading signal output

use crate::models::candle::{Asset, Timeframe};
use crate::models::indicators::IndicatorSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalAction {
    Long,
    Short,
    Hold,
}

impl SignalAction {
    pub fn side(&self) -> Option<TradeSide> {
        match self {
            SignalAction::Long => Some(TradeSide::Long),
            SignalAction::Short => Some(TradeSide::Short),
            SignalAction::Hold => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Long => "LONG",
            SignalAction::Short => "SHORT",
            SignalAction::Hold => "HOLD",
        }
    }
}

/// Direction of an open or simulated position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Long => "LONG",
            TradeSide::Short => "SHORT",
        }
    }

    pub fn opposite(&self) -> TradeSide {
        match self {
            TradeSide::Long => TradeSide::Short,
            TradeSide::Short => TradeSide::Long,
        }
    }
}

impl From<TradeSide> for SignalAction {
    fn from(side: TradeSide) -> Self {
        match side {
            TradeSide::Long => SignalAction::Long,
            TradeSide::Short => SignalAction::Short,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// One named contribution to a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactor {
    pub name: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub base: f64,
    pub factors: Vec<ConfidenceFactor>,
    /// Learned scaling applied after the additive factors (1.0 when none).
    pub learning_multiplier: f64,
    pub total: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    pub technical: String,
    pub fundamental: String,
    pub sentiment: String,
    /// Name of the cascade rule that chose the action.
    pub rule: String,
    pub confidence: ConfidenceBreakdown,
}

/// Indicator snapshots of both timeframes at emission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAnalysis {
    pub fast_timeframe: Timeframe,
    pub slow_timeframe: Timeframe,
    pub fast: IndicatorSnapshot,
    pub slow: IndicatorSnapshot,
    pub sentiment_score: f64,
}

/// An emitted directional signal. Levels are absolute prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub asset: Asset,
    pub action: SignalAction,
    pub entry: f64,
    /// Ordered by increasing distance from entry.
    pub targets: [f64; 3],
    pub stop_loss: f64,
    /// 0-100
    pub confidence: u8,
    pub timeframe: Timeframe,
    pub risk_level: RiskLevel,
    pub reasoning: Reasoning,
    /// Scalar indicator values keyed by name, used for audit and learning.
    pub indicators: BTreeMap<String, f64>,
    pub analysis: SignalAnalysis,
}

impl Signal {
    pub fn side(&self) -> Option<TradeSide> {
        self.action.side()
    }

    /// Planned reward-to-risk ratio to the first target.
    pub fn risk_reward(&self) -> f64 {
        let risk = (self.entry - self.stop_loss).abs();
        if risk == 0.0 {
            return 0.0;
        }
        (self.targets[0] - self.entry).abs() / risk
    }
}
