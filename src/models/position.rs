//! Live outcome tracking records

use crate::models::signal::{Signal, SignalAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Waiting,
    Active,
    #[serde(rename = "TP1_HIT")]
    Tp1Hit,
    #[serde(rename = "TP2_HIT")]
    Tp2Hit,
    #[serde(rename = "TP3_HIT")]
    Tp3Hit,
    StoppedOut,
    Expired,
}

impl PositionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PositionStatus::Waiting | PositionStatus::Active)
    }

    pub fn is_target_hit(&self) -> bool {
        matches!(
            self,
            PositionStatus::Tp1Hit | PositionStatus::Tp2Hit | PositionStatus::Tp3Hit
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionStatus::Waiting => "WAITING",
            PositionStatus::Active => "ACTIVE",
            PositionStatus::Tp1Hit => "TP1_HIT",
            PositionStatus::Tp2Hit => "TP2_HIT",
            PositionStatus::Tp3Hit => "TP3_HIT",
            PositionStatus::StoppedOut => "STOPPED_OUT",
            PositionStatus::Expired => "EXPIRED",
        }
    }
}

/// A signal accepted for live tracking.
///
/// Mutated only through the transition methods in `outcome::tracker`; once
/// `status` is terminal the record never changes again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPosition {
    pub signal: Signal,
    pub status: PositionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_pnl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
    pub check_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TrackedPosition {
    pub fn signal_id(&self) -> &str {
        &self.signal.id
    }

    pub fn symbol(&self) -> &str {
        &self.signal.asset.symbol
    }
}

/// Emitted once when a tracked position reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    pub signal_id: String,
    pub symbol: String,
    pub action: SignalAction,
    pub status: PositionStatus,
    pub exit_price: f64,
    pub pnl_percent: f64,
    pub time_to_resolution_secs: i64,
    pub resolved_at: DateTime<Utc>,
}

impl OutcomeEvent {
    pub fn is_win(&self) -> bool {
        self.status.is_target_hit()
    }
}
