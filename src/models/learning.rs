//! Confidence learning aggregates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeightCategory {
    Indicator,
    Asset,
}

/// Streaming win/loss aggregate for one indicator+direction or one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningWeight {
    pub key: String,
    pub category: WeightCategory,
    pub win_count: u32,
    pub loss_count: u32,
    pub total_pnl: f64,
    pub adjusted_weight: f64,
    pub updated_at: DateTime<Utc>,
}

impl LearningWeight {
    pub fn new(key: impl Into<String>, category: WeightCategory, now: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            category,
            win_count: 0,
            loss_count: 0,
            total_pnl: 0.0,
            adjusted_weight: 1.0,
            updated_at: now,
        }
    }

    pub fn samples(&self) -> u32 {
        self.win_count + self.loss_count
    }

    pub fn win_rate(&self) -> f64 {
        let samples = self.samples();
        if samples == 0 {
            return 0.0;
        }
        self.win_count as f64 / samples as f64
    }

    pub fn avg_pnl(&self) -> f64 {
        let samples = self.samples();
        if samples == 0 {
            return 0.0;
        }
        self.total_pnl / samples as f64
    }
}
