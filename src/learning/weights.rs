//! Streaming win-rate weights keyed by indicator+direction and by asset.
//!
//! A key needs `min_samples` resolved outcomes before it counts. Its weight
//! is `0.5 + win_rate`, and only moves when the change exceeds the noise
//! threshold.

use crate::config::LearningConfig;
use crate::models::learning::{LearningWeight, WeightCategory};
use crate::models::position::OutcomeEvent;
use crate::models::signal::{Signal, SignalAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

pub fn indicator_key(indicator: &str, action: SignalAction) -> String {
    format!("{}_{}", indicator, action.as_str())
}

pub fn asset_key(symbol: &str) -> String {
    format!("asset_{}", symbol.trim().to_uppercase())
}

/// A weight change that cleared the noise threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightUpdate {
    pub key: String,
    pub old_weight: f64,
    pub new_weight: f64,
    pub samples: u32,
    pub win_rate: f64,
}

/// Immutable copy of qualified weights, handed to the signal generator so
/// signals emitted in one cycle all see the same weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningSnapshot {
    multipliers: HashMap<String, f64>,
}

impl LearningSnapshot {
    pub fn from_multipliers(multipliers: HashMap<String, f64>) -> Self {
        Self { multipliers }
    }

    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }

    pub fn multiplier(&self, key: &str) -> Option<f64> {
        self.multipliers.get(key).copied()
    }

    /// Mean multiplier over the keys that have one; 1.0 when none do.
    pub fn multiplier_for(&self, keys: &[String]) -> f64 {
        let known: Vec<f64> = keys.iter().filter_map(|k| self.multiplier(k)).collect();
        if known.is_empty() {
            return 1.0;
        }
        known.iter().sum::<f64>() / known.len() as f64
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningBook {
    config: LearningConfig,
    weights: HashMap<String, LearningWeight>,
}

impl LearningBook {
    pub fn new(config: LearningConfig) -> Self {
        Self {
            config,
            weights: HashMap::new(),
        }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn weight(&self, key: &str) -> Option<&LearningWeight> {
        self.weights.get(key)
    }

    pub fn weights(&self) -> impl Iterator<Item = &LearningWeight> {
        self.weights.values()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Fold one resolved outcome into every key the signal touches.
    ///
    /// Target hits count as wins; stop-outs and expiries as losses.
    pub fn record_outcome(&mut self, signal: &Signal, event: &OutcomeEvent) -> Vec<WeightUpdate> {
        let win = event.is_win();
        let mut updates = Vec::new();

        for name in signal.indicators.keys() {
            let key = indicator_key(name, signal.action);
            updates.extend(self.record(
                &key,
                WeightCategory::Indicator,
                win,
                event.pnl_percent,
                event.resolved_at,
            ));
        }
        updates.extend(self.record(
            &asset_key(&signal.asset.symbol),
            WeightCategory::Asset,
            win,
            event.pnl_percent,
            event.resolved_at,
        ));

        if !updates.is_empty() {
            info!(
                signal_id = %signal.id,
                updates = updates.len(),
                "LearningBook: {} weights adjusted after {} resolved {}",
                updates.len(),
                signal.asset.symbol,
                event.status.as_str()
            );
        }
        updates
    }

    /// Update one key incrementally; returns the change when the weight moved.
    pub fn record(
        &mut self,
        key: &str,
        category: WeightCategory,
        win: bool,
        pnl: f64,
        now: DateTime<Utc>,
    ) -> Option<WeightUpdate> {
        let min_samples = self.config.min_samples;
        let noise = self.config.noise_threshold;

        let weight = self
            .weights
            .entry(key.to_string())
            .or_insert_with(|| LearningWeight::new(key, category, now));

        if win {
            weight.win_count += 1;
        } else {
            weight.loss_count += 1;
        }
        if pnl.is_finite() {
            weight.total_pnl += pnl;
        }
        weight.updated_at = now;

        let samples = weight.samples();
        if samples < min_samples {
            return None;
        }

        let win_rate = weight.win_rate();
        let candidate = 0.5 + win_rate;
        if (candidate - weight.adjusted_weight).abs() <= noise {
            debug!(key = %key, samples, "LearningBook: change within noise for {}", key);
            return None;
        }

        let old_weight = weight.adjusted_weight;
        weight.adjusted_weight = candidate;

        Some(WeightUpdate {
            key: key.to_string(),
            old_weight,
            new_weight: candidate,
            samples,
            win_rate,
        })
    }

    /// Learned weight for `key`, or 1.0 until it has enough samples.
    pub fn get_confidence_multiplier(&self, key: &str) -> f64 {
        match self.weights.get(key) {
            Some(w) if w.samples() >= self.config.min_samples => w.adjusted_weight,
            _ => 1.0,
        }
    }

    pub fn snapshot(&self) -> LearningSnapshot {
        let multipliers = self
            .weights
            .values()
            .filter(|w| w.samples() >= self.config.min_samples)
            .map(|w| (w.key.clone(), w.adjusted_weight))
            .collect();
        LearningSnapshot::from_multipliers(multipliers)
    }
}
