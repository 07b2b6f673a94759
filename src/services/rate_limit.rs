//! Per-asset failure counting for price lookups.
//!
//! After `max_failures` consecutive failures an asset is skipped until the
//! cooldown has elapsed; one success clears its counter.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Default)]
struct FailureState {
    failures: u32,
    suppressed_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct FailureBackoff {
    max_failures: u32,
    cooldown: Duration,
    state: HashMap<String, FailureState>,
}

impl FailureBackoff {
    pub fn new(max_failures: u32, cooldown: Duration) -> Self {
        Self {
            max_failures: max_failures.max(1),
            cooldown,
            state: HashMap::new(),
        }
    }

    fn key(asset: &str) -> String {
        asset.trim().to_uppercase()
    }

    /// Whether lookups for `asset` should be skipped at `now`.
    ///
    /// An expired cooldown resets the asset.
    pub fn is_suppressed(&mut self, asset: &str, now: DateTime<Utc>) -> bool {
        let key = Self::key(asset);
        match self.state.get(&key).and_then(|s| s.suppressed_until) {
            Some(until) if now < until => true,
            Some(_) => {
                self.state.remove(&key);
                false
            }
            None => false,
        }
    }

    pub fn record_failure(&mut self, asset: &str, now: DateTime<Utc>) {
        let key = Self::key(asset);
        let state = self.state.entry(key).or_default();
        state.failures += 1;
        if state.failures >= self.max_failures && state.suppressed_until.is_none() {
            let until = now + self.cooldown;
            state.suppressed_until = Some(until);
            warn!(
                asset = %asset,
                failures = state.failures,
                "FailureBackoff: suppressing {} until {}",
                asset,
                until
            );
        }
    }

    pub fn record_success(&mut self, asset: &str) {
        self.state.remove(&Self::key(asset));
    }

    pub fn failures(&self, asset: &str) -> u32 {
        self.state
            .get(&Self::key(asset))
            .map(|s| s.failures)
            .unwrap_or(0)
    }
}
