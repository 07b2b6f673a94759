//! Async live tracking driver.
//!
//! Each cycle expires overdue positions, then looks up one price per open
//! position, pausing between lookups. Failing assets are backed off without
//! holding up the others.

use crate::config::TrackerConfig;
use crate::models::position::OutcomeEvent;
use crate::outcome::tracker::PositionTracker;
use crate::services::market_data::MarketDataProvider;
use crate::services::rate_limit::FailureBackoff;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleSummary {
    pub checked: usize,
    pub resolved: usize,
    /// Positions skipped because their asset is backed off.
    pub skipped: usize,
    pub failures: usize,
    pub events: Vec<OutcomeEvent>,
}

pub struct LiveTracker<P: MarketDataProvider> {
    provider: Arc<P>,
    tracker: PositionTracker,
    backoff: FailureBackoff,
    delay: Duration,
}

impl<P: MarketDataProvider> LiveTracker<P> {
    pub fn new(provider: Arc<P>, config: TrackerConfig) -> Self {
        let backoff = FailureBackoff::new(
            config.max_failures,
            chrono::Duration::seconds(config.cooldown_secs),
        );
        let delay = Duration::from_millis(config.inter_call_delay_ms);
        Self {
            provider,
            tracker: PositionTracker::new(config),
            backoff,
            delay,
        }
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut PositionTracker {
        &mut self.tracker
    }

    pub fn backoff(&self) -> &FailureBackoff {
        &self.backoff
    }

    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleSummary {
        let mut summary = CycleSummary::default();
        summary.events.extend(self.tracker.expire_due(now));

        let targets: Vec<(String, String)> = self
            .tracker
            .active()
            .map(|p| (p.signal.id.clone(), p.symbol().to_string()))
            .collect();

        for (signal_id, symbol) in &targets {
            if self.backoff.is_suppressed(symbol, now) {
                debug!(asset = %symbol, "LiveTracker: {} backed off, skipping", symbol);
                summary.skipped += 1;
                continue;
            }
            if summary.checked > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            summary.checked += 1;
            match self.provider.get_current_price(symbol).await {
                Ok(Some(price)) if price.is_finite() && price > 0.0 => {
                    self.backoff.record_success(symbol);
                    if let Some(event) = self.tracker.observe(signal_id, price, now) {
                        summary.events.push(event);
                    }
                }
                Ok(_) => {
                    debug!(asset = %symbol, "LiveTracker: no price for {}", symbol);
                    self.backoff.record_failure(symbol, now);
                    summary.failures += 1;
                }
                Err(e) => {
                    warn!(asset = %symbol, error = %e, "LiveTracker: price lookup failed for {}", symbol);
                    self.backoff.record_failure(symbol, now);
                    summary.failures += 1;
                }
            }
        }

        summary.resolved = summary.events.len();
        info!(
            checked = summary.checked,
            resolved = summary.resolved,
            skipped = summary.skipped,
            failures = summary.failures,
            "LiveTracker: cycle complete"
        );
        summary
    }
}
