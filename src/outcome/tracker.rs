//! Tracked position state machine.
//!
//! WAITING -> ACTIVE on entry fill, then ACTIVE -> one of TP1_HIT, TP2_HIT,
//! TP3_HIT, STOPPED_OUT or EXPIRED. Terminal positions are never touched
//! again.

use crate::config::TrackerConfig;
use crate::error::TrackingError;
use crate::models::position::{OutcomeEvent, PositionStatus, TrackedPosition};
use crate::models::signal::{Signal, TradeSide};
use crate::outcome::resolution::{pnl_percent, resolve_outcome, Resolution};
use crate::outcome::stats::{performance_stats, PerformanceStats};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

impl TrackedPosition {
    /// Start tracking a signal. HOLD signals and unusable entries are refused.
    pub fn open(signal: Signal) -> Result<Self, TrackingError> {
        if signal.side().is_none() {
            return Err(TrackingError::NotDirectional(signal.id));
        }
        if !signal.entry.is_finite() || signal.entry <= 0.0 {
            return Err(TrackingError::InvalidEntry(signal.entry));
        }

        Ok(Self {
            signal,
            status: PositionStatus::Waiting,
            filled_at: None,
            highest_pnl: None,
            lowest_pnl: None,
            last_price: None,
            check_count: 0,
            exit_price: None,
            pnl_percent: None,
            resolved_at: None,
        })
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    fn side(&self) -> TradeSide {
        // open() refuses HOLD signals
        self.signal.side().unwrap_or(TradeSide::Long)
    }

    fn fills_at(&self, price: f64, tolerance_pct: f64) -> bool {
        let entry = self.signal.entry;
        let tolerance = tolerance_pct / 100.0;
        match self.side() {
            TradeSide::Long => price <= entry * (1.0 + tolerance),
            TradeSide::Short => price >= entry * (1.0 - tolerance),
        }
    }

    /// Apply one price observation. Returns the outcome event when this
    /// observation resolves the position.
    pub fn observe(
        &mut self,
        price: f64,
        at: DateTime<Utc>,
        tolerance_pct: f64,
    ) -> Option<OutcomeEvent> {
        if self.status.is_terminal() {
            return None;
        }
        if !price.is_finite() || price <= 0.0 {
            debug!(
                signal_id = %self.signal.id,
                price,
                "Tracker: ignoring unusable price for {}",
                self.symbol()
            );
            return None;
        }

        self.check_count += 1;
        self.last_price = Some(price);

        if at >= self.signal.expires_at {
            return Some(self.expire(at));
        }

        if self.status == PositionStatus::Waiting {
            if !self.fills_at(price, tolerance_pct) {
                return None;
            }
            self.status = PositionStatus::Active;
            self.filled_at = Some(at);
            debug!(
                signal_id = %self.signal.id,
                price,
                "Tracker: {} entry filled",
                self.symbol()
            );
        }

        let side = self.side();
        let result = resolve_outcome(
            side,
            self.signal.entry,
            price,
            &self.signal.targets,
            self.signal.stop_loss,
        );

        self.highest_pnl = Some(self.highest_pnl.map_or(result.pnl, |h| h.max(result.pnl)));
        self.lowest_pnl = Some(self.lowest_pnl.map_or(result.pnl, |l| l.min(result.pnl)));

        match result.resolution {
            Resolution::Open => None,
            _ => {
                let status = result.status()?;
                Some(self.finish(status, price, result.pnl, at))
            }
        }
    }

    /// Resolve as EXPIRED when `now` is past the validity horizon and no
    /// fresh price is available.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> Option<OutcomeEvent> {
        if self.status.is_terminal() || now < self.signal.expires_at {
            return None;
        }
        Some(self.expire(now))
    }

    fn expire(&mut self, at: DateTime<Utc>) -> OutcomeEvent {
        let entry = self.signal.entry;
        let (exit_price, pnl) = match self.status {
            PositionStatus::Active => {
                let price = self.last_price.unwrap_or(entry);
                (price, pnl_percent(self.side(), entry, price))
            }
            _ => (entry, 0.0),
        };
        self.finish(PositionStatus::Expired, exit_price, pnl, at)
    }

    fn finish(
        &mut self,
        status: PositionStatus,
        exit_price: f64,
        pnl: f64,
        at: DateTime<Utc>,
    ) -> OutcomeEvent {
        self.status = status;
        self.exit_price = Some(exit_price);
        self.pnl_percent = Some(pnl);
        self.resolved_at = Some(at);

        info!(
            signal_id = %self.signal.id,
            status = status.as_str(),
            pnl,
            "Tracker: {} {} resolved {}",
            self.symbol(),
            self.signal.action.as_str(),
            status.as_str()
        );

        OutcomeEvent {
            signal_id: self.signal.id.clone(),
            symbol: self.signal.asset.symbol.clone(),
            action: self.signal.action,
            status,
            exit_price,
            pnl_percent: pnl,
            time_to_resolution_secs: (at - self.signal.created_at).num_seconds(),
            resolved_at: at,
        }
    }
}

/// Owns every tracked position. Single writer per position.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    config: TrackerConfig,
    positions: Vec<TrackedPosition>,
}

impl PositionTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            positions: Vec::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Accept a signal for tracking. Rejections are logged and returned.
    pub fn accept(&mut self, signal: Signal) -> Result<(), TrackingError> {
        if self.get(&signal.id).is_some() {
            warn!(signal_id = %signal.id, "Tracker: signal already tracked");
            return Err(TrackingError::Duplicate(signal.id));
        }

        let symbol = signal.asset.symbol.clone();
        match TrackedPosition::open(signal) {
            Ok(position) => {
                info!(
                    signal_id = %position.signal.id,
                    entry = position.signal.entry,
                    "Tracker: tracking {} {}",
                    symbol,
                    position.signal.action.as_str()
                );
                self.positions.push(position);
                Ok(())
            }
            Err(e) => {
                warn!(asset = %symbol, error = %e, "Tracker: rejected signal for {}", symbol);
                Err(e)
            }
        }
    }

    pub fn observe(
        &mut self,
        signal_id: &str,
        price: f64,
        at: DateTime<Utc>,
    ) -> Option<OutcomeEvent> {
        let tolerance = self.config.entry_tolerance_pct;
        self.positions
            .iter_mut()
            .find(|p| p.signal.id == signal_id)
            .and_then(|p| p.observe(price, at, tolerance))
    }

    /// Apply one price to every open position on `symbol`.
    pub fn observe_symbol(
        &mut self,
        symbol: &str,
        price: f64,
        at: DateTime<Utc>,
    ) -> Vec<OutcomeEvent> {
        let tolerance = self.config.entry_tolerance_pct;
        self.positions
            .iter_mut()
            .filter(|p| p.is_open() && p.symbol().eq_ignore_ascii_case(symbol))
            .filter_map(|p| p.observe(price, at, tolerance))
            .collect()
    }

    pub fn expire_due(&mut self, now: DateTime<Utc>) -> Vec<OutcomeEvent> {
        self.positions
            .iter_mut()
            .filter_map(|p| p.expire_if_due(now))
            .collect()
    }

    pub fn active(&self) -> impl Iterator<Item = &TrackedPosition> {
        self.positions.iter().filter(|p| p.is_open())
    }

    pub fn get(&self, signal_id: &str) -> Option<&TrackedPosition> {
        self.positions.iter().find(|p| p.signal.id == signal_id)
    }

    pub fn positions(&self) -> &[TrackedPosition] {
        &self.positions
    }

    pub fn stats(&self) -> PerformanceStats {
        performance_stats(&self.positions)
    }
}
