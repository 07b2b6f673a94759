//! Pure outcome resolution and the shared PnL formula.

use crate::models::position::PositionStatus;
use crate::models::signal::{SignalAction, TradeSide};
use serde::{Deserialize, Serialize};

/// Where a price sits relative to a position's stop and targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    StoppedOut,
    /// 1-based index of the best target reached.
    TargetHit(u8),
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallOutcome {
    Win,
    Loss,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeResult {
    pub resolution: Resolution,
    /// Price change from entry in percent, ignoring direction.
    pub raw_pnl: f64,
    /// Direction-adjusted PnL in percent.
    pub pnl: f64,
}

impl OutcomeResult {
    pub fn outcome(&self) -> CallOutcome {
        match self.resolution {
            Resolution::StoppedOut => CallOutcome::Loss,
            Resolution::TargetHit(_) => CallOutcome::Win,
            Resolution::Open => CallOutcome::Neutral,
        }
    }

    /// Terminal tracking status this result maps to, if any.
    pub fn status(&self) -> Option<PositionStatus> {
        match self.resolution {
            Resolution::StoppedOut => Some(PositionStatus::StoppedOut),
            Resolution::TargetHit(1) => Some(PositionStatus::Tp1Hit),
            Resolution::TargetHit(2) => Some(PositionStatus::Tp2Hit),
            Resolution::TargetHit(_) => Some(PositionStatus::Tp3Hit),
            Resolution::Open => None,
        }
    }
}

/// `(current - entry) / entry * 100`; 0 when the inputs cannot give a number.
pub fn raw_pnl_percent(entry: f64, current: f64) -> f64 {
    if !entry.is_finite() || !current.is_finite() || entry <= 0.0 {
        return 0.0;
    }
    (current - entry) / entry * 100.0
}

/// Direction-adjusted PnL percent: raw for LONG, negated for SHORT.
pub fn pnl_percent(side: TradeSide, entry: f64, current: f64) -> f64 {
    let raw = raw_pnl_percent(entry, current);
    match side {
        TradeSide::Long => raw,
        TradeSide::Short => -raw,
    }
}

/// Resolve one price observation against a stop and ordered targets.
///
/// The stop is checked first and wins over any simultaneous target touch.
/// Targets are checked farthest first so the best one reached is reported.
/// Levels on the wrong side of entry are taken as given.
pub fn resolve_outcome(
    side: TradeSide,
    entry: f64,
    current: f64,
    targets: &[f64],
    stop: f64,
) -> OutcomeResult {
    let raw_pnl = raw_pnl_percent(entry, current);
    let pnl = pnl_percent(side, entry, current);

    let stopped = match side {
        TradeSide::Long => current <= stop,
        TradeSide::Short => current >= stop,
    };
    if stopped {
        return OutcomeResult {
            resolution: Resolution::StoppedOut,
            raw_pnl,
            pnl,
        };
    }

    let reached = targets
        .iter()
        .enumerate()
        .rev()
        .find(|(_, &target)| match side {
            TradeSide::Long => current >= target,
            TradeSide::Short => current <= target,
        })
        .map(|(index, _)| index);

    let resolution = match reached {
        Some(index) => Resolution::TargetHit((index + 1).min(u8::MAX as usize) as u8),
        None => Resolution::Open,
    };

    OutcomeResult {
        resolution,
        raw_pnl,
        pnl,
    }
}

/// Score of a historical call at a later price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallScore {
    pub outcome: CallOutcome,
    pub pnl: f64,
}

/// Score a past call. HOLD calls carry no position and are always neutral.
pub fn score_call(
    action: SignalAction,
    entry: f64,
    current: f64,
    targets: &[f64],
    stop: f64,
) -> CallScore {
    match action.side() {
        Some(side) => {
            let result = resolve_outcome(side, entry, current, targets, stop);
            CallScore {
                outcome: result.outcome(),
                pnl: result.pnl,
            }
        }
        None => CallScore {
            outcome: CallOutcome::Neutral,
            pnl: 0.0,
        },
    }
}
