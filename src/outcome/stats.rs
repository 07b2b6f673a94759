//! Aggregate statistics over tracked positions.

use crate::backtest::metrics::{profit_factor, win_rate};
use crate::indicators::math::{max_of, mean, min_of};
use crate::models::position::{PositionStatus, TrackedPosition};
use crate::models::signal::SignalAction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionalStats {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_pnl: f64,
}

/// Rates are percentages of resolved positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total: usize,
    pub open: usize,
    pub resolved: usize,
    /// Reached at least TP1.
    pub tp1_hits: usize,
    pub tp2_hits: usize,
    pub tp3_hits: usize,
    pub stopped_out: usize,
    pub expired: usize,
    pub win_rate: f64,
    pub full_win_rate: f64,
    pub loss_rate: f64,
    pub avg_pnl: f64,
    pub avg_win_pnl: f64,
    pub avg_loss_pnl: f64,
    pub total_pnl: f64,
    #[serde(with = "crate::models::ratio")]
    pub profit_factor: f64,
    /// Hours from emission to the first target (or better) being reached.
    pub avg_time_to_tp1_hours: f64,
    pub avg_time_to_stop_hours: f64,
    pub long_stats: DirectionalStats,
    pub short_stats: DirectionalStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStats {
    pub symbol: String,
    pub total: usize,
    pub resolved: usize,
    pub tp1_hits: usize,
    pub tp3_hits: usize,
    pub stopped_out: usize,
    pub expired: usize,
    pub win_rate: f64,
    pub avg_pnl: f64,
    pub total_pnl: f64,
    pub best_pnl: f64,
    pub worst_pnl: f64,
    /// Win rate over the five most recent resolved positions.
    pub last5_win_rate: f64,
}

fn is_loss(status: PositionStatus) -> bool {
    matches!(status, PositionStatus::StoppedOut | PositionStatus::Expired)
}

fn count_where<'a, I, F>(positions: I, pred: F) -> usize
where
    I: IntoIterator<Item = &'a TrackedPosition>,
    F: Fn(PositionStatus) -> bool,
{
    positions.into_iter().filter(|p| pred(p.status)).count()
}

fn avg(values: &[f64]) -> f64 {
    mean(values).unwrap_or(0.0)
}

fn resolved_pnl(position: &TrackedPosition) -> Option<f64> {
    if !position.status.is_terminal() {
        return None;
    }
    position.pnl_percent.filter(|p| p.is_finite())
}

fn hours_to_resolution(position: &TrackedPosition) -> Option<f64> {
    position
        .resolved_at
        .map(|at| (at - position.signal.created_at).num_seconds() as f64 / 3600.0)
}

fn directional(positions: &[TrackedPosition], action: SignalAction) -> DirectionalStats {
    let side: Vec<&TrackedPosition> = positions
        .iter()
        .filter(|p| p.signal.action == action)
        .collect();
    let resolved = side.iter().filter(|p| p.status.is_terminal()).count();
    let wins = side.iter().filter(|p| p.status.is_target_hit()).count();
    let losses = side.iter().filter(|p| is_loss(p.status)).count();
    let pnls: Vec<f64> = side.iter().filter_map(|p| resolved_pnl(p)).collect();

    DirectionalStats {
        total: side.len(),
        wins,
        losses,
        win_rate: win_rate(wins, resolved),
        avg_pnl: avg(&pnls),
    }
}

/// Summary across all tracked positions.
pub fn performance_stats(positions: &[TrackedPosition]) -> PerformanceStats {
    let total = positions.len();
    let open = count_where(positions, |s| !s.is_terminal());
    let resolved = total - open;
    let tp1_hits = count_where(positions, |s| s.is_target_hit());
    let tp2_hits = count_where(positions, |s| {
        matches!(s, PositionStatus::Tp2Hit | PositionStatus::Tp3Hit)
    });
    let tp3_hits = count_where(positions, |s| s == PositionStatus::Tp3Hit);
    let stopped_out = count_where(positions, |s| s == PositionStatus::StoppedOut);
    let expired = count_where(positions, |s| s == PositionStatus::Expired);

    let pnls: Vec<f64> = positions.iter().filter_map(resolved_pnl).collect();
    let win_pnls: Vec<f64> = positions
        .iter()
        .filter(|p| p.status.is_target_hit())
        .filter_map(resolved_pnl)
        .collect();
    let loss_pnls: Vec<f64> = positions
        .iter()
        .filter(|p| is_loss(p.status))
        .filter_map(resolved_pnl)
        .collect();

    let total_pnl: f64 = pnls.iter().sum();
    let gains: Vec<f64> = win_pnls.iter().map(|p| p.max(0.0)).collect();
    let drawdowns: Vec<f64> = loss_pnls.iter().map(|p| p.min(0.0)).collect();

    let tp1_hours: Vec<f64> = positions
        .iter()
        .filter(|p| p.status.is_target_hit())
        .filter_map(hours_to_resolution)
        .collect();
    let stop_hours: Vec<f64> = positions
        .iter()
        .filter(|p| p.status == PositionStatus::StoppedOut)
        .filter_map(hours_to_resolution)
        .collect();

    PerformanceStats {
        total,
        open,
        resolved,
        tp1_hits,
        tp2_hits,
        tp3_hits,
        stopped_out,
        expired,
        win_rate: win_rate(tp1_hits, resolved),
        full_win_rate: win_rate(tp3_hits, resolved),
        loss_rate: win_rate(stopped_out + expired, resolved),
        avg_pnl: avg(&pnls),
        avg_win_pnl: avg(&win_pnls),
        avg_loss_pnl: avg(&loss_pnls),
        total_pnl,
        profit_factor: profit_factor(&gains, &drawdowns),
        avg_time_to_tp1_hours: avg(&tp1_hours),
        avg_time_to_stop_hours: avg(&stop_hours),
        long_stats: directional(positions, SignalAction::Long),
        short_stats: directional(positions, SignalAction::Short),
    }
}

/// Per-asset results, best average PnL first.
pub fn asset_leaderboard(positions: &[TrackedPosition]) -> Vec<AssetStats> {
    let mut by_asset: BTreeMap<String, Vec<&TrackedPosition>> = BTreeMap::new();
    for position in positions {
        by_asset
            .entry(position.symbol().to_uppercase())
            .or_default()
            .push(position);
    }

    let mut board: Vec<AssetStats> = by_asset
        .into_iter()
        .map(|(symbol, group)| {
            let resolved = group.iter().filter(|p| p.status.is_terminal()).count();
            let tp1_hits = group.iter().filter(|p| p.status.is_target_hit()).count();
            let pnls: Vec<f64> = group.iter().filter_map(|p| resolved_pnl(p)).collect();

            let mut recent: Vec<&&TrackedPosition> =
                group.iter().filter(|p| p.status.is_terminal()).collect();
            recent.sort_by(|a, b| b.signal.created_at.cmp(&a.signal.created_at));
            recent.truncate(5);
            let recent_wins = recent.iter().filter(|p| p.status.is_target_hit()).count();

            AssetStats {
                total: group.len(),
                resolved,
                tp1_hits,
                tp3_hits: count_where(group.iter().copied(), |s| s == PositionStatus::Tp3Hit),
                stopped_out: count_where(group.iter().copied(), |s| {
                    s == PositionStatus::StoppedOut
                }),
                expired: count_where(group.iter().copied(), |s| s == PositionStatus::Expired),
                win_rate: win_rate(tp1_hits, resolved),
                avg_pnl: avg(&pnls),
                total_pnl: pnls.iter().sum(),
                best_pnl: max_of(pnls.iter().copied()).unwrap_or(0.0),
                worst_pnl: min_of(pnls.iter().copied()).unwrap_or(0.0),
                last5_win_rate: win_rate(recent_wins, recent.len()),
                symbol,
            }
        })
        .collect();

    board.sort_by(|a, b| b.avg_pnl.total_cmp(&a.avg_pnl));
    board
}
