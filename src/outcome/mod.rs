//! Trade outcome state machine.
//!
//! `resolution` holds the single pure decision function shared by live
//! tracking, backtesting and historical call scoring. `tracker` drives a
//! `TrackedPosition` through its states, `live` polls prices for it and
//! `stats` summarises tracked results.

pub mod live;
pub mod resolution;
pub mod stats;
pub mod tracker;

pub use live::{CycleSummary, LiveTracker};
pub use resolution::{
    pnl_percent, raw_pnl_percent, resolve_outcome, score_call, CallOutcome, CallScore,
    OutcomeResult, Resolution,
};
pub use stats::{asset_leaderboard, performance_stats, AssetStats, DirectionalStats, PerformanceStats};
pub use tracker::PositionTracker;
