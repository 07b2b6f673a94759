//! Bar-by-bar strategy replay over historical candles.

pub mod analysis;
pub mod engine;
pub mod metrics;
pub mod runner;
pub mod strategies;

pub use analysis::analyze_trades;
pub use engine::{bar_indicators, condition_holds, BacktestConfig, BacktestEngine, BarIndicators};
pub use metrics::compute_metrics;
pub use runner::BacktestRunner;
pub use strategies::{all_strategies, get_strategy, list_strategies};
