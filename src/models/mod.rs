pub mod backtest;
pub mod candle;
pub mod indicators;
pub mod learning;
pub mod position;
pub mod ratio;
pub mod signal;
pub mod strategy;

pub use candle::{Asset, Candle, Timeframe};
pub use signal::{RiskLevel, Signal, SignalAction, TradeSide};
