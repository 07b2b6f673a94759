//! Trend indicators: EMA stack and trend detection

pub mod ema;

pub use ema::*;
