//! Morpheus: technical-indicator signal generation, outcome tracking,
//! backtesting and confidence learning for crypto assets.

pub mod backtest;
pub mod config;
pub mod error;
pub mod indicators;
pub mod learning;
pub mod logging;
pub mod models;
pub mod outcome;
pub mod services;
pub mod signals;
