//! Backtest trades, equity curve and report types

use crate::models::candle::Timeframe;
use crate::models::indicators::TrendDirection;
use crate::models::signal::TradeSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    Open,
    ClosedWin,
    ClosedLoss,
    ClosedBreakeven,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Signal,
    EndOfPeriod,
}

/// Indicator values observed on the entry bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIndicators {
    pub rsi: f64,
    pub macd_histogram: f64,
    pub trend: TrendDirection,
    pub volume: f64,
    pub entry_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestTrade {
    pub id: String,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub side: TradeSide,
    /// Units held: committed capital / entry price.
    pub size: f64,
    /// Capital committed at entry.
    pub capital: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    pub status: TradeStatus,
    pub pnl: f64,
    pub pnl_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<ExitReason>,
    pub indicators: TradeIndicators,
}

impl BacktestTrade {
    pub fn duration_hours(&self) -> Option<f64> {
        self.exit_time
            .map(|exit| (exit - self.entry_time).num_seconds() as f64 / 3600.0)
    }

    pub fn planned_risk_reward(&self) -> f64 {
        let risk = (self.entry_price - self.stop_loss).abs();
        if risk == 0.0 {
            return 0.0;
        }
        (self.take_profit - self.entry_price).abs() / risk
    }

    /// Realized move in units of planned risk; negative for losing trades.
    pub fn realized_risk_reward(&self) -> Option<f64> {
        let exit = self.exit_price?;
        let risk = (self.entry_price - self.stop_loss).abs();
        if risk == 0.0 {
            return Some(0.0);
        }
        let moved = match self.side {
            TradeSide::Long => exit - self.entry_price,
            TradeSide::Short => self.entry_price - exit,
        };
        Some(moved / risk)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
    pub drawdown: f64,
    pub drawdown_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// Infinite when there are wins and no losses.
    #[serde(with = "crate::models::ratio")]
    pub profit_factor: f64,
    pub total_return: f64,
    pub total_return_percent: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_percent: f64,
    pub avg_trade_duration_hours: f64,
    pub avg_planned_risk_reward: f64,
    pub avg_realized_risk_reward: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub label: String,
    pub trades: usize,
    pub win_rate: f64,
    pub avg_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentStats {
    pub trades: usize,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAnalysis {
    /// Sorted by win rate, best first.
    pub rsi_buckets: Vec<BucketStats>,
    pub with_trend: AlignmentStats,
    pub against_trend: AlignmentStats,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub strategy: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub initial_capital: f64,
    pub final_capital: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    pub candles_processed: usize,
    pub trades: Vec<BacktestTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: BacktestMetrics,
    pub analysis: StrategyAnalysis,
}
