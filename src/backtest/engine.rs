//! Sequential replay engine.
//!
//! At bar `i` indicators see only `candles[..=i]`. Exits are checked before
//! entries and at most one position is open at a time. Stop and target
//! checks go through `outcome::resolve_outcome`, the same function live
//! tracking uses.

use crate::backtest::analysis::analyze_trades;
use crate::backtest::metrics::compute_metrics;
use crate::config::BacktestDefaults;
use crate::error::BacktestError;
use crate::indicators::momentum::{calculate_macd_default, calculate_rsi_default};
use crate::indicators::trend::detect_trend;
use crate::models::backtest::{
    BacktestReport, BacktestTrade, EquityPoint, ExitReason, TradeIndicators, TradeStatus,
};
use crate::models::candle::{Candle, Timeframe};
use crate::models::indicators::{Crossover, MacdReading, TrendDirection};
use crate::models::signal::TradeSide;
use crate::models::strategy::{Condition, RuleAction, Strategy};
use crate::outcome::resolution::{pnl_percent, resolve_outcome, Resolution};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// |pnl%| below this closes a trade as breakeven.
pub const BREAKEVEN_BAND_PCT: f64 = 0.1;

/// Fewest bars replayed before the first entry can be taken.
pub const MIN_WARMUP: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub strategy: Strategy,
    pub initial_capital: f64,
    /// Percent of current capital committed per trade.
    pub position_size_pct: f64,
    pub warmup: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl BacktestConfig {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, strategy: Strategy) -> Self {
        Self::from_defaults(symbol, timeframe, strategy, &BacktestDefaults::default())
    }

    pub fn from_defaults(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        strategy: Strategy,
        defaults: &BacktestDefaults,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            strategy,
            initial_capital: defaults.initial_capital,
            position_size_pct: defaults.position_size_pct,
            warmup: defaults.warmup,
            start: None,
            end: None,
        }
    }

    pub fn with_capital(mut self, capital: f64) -> Self {
        self.initial_capital = capital;
        self
    }

    pub fn with_position_size(mut self, pct: f64) -> Self {
        self.position_size_pct = pct;
        self
    }

    pub fn with_range(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(BacktestError::InvalidConfig(format!(
                "initial capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(self.position_size_pct > 0.0 && self.position_size_pct <= 100.0) {
            return Err(BacktestError::InvalidConfig(format!(
                "position size must be in (0, 100], got {}",
                self.position_size_pct
            )));
        }
        if self.warmup < MIN_WARMUP {
            return Err(BacktestError::InvalidConfig(format!(
                "warmup must be at least {} bars, got {}",
                MIN_WARMUP, self.warmup
            )));
        }
        if self.strategy.entry_rules().next().is_none() {
            return Err(BacktestError::InvalidConfig(format!(
                "strategy '{}' has no entry rules",
                self.strategy.name
            )));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(BacktestError::InvalidConfig(
                    "start of range is after its end".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn in_range(&self, candle: &Candle) -> bool {
        self.start.map_or(true, |s| candle.timestamp >= s)
            && self.end.map_or(true, |e| candle.timestamp <= e)
    }
}

/// Indicator values the strategy rules test on one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarIndicators {
    pub rsi: f64,
    pub macd: MacdReading,
    pub trend: TrendDirection,
}

/// Compute the bar's indicators from `history`, whose last element is the
/// current bar.
pub fn bar_indicators(history: &[Candle]) -> BarIndicators {
    BarIndicators {
        rsi: calculate_rsi_default(history).value,
        macd: calculate_macd_default(history),
        trend: detect_trend(history).direction,
    }
}

pub fn condition_holds(condition: &Condition, bar: &BarIndicators) -> bool {
    match condition {
        Condition::Rsi {
            comparison,
            threshold,
        } => comparison.holds(bar.rsi, *threshold),
        Condition::MacdVsSignal { comparison } => comparison.holds(bar.macd.macd, bar.macd.signal),
        Condition::MacdCrossAbove => bar.macd.crossover == Some(Crossover::BullishCross),
        Condition::MacdCrossBelow => bar.macd.crossover == Some(Crossover::BearishCross),
        Condition::Trend { direction } => bar.trend == *direction,
    }
}

/// Entry decision: summed weight of matching entry rules and the side of the
/// first one that matched.
fn entry_signal(strategy: &Strategy, bar: &BarIndicators) -> Option<(TradeSide, f64)> {
    let mut score = 0.0;
    let mut side = None;
    for rule in strategy.entry_rules() {
        if !condition_holds(&rule.condition, bar) {
            continue;
        }
        score += rule.weight;
        if side.is_none() {
            side = match rule.action {
                RuleAction::Long => Some(TradeSide::Long),
                RuleAction::Short => Some(TradeSide::Short),
                RuleAction::Exit => None,
            };
        }
    }
    side.filter(|_| score >= strategy.min_entry_score)
        .map(|s| (s, score))
}

fn exit_signal(strategy: &Strategy, bar: &BarIndicators, side: TradeSide) -> bool {
    if strategy
        .exit_rules()
        .any(|rule| condition_holds(&rule.condition, bar))
    {
        return true;
    }
    matches!(entry_signal(strategy, bar), Some((s, _)) if s == side.opposite())
}

/// Mutable state of one run.
struct Simulation<'a> {
    config: &'a BacktestConfig,
    capital: f64,
    peak: f64,
    open: Option<BacktestTrade>,
    trades: Vec<BacktestTrade>,
    equity: Vec<EquityPoint>,
}

impl<'a> Simulation<'a> {
    fn new(config: &'a BacktestConfig) -> Self {
        Self {
            config,
            capital: config.initial_capital,
            peak: config.initial_capital,
            open: None,
            trades: Vec::new(),
            equity: Vec::new(),
        }
    }

    fn check_exit(&mut self, candle: &Candle, bar: &BarIndicators) {
        let Some(trade) = self.open.as_ref() else {
            return;
        };
        let price = candle.close;
        let result = resolve_outcome(
            trade.side,
            trade.entry_price,
            price,
            &[trade.take_profit],
            trade.stop_loss,
        );
        let reason = match result.resolution {
            Resolution::StoppedOut => Some(ExitReason::StopLoss),
            Resolution::TargetHit(_) => Some(ExitReason::TakeProfit),
            Resolution::Open if exit_signal(&self.config.strategy, bar, trade.side) => {
                Some(ExitReason::Signal)
            }
            Resolution::Open => None,
        };
        if let Some(reason) = reason {
            self.close(candle, reason);
        }
    }

    fn check_entry(&mut self, candle: &Candle, bar: &BarIndicators) {
        let Some((side, score)) = entry_signal(&self.config.strategy, bar) else {
            return;
        };
        let entry = candle.close;
        if !entry.is_finite() || entry <= 0.0 {
            return;
        }

        let strategy = &self.config.strategy;
        let capital = self.capital * self.config.position_size_pct / 100.0;
        let (stop_loss, take_profit) = match side {
            TradeSide::Long => (
                entry * (1.0 - strategy.stop_loss_pct / 100.0),
                entry * (1.0 + strategy.take_profit_pct / 100.0),
            ),
            TradeSide::Short => (
                entry * (1.0 + strategy.stop_loss_pct / 100.0),
                entry * (1.0 - strategy.take_profit_pct / 100.0),
            ),
        };

        let trade = BacktestTrade {
            id: format!("trade_{}", self.trades.len() + 1),
            entry_time: candle.timestamp,
            entry_price: entry,
            side,
            size: capital / entry,
            capital,
            stop_loss,
            take_profit,
            exit_time: None,
            exit_price: None,
            status: TradeStatus::Open,
            pnl: 0.0,
            pnl_percent: 0.0,
            exit_reason: None,
            indicators: TradeIndicators {
                rsi: bar.rsi,
                macd_histogram: bar.macd.histogram,
                trend: bar.trend,
                volume: candle.volume,
                entry_score: score,
            },
        };
        debug!(
            trade_id = %trade.id,
            side = side.as_str(),
            entry,
            score,
            "Backtest: opened position"
        );
        self.open = Some(trade);
    }

    fn close(&mut self, candle: &Candle, reason: ExitReason) {
        let Some(mut trade) = self.open.take() else {
            return;
        };
        let exit = candle.close;
        let pnl_pct = pnl_percent(trade.side, trade.entry_price, exit);
        let pnl = trade.capital * pnl_pct / 100.0;
        self.capital += pnl;

        trade.exit_time = Some(candle.timestamp);
        trade.exit_price = Some(exit);
        trade.pnl = pnl;
        trade.pnl_percent = pnl_pct;
        trade.exit_reason = Some(reason);
        trade.status = if pnl_pct.abs() < BREAKEVEN_BAND_PCT {
            TradeStatus::ClosedBreakeven
        } else if pnl > 0.0 {
            TradeStatus::ClosedWin
        } else {
            TradeStatus::ClosedLoss
        };

        debug!(
            trade_id = %trade.id,
            reason = ?reason,
            pnl_pct,
            "Backtest: closed position"
        );
        self.trades.push(trade);
    }

    fn mark(&mut self, candle: &Candle) {
        let unrealized = self
            .open
            .as_ref()
            .map(|t| t.capital * pnl_percent(t.side, t.entry_price, candle.close) / 100.0)
            .unwrap_or(0.0);
        let equity = self.capital + unrealized;
        self.peak = self.peak.max(equity);
        let drawdown = self.peak - equity;
        let drawdown_percent = if self.peak > 0.0 {
            drawdown / self.peak * 100.0
        } else {
            0.0
        };
        self.equity.push(EquityPoint {
            timestamp: candle.timestamp,
            equity,
            drawdown,
            drawdown_percent,
        });
    }
}

pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Replay the strategy over `candles` (ascending by timestamp).
    pub fn run(&self, candles: &[Candle]) -> Result<BacktestReport, BacktestError> {
        self.config.validate()?;

        let series: Vec<Candle> = candles
            .iter()
            .filter(|c| self.config.in_range(c))
            .copied()
            .collect();
        if series.is_empty() {
            return Err(BacktestError::NoData {
                asset: self.config.symbol.clone(),
            });
        }

        info!(
            asset = %self.config.symbol,
            strategy = %self.config.strategy.name,
            candles = series.len(),
            "Backtest: starting run"
        );

        let mut sim = Simulation::new(&self.config);
        for i in self.config.warmup..series.len() {
            let candle = &series[i];
            let bar = bar_indicators(&series[..=i]);

            if sim.open.is_some() {
                sim.check_exit(candle, &bar);
            }
            if sim.open.is_none() {
                sim.check_entry(candle, &bar);
            }
            sim.mark(candle);
        }

        if let Some(last) = series.last() {
            if sim.open.is_some() {
                sim.close(last, ExitReason::EndOfPeriod);
            }
        }

        let metrics = compute_metrics(
            &sim.trades,
            &sim.equity,
            self.config.initial_capital,
            sim.capital,
        );
        let analysis = analyze_trades(&sim.trades, &metrics);

        info!(
            asset = %self.config.symbol,
            strategy = %self.config.strategy.name,
            trades = metrics.total_trades,
            win_rate = metrics.win_rate,
            "Backtest: complete, {} trades",
            metrics.total_trades
        );

        Ok(BacktestReport {
            strategy: self.config.strategy.name.clone(),
            symbol: self.config.symbol.clone(),
            timeframe: self.config.timeframe,
            initial_capital: self.config.initial_capital,
            final_capital: sim.capital,
            start: series.first().map(|c| c.timestamp),
            end: series.last().map(|c| c.timestamp),
            candles_processed: series.len(),
            trades: sim.trades,
            equity_curve: sim.equity,
            metrics,
            analysis,
        })
    }
}
