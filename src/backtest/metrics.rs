//! Backtest metrics. Pure functions over the closed trades and equity curve.

use crate::indicators::math::{max_of, mean, min_of, std_dev};
use crate::models::backtest::{BacktestMetrics, BacktestTrade, EquityPoint, TradeStatus};

const TRADING_DAYS: f64 = 252.0;

pub fn compute_metrics(
    trades: &[BacktestTrade],
    equity_curve: &[EquityPoint],
    initial_capital: f64,
    final_capital: f64,
) -> BacktestMetrics {
    let closed: Vec<&BacktestTrade> = trades
        .iter()
        .filter(|t| t.status != TradeStatus::Open)
        .collect();
    let wins: Vec<f64> = closed
        .iter()
        .filter(|t| t.status == TradeStatus::ClosedWin)
        .map(|t| t.pnl)
        .collect();
    let losses: Vec<f64> = closed
        .iter()
        .filter(|t| t.status == TradeStatus::ClosedLoss)
        .map(|t| t.pnl)
        .collect();
    let breakeven = closed
        .iter()
        .filter(|t| t.status == TradeStatus::ClosedBreakeven)
        .count();

    let total_return = final_capital - initial_capital;
    let total_return_percent = if initial_capital > 0.0 {
        total_return / initial_capital * 100.0
    } else {
        0.0
    };
    let (max_drawdown, max_drawdown_percent) = max_drawdown(equity_curve);

    BacktestMetrics {
        total_trades: closed.len(),
        winning_trades: wins.len(),
        losing_trades: losses.len(),
        breakeven_trades: breakeven,
        win_rate: win_rate(wins.len(), closed.len()),
        avg_win: mean(&wins).unwrap_or(0.0),
        avg_loss: mean(&losses).map(f64::abs).unwrap_or(0.0),
        largest_win: max_of(wins.iter().copied()).unwrap_or(0.0),
        largest_loss: min_of(losses.iter().copied()).unwrap_or(0.0),
        profit_factor: profit_factor(&wins, &losses),
        total_return,
        total_return_percent,
        sharpe_ratio: sharpe_ratio(&closed.iter().map(|t| t.pnl_percent).collect::<Vec<_>>()),
        max_drawdown,
        max_drawdown_percent,
        avg_trade_duration_hours: mean(
            &closed
                .iter()
                .filter_map(|t| t.duration_hours())
                .collect::<Vec<_>>(),
        )
        .unwrap_or(0.0),
        avg_planned_risk_reward: mean(
            &closed
                .iter()
                .map(|t| t.planned_risk_reward())
                .collect::<Vec<_>>(),
        )
        .unwrap_or(0.0),
        avg_realized_risk_reward: mean(
            &closed
                .iter()
                .filter_map(|t| t.realized_risk_reward())
                .collect::<Vec<_>>(),
        )
        .unwrap_or(0.0),
    }
}

/// Percent of `total` that are wins; 0 when there are no trades.
pub fn win_rate(wins: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    wins as f64 / total as f64 * 100.0
}

/// Gross wins over gross losses.
///
/// 0 with neither wins nor losses, infinite with wins but no losses.
pub fn profit_factor(wins: &[f64], losses: &[f64]) -> f64 {
    let gross_win: f64 = wins.iter().sum();
    let gross_loss = losses.iter().sum::<f64>().abs();
    if gross_loss > 0.0 {
        gross_win / gross_loss
    } else if gross_win > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Simplified annualized Sharpe over per-trade percent returns.
///
/// mean / population std * sqrt(252). 0 with fewer than 2 trades or zero
/// deviation.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(returns);
    if std < 1e-12 {
        return 0.0;
    }
    mean(returns).unwrap_or(0.0) / std * TRADING_DAYS.sqrt()
}

/// Largest absolute and percent drawdown on the curve.
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> (f64, f64) {
    let absolute = max_of(equity_curve.iter().map(|p| p.drawdown)).unwrap_or(0.0);
    let percent = max_of(equity_curve.iter().map(|p| p.drawdown_percent)).unwrap_or(0.0);
    (absolute.max(0.0), percent.max(0.0))
}
