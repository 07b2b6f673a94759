//! Post-run breakdown of where a strategy wins and loses.

use crate::indicators::math::mean;
use crate::models::backtest::{
    AlignmentStats, BacktestMetrics, BacktestTrade, BucketStats, StrategyAnalysis, TradeStatus,
};
use crate::models::indicators::TrendDirection;
use crate::models::signal::TradeSide;

const OVERSOLD_BUCKET: &str = "Oversold (<30)";
const OVERBOUGHT_BUCKET: &str = "Overbought (>70)";
const NEUTRAL_BUCKET: &str = "Neutral (30-70)";

fn rsi_bucket(rsi: f64) -> &'static str {
    if rsi < 30.0 {
        OVERSOLD_BUCKET
    } else if rsi > 70.0 {
        OVERBOUGHT_BUCKET
    } else {
        NEUTRAL_BUCKET
    }
}

fn alignment(trades: &[&BacktestTrade]) -> AlignmentStats {
    let wins = trades
        .iter()
        .filter(|t| t.status == TradeStatus::ClosedWin)
        .count();
    AlignmentStats {
        trades: trades.len(),
        win_rate: if trades.is_empty() {
            0.0
        } else {
            wins as f64 / trades.len() as f64 * 100.0
        },
    }
}

pub fn analyze_trades(trades: &[BacktestTrade], metrics: &BacktestMetrics) -> StrategyAnalysis {
    let closed: Vec<&BacktestTrade> = trades
        .iter()
        .filter(|t| t.status != TradeStatus::Open)
        .collect();

    let mut rsi_buckets: Vec<BucketStats> = [OVERSOLD_BUCKET, NEUTRAL_BUCKET, OVERBOUGHT_BUCKET]
        .iter()
        .filter_map(|label| {
            let bucket: Vec<&&BacktestTrade> = closed
                .iter()
                .filter(|t| rsi_bucket(t.indicators.rsi) == *label)
                .collect();
            if bucket.is_empty() {
                return None;
            }
            let wins = bucket
                .iter()
                .filter(|t| t.status == TradeStatus::ClosedWin)
                .count();
            let returns: Vec<f64> = bucket.iter().map(|t| t.pnl_percent).collect();
            Some(BucketStats {
                label: label.to_string(),
                trades: bucket.len(),
                win_rate: wins as f64 / bucket.len() as f64 * 100.0,
                avg_return: mean(&returns).unwrap_or(0.0),
            })
        })
        .collect();
    rsi_buckets.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));

    let with: Vec<&BacktestTrade> = closed
        .iter()
        .copied()
        .filter(|t| {
            matches!(
                (t.side, t.indicators.trend),
                (TradeSide::Long, TrendDirection::Up) | (TradeSide::Short, TrendDirection::Down)
            )
        })
        .collect();
    let against: Vec<&BacktestTrade> = closed
        .iter()
        .copied()
        .filter(|t| {
            matches!(
                (t.side, t.indicators.trend),
                (TradeSide::Long, TrendDirection::Down) | (TradeSide::Short, TrendDirection::Up)
            )
        })
        .collect();
    let with_trend = alignment(&with);
    let against_trend = alignment(&against);

    let mut recommendations = Vec::new();
    if metrics.total_trades > 0 {
        if metrics.win_rate < 50.0 {
            recommendations
                .push("Consider tightening entry criteria or adjusting stop-loss levels".to_string());
        }
        if metrics.profit_factor < 1.5 {
            recommendations.push("Profit factor is low - review risk/reward ratio".to_string());
        }
    }
    if with_trend.win_rate > against_trend.win_rate + 10.0 {
        recommendations.push("Trading with the trend shows significantly better results".to_string());
    }
    if let Some(best) = rsi_buckets.first().filter(|b| b.win_rate > 60.0) {
        recommendations.push(format!("{} RSI levels show best performance", best.label));
    }

    StrategyAnalysis {
        rsi_buckets,
        with_trend,
        against_trend,
        recommendations,
    }
}
