//! Unit tests for backtest metrics

use crate::common::{geometric_candles, ts};
use morpheus::backtest::metrics::{max_drawdown, profit_factor, sharpe_ratio, win_rate};
use morpheus::backtest::{compute_metrics, BacktestConfig, BacktestEngine};
use morpheus::models::backtest::{BacktestMetrics, BacktestReport, EquityPoint};
use morpheus::models::candle::Timeframe;
use morpheus::models::strategy::{Condition, RuleAction, Strategy, StrategyRule};

fn point(hour: i64, equity: f64, drawdown: f64, drawdown_percent: f64) -> EquityPoint {
    EquityPoint {
        timestamp: ts(hour),
        equity,
        drawdown,
        drawdown_percent,
    }
}

#[test]
fn test_profit_factor_edge_cases() {
    assert_eq!(profit_factor(&[], &[]), 0.0);
    assert!(profit_factor(&[10.0], &[]).is_infinite());
    assert_eq!(profit_factor(&[30.0], &[-10.0, -5.0]), 2.0);
    assert_eq!(profit_factor(&[], &[-10.0]), 0.0);
}

#[test]
fn test_infinite_profit_factor_survives_json() {
    let metrics = BacktestMetrics {
        winning_trades: 3,
        total_trades: 3,
        profit_factor: f64::INFINITY,
        ..BacktestMetrics::default()
    };

    let json = serde_json::to_string(&metrics).unwrap();
    assert!(json.contains(r#""profit_factor":"Infinity""#));
    let back: BacktestMetrics = serde_json::from_str(&json).unwrap();
    assert!(back.profit_factor.is_infinite() && back.profit_factor > 0.0);

    let finite = BacktestMetrics {
        profit_factor: 2.5,
        ..BacktestMetrics::default()
    };
    let json = serde_json::to_string(&finite).unwrap();
    assert!(json.contains(r#""profit_factor":2.5"#));
    let back: BacktestMetrics = serde_json::from_str(&json).unwrap();
    assert_eq!(back.profit_factor, 2.5);
}

#[test]
fn test_winning_only_report_reads_back() {
    let strategy = Strategy::new("Always Long", "test strategy")
        .with_rule(StrategyRule::new(RuleAction::Long, Condition::rsi_below(101.0), 60.0))
        .with_stop_loss(5.0)
        .with_take_profit(10.0);
    let report = BacktestEngine::new(BacktestConfig::new("BTC", Timeframe::FourHour, strategy))
        .run(&geometric_candles(120, 100.0, 1.0))
        .unwrap();
    assert!(report.metrics.total_trades > 0);
    assert_eq!(report.metrics.losing_trades, 0);
    assert!(report.metrics.profit_factor.is_infinite());

    let json = serde_json::to_string(&report).unwrap();
    let back: BacktestReport = serde_json::from_str(&json).unwrap();
    assert!(back.metrics.profit_factor.is_infinite());
    assert_eq!(back.trades.len(), report.trades.len());
}

#[test]
fn test_win_rate() {
    assert_eq!(win_rate(0, 0), 0.0);
    assert_eq!(win_rate(3, 4), 75.0);
}

#[test]
fn test_sharpe_ratio() {
    assert_eq!(sharpe_ratio(&[5.0]), 0.0);
    assert_eq!(sharpe_ratio(&[2.0, 2.0, 2.0]), 0.0);
    let sharpe = sharpe_ratio(&[1.0, 3.0]);
    assert!((sharpe - 2.0 * 252f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_max_drawdown() {
    let curve = vec![
        point(0, 10_000.0, 0.0, 0.0),
        point(1, 9_500.0, 500.0, 5.0),
        point(2, 10_200.0, 0.0, 0.0),
        point(3, 9_900.0, 300.0, 2.94),
    ];
    assert_eq!(max_drawdown(&curve), (500.0, 5.0));
    assert_eq!(max_drawdown(&[]), (0.0, 0.0));
}

#[test]
fn test_metrics_without_trades() {
    let metrics = compute_metrics(&[], &[], 10_000.0, 10_000.0);
    assert_eq!(metrics.total_trades, 0);
    assert_eq!(metrics.win_rate, 0.0);
    assert_eq!(metrics.profit_factor, 0.0);
    assert_eq!(metrics.total_return, 0.0);
    assert_eq!(metrics.sharpe_ratio, 0.0);
}

#[test]
fn test_total_return_percent() {
    let metrics = compute_metrics(&[], &[], 10_000.0, 11_000.0);
    assert_eq!(metrics.total_return, 1_000.0);
    assert_eq!(metrics.total_return_percent, 10.0);
}
