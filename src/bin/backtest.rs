//! Morpheus backtester
//!
//! Replays the preset strategies (or the one named in `STRATEGY`) over every
//! asset in a candle dump and prints a summary per run.

use dotenvy::dotenv;
use morpheus::backtest::{all_strategies, get_strategy, BacktestRunner};
use morpheus::config::Config;
use morpheus::logging;
use morpheus::models::backtest::BacktestReport;
use morpheus::models::candle::Timeframe;
use morpheus::services::{CandleFile, InMemoryMarketData};
use std::env;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let path = env::args()
        .nth(1)
        .or_else(|| env::var("CANDLES_FILE").ok())
        .ok_or("usage: backtest <candles.json> [timeframe]")?;
    let timeframe: Timeframe = env::args()
        .nth(2)
        .or_else(|| env::var("BACKTEST_TIMEFRAME").ok())
        .unwrap_or_else(|| "4H".to_string())
        .parse()?;
    let json_output = env::var("BACKTEST_JSON").map(|v| v == "1").unwrap_or(false);

    let config = Config::from_env()?;
    let strategies = match env::var("STRATEGY") {
        Ok(name) => vec![get_strategy(&name).ok_or_else(|| format!("unknown strategy '{}'", name))?],
        Err(_) => all_strategies(),
    };

    let file = CandleFile::load(&path)?;
    let symbols: Vec<String> = file.assets.iter().map(|a| a.asset.symbol.clone()).collect();
    let provider = Arc::new(InMemoryMarketData::from_file(&file));
    let runner = BacktestRunner::new(provider, config.backtest.clone());

    info!(
        assets = symbols.len(),
        strategies = strategies.len(),
        timeframe = %timeframe,
        "Starting backtests"
    );

    let mut reports = Vec::new();
    for symbol in &symbols {
        match runner
            .run_many(symbol, timeframe, strategies.clone(), (None, None))
            .await
        {
            Ok(results) => {
                for (name, result) in results {
                    match result {
                        Ok(report) => {
                            if !json_output {
                                print_summary(&report);
                            }
                            reports.push(report);
                        }
                        Err(e) => error!(asset = %symbol, strategy = %name, error = %e, "Backtest failed"),
                    }
                }
            }
            Err(e) => error!(asset = %symbol, error = %e, "Could not load candles"),
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

fn print_summary(report: &BacktestReport) {
    let m = &report.metrics;
    println!("{} / {} ({})", report.symbol, report.strategy, report.timeframe);
    println!(
        "  trades: {}  win rate: {:.2}%  profit factor: {:.2}",
        m.total_trades, m.win_rate, m.profit_factor
    );
    println!(
        "  return: {:.2} ({:.2}%)  max drawdown: {:.2}%  sharpe: {:.2}",
        m.total_return, m.total_return_percent, m.max_drawdown_percent, m.sharpe_ratio
    );
    for recommendation in &report.analysis.recommendations {
        println!("  - {}", recommendation);
    }
}
