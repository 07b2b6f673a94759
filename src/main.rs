//! Morpheus scanner
//!
//! Reads a candle dump, scans every asset and prints the emitted signals as
//! JSON on stdout.

use dotenvy::dotenv;
use morpheus::config::{get_environment, Config};
use morpheus::logging;
use morpheus::services::CandleFile;
use morpheus::signals::{SignalEngine, SignalGenerator, SignalRequest};
use std::env;
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let path = env::args()
        .nth(1)
        .or_else(|| env::var("CANDLES_FILE").ok())
        .ok_or("usage: morpheus <candles.json> (or set CANDLES_FILE)")?;

    let config = Config::from_env()?;
    info!(environment = %get_environment(), file = %path, "Starting Morpheus scan");

    let file = CandleFile::load(&path)?;
    let requests: Vec<SignalRequest> = file
        .assets
        .into_iter()
        .map(|entry| SignalRequest::new(entry.asset, entry.candles))
        .collect();
    if requests.is_empty() {
        warn!(file = %path, "No assets in candle file");
    }

    let generator = SignalGenerator::new(config.signal);
    let signals = SignalEngine::scan(&generator, &requests);

    info!(
        assets = requests.len(),
        signals = signals.len(),
        "Scan complete"
    );
    println!("{}", serde_json::to_string_pretty(&signals)?);

    Ok(())
}
