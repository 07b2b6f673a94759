//! Market data provider interface and an in-memory implementation.

use crate::error::MarketDataError;
use crate::models::candle::{Asset, Candle, Timeframe};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Candles for `symbol` on `timeframe`, oldest first.
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, MarketDataError>;

    /// Latest traded price. `Ok(None)` means temporarily unavailable, not zero.
    async fn get_current_price(&self, symbol: &str) -> Result<Option<f64>, MarketDataError>;
}

/// Candles for one asset keyed by timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCandles {
    pub asset: Asset,
    pub candles: HashMap<Timeframe, Vec<Candle>>,
}

/// On-disk candle dump consumed by the binaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleFile {
    pub assets: Vec<AssetCandles>,
}

impl CandleFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MarketDataError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MarketDataError::Provider(format!("{}: {}", path.display(), e)))?;
        let mut file: CandleFile = serde_json::from_str(&raw)
            .map_err(|e| MarketDataError::Provider(format!("{}: {}", path.display(), e)))?;
        for entry in &mut file.assets {
            for candles in entry.candles.values_mut() {
                candles.sort_by_key(|c| c.timestamp);
                candles.dedup_by_key(|c| c.timestamp);
            }
        }
        Ok(file)
    }
}

/// Provider backed by maps in memory. Prices can be updated between polls.
#[derive(Debug, Default)]
pub struct InMemoryMarketData {
    candles: RwLock<HashMap<(String, Timeframe), Vec<Candle>>>,
    prices: RwLock<HashMap<String, f64>>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(file: &CandleFile) -> Self {
        let mut candles = HashMap::new();
        let mut prices = HashMap::new();
        for entry in &file.assets {
            let symbol = entry.asset.symbol.to_uppercase();
            for (timeframe, series) in &entry.candles {
                candles.insert((symbol.clone(), *timeframe), series.clone());
            }
            let latest = entry
                .candles
                .values()
                .filter_map(|series| series.last())
                .max_by_key(|c| c.timestamp);
            if let Some(candle) = latest {
                prices.insert(symbol.clone(), candle.close);
            }
        }
        Self {
            candles: RwLock::new(candles),
            prices: RwLock::new(prices),
        }
    }

    pub async fn insert_candles(&self, symbol: &str, timeframe: Timeframe, mut series: Vec<Candle>) {
        series.sort_by_key(|c| c.timestamp);
        let mut candles = self.candles.write().await;
        candles.insert((symbol.to_uppercase(), timeframe), series);
    }

    pub async fn set_price(&self, symbol: &str, price: f64) {
        let mut prices = self.prices.write().await;
        prices.insert(symbol.to_uppercase(), price);
    }

    pub async fn clear_price(&self, symbol: &str) {
        let mut prices = self.prices.write().await;
        prices.remove(&symbol.to_uppercase());
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for InMemoryMarketData {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let candles = self.candles.read().await;
        match candles.get(&(symbol.to_uppercase(), timeframe)) {
            Some(series) => Ok(series.clone()),
            None => {
                debug!(asset = %symbol, timeframe = %timeframe, "InMemoryMarketData: no candles");
                Ok(Vec::new())
            }
        }
    }

    async fn get_current_price(&self, symbol: &str) -> Result<Option<f64>, MarketDataError> {
        let prices = self.prices.read().await;
        Ok(prices.get(&symbol.to_uppercase()).copied())
    }
}
