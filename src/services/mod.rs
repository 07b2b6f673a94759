//! Collaborators the core consumes: market data and per-asset backoff.

pub mod market_data;
pub mod rate_limit;

pub use market_data::{AssetCandles, CandleFile, InMemoryMarketData, MarketDataProvider};
pub use rate_limit::FailureBackoff;
