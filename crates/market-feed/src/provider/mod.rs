//! Market data and FX provider abstractions and implementations.
//!
//! This module contains:
//! - The [`MarketProvider`] and [`FxProvider`] traits
//! - Shared HTTP plumbing and field parsers
//! - Concrete adapters for the public crypto price APIs
//!
//! # Provider Resolution
//!
//! Adapters are addressed by their string id (e.g. `"coingecko"`) so a
//! fallback chain can be assembled from configuration with
//! [`market_provider_by_id`].

mod http;
mod parse;
mod traits;

pub mod binance;
pub mod coincap;
pub mod coingecko;
pub mod coinlore;
pub mod coinpaprika;
pub mod cryptocompare;
pub mod open_er_api;

use std::sync::Arc;
use std::time::Duration;

use crate::errors::FeedError;

pub use http::{parse_retry_after, CLIENT_USER_AGENT, DEFAULT_REQUEST_TIMEOUT, MAX_RETRY_AFTER};
pub use traits::{FxProvider, MarketProvider};

pub use binance::BinanceProvider;
pub use coincap::CoinCapProvider;
pub use coingecko::CoinGeckoProvider;
pub use coinlore::CoinLoreProvider;
pub use coinpaprika::CoinPaprikaProvider;
pub use cryptocompare::CryptoCompareProvider;
pub use open_er_api::OpenErApiProvider;

/// Market providers in default priority order.
pub const DEFAULT_MARKET_PROVIDERS: [&str; 3] = [
    coingecko::PROVIDER_ID,
    cryptocompare::PROVIDER_ID,
    coinlore::PROVIDER_ID,
];

/// Every market adapter id this crate knows about.
pub const KNOWN_MARKET_PROVIDERS: [&str; 6] = [
    coingecko::PROVIDER_ID,
    coincap::PROVIDER_ID,
    coinpaprika::PROVIDER_ID,
    cryptocompare::PROVIDER_ID,
    binance::PROVIDER_ID,
    coinlore::PROVIDER_ID,
];

/// Build a market adapter from its id.
pub fn market_provider_by_id(
    id: &str,
    timeout: Duration,
) -> Result<Arc<dyn MarketProvider>, FeedError> {
    let provider: Arc<dyn MarketProvider> = match id.trim().to_ascii_lowercase().as_str() {
        coingecko::PROVIDER_ID => Arc::new(CoinGeckoProvider::new(timeout)),
        coincap::PROVIDER_ID => Arc::new(CoinCapProvider::new(timeout)),
        coinpaprika::PROVIDER_ID => Arc::new(CoinPaprikaProvider::new(timeout)),
        cryptocompare::PROVIDER_ID => Arc::new(CryptoCompareProvider::new(timeout)),
        binance::PROVIDER_ID => Arc::new(BinanceProvider::new(timeout)),
        coinlore::PROVIDER_ID => Arc::new(CoinLoreProvider::new(timeout)),
        _ => return Err(FeedError::UnknownProvider(id.to_string())),
    };
    Ok(provider)
}

/// Build a fallback chain from ids, preserving their order.
pub fn market_providers_by_ids<S: AsRef<str>>(
    ids: &[S],
    timeout: Duration,
) -> Result<Vec<Arc<dyn MarketProvider>>, FeedError> {
    ids.iter()
        .map(|id| market_provider_by_id(id.as_ref(), timeout))
        .collect()
}

/// The default chain: CoinGecko, CryptoCompare, CoinLore.
pub fn default_market_providers(timeout: Duration) -> Vec<Arc<dyn MarketProvider>> {
    vec![
        Arc::new(CoinGeckoProvider::new(timeout)),
        Arc::new(CryptoCompareProvider::new(timeout)),
        Arc::new(CoinLoreProvider::new(timeout)),
    ]
}

pub fn default_fx_provider(timeout: Duration) -> Arc<dyn FxProvider> {
    Arc::new(OpenErApiProvider::new(timeout))
}
