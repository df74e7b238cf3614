//! CoinGecko market data provider.
//!
//! Uses the public `/coins/markets` endpoint, which returns name, symbol,
//! price, 24h change and an RFC 3339 update time for every requested id in a
//! single call. No API key is required, but the free tier throttles
//! aggressively with HTTP 429.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::models::{CoinId, CoinQuote, MarketSnapshot};
use crate::provider::{http, parse, MarketProvider};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const PROVIDER_ID: &str = "coingecko";

/// Entry of the `/coins/markets` response.
#[derive(Debug, Deserialize)]
struct MarketEntry {
    id: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    last_updated: Option<String>,
}

/// CoinGecko market data provider.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: http::build_client(timeout),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different API root (e.g. a mirror).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn tracked_ids() -> String {
        CoinId::ALL
            .iter()
            .map(CoinId::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn build_snapshot(entries: Vec<MarketEntry>, now: DateTime<Utc>) -> MarketSnapshot {
    let mut snapshot = MarketSnapshot::new(PROVIDER_ID, now);
    for entry in entries {
        let ticker = entry.symbol.trim().to_ascii_uppercase();
        let Some(id) = CoinId::resolve(&entry.id, &ticker) else {
            continue;
        };
        let Some(price) = entry.current_price.and_then(parse::price_from_f64) else {
            continue;
        };
        let last_update = entry
            .last_updated
            .as_deref()
            .and_then(parse::timestamp_from_rfc3339)
            .unwrap_or(now);

        snapshot.insert(
            CoinQuote::new(id, price)
                .with_name(entry.name)
                .with_ticker(ticker)
                .with_change(entry.price_change_percentage_24h)
                .with_last_update(last_update),
        );
    }
    snapshot
}

#[async_trait]
impl MarketProvider for CoinGeckoProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn fetch_usd(&self) -> Result<MarketSnapshot, ProviderError> {
        let url = format!("{}/coins/markets", self.base_url);
        let ids = Self::tracked_ids();
        let query = [
            ("vs_currency", "usd"),
            ("ids", ids.as_str()),
            ("order", "market_cap_desc"),
            ("sparkline", "false"),
            ("price_change_percentage", "24h"),
        ];
        let entries: Vec<MarketEntry> =
            http::get_json(&self.client, PROVIDER_ID, &url, &query).await?;
        parse::non_empty(build_snapshot(entries, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FIXTURE: &str = r#"[
        {"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":100.5,
         "price_change_percentage_24h":1.2,"last_updated":"2026-02-20T10:11:12.000Z"},
        {"id":"the-open-network","symbol":"ton","name":"Toncoin","current_price":5.89,
         "price_change_percentage_24h":null,"last_updated":"garbage"},
        {"id":"cardano","symbol":"ada","name":"Cardano","current_price":0.7,
         "price_change_percentage_24h":0.1,"last_updated":"2026-02-20T10:11:12Z"},
        {"id":"dogecoin","symbol":"doge","name":"Dogecoin","current_price":0,
         "price_change_percentage_24h":0.1,"last_updated":"2026-02-20T10:11:12Z"}
    ]"#;

    #[test]
    fn test_tracked_ids() {
        assert_eq!(
            CoinGeckoProvider::tracked_ids(),
            "bitcoin,ethereum,the-open-network,solana,dogecoin,ripple,litecoin"
        );
    }

    #[test]
    fn test_build_snapshot_maps_and_drops() {
        let entries: Vec<MarketEntry> = http::decode(PROVIDER_ID, FIXTURE).unwrap();
        let now = Utc::now();
        let snapshot = build_snapshot(entries, now);

        assert_eq!(snapshot.provider, "coingecko");
        assert_eq!(snapshot.len(), 2);

        let btc = snapshot.get(CoinId::Bitcoin).unwrap();
        assert_eq!(btc.price_usd, dec!(100.5));
        assert_eq!(btc.ticker, "BTC");
        assert_eq!(btc.change_24h, Some(1.2));
        assert_eq!(btc.last_update.unwrap().timestamp(), 1_771_582_272);

        let ton = snapshot.get(CoinId::TheOpenNetwork).unwrap();
        assert_eq!(ton.name, "Toncoin");
        assert_eq!(ton.change_24h, None);
        assert_eq!(ton.last_update, Some(now));

        assert!(snapshot.get(CoinId::Dogecoin).is_none());
    }

    #[test]
    fn test_provider_id() {
        let provider = CoinGeckoProvider::new(Duration::from_secs(1));
        assert_eq!(provider.id(), "coingecko");
    }
}
