//! CoinPaprika market data provider.
//!
//! `/tickers?quotes=USD` has no id filter and returns the whole market, so
//! parsing stops as soon as every tracked coin has been found.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::models::{CoinId, CoinQuote, MarketSnapshot};
use crate::provider::{http, parse, MarketProvider};

const BASE_URL: &str = "https://api.coinpaprika.com/v1";
pub const PROVIDER_ID: &str = "coinpaprika";

#[derive(Debug, Deserialize)]
struct Ticker {
    #[serde(default)]
    id: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
    last_updated: Option<String>,
    #[serde(default)]
    quotes: Quotes,
}

#[derive(Debug, Default, Deserialize)]
struct Quotes {
    #[serde(rename = "USD")]
    usd: Option<UsdQuote>,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    price: Option<f64>,
    percent_change_24h: Option<f64>,
}

pub struct CoinPaprikaProvider {
    client: Client,
    base_url: String,
}

impl CoinPaprikaProvider {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: http::build_client(timeout),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn build_snapshot(tickers: Vec<Ticker>, now: DateTime<Utc>) -> MarketSnapshot {
    let mut snapshot = MarketSnapshot::new(PROVIDER_ID, now);
    for ticker in tickers {
        let symbol = ticker.symbol.trim().to_ascii_uppercase();
        let Some(id) = CoinId::resolve(&ticker.id, &symbol) else {
            continue;
        };
        // The full listing contains look-alike tokens sharing a ticker; the
        // first (highest ranked) entry wins.
        if snapshot.get(id).is_some() {
            continue;
        }
        let Some(usd) = ticker.quotes.usd else {
            continue;
        };
        let Some(price) = usd.price.and_then(parse::price_from_f64) else {
            continue;
        };
        let last_update = ticker
            .last_updated
            .as_deref()
            .and_then(parse::timestamp_from_rfc3339)
            .unwrap_or(now);

        snapshot.insert(
            CoinQuote::new(id, price)
                .with_name(ticker.name)
                .with_ticker(symbol)
                .with_change(usd.percent_change_24h)
                .with_last_update(last_update),
        );
        if snapshot.len() == CoinId::ALL.len() {
            break;
        }
    }
    snapshot
}

#[async_trait]
impl MarketProvider for CoinPaprikaProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn fetch_usd(&self) -> Result<MarketSnapshot, ProviderError> {
        let url = format!("{}/tickers", self.base_url);
        let tickers: Vec<Ticker> =
            http::get_json(&self.client, PROVIDER_ID, &url, &[("quotes", "USD")]).await?;
        parse::non_empty(build_snapshot(tickers, Utc::now()))
    }
}
