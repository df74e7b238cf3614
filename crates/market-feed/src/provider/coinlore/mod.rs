//! CoinLore market data provider.
//!
//! The ticker list is paged by market cap; the first hundred entries cover
//! every tracked coin.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::models::{CoinId, CoinQuote, MarketSnapshot};
use crate::provider::{http, parse, MarketProvider};

const BASE_URL: &str = "https://api.coinlore.net/api/tickers/";
pub const PROVIDER_ID: &str = "coinlore";

#[derive(Debug, Deserialize)]
struct TickersResponse {
    #[serde(default)]
    data: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
    price_usd: Option<String>,
    percent_change_24h: Option<String>,
}

pub struct CoinLoreProvider {
    client: Client,
    base_url: String,
}

impl CoinLoreProvider {
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

fn build_snapshot(response: TickersResponse, now: DateTime<Utc>) -> MarketSnapshot {
    let mut snapshot = MarketSnapshot::new(PROVIDER_ID, now);
    for ticker in response.data {
        let Some(id) = CoinId::from_ticker(&ticker.symbol) else {
            continue;
        };
        if snapshot.get(id).is_some() {
            continue;
        }
        let Some(price) = ticker.price_usd.as_deref().and_then(parse::price_from_str) else {
            continue;
        };
        let change = ticker
            .percent_change_24h
            .as_deref()
            .and_then(parse::change_from_str);
        let name = if ticker.name.trim().is_empty() {
            id.default_name().to_string()
        } else {
            ticker.name
        };

        snapshot.insert(
            CoinQuote::new(id, price)
                .with_name(name)
                .with_ticker(id.default_ticker())
                .with_change(change)
                .with_last_update(now),
        );
        if snapshot.len() == CoinId::ALL.len() {
            break;
        }
    }
    snapshot
}

#[async_trait]
impl MarketProvider for CoinLoreProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn fetch_usd(&self) -> Result<MarketSnapshot, ProviderError> {
        let query = [("start", "0"), ("limit", "100")];
        let response: TickersResponse =
            http::get_json(&self.client, PROVIDER_ID, &self.base_url, &query).await?;
        parse::non_empty(build_snapshot(response, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_build_snapshot() {
        let body = r#"{"data":[
            {"id":"90","symbol":"BTC","name":"Bitcoin","price_usd":"96543.12","percent_change_24h":"2.54"},
            {"id":"80","symbol":"ETH","name":"","price_usd":"3421.77","percent_change_24h":"-1.23"},
            {"id":"2710","symbol":"BNB","name":"Binance Coin","price_usd":"600.00","percent_change_24h":"0.5"},
            {"id":"2","symbol":"DOGE","name":"Dogecoin","price_usd":"","percent_change_24h":"0.5"}
        ],"info":{"coins_num":10000}}"#;
        let response: TickersResponse = http::decode(PROVIDER_ID, body).unwrap();
        let snapshot = build_snapshot(response, Utc::now());

        assert_eq!(snapshot.len(), 2);
        let btc = snapshot.get(CoinId::Bitcoin).unwrap();
        assert_eq!(btc.price_usd, dec!(96543.12));
        assert_eq!(btc.change_24h, Some(2.54));

        let eth = snapshot.get(CoinId::Ethereum).unwrap();
        assert_eq!(eth.name, "Ethereum");
        assert_eq!(eth.ticker, "ETH");
        assert_eq!(eth.change_24h, Some(-1.23));
    }
}
