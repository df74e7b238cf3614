//! CryptoCompare market data provider.
//!
//! Uses `pricemultifull`, keyed by ticker symbol. The payload carries no coin
//! names, so the canonical default names are used.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::models::{CoinId, CoinQuote, MarketSnapshot};
use crate::provider::{http, parse, MarketProvider};

const BASE_URL: &str = "https://min-api.cryptocompare.com/data/pricemultifull";
pub const PROVIDER_ID: &str = "cryptocompare";

#[derive(Debug, Deserialize)]
struct PriceMultiFullResponse {
    #[serde(rename = "RAW", default)]
    raw: HashMap<String, HashMap<String, RawQuote>>,
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    #[serde(rename = "PRICE")]
    price: Option<f64>,
    #[serde(rename = "CHANGEPCT24HOUR")]
    change_pct_24h: Option<f64>,
    #[serde(rename = "LASTUPDATE")]
    last_update: Option<i64>,
}

pub struct CryptoCompareProvider {
    client: Client,
    base_url: String,
}

impl CryptoCompareProvider {
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

    fn from_symbols() -> String {
        CoinId::ALL
            .iter()
            .map(CoinId::default_ticker)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn build_snapshot(response: PriceMultiFullResponse, now: DateTime<Utc>) -> MarketSnapshot {
    let mut snapshot = MarketSnapshot::new(PROVIDER_ID, now);
    for (symbol, by_fiat) in response.raw {
        let Some(usd) = by_fiat.get("USD") else {
            continue;
        };
        let Some(id) = CoinId::from_ticker(&symbol) else {
            continue;
        };
        let Some(price) = usd.price.and_then(parse::price_from_f64) else {
            continue;
        };
        let last_update = usd
            .last_update
            .and_then(parse::timestamp_from_unix_secs)
            .unwrap_or(now);

        snapshot.insert(
            CoinQuote::new(id, price)
                .with_name(id.default_name())
                .with_ticker(symbol.trim().to_ascii_uppercase())
                .with_change(usd.change_pct_24h)
                .with_last_update(last_update),
        );
    }
    snapshot
}

#[async_trait]
impl MarketProvider for CryptoCompareProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn fetch_usd(&self) -> Result<MarketSnapshot, ProviderError> {
        let fsyms = Self::from_symbols();
        let query = [("fsyms", fsyms.as_str()), ("tsyms", "USD")];
        let response: PriceMultiFullResponse =
            http::get_json(&self.client, PROVIDER_ID, &self.base_url, &query).await?;
        parse::non_empty(build_snapshot(response, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_symbols() {
        assert_eq!(
            CryptoCompareProvider::from_symbols(),
            "BTC,ETH,TON,SOL,DOGE,XRP,LTC"
        );
    }

    #[test]
    fn test_build_snapshot() {
        let body = r#"{"RAW":{
            "BTC":{"USD":{"PRICE":96543.5,"CHANGEPCT24HOUR":2.54,"LASTUPDATE":1700000000}},
            "LTC":{"USD":{"PRICE":102.33}},
            "SOL":{"EUR":{"PRICE":170.0,"CHANGEPCT24HOUR":1.0,"LASTUPDATE":1700000000}},
            "ADA":{"USD":{"PRICE":0.7,"CHANGEPCT24HOUR":1.0,"LASTUPDATE":1700000000}},
            "DOGE":{"USD":{"PRICE":-0.1,"CHANGEPCT24HOUR":1.0,"LASTUPDATE":1700000000}}
        }}"#;
        let response: PriceMultiFullResponse = http::decode(PROVIDER_ID, body).unwrap();
        let now = Utc::now();
        let snapshot = build_snapshot(response, now);

        assert_eq!(snapshot.len(), 2);

        let btc = snapshot.get(CoinId::Bitcoin).unwrap();
        assert_eq!(btc.price_usd, dec!(96543.5));
        assert_eq!(btc.name, "Bitcoin");
        assert_eq!(btc.change_24h, Some(2.54));
        assert_eq!(btc.last_update.unwrap().timestamp(), 1_700_000_000);

        let ltc = snapshot.get(CoinId::Litecoin).unwrap();
        assert_eq!(ltc.change_24h, None);
        assert_eq!(ltc.last_update, Some(now));
    }

    #[test]
    fn test_error_payload_without_raw_is_empty() {
        let body = r#"{"Response":"Error","Message":"rate limit"}"#;
        let response: PriceMultiFullResponse = http::decode(PROVIDER_ID, body).unwrap();
        assert!(build_snapshot(response, Utc::now()).is_empty());
    }
}
