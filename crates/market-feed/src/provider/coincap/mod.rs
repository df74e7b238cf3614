//! CoinCap market data provider.
//!
//! `/assets?ids=...` returns every numeric field as a string. The payload has
//! no per-asset update time, so quotes are stamped with the fetch time.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::models::{CoinId, CoinQuote, MarketSnapshot};
use crate::provider::{http, parse, MarketProvider};

const BASE_URL: &str = "https://api.coincap.io/v2";
pub const PROVIDER_ID: &str = "coincap";

/// CoinCap's own asset ids for the tracked coins.
const ASSET_IDS: &str = "bitcoin,ethereum,toncoin,solana,dogecoin,xrp,litecoin";

#[derive(Debug, Deserialize)]
struct AssetsResponse {
    #[serde(default)]
    data: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Asset {
    #[serde(default)]
    id: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
    price_usd: Option<String>,
    #[serde(rename = "changePercent24Hr")]
    change_percent_24h: Option<String>,
}

pub struct CoinCapProvider {
    client: Client,
    base_url: String,
}

impl CoinCapProvider {
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

fn build_snapshot(response: AssetsResponse, now: DateTime<Utc>) -> MarketSnapshot {
    let mut snapshot = MarketSnapshot::new(PROVIDER_ID, now);
    for asset in response.data {
        let ticker = asset.symbol.trim().to_ascii_uppercase();
        let Some(id) = CoinId::resolve(&asset.id, &ticker) else {
            continue;
        };
        let Some(price) = asset.price_usd.as_deref().and_then(parse::price_from_str) else {
            continue;
        };
        let change = asset
            .change_percent_24h
            .as_deref()
            .and_then(parse::change_from_str);

        snapshot.insert(
            CoinQuote::new(id, price)
                .with_name(asset.name)
                .with_ticker(ticker)
                .with_change(change)
                .with_last_update(now),
        );
    }
    snapshot
}

#[async_trait]
impl MarketProvider for CoinCapProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn fetch_usd(&self) -> Result<MarketSnapshot, ProviderError> {
        let url = format!("{}/assets", self.base_url);
        let response: AssetsResponse =
            http::get_json(&self.client, PROVIDER_ID, &url, &[("ids", ASSET_IDS)]).await?;
        parse::non_empty(build_snapshot(response, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_build_snapshot_parses_string_numbers() {
        let body = r#"{"data":[
            {"id":"xrp","symbol":"XRP","name":"XRP","priceUsd":"0.7100000000","changePercent24Hr":"1.04"},
            {"id":"toncoin","symbol":"TON","name":"Toncoin","priceUsd":"5.89","changePercent24Hr":""},
            {"id":"solana","symbol":"SOL","name":"Solana","priceUsd":"not-a-number","changePercent24Hr":"5.91"},
            {"id":"litecoin","symbol":"LTC","name":"Litecoin","priceUsd":"-1","changePercent24Hr":"0.1"}
        ],"timestamp":1700000000000}"#;
        let response: AssetsResponse = http::decode(PROVIDER_ID, body).unwrap();
        let now = Utc::now();
        let snapshot = build_snapshot(response, now);

        assert_eq!(snapshot.len(), 2);

        let xrp = snapshot.get(CoinId::Ripple).unwrap();
        assert_eq!(xrp.price_usd, dec!(0.71));
        assert_eq!(xrp.change_24h, Some(1.04));
        assert_eq!(xrp.last_update, Some(now));

        let ton = snapshot.get(CoinId::TheOpenNetwork).unwrap();
        assert_eq!(ton.change_24h, None);

        assert!(snapshot.get(CoinId::Solana).is_none());
        assert!(snapshot.get(CoinId::Litecoin).is_none());
    }

    #[test]
    fn test_missing_data_is_empty() {
        let response: AssetsResponse = http::decode(PROVIDER_ID, "{}").unwrap();
        assert!(build_snapshot(response, Utc::now()).is_empty());
    }
}
