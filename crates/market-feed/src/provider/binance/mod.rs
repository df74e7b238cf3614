//! Binance 24h ticker provider.
//!
//! USDT pairs stand in for USD prices. Binance answers HTTP 451 from
//! restricted regions, which surfaces as an ordinary `other` failure.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::models::{CoinId, CoinQuote, MarketSnapshot};
use crate::provider::{http, parse, MarketProvider};

const BASE_URL: &str = "https://api.binance.com/api/v3/ticker/24hr";
pub const PROVIDER_ID: &str = "binance";

const QUOTE_ASSET: &str = "USDT";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    symbol: String,
    last_price: Option<String>,
    price_change_percent: Option<String>,
    close_time: Option<i64>,
}

pub struct BinanceProvider {
    client: Client,
    base_url: String,
}

impl BinanceProvider {
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

    /// JSON array of trading pairs, e.g. `["BTCUSDT","ETHUSDT",...]`.
    fn symbols_param() -> String {
        let pairs: Vec<String> = CoinId::ALL
            .iter()
            .map(|id| format!("\"{}{}\"", id.default_ticker(), QUOTE_ASSET))
            .collect();
        format!("[{}]", pairs.join(","))
    }
}

fn build_snapshot(tickers: Vec<Ticker24h>, now: DateTime<Utc>) -> MarketSnapshot {
    let mut snapshot = MarketSnapshot::new(PROVIDER_ID, now);
    for ticker in tickers {
        let pair = ticker.symbol.trim().to_ascii_uppercase();
        let base = pair.strip_suffix(QUOTE_ASSET).unwrap_or(&pair);
        let Some(id) = CoinId::from_ticker(base) else {
            continue;
        };
        let Some(price) = ticker.last_price.as_deref().and_then(parse::price_from_str) else {
            continue;
        };
        let change = ticker
            .price_change_percent
            .as_deref()
            .and_then(parse::change_from_str);
        let last_update = ticker
            .close_time
            .and_then(parse::timestamp_from_unix_millis)
            .unwrap_or(now);

        snapshot.insert(
            CoinQuote::new(id, price)
                .with_name(id.default_name())
                .with_ticker(id.default_ticker())
                .with_change(change)
                .with_last_update(last_update),
        );
    }
    snapshot
}

#[async_trait]
impl MarketProvider for BinanceProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn fetch_usd(&self) -> Result<MarketSnapshot, ProviderError> {
        let symbols = Self::symbols_param();
        let tickers: Vec<Ticker24h> = http::get_json(
            &self.client,
            PROVIDER_ID,
            &self.base_url,
            &[("symbols", symbols.as_str())],
        )
        .await?;
        parse::non_empty(build_snapshot(tickers, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_symbols_param() {
        assert_eq!(
            BinanceProvider::symbols_param(),
            r#"["BTCUSDT","ETHUSDT","TONUSDT","SOLUSDT","DOGEUSDT","XRPUSDT","LTCUSDT"]"#
        );
    }

    #[test]
    fn test_build_snapshot() {
        let body = r#"[
            {"symbol":"BTCUSDT","lastPrice":"96543.12000000","priceChangePercent":"2.540","closeTime":1700000000123},
            {"symbol":"ETHUSDT","lastPrice":"3421.77","priceChangePercent":"","closeTime":0},
            {"symbol":"BNBUSDT","lastPrice":"600.0","priceChangePercent":"1.0","closeTime":1700000000123},
            {"symbol":"SOLUSDT","lastPrice":"0.00000000","priceChangePercent":"1.0","closeTime":1700000000123}
        ]"#;
        let tickers: Vec<Ticker24h> = http::decode(PROVIDER_ID, body).unwrap();
        let now = Utc::now();
        let snapshot = build_snapshot(tickers, now);

        assert_eq!(snapshot.len(), 2);

        let btc = snapshot.get(CoinId::Bitcoin).unwrap();
        assert_eq!(btc.price_usd, dec!(96543.12));
        assert_eq!(btc.change_24h, Some(2.54));
        assert_eq!(btc.ticker, "BTC");
        assert_eq!(btc.name, "Bitcoin");
        assert_eq!(btc.last_update.unwrap().timestamp_millis(), 1_700_000_000_123);

        let eth = snapshot.get(CoinId::Ethereum).unwrap();
        assert_eq!(eth.change_24h, None);
        assert_eq!(eth.last_update, Some(now));
    }
}
