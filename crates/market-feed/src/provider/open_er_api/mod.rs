//! open.er-api.com exchange rate provider.
//!
//! The free `latest/USD` endpoint is refreshed once a day upstream; the feed
//! polls it far more often than that, but the call is cheap and unmetered.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::errors::ProviderError;
use crate::models::{FiatCurrency, FxSnapshot};
use crate::provider::{http, parse, FxProvider};

const BASE_URL: &str = "https://open.er-api.com/v6/latest/USD";
pub const PROVIDER_ID: &str = "open-er-api";

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    rates: HashMap<String, f64>,
    time_last_update_unix: Option<i64>,
}

pub struct OpenErApiProvider {
    client: Client,
    base_url: String,
}

impl OpenErApiProvider {
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

fn build_snapshot(
    response: LatestResponse,
    now: DateTime<Utc>,
) -> Result<FxSnapshot, ProviderError> {
    if response.rates.is_empty() {
        return Err(ProviderError::other(PROVIDER_ID, "empty fx rates"));
    }

    let fetched_at = response
        .time_last_update_unix
        .and_then(parse::timestamp_from_unix_secs)
        .unwrap_or(now);
    let mut snapshot = FxSnapshot::new(fetched_at);

    for currency in FiatCurrency::ALL {
        if currency.is_base() {
            continue;
        }
        if let Some(rate) = response
            .rates
            .get(currency.code())
            .and_then(|rate| parse::price_from_f64(*rate))
        {
            snapshot.rates.insert(currency, rate);
        }
    }
    if !snapshot.has_foreign_rates() {
        return Err(ProviderError::other(PROVIDER_ID, "no usable fx rates"));
    }
    Ok(snapshot)
}

#[async_trait]
impl FxProvider for OpenErApiProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn fetch_rates(&self) -> Result<FxSnapshot, ProviderError> {
        let response: LatestResponse =
            http::get_json(&self.client, PROVIDER_ID, &self.base_url, &[]).await?;
        build_snapshot(response, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_build_snapshot_keeps_supported_positive_rates() {
        let body = r#"{"result":"success","time_last_update_unix":1700000000,
            "rates":{"EUR":0.5,"RUB":-1,"GBP":0.8}}"#;
        let response: LatestResponse = http::decode(PROVIDER_ID, body).unwrap();
        let fx = build_snapshot(response, Utc::now()).unwrap();

        assert_eq!(fx.rate(FiatCurrency::Usd), Some(Decimal::ONE));
        assert_eq!(fx.rate(FiatCurrency::Eur), Some(dec!(0.5)));
        assert_eq!(fx.rate(FiatCurrency::Rub), None);
        assert_eq!(fx.fetched_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_usd_pinned_even_if_upstream_differs() {
        let body = r#"{"result":"success","rates":{"RUB":90}}"#;
        let response: LatestResponse = http::decode(PROVIDER_ID, body).unwrap();
        let fx = build_snapshot(response, Utc::now()).unwrap();
        assert_eq!(fx.rate(FiatCurrency::Usd), Some(Decimal::ONE));
        assert_eq!(fx.rate(FiatCurrency::Rub), Some(dec!(90)));
    }

    #[test]
    fn test_only_unsupported_rates_is_error() {
        let body = r#"{"result":"success","rates":{"USD":1,"GBP":0.8,"EUR":0}}"#;
        let response: LatestResponse = http::decode(PROVIDER_ID, body).unwrap();
        let err = build_snapshot(response, Utc::now()).unwrap_err();
        assert_eq!(err.kind, FailureKind::Other);
    }

    #[test]
    fn test_empty_rates_is_error() {
        let body = r#"{"result":"error","error-type":"unsupported-code"}"#;
        let response: LatestResponse = http::decode(PROVIDER_ID, body).unwrap();
        let err = build_snapshot(response, Utc::now()).unwrap_err();
        assert_eq!(err.kind, FailureKind::Other);
        assert_eq!(err.to_string(), "open-er-api: empty fx rates");
    }
}
