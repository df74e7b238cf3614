//! Shared HTTP plumbing for the provider adapters.
//!
//! Every adapter issues exactly one GET per fetch through [`get_text`], which
//! sets the common headers and turns transport errors and non-200 answers
//! into classified [`ProviderError`]s.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;
use reqwest::header::{ACCEPT, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::errors::ProviderError;

/// User agent sent with every provider request.
pub const CLIENT_USER_AGENT: &str = "CryptoView/1.0";

/// Transport timeout used when an adapter is built without one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound applied to server-provided `Retry-After` hints.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

/// Build the HTTP client owned by one adapter.
///
/// A zero timeout falls back to [`DEFAULT_REQUEST_TIMEOUT`].
pub(crate) fn build_client(timeout: Duration) -> Client {
    let timeout = if timeout.is_zero() {
        DEFAULT_REQUEST_TIMEOUT
    } else {
        timeout
    };
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// GET `url` and return the body of a 200 response.
pub(crate) async fn get_text(
    client: &Client,
    provider: &str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String, ProviderError> {
    debug!("{} request: {} with {} params", provider, url, query.len());

    let response = client
        .get(url)
        .query(query)
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, CLIENT_USER_AGENT)
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| parse_retry_after(raw, Utc::now()));
        return Err(ProviderError::from_status(
            provider,
            status.as_u16(),
            retry_after,
        ));
    }

    response
        .text()
        .await
        .map_err(|e| ProviderError::from_reqwest(provider, e))
}

/// GET `url` and decode the JSON body into `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: &str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ProviderError> {
    let body = get_text(client, provider, url, query).await?;
    decode(provider, &body)
}

pub(crate) fn decode<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::decode(provider, e))
}

/// Parse a `Retry-After` header value.
///
/// Accepts delta-seconds (`"120"`) or an HTTP date in any of the three
/// forms HTTP allows (`"Wed, 21 Oct 2015 07:28:00 GMT"`, the RFC 850 form
/// and asctime). Zero, past dates and garbage yield `None`; anything above
/// [`MAX_RETRY_AFTER`] is clipped.
pub fn parse_retry_after(raw: &str, now: DateTime<Utc>) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let delay = if let Ok(secs) = raw.parse::<u64>() {
        Duration::from_secs(secs)
    } else {
        (parse_http_date(raw)? - now).to_std().ok()?
    };

    if delay.is_zero() {
        return None;
    }
    Some(delay.min(MAX_RETRY_AFTER))
}

// Obsolete HTTP-date forms, always GMT.
const RFC850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(when) = DateTime::parse_from_rfc2822(raw) {
        return Some(when.with_timezone(&Utc));
    }
    [RFC850_FORMAT, ASCTIME_FORMAT]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
