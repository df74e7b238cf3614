//! Per-field parsing helpers shared by the adapters.
//!
//! All helpers return `Option`: a value that fails to parse drops the coin
//! (or the optional field) instead of failing the whole fetch.

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::errors::ProviderError;
use crate::models::MarketSnapshot;

/// Strictly positive price from a decimal string (`"96543.12"`, `"1.5e-7"`).
pub(crate) fn price_from_str(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .filter(is_positive)
}

/// Strictly positive price from a JSON number.
pub(crate) fn price_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::try_from(value).ok().filter(is_positive)
}

/// Optional percentage from a string; empty or unparseable means absent.
pub(crate) fn change_from_str(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// RFC 3339 timestamp, with or without fractional seconds.
pub(crate) fn timestamp_from_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

pub(crate) fn timestamp_from_unix_secs(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        return None;
    }
    Utc.timestamp_opt(secs, 0).single()
}

pub(crate) fn timestamp_from_unix_millis(millis: i64) -> Option<DateTime<Utc>> {
    if millis <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(millis).single()
}

/// Reject snapshots without a single tracked coin.
pub(crate) fn non_empty(snapshot: MarketSnapshot) -> Result<MarketSnapshot, ProviderError> {
    if snapshot.is_empty() {
        return Err(ProviderError::other(
            snapshot.provider,
            "empty result set",
        ));
    }
    Ok(snapshot)
}

fn is_positive(value: &Decimal) -> bool {
    value.is_sign_positive() && !value.is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_from_str() {
        assert_eq!(price_from_str("96543.12"), Some(dec!(96543.12)));
        assert_eq!(price_from_str(" 0.25 "), Some(dec!(0.25)));
        assert_eq!(price_from_str("1.5e-3"), Some(dec!(0.0015)));
        assert_eq!(price_from_str("0"), None);
        assert_eq!(price_from_str("-3"), None);
        assert_eq!(price_from_str("n/a"), None);
        assert_eq!(price_from_str(""), None);
    }

    #[test]
    fn test_price_from_f64() {
        assert_eq!(price_from_f64(100.5), Some(dec!(100.5)));
        assert_eq!(price_from_f64(0.0), None);
        assert_eq!(price_from_f64(-1.0), None);
        assert_eq!(price_from_f64(f64::NAN), None);
    }

    #[test]
    fn test_change_from_str() {
        assert_eq!(change_from_str("-1.23"), Some(-1.23));
        assert_eq!(change_from_str(""), None);
        assert_eq!(change_from_str("abc"), None);
    }

    #[test]
    fn test_timestamps() {
        let ts = timestamp_from_rfc3339("2026-02-20T10:11:12Z").unwrap();
        assert_eq!(ts.timestamp(), 1_771_582_272);
        assert!(timestamp_from_rfc3339("2026-02-20T10:11:12.345Z").is_some());
        assert!(timestamp_from_rfc3339("yesterday").is_none());
        assert_eq!(
            timestamp_from_unix_secs(1_700_000_000).unwrap().timestamp(),
            1_700_000_000
        );
        assert!(timestamp_from_unix_secs(0).is_none());
        assert_eq!(
            timestamp_from_unix_millis(1_700_000_000_123)
                .unwrap()
                .timestamp_millis(),
            1_700_000_000_123
        );
    }

    #[test]
    fn test_empty_snapshot_is_other_failure() {
        let err = non_empty(MarketSnapshot::new("coinlore", Utc::now())).unwrap_err();
        assert_eq!(err.kind, FailureKind::Other);
        assert_eq!(err.provider, "coinlore");
    }
}
