//! Error types for the market feed crate.
//!
//! This module provides:
//! - [`ProviderError`]: a classified failure from a single provider fetch
//! - [`FailureKind`]: the classification that drives provider backoff
//! - [`FeedError`]: configuration errors and the combined failure surfaced
//!   when no provider could deliver data

mod kind;

pub use kind::FailureKind;

use std::time::Duration;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failed fetch from one provider.
///
/// Adapters never return anything else: transport errors, bad statuses and
/// undecodable payloads are all folded into this shape so the feed can decide
/// on backoff from [`kind`](Self::kind) and [`retry_after`](Self::retry_after).
#[derive(Error, Debug)]
#[error("{provider}: {message}")]
pub struct ProviderError {
    /// The provider that failed (e.g. "coingecko").
    pub provider: String,
    /// Failure classification.
    pub kind: FailureKind,
    /// HTTP status, when the provider answered at all.
    pub status: Option<u16>,
    /// Server-provided `Retry-After` hint, already clipped.
    pub retry_after: Option<Duration>,
    /// Human readable description.
    pub message: String,
    #[source]
    source: Option<BoxError>,
}

impl ProviderError {
    /// Create an error with no status and no underlying cause.
    ///
    /// The message defaults to the kind name, so `ProviderError::new("cg",
    /// FailureKind::RateLimit)` displays as `cg: rate_limit`.
    pub fn new(provider: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            provider: provider.into(),
            kind,
            status: None,
            retry_after: None,
            message: kind.to_string(),
            source: None,
        }
    }

    /// A throttling response, optionally carrying a `Retry-After` hint.
    pub fn rate_limited(provider: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let mut err = Self::new(provider, FailureKind::RateLimit);
        err.status = Some(429);
        err.retry_after = retry_after;
        err
    }

    /// A non-200 HTTP answer. 429 is classified as a rate limit, every other
    /// status as [`FailureKind::Other`].
    pub fn from_status(
        provider: impl Into<String>,
        status: u16,
        retry_after: Option<Duration>,
    ) -> Self {
        let provider = provider.into();
        let kind = if status == 429 {
            FailureKind::RateLimit
        } else {
            FailureKind::Other
        };
        let message = format!("HTTP status {}", status);
        Self {
            provider,
            kind,
            status: Some(status),
            retry_after,
            message,
            source: None,
        }
    }

    /// Transport failure that never produced a response.
    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, FailureKind::Network).with_message(message)
    }

    /// Malformed or unusable payload.
    pub fn other(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, FailureKind::Other).with_message(message)
    }

    /// Classify a `reqwest` error.
    ///
    /// Request construction, redirect and decode errors are the provider's or
    /// our own fault and count as [`FailureKind::Other`]; everything else
    /// (connect, timeout, reading the body) is a network failure.
    pub fn from_reqwest(provider: impl Into<String>, err: reqwest::Error) -> Self {
        let kind = if err.is_builder() || err.is_redirect() || err.is_decode() {
            FailureKind::Other
        } else {
            FailureKind::Network
        };
        Self::new(provider, kind)
            .with_message(err.to_string())
            .with_source(err)
    }

    /// Payload could not be decoded.
    pub fn decode(provider: impl Into<String>, err: serde_json::Error) -> Self {
        Self::new(provider, FailureKind::Other)
            .with_message(format!("decode payload: {}", err))
            .with_source(err)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_rate_limit(&self) -> bool {
        self.kind == FailureKind::RateLimit
    }
}

/// Errors surfaced by the feed itself.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The feed was built without any market provider.
    #[error("at least one market provider is required")]
    NoMarketProviders,

    /// A provider id in the configuration does not name a known adapter.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The requested display currency is not supported.
    #[error("unsupported fiat currency: {0}")]
    UnsupportedCurrency(String),

    /// `Feed::start` was called outside a tokio runtime.
    #[error("feed worker needs a running tokio runtime")]
    NoRuntime,

    /// The only attempted provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Several providers were attempted and all failed.
    #[error("{count} provider failures; last: {last}")]
    AllProvidersFailed {
        count: usize,
        #[source]
        last: ProviderError,
    },
}

impl FeedError {
    /// Fold the failures of one market cycle into a single error.
    ///
    /// Exactly one failure is returned verbatim; more are summarised with the
    /// count and the last error. Returns `None` for an empty list.
    pub fn combine(mut failures: Vec<ProviderError>) -> Option<Self> {
        let count = failures.len();
        let last = failures.pop()?;
        if count == 1 {
            Some(Self::Provider(last))
        } else {
            Some(Self::AllProvidersFailed { count, last })
        }
    }
}
