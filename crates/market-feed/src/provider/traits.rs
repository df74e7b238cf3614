//! Provider trait definitions.
//!
//! Market-data sources and FX sources are separate capabilities: a concrete
//! adapter implements exactly one of them, so each can be substituted or
//! mocked on its own.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::{FxSnapshot, MarketSnapshot};

/// A source of USD quotes for the tracked coins.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use cryptoview_market_feed::provider::MarketProvider;
///
/// struct StaticProvider;
///
/// #[async_trait]
/// impl MarketProvider for StaticProvider {
///     fn id(&self) -> &str {
///         "static"
///     }
///
///     async fn fetch_usd(&self) -> Result<MarketSnapshot, ProviderError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait MarketProvider: Send + Sync {
    /// Stable identifier, used for logging and per-provider health tracking.
    fn id(&self) -> &str;

    /// Fetch one snapshot of USD quotes.
    ///
    /// The caller bounds this with its own deadline. Coins that cannot be
    /// mapped or parsed are dropped; an empty result is an error.
    async fn fetch_usd(&self) -> Result<MarketSnapshot, ProviderError>;
}

/// A source of USD-based exchange rates.
#[async_trait]
pub trait FxProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Fetch one snapshot of rates. The USD entry is always present.
    async fn fetch_rates(&self) -> Result<FxSnapshot, ProviderError>;
}
