//! CryptoView Market Feed
//!
//! Live USD quotes for a fixed set of cryptocurrencies, aggregated from
//! public price APIs and converted into a display currency.
//!
//! # Overview
//!
//! - Provider adapters normalise each API into a [`MarketSnapshot`] of USD
//!   quotes, or an [`FxSnapshot`] of USD-based exchange rates.
//! - The [`Feed`] polls an ordered fallback chain of market providers,
//!   benching failing ones with per-kind backoff, and keeps the last good
//!   snapshot cached.
//! - Every update is projected into display [`Coin`]s in the selected
//!   [`FiatCurrency`] and delivered to a [`FeedListener`] together with a
//!   [`StatusEvent`].
//!
//! # Architecture
//!
//! ```text
//! +-------------------+      +-------------------+
//! |  MarketProvider   | ...  |    FxProvider     |   (HTTP adapters)
//! +-------------------+      +-------------------+
//!           |                          |
//!           v                          v
//! +---------------------------------------------+
//! |  Feed: fallback chain + ProviderHealth      |   (background worker)
//! |        cached MarketSnapshot / FxSnapshot   |
//! +---------------------------------------------+
//!           |
//!           v  project(market, fx, currency)
//! +-------------------+
//! |  FeedListener     |   (FeedEventBus, UI, ...)
//! +-------------------+
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cryptoview_market_feed::{provider, Feed, FeedConfig, FeedEventBus};
//!
//! let config = FeedConfig::default();
//! let bus = FeedEventBus::default();
//! let mut events = bus.subscribe();
//! let feed = Feed::new(
//!     provider::default_market_providers(config.fetch_timeout),
//!     provider::default_fx_provider(config.fetch_timeout),
//!     Arc::new(bus),
//!     config,
//! )?;
//! feed.start()?;
//! ```

pub mod errors;
pub mod feed;
pub mod models;
pub mod provider;

pub use errors::{FailureKind, FeedError, ProviderError};

pub use models::{
    Coin, CoinId, CoinQuote, FiatCurrency, FxSnapshot, MarketSnapshot, NO_TIME_PLACEHOLDER,
};

pub use feed::{
    CycleReport, Feed, FeedConfig, FeedEvent, FeedEventBus, FeedListener, NoopListener,
    ProviderHealthSnapshot, StatusCode, StatusEvent, StatusKind,
};

pub use provider::{FxProvider, MarketProvider};
