use std::time::Duration;

use anyhow::{bail, Context};
use cryptoview_market_feed::feed::{DEFAULT_FX_POLL_INTERVAL, DEFAULT_MARKET_POLL_INTERVAL};
use cryptoview_market_feed::provider::{
    DEFAULT_MARKET_PROVIDERS, DEFAULT_REQUEST_TIMEOUT, KNOWN_MARKET_PROVIDERS,
};
use cryptoview_market_feed::{FeedConfig, FiatCurrency};

pub struct Config {
    /// Market provider ids in priority order.
    pub providers: Vec<String>,
    pub fiat: FiatCurrency,
    pub market_poll_interval: Duration,
    pub fx_poll_interval: Duration,
    /// Per-request HTTP timeout of the adapters.
    pub http_timeout: Duration,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let providers: Vec<String> = get("CRYPTOVIEW_PROVIDERS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        let providers = if providers.is_empty() {
            DEFAULT_MARKET_PROVIDERS.iter().map(|s| s.to_string()).collect()
        } else {
            providers
        };
        if let Some(unknown) = providers
            .iter()
            .find(|id| !KNOWN_MARKET_PROVIDERS.contains(&id.as_str()))
        {
            bail!(
                "Invalid CRYPTOVIEW_PROVIDERS: unknown provider '{}' (known: {})",
                unknown,
                KNOWN_MARKET_PROVIDERS.join(", ")
            );
        }

        let fiat = match get("CRYPTOVIEW_FIAT") {
            Some(raw) if !raw.trim().is_empty() => raw
                .parse::<FiatCurrency>()
                .context("Invalid CRYPTOVIEW_FIAT")?,
            _ => FiatCurrency::BASE,
        };

        let millis = |key: &str, default: Duration| -> Duration {
            get(key)
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Ok(Self {
            providers,
            fiat,
            market_poll_interval: millis("CRYPTOVIEW_MARKET_POLL_MS", DEFAULT_MARKET_POLL_INTERVAL),
            fx_poll_interval: millis("CRYPTOVIEW_FX_POLL_MS", DEFAULT_FX_POLL_INTERVAL),
            http_timeout: millis("CRYPTOVIEW_HTTP_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT),
            log_format: get("CRYPTOVIEW_LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
        })
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            market_poll_interval: self.market_poll_interval,
            fx_poll_interval: self.fx_poll_interval,
            initial_currency: self.fiat,
            ..FeedConfig::default()
        }
    }
}
