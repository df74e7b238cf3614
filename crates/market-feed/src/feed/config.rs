use std::time::Duration;

use crate::models::FiatCurrency;

pub const DEFAULT_MARKET_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_FX_POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Deadline for a single provider fetch, independent of the HTTP timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(12);

/// Feed timing and initial display currency.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedConfig {
    pub market_poll_interval: Duration,
    pub fx_poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub initial_currency: FiatCurrency,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            market_poll_interval: DEFAULT_MARKET_POLL_INTERVAL,
            fx_poll_interval: DEFAULT_FX_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            initial_currency: FiatCurrency::BASE,
        }
    }
}

impl FeedConfig {
    /// Replace zero durations with the defaults.
    pub(crate) fn normalized(mut self) -> Self {
        if self.market_poll_interval.is_zero() {
            self.market_poll_interval = DEFAULT_MARKET_POLL_INTERVAL;
        }
        if self.fx_poll_interval.is_zero() {
            self.fx_poll_interval = DEFAULT_FX_POLL_INTERVAL;
        }
        if self.fetch_timeout.is_zero() {
            self.fetch_timeout = DEFAULT_FETCH_TIMEOUT;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FeedConfig::default();
        assert_eq!(config.market_poll_interval, Duration::from_secs(2));
        assert_eq!(config.fx_poll_interval, Duration::from_secs(30));
        assert_eq!(config.fetch_timeout, Duration::from_secs(12));
        assert_eq!(config.initial_currency, FiatCurrency::Usd);
    }

    #[test]
    fn test_zero_durations_fall_back() {
        let config = FeedConfig {
            market_poll_interval: Duration::ZERO,
            fx_poll_interval: Duration::from_secs(5),
            fetch_timeout: Duration::ZERO,
            initial_currency: FiatCurrency::Eur,
        }
        .normalized();
        assert_eq!(config.market_poll_interval, DEFAULT_MARKET_POLL_INTERVAL);
        assert_eq!(config.fx_poll_interval, Duration::from_secs(5));
        assert_eq!(config.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
        assert_eq!(config.initial_currency, FiatCurrency::Eur);
    }
}
