use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::coin::CoinId;

/// USD quote for one coin, as normalised from a provider payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinQuote {
    pub id: CoinId,

    /// Provider-reported name; empty when the provider has none.
    pub name: String,

    /// Provider-reported ticker; empty when the provider has none.
    pub ticker: String,

    pub price_usd: Decimal,

    /// 24h change in percent. `None` when the provider did not report it,
    /// which is different from a genuine `Some(0.0)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

impl CoinQuote {
    pub fn new(id: CoinId, price_usd: Decimal) -> Self {
        Self {
            id,
            name: String::new(),
            ticker: String::new(),
            price_usd,
            change_24h: None,
            last_update: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = ticker.into();
        self
    }

    pub fn with_change(mut self, change_24h: Option<f64>) -> Self {
        self.change_24h = change_24h;
        self
    }

    pub fn with_last_update(mut self, last_update: DateTime<Utc>) -> Self {
        self.last_update = Some(last_update);
        self
    }
}

/// One provider's batch of quotes at one point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub provider: String,
    pub fetched_at: DateTime<Utc>,
    pub coins: HashMap<CoinId, CoinQuote>,
}

impl MarketSnapshot {
    pub fn new(provider: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            provider: provider.into(),
            fetched_at,
            coins: HashMap::new(),
        }
    }

    /// Insert a quote, replacing any earlier quote for the same coin.
    pub fn insert(&mut self, quote: CoinQuote) {
        self.coins.insert(quote.id, quote);
    }

    pub fn get(&self, id: CoinId) -> Option<&CoinQuote> {
        self.coins.get(&id)
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Fill in 24h changes this snapshot lacks from `previous`.
    ///
    /// Only absent values are patched; a value reported by this snapshot
    /// always wins. Returns the number of coins patched.
    pub fn backfill_changes(&mut self, previous: &MarketSnapshot) -> usize {
        let mut patched = 0;
        for (id, quote) in self.coins.iter_mut() {
            if quote.change_24h.is_some() {
                continue;
            }
            if let Some(change) = previous.coins.get(id).and_then(|prev| prev.change_24h) {
                quote.change_24h = Some(change);
                patched += 1;
            }
        }
        patched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(provider: &str, quotes: Vec<CoinQuote>) -> MarketSnapshot {
        let mut snap = MarketSnapshot::new(provider, Utc::now());
        for quote in quotes {
            snap.insert(quote);
        }
        snap
    }

    #[test]
    fn test_backfill_keeps_previous_change_when_missing() {
        let previous = snapshot(
            "coingecko",
            vec![CoinQuote::new(CoinId::Bitcoin, dec!(100)).with_change(Some(2.5))],
        );
        let mut next = snapshot(
            "coinlore",
            vec![CoinQuote::new(CoinId::Bitcoin, dec!(101)).with_change(None)],
        );

        assert_eq!(next.backfill_changes(&previous), 1);
        assert_eq!(next.get(CoinId::Bitcoin).unwrap().change_24h, Some(2.5));
        assert_eq!(next.get(CoinId::Bitcoin).unwrap().price_usd, dec!(101));
    }

    #[test]
    fn test_backfill_never_overwrites_reported_change() {
        let previous = snapshot(
            "coingecko",
            vec![CoinQuote::new(CoinId::Bitcoin, dec!(100)).with_change(Some(2.5))],
        );
        let mut next = snapshot(
            "coingecko",
            vec![CoinQuote::new(CoinId::Bitcoin, dec!(101)).with_change(Some(0.0))],
        );

        assert_eq!(next.backfill_changes(&previous), 0);
        assert_eq!(next.get(CoinId::Bitcoin).unwrap().change_24h, Some(0.0));
    }

    #[test]
    fn test_backfill_ignores_coins_unknown_to_previous() {
        let previous = snapshot(
            "coingecko",
            vec![CoinQuote::new(CoinId::Bitcoin, dec!(100)).with_change(Some(2.5))],
        );
        let mut next = snapshot(
            "binance",
            vec![CoinQuote::new(CoinId::Solana, dec!(150))],
        );

        assert_eq!(next.backfill_changes(&previous), 0);
        assert_eq!(next.get(CoinId::Solana).unwrap().change_24h, None);
    }
}
