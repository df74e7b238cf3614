use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fiat::FiatCurrency;

/// Exchange rates relative to USD (1 USD = `rate` units of the currency).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FxSnapshot {
    pub base: FiatCurrency,
    /// `None` for the built-in USD-only snapshot that was never fetched.
    pub fetched_at: Option<DateTime<Utc>>,
    pub rates: HashMap<FiatCurrency, Decimal>,
}

impl FxSnapshot {
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        let mut snapshot = Self {
            base: FiatCurrency::BASE,
            fetched_at: Some(fetched_at),
            rates: HashMap::new(),
        };
        snapshot.pin_base();
        snapshot
    }

    /// Snapshot used before any FX fetch succeeded: only USD = 1.
    pub fn usd_only() -> Self {
        Self {
            base: FiatCurrency::BASE,
            fetched_at: None,
            rates: HashMap::from([(FiatCurrency::BASE, Decimal::ONE)]),
        }
    }

    /// Make sure the base currency is present at 1.
    pub fn pin_base(&mut self) {
        self.rates.entry(FiatCurrency::BASE).or_insert(Decimal::ONE);
    }

    /// Positive rate for `currency`, if known.
    pub fn rate(&self, currency: FiatCurrency) -> Option<Decimal> {
        self.rates
            .get(&currency)
            .copied()
            .filter(|rate| rate.is_sign_positive() && !rate.is_zero())
    }

    /// Whether any non-base rate is known.
    pub fn has_foreign_rates(&self) -> bool {
        self.rates
            .keys()
            .any(|currency| !currency.is_base())
    }
}

impl Default for FxSnapshot {
    fn default() -> Self {
        Self::usd_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_usd_only_has_base_rate() {
        let fx = FxSnapshot::usd_only();
        assert_eq!(fx.rate(FiatCurrency::Usd), Some(Decimal::ONE));
        assert_eq!(fx.rate(FiatCurrency::Eur), None);
        assert!(fx.fetched_at.is_none());
        assert!(!fx.has_foreign_rates());
    }

    #[test]
    fn test_pin_base_does_not_override() {
        let mut fx = FxSnapshot::new(Utc::now());
        fx.rates.insert(FiatCurrency::Rub, dec!(90));
        fx.pin_base();
        assert_eq!(fx.rate(FiatCurrency::Usd), Some(Decimal::ONE));
        assert_eq!(fx.rate(FiatCurrency::Rub), Some(dec!(90)));
        assert!(fx.has_foreign_rates());
    }

    #[test]
    fn test_non_positive_rate_is_unknown() {
        let mut fx = FxSnapshot::new(Utc::now());
        fx.rates.insert(FiatCurrency::Eur, Decimal::ZERO);
        assert_eq!(fx.rate(FiatCurrency::Eur), None);
    }
}
