use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FeedError;

/// Display currency supported by the feed.
///
/// USD is the base: every provider quotes in USD and the other currencies are
/// derived through the FX snapshot.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiatCurrency {
    #[default]
    Usd,
    Eur,
    Rub,
}

impl FiatCurrency {
    pub const BASE: FiatCurrency = FiatCurrency::Usd;

    pub const ALL: [FiatCurrency; 3] = [FiatCurrency::Usd, FiatCurrency::Eur, FiatCurrency::Rub];

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Rub => "RUB",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "\u{20ac}",
            Self::Rub => "\u{20bd}",
        }
    }

    pub fn is_base(&self) -> bool {
        *self == Self::BASE
    }

    /// Case-insensitive, whitespace-tolerant lookup.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl fmt::Display for FiatCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FiatCurrency {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| FeedError::UnsupportedCurrency(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(FiatCurrency::parse("usd"), Some(FiatCurrency::Usd));
        assert_eq!(FiatCurrency::parse(" Eur "), Some(FiatCurrency::Eur));
        assert_eq!(FiatCurrency::parse("RUB"), Some(FiatCurrency::Rub));
        assert_eq!(FiatCurrency::parse("GBP"), None);
    }

    #[test]
    fn test_from_str_reports_unsupported() {
        let err = "JPY".parse::<FiatCurrency>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported fiat currency: JPY");
    }

    #[test]
    fn test_base_is_usd() {
        assert!(FiatCurrency::Usd.is_base());
        assert!(!FiatCurrency::Rub.is_base());
        assert_eq!(FiatCurrency::default(), FiatCurrency::Usd);
    }
}
