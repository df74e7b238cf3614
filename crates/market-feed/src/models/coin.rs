use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical identity of a tracked coin.
///
/// Providers name coins in their own schemes (`btc-bitcoin`, `BTCUSDT`,
/// `toncoin`, ...). Adapters map those onto this fixed set and drop
/// everything else.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CoinId {
    Bitcoin,
    Ethereum,
    TheOpenNetwork,
    Solana,
    Dogecoin,
    Ripple,
    Litecoin,
}

impl CoinId {
    /// Every tracked coin, in display order.
    pub const ALL: [CoinId; 7] = [
        CoinId::Bitcoin,
        CoinId::Ethereum,
        CoinId::TheOpenNetwork,
        CoinId::Solana,
        CoinId::Dogecoin,
        CoinId::Ripple,
        CoinId::Litecoin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Ethereum => "ethereum",
            Self::TheOpenNetwork => "the-open-network",
            Self::Solana => "solana",
            Self::Dogecoin => "dogecoin",
            Self::Ripple => "ripple",
            Self::Litecoin => "litecoin",
        }
    }

    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Bitcoin => "Bitcoin",
            Self::Ethereum => "Ethereum",
            Self::TheOpenNetwork => "TON Coin",
            Self::Solana => "Solana",
            Self::Dogecoin => "Dogecoin",
            Self::Ripple => "Ripple",
            Self::Litecoin => "Litecoin",
        }
    }

    pub fn default_ticker(&self) -> &'static str {
        match self {
            Self::Bitcoin => "BTC",
            Self::Ethereum => "ETH",
            Self::TheOpenNetwork => "TON",
            Self::Solana => "SOL",
            Self::Dogecoin => "DOGE",
            Self::Ripple => "XRP",
            Self::Litecoin => "LTC",
        }
    }

    /// Map a provider-specific coin id (e.g. "btc-bitcoin", "toncoin").
    pub fn from_provider_id(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bitcoin" | "btc-bitcoin" => Some(Self::Bitcoin),
            "ethereum" | "eth-ethereum" => Some(Self::Ethereum),
            "the-open-network" | "toncoin" | "ton-toncoin" | "toncoin-toncoin" => {
                Some(Self::TheOpenNetwork)
            }
            "solana" | "sol-solana" => Some(Self::Solana),
            "dogecoin" | "doge-dogecoin" => Some(Self::Dogecoin),
            "ripple" | "xrp" | "xrp-xrp" => Some(Self::Ripple),
            "litecoin" | "ltc-litecoin" => Some(Self::Litecoin),
            _ => None,
        }
    }

    /// Map a ticker symbol (e.g. "btc", "DOGE").
    pub fn from_ticker(raw: &str) -> Option<Self> {
        let symbol = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|id| id.default_ticker() == symbol)
    }

    /// Resolve a provider entry to a canonical id.
    ///
    /// The provider's own id wins; the ticker is only consulted when the id is
    /// empty or unknown.
    pub fn resolve(provider_id: &str, ticker: &str) -> Option<Self> {
        Self::from_provider_id(provider_id).or_else(|| Self::from_ticker(ticker))
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoinId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown coin id: {}", s))
    }
}

impl From<CoinId> for String {
    fn from(id: CoinId) -> Self {
        id.as_str().to_string()
    }
}

impl TryFrom<String> for CoinId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_ids_map_to_canonical() {
        assert_eq!(CoinId::from_provider_id("btc-bitcoin"), Some(CoinId::Bitcoin));
        assert_eq!(
            CoinId::from_provider_id(" TONCOIN "),
            Some(CoinId::TheOpenNetwork)
        );
        assert_eq!(CoinId::from_provider_id("xrp-xrp"), Some(CoinId::Ripple));
        assert_eq!(CoinId::from_provider_id("cardano"), None);
    }

    #[test]
    fn test_ticker_fallback() {
        assert_eq!(CoinId::resolve("", "doge"), Some(CoinId::Dogecoin));
        assert_eq!(CoinId::resolve("unknown-id", "LTC"), Some(CoinId::Litecoin));
        assert_eq!(CoinId::resolve("", "ADA"), None);
    }

    #[test]
    fn test_provider_id_wins_over_ticker() {
        assert_eq!(CoinId::resolve("bitcoin", "ETH"), Some(CoinId::Bitcoin));
    }

    #[test]
    fn test_defaults_table() {
        assert_eq!(CoinId::TheOpenNetwork.default_name(), "TON Coin");
        assert_eq!(CoinId::Ripple.default_ticker(), "XRP");
        assert_eq!(CoinId::ALL[0], CoinId::Bitcoin);
        assert_eq!(CoinId::ALL[6], CoinId::Litecoin);
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let json = serde_json::to_string(&CoinId::TheOpenNetwork).unwrap();
        assert_eq!(json, "\"the-open-network\"");
        let back: CoinId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CoinId::TheOpenNetwork);
    }
}
