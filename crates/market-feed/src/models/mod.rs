//! Core data types shared by providers, the feed and its consumers.

mod coin;
mod display;
mod fiat;
mod fx;
mod quote;

pub use coin::CoinId;
pub use display::{Coin, NO_TIME_PLACEHOLDER};
pub use fiat::FiatCurrency;
pub use fx::FxSnapshot;
pub use quote::{CoinQuote, MarketSnapshot};
