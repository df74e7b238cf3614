use rust_decimal::Decimal;
use serde::Serialize;

use super::coin::CoinId;
use super::fiat::FiatCurrency;

/// Placeholder shown when a quote carries no timestamp.
pub const NO_TIME_PLACEHOLDER: &str = "--:--:--";

/// A coin row as handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub id: CoinId,
    pub name: String,
    pub ticker: String,
    /// Price converted into `currency`.
    pub price: Decimal,
    /// Display currency this row was projected in.
    pub currency: FiatCurrency,
    /// 24h change in percent, 0.0 when unknown.
    pub change_24h: f64,
    /// Local wall-clock time of the last update (`HH:MM:SS`).
    pub last_update_time: String,
}
