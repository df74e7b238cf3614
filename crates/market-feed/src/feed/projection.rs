//! Conversion of cached USD quotes into display rows.

use chrono::{DateTime, Local, Utc};
use log::warn;
use rust_decimal::Decimal;

use crate::models::{Coin, CoinId, FiatCurrency, FxSnapshot, MarketSnapshot, NO_TIME_PLACEHOLDER};

/// Project the cached snapshots into display coins for `currency`.
///
/// Returns `None` when there is nothing to show: no market snapshot yet, no
/// FX rate for a non-base currency, or no tracked coin in the snapshot.
/// Rows follow [`CoinId::ALL`] order. A coin whose converted price does not
/// fit in a `Decimal` is left out.
pub fn project(
    market: Option<&MarketSnapshot>,
    fx: &FxSnapshot,
    currency: FiatCurrency,
) -> Option<Vec<Coin>> {
    let market = market?;
    let rate = match fx.rate(currency) {
        Some(rate) => rate,
        None if currency.is_base() => Decimal::ONE,
        None => return None,
    };

    let coins: Vec<Coin> = CoinId::ALL
        .iter()
        .filter_map(|id| market.get(*id))
        .filter_map(|quote| {
            let Some(price) = quote.price_usd.checked_mul(rate) else {
                warn!(
                    "Dropping {}: {} USD at rate {} overflows",
                    quote.id, quote.price_usd, rate
                );
                return None;
            };
            Some(Coin {
                id: quote.id,
                name: or_default(&quote.name, quote.id.default_name()),
                ticker: or_default(&quote.ticker, quote.id.default_ticker()),
                price,
                currency,
                change_24h: quote.change_24h.unwrap_or(0.0),
                last_update_time: format_update_time(quote.last_update),
            })
        })
        .collect();

    if coins.is_empty() {
        None
    } else {
        Some(coins)
    }
}

fn or_default(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Local `HH:MM:SS`, or the placeholder when unknown.
pub fn format_update_time(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => NO_TIME_PLACEHOLDER.to_string(),
    }
}
