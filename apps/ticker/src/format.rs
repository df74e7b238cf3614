use cryptoview_market_feed::{Coin, FiatCurrency};
use rust_decimal::{Decimal, RoundingStrategy};

/// `$96,543.12`: two decimals, comma-grouped thousands, symbol first.
pub fn format_price(value: Decimal, currency: FiatCurrency) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let raw = format!("{:.2}", rounded);
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", int_part),
    };
    format!(
        "{}{}{}.{}",
        sign,
        currency.symbol(),
        group_thousands(digits, ','),
        frac_part
    )
}

fn group_thousands(digits: &str, sep: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

pub fn format_change(change: f64) -> String {
    format!("{:+.2}%", change)
}

/// One table line per coin, priced in the currency it was projected in.
pub fn format_coin(coin: &Coin) -> String {
    format!(
        "{:<5} {:<10} {:>16} {:>8}  {}",
        coin.ticker,
        coin.name,
        format_price(coin.price, coin.currency),
        format_change(coin.change_24h),
        coin.last_update_time
    )
}
