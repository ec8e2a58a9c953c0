//! Derived IPO pricing figures.
//!
//! These values are never stored; they are computed from the persisted price
//! columns whenever an IPO is serialized. Percentages are rounded to two
//! decimal places with banker's rounding (round-half-to-even), which is what
//! [`Decimal::round_dp`] does.

use rust_decimal::Decimal;

/// Currency symbol used when rendering price bands.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Number of decimal places kept on percentage figures.
const PERCENT_DP: u32 = 2;

/// Formats a price band as `"₹{min} - ₹{max}"`.
///
/// Values are rendered at their own scale, so `100` prints as `100` and a
/// stored `100.00` prints as `100.00`.
#[must_use]
pub fn price_band(min: Decimal, max: Decimal) -> String {
    format!("{CURRENCY_SYMBOL}{min} - {CURRENCY_SYMBOL}{max}")
}

/// Percentage gain from the issue price to the first-day listing price.
///
/// Returns `None` unless both prices are known and non-zero and the issue
/// price is strictly positive. A zero listing price counts as unknown.
#[must_use]
pub fn listing_gain(ipo_price: Option<Decimal>, listing_price: Option<Decimal>) -> Option<Decimal> {
    percent_change(ipo_price?, listing_price?)
}

/// Percentage return from the issue price to the current market price.
#[must_use]
pub fn current_return(
    ipo_price: Option<Decimal>,
    current_market_price: Option<Decimal>,
) -> Option<Decimal> {
    percent_change(ipo_price?, current_market_price?)
}

fn percent_change(base: Decimal, value: Decimal) -> Option<Decimal> {
    if base <= Decimal::ZERO || value.is_zero() {
        return None;
    }
    let change = (value - base).checked_div(base)?.checked_mul(Decimal::ONE_HUNDRED)?;
    Some(change.round_dp(PERCENT_DP))
}
