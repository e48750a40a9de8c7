//! Polish price text parsing.
//!
//! Listing pages render amounts like `1 234,56` or `1.234,56`, with spaces
//! (often `&nbsp;`) or dots grouping thousands and a comma before the grosz.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a localized price string into a [`Decimal`].
///
/// Every space and dot is dropped as a thousands separator and the comma
/// becomes the decimal point. Malformed multi-dot input therefore parses
/// to a number instead of failing.
pub fn parse_price_pln(text: &str) -> Result<Decimal, rust_decimal::Error> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '.'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    Decimal::from_str(&cleaned)
}

/// Two-decimal rendering, half away from zero (`229.995` is `230.00`)
pub fn format_pln(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
