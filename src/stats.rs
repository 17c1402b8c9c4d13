//! Reductions over accumulated attribute values, and currency formatting.
//!
//! Values arrive as the raw strings stored in a [`crate::aggregation::Datum`].
//! Numeric reductions parse them as exact decimals so money and minute
//! totals never pick up binary floating-point drift before rounding.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ReportError, ReportResult};

/// Parse one raw value as a decimal number.
///
/// Surrounding whitespace is ignored; anything else that is not a plain or
/// scientific-notation decimal is a [`ReportError::Format`].
pub fn parse_decimal(raw: &str) -> ReportResult<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ReportError::format(raw))
}

/// Arithmetic total of `values`. The first non-numeric value aborts the sum.
pub fn sum<S: AsRef<str>>(values: &[S]) -> ReportResult<Decimal> {
    values.iter().try_fold(Decimal::ZERO, |acc, raw| {
        let value = parse_decimal(raw.as_ref())?;
        acc.checked_add(value)
            .ok_or_else(|| ReportError::format(raw.as_ref()))
    })
}

/// Number of values. Values are never parsed, so identifiers can be tallied.
pub fn count<S>(values: &[S]) -> usize {
    values.len()
}

/// `total / count`, or zero when `count` is zero.
pub fn average_of(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    }
}

/// Mean of `values`; zero for an empty sequence.
pub fn average<S: AsRef<str>>(values: &[S]) -> ReportResult<Decimal> {
    Ok(average_of(sum(values)?, values.len()))
}

/// Render `value` rounded half-up to exactly two fractional digits, with no
/// grouping separators or currency symbol (`2.005` → `"2.01"`, `0` → `"0.00"`).
pub fn currency_format(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    if rounded.is_zero() {
        // Avoid "-0.00" when a small negative rounds to zero.
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
