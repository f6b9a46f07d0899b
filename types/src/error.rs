//! Error types for the fundamental types.

use thiserror::Error;

/// Failure to parse or range-check a monetary amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The text is not a decimal numeral, carries significant digits beyond
    /// the sixth fractional place, or does not fit in a signed 64-bit value.
    #[error("invalid amount: {0:?}")]
    Invalid(String),

    /// The value is representable but lies outside `0..=MAX_MONEY`.
    #[error("amount out of range: {0}")]
    OutOfRange(i64),
}
