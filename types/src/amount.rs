//! Monetary amounts as fixed-point integers.
//!
//! An [`Amount`] counts millionths of a coin in a signed 64-bit integer, so
//! arithmetic and text conversion never go through floating point. Text is
//! always produced with exactly six fractional digits; on input a decimal
//! numeral with an optional exponent is accepted as long as it carries no
//! significant digit beyond the sixth fractional place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AmountError;

/// Number of fractional decimal digits in an amount.
pub const DECIMALS: u32 = 6;

/// Scaled units in one coin.
pub const COIN: i64 = 1_000_000;

/// Largest amount that may appear in a transaction output or fee setting.
pub const MAX_MONEY: i64 = 2_000_000_000 * COIN;

/// Largest magnitude a parsed mantissa may reach.
const UPPER_BOUND: i128 = i64::MAX as i128;

/// A monetary value in millionths of a coin.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Self = Self(0);
    pub const MAX_MONEY: Self = Self(MAX_MONEY);

    pub const fn from_units(units: i64) -> Self {
        Self(units)
    }

    pub const fn units(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Whether the amount lies in `0..=MAX_MONEY`.
    pub fn is_money_range(&self) -> bool {
        (0..=MAX_MONEY).contains(&self.0)
    }

    /// Return the amount if it lies in the money range.
    pub fn checked_money(self) -> Result<Self, AmountError> {
        if self.is_money_range() {
            Ok(self)
        } else {
            Err(AmountError::OutOfRange(self.0))
        }
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Parse decimal text into an amount. See [`parse_fixed_point`].
    pub fn parse(text: &str) -> Result<Self, AmountError> {
        parse_fixed_point(text, DECIMALS).map(Self)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let coin = COIN as u64;
        write!(f, "{sign}{}.{:06}", magnitude / coin, magnitude % coin)
    }
}

/// Parse a decimal numeral into an integer scaled by `10^decimals`.
///
/// Grammar: `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`.
/// The value is normalised exactly (mantissa, trailing zeros and exponent are
/// tracked separately), so `0.000001000000` and `0.1e-5` both scale to `1`
/// while `0.000001009` is rejected. Results must fit in `±i64::MAX`.
pub fn parse_fixed_point(text: &str, decimals: u32) -> Result<i64, AmountError> {
    let invalid = || AmountError::Invalid(text.to_string());
    let bytes = text.as_bytes();
    let mut pos = 0;

    let mut mantissa: i128 = 0;
    let mut pending_zeros: i64 = 0;
    let mut point_offset: i64 = 0;

    let negative = bytes.first() == Some(&b'-');
    if negative {
        pos += 1;
    }

    match bytes.get(pos) {
        // A single leading zero; "00" fails on the trailing-garbage check.
        Some(b'0') => pos += 1,
        Some(b'1'..=b'9') => {
            while let Some(&digit @ b'0'..=b'9') = bytes.get(pos) {
                push_digit(&mut mantissa, &mut pending_zeros, digit).ok_or_else(invalid)?;
                pos += 1;
            }
        }
        _ => return Err(invalid()),
    }

    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        if !matches!(bytes.get(pos), Some(b'0'..=b'9')) {
            return Err(invalid());
        }
        while let Some(&digit @ b'0'..=b'9') = bytes.get(pos) {
            push_digit(&mut mantissa, &mut pending_zeros, digit).ok_or_else(invalid)?;
            pos += 1;
            point_offset += 1;
        }
    }

    let mut exponent: i64 = 0;
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        let exponent_negative = match bytes.get(pos) {
            Some(b'+') => {
                pos += 1;
                false
            }
            Some(b'-') => {
                pos += 1;
                true
            }
            _ => false,
        };
        if !matches!(bytes.get(pos), Some(b'0'..=b'9')) {
            return Err(invalid());
        }
        while let Some(&digit @ b'0'..=b'9') = bytes.get(pos) {
            exponent = exponent
                .checked_mul(10)
                .and_then(|e| e.checked_add(i64::from(digit - b'0')))
                .ok_or_else(invalid)?;
            pos += 1;
        }
        if exponent_negative {
            exponent = -exponent;
        }
    }

    if pos != bytes.len() {
        return Err(invalid());
    }

    if mantissa == 0 {
        return Ok(0);
    }

    let scale = exponent
        .checked_sub(point_offset)
        .and_then(|e| e.checked_add(pending_zeros))
        .and_then(|e| e.checked_add(i64::from(decimals)))
        .ok_or_else(invalid)?;
    // Negative scale: a significant digit sits below 10^-decimals.
    // Above 18 even a mantissa of 1 exceeds the 64-bit range.
    if !(0..=18).contains(&scale) {
        return Err(invalid());
    }

    let scaled = mantissa * 10i128.pow(scale as u32);
    if scaled > UPPER_BOUND {
        return Err(invalid());
    }

    let value = scaled as i64;
    Ok(if negative { -value } else { value })
}

/// Append one digit to the mantissa. Zeros are held back until a non-zero
/// digit follows so that trailing zeros never count against the range.
fn push_digit(mantissa: &mut i128, pending_zeros: &mut i64, digit: u8) -> Option<()> {
    if digit == b'0' {
        *pending_zeros += 1;
        return Some(());
    }
    if *mantissa == 0 {
        // Leading zeros are not significant.
        *pending_zeros = 0;
    }
    for _ in 0..*pending_zeros {
        *mantissa *= 10;
        if *mantissa > UPPER_BOUND {
            return None;
        }
    }
    *pending_zeros = 0;
    *mantissa = *mantissa * 10 + i128::from(digit - b'0');
    (*mantissa <= UPPER_BOUND).then_some(())
}
