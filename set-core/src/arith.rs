//! BigInt arithmetic adapter.
//!
//! Values are `num_bigint::BigInt`: signed, unbounded, exact comparison.
//! `+ - *` come straight from the operator impls. Division and remainder
//! truncate toward zero, so the remainder carries the sign of the dividend
//! (`-7 / 2 == -3`, `-7 % 2 == -1`).

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Errors raised while reading integers from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid decimal integer '{input}'")]
    InvalidDecimal { input: String },
}

/// Parse a base-10 integer with an optional leading sign.
///
/// Surrounding whitespace is ignored. Digit separators are rejected so that a
/// value always round-trips through [`to_decimal_string`].
pub fn parse_decimal(input: &str) -> Result<BigInt, ParseError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidDecimal {
            input: input.to_string(),
        });
    }

    BigInt::parse_bytes(trimmed.as_bytes(), 10).ok_or_else(|| ParseError::InvalidDecimal {
        input: input.to_string(),
    })
}

/// Exact decimal rendering used for export cells.
pub fn to_decimal_string(n: &BigInt) -> String {
    n.to_str_radix(10)
}

/// Build a sequence from machine integer literals.
pub fn from_literals(values: &[u64]) -> Vec<BigInt> {
    values.iter().map(|&v| BigInt::from(v)).collect()
}

/// Truncating quotient and remainder of `x / y`, or `None` when `y` is zero.
///
/// A zero divisor is a defined skip for the caller, never a panic.
pub fn checked_div_rem(x: &BigInt, y: &BigInt) -> Option<(BigInt, BigInt)> {
    if y.is_zero() {
        return None;
    }
    Some(x.div_rem(y))
}

/// The Mersenne number 2^p - 1.
pub fn mersenne(p: u32) -> BigInt {
    (BigInt::one() << p) - 1u32
}
