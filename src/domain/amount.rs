//! Fixed-point token amounts.
//!
//! An amount is a raw `U256` integer plus the token's decimals, exactly as
//! the token contract stores it. Parsing and formatting always take the
//! decimals read from the contract; there is no default precision.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::error::LendingError;

/// Largest decimals value whose scale (10^d) still fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

/// Reasons a user-supplied amount string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a plain decimal number")]
    Malformed(String),
    #[error("{found} fractional digits exceed token precision of {decimals}")]
    TooPrecise { decimals: u8, found: usize },
    #[error("amount does not fit in 256 bits")]
    Overflow,
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("token decimals {0} not supported")]
    UnsupportedDecimals(u8),
}

impl From<AmountError> for LendingError {
    fn from(err: AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

/// A token amount in the token's smallest unit, tagged with its decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    raw: U256,
    decimals: u8,
}

impl TokenAmount {
    /// Wrap a raw on-chain value.
    pub const fn from_raw(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub const fn zero(decimals: u8) -> Self {
        Self {
            raw: U256::ZERO,
            decimals,
        }
    }

    /// Parse a human-entered decimal string such as `"5000"` or `"0.25"`.
    ///
    /// Accepts digits with at most one `.`; rejects signs, exponents,
    /// separators, and more significant fractional digits than `decimals`.
    pub fn parse(input: &str, decimals: u8) -> Result<Self, AmountError> {
        if decimals > MAX_DECIMALS {
            return Err(AmountError::UnsupportedDecimals(decimals));
        }

        let text = input.trim();
        if text.is_empty() {
            return Err(AmountError::Empty);
        }

        let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
        let well_formed = !(int_part.is_empty() && frac_part.is_empty())
            && int_part.bytes().all(|b| b.is_ascii_digit())
            && frac_part.bytes().all(|b| b.is_ascii_digit());
        if !well_formed {
            return Err(AmountError::Malformed(text.to_string()));
        }

        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.len() > usize::from(decimals) {
            return Err(AmountError::TooPrecise {
                decimals,
                found: frac_part.len(),
            });
        }

        let whole = parse_digits(int_part)?;
        let padded = format!("{frac_part:0<width$}", width = usize::from(decimals));
        let fraction = parse_digits(&padded)?;

        let raw = whole
            .checked_mul(scale(decimals))
            .and_then(|v| v.checked_add(fraction))
            .ok_or(AmountError::Overflow)?;

        Ok(Self { raw, decimals })
    }

    /// Parse and require a strictly positive value.
    pub fn parse_positive(input: &str, decimals: u8) -> Result<Self, AmountError> {
        let amount = Self::parse(input, decimals)?;
        if amount.is_zero() {
            return Err(AmountError::NotPositive);
        }
        Ok(amount)
    }

    pub const fn raw(&self) -> U256 {
        self.raw
    }

    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Fixed number of fractional places, truncated (never rounded up).
    pub fn format_fixed(&self, places: usize) -> String {
        let (whole, fraction) = self.split();
        if places == 0 {
            return whole.to_string();
        }
        let mut digits: String = fraction.chars().take(places).collect();
        while digits.len() < places {
            digits.push('0');
        }
        format!("{whole}.{digits}")
    }

    /// Lossy conversion for display arithmetic. `None` past `Decimal` range.
    pub fn to_decimal(&self) -> Option<Decimal> {
        Decimal::from_str(&self.to_string()).ok()
    }

    /// Integer part and zero-padded fractional digits.
    fn split(&self) -> (U256, String) {
        if self.decimals == 0 {
            return (self.raw, String::new());
        }
        let unit = scale(self.decimals);
        let whole = self.raw / unit;
        let fraction = self.raw % unit;
        let digits = format!(
            "{:0>width$}",
            fraction.to_string(),
            width = usize::from(self.decimals)
        );
        (whole, digits)
    }
}

impl fmt::Display for TokenAmount {
    /// Shortest exact representation; trailing fractional zeros are dropped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (whole, fraction) = self.split();
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            write!(f, "{whole}")
        } else {
            write!(f, "{whole}.{fraction}")
        }
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn scale(decimals: u8) -> U256 {
    U256::from(10u8).pow(U256::from(decimals))
}

fn parse_digits(digits: &str) -> Result<U256, AmountError> {
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fraction() {
        let amount = TokenAmount::parse("5000", 18).unwrap();
        assert_eq!(amount.raw(), U256::from(5000u64) * U256::from(10u64).pow(U256::from(18u64)));

        let amount = TokenAmount::parse("0.25", 6).unwrap();
        assert_eq!(amount.raw(), U256::from(250_000u64));

        let amount = TokenAmount::parse(".5", 1).unwrap();
        assert_eq!(amount.raw(), U256::from(5u64));
    }

    #[test]
    fn test_same_text_differs_by_decimals() {
        let six = TokenAmount::parse("1", 6).unwrap();
        let eighteen = TokenAmount::parse("1", 18).unwrap();
        assert_ne!(six.raw(), eighteen.raw());
        assert_eq!(six.to_string(), eighteen.to_string());
    }

    #[test]
    fn test_rejects_malformed_input() {
        for input in ["", "  ", "-1", "+1", "1e6", "1,000", "1.2.3", ".", "abc", "0x10"] {
            assert!(TokenAmount::parse(input, 18).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_rejects_excess_precision() {
        assert_eq!(
            TokenAmount::parse("1.0000001", 6),
            Err(AmountError::TooPrecise { decimals: 6, found: 7 })
        );
        // Trailing zeros are not significant.
        assert!(TokenAmount::parse("1.5000000", 6).is_ok());
    }

    #[test]
    fn test_rejects_overflow() {
        let huge = "9".repeat(80);
        assert_eq!(TokenAmount::parse(&huge, 0), Err(AmountError::Overflow));
        assert_eq!(TokenAmount::parse("1", 78), Err(AmountError::UnsupportedDecimals(78)));
    }

    #[test]
    fn test_parse_positive_rejects_zero() {
        assert_eq!(TokenAmount::parse_positive("0.000", 6), Err(AmountError::NotPositive));
        assert!(TokenAmount::parse_positive("0.000001", 6).is_ok());
    }

    #[test]
    fn test_display_trims_zeros() {
        assert_eq!(TokenAmount::from_raw(U256::from(1_500_000u64), 6).to_string(), "1.5");
        assert_eq!(TokenAmount::from_raw(U256::from(7u64), 6).to_string(), "0.000007");
        assert_eq!(TokenAmount::from_raw(U256::from(42u64), 0).to_string(), "42");
        assert_eq!(TokenAmount::zero(18).to_string(), "0");
    }

    #[test]
    fn test_format_fixed_truncates() {
        let amount = TokenAmount::from_raw(U256::from(12_349_999u64), 6);
        assert_eq!(amount.format_fixed(2), "12.34");
        assert_eq!(amount.format_fixed(0), "12");
        assert_eq!(TokenAmount::from_raw(U256::from(5u64), 0).format_fixed(2), "5.00");
    }

    #[test]
    fn test_to_decimal() {
        let amount = TokenAmount::parse("5000.25", 18).unwrap();
        assert_eq!(amount.to_decimal(), Some(Decimal::from_str("5000.25").unwrap()));
    }

    #[test]
    fn test_invalid_amount_maps_to_lending_error() {
        let err: LendingError = AmountError::NotPositive.into();
        assert_eq!(err, LendingError::InvalidAmount("amount must be greater than zero".into()));
    }
}
