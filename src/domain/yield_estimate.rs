//! Display-side yield projection.
//!
//! Mirrors the dashboard's APY card and quick calculator. Nothing in the
//! transaction flow depends on these figures.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::amount::TokenAmount;

/// Simple (non-compounding) return over one year at `apy_percent`.
///
/// Returns `None` when the amount does not fit a `Decimal` or the product
/// overflows.
pub fn estimate_yearly_return(amount: &TokenAmount, apy_percent: Decimal) -> Option<Decimal> {
    let principal = amount.to_decimal()?;
    let rate = apy_percent.checked_div(dec!(100))?;
    principal.checked_mul(rate).map(|v| v.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yearly_return_at_19_percent() {
        let amount = TokenAmount::parse("5000", 18).unwrap();
        assert_eq!(estimate_yearly_return(&amount, dec!(19)), Some(dec!(950.00)));
    }

    #[test]
    fn test_zero_principal() {
        let amount = TokenAmount::zero(6);
        assert_eq!(estimate_yearly_return(&amount, dec!(19)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_rounds_to_cents() {
        let amount = TokenAmount::parse("0.333333", 6).unwrap();
        assert_eq!(estimate_yearly_return(&amount, dec!(5)), Some(dec!(0.02)));
    }
}
