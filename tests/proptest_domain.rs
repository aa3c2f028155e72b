//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to verify that amount parsing/formatting and lock
//! time formatting hold across random inputs.

use alloy::primitives::U256;
use proptest::prelude::*;
use rust_decimal::Decimal;

use tutum_lending_client::domain::{TokenAmount, estimate_yearly_return, format_time_remaining};

fn raw_amount() -> impl Strategy<Value = U256> {
    prop_oneof![
        any::<u64>().prop_map(U256::from),
        any::<u128>().prop_map(U256::from),
        (any::<u128>(), any::<u64>())
            .prop_map(|(hi, lo)| (U256::from(hi) << 64usize) | U256::from(lo)),
    ]
}

// ── Token Amount Properties ─────────────────────────────────

proptest! {
    /// Formatting with the on-chain decimals and parsing back is lossless.
    #[test]
    fn amount_display_parses_back(raw in raw_amount(), decimals in 0u8..=36) {
        let amount = TokenAmount::from_raw(raw, decimals);
        let text = amount.to_string();
        let parsed = TokenAmount::parse(&text, decimals);
        prop_assert_eq!(parsed, Ok(amount), "round trip failed for {}", text);
    }

    /// Truncated display never exceeds the exact value.
    #[test]
    fn format_fixed_truncates(raw in any::<u64>(), decimals in 2u8..=18) {
        let amount = TokenAmount::from_raw(U256::from(raw), decimals);
        let fixed = amount.format_fixed(2);
        let (_, fraction) = fixed.split_once('.').unwrap();
        prop_assert_eq!(fraction.len(), 2);

        let shown = TokenAmount::parse(&fixed, decimals).unwrap();
        prop_assert!(shown.raw() <= amount.raw());
        let step = U256::from(10u64).pow(U256::from(decimals - 2));
        prop_assert!(amount.raw() - shown.raw() < step);
    }

    /// Inputs with more fractional digits than the token supports are refused.
    #[test]
    fn excess_precision_rejected(whole in any::<u32>(), decimals in 0u8..=18) {
        let input = format!("{whole}.{}1", "0".repeat(usize::from(decimals)));
        prop_assert!(TokenAmount::parse(&input, decimals).is_err());
    }

    /// At APY <= 100% the yearly return is bounded by the principal (up to cent rounding).
    #[test]
    fn yearly_return_bounded(raw in any::<u64>(), apy in 0u32..=100) {
        let amount = TokenAmount::from_raw(U256::from(raw), 6);
        let estimate = estimate_yearly_return(&amount, Decimal::from(apy)).unwrap();
        prop_assert!(estimate >= Decimal::ZERO);
        prop_assert!(estimate <= amount.to_decimal().unwrap() + Decimal::new(1, 2));
    }
}

// ── Lock Time Formatting Properties ─────────────────────────

proptest! {
    /// Days, hours and minutes recombine to the input minus leftover seconds.
    #[test]
    fn time_remaining_components_recombine(seconds in 1u64..=10 * 365 * 86_400) {
        let text = format_time_remaining(seconds);
        let parts: Vec<u64> = text
            .split(' ')
            .map(|p| p[..p.len() - 1].parse().unwrap())
            .collect();
        prop_assert_eq!(parts.len(), 3);
        prop_assert!(parts[1] < 24);
        prop_assert!(parts[2] < 60);
        let total = parts[0] * 86_400 + parts[1] * 3_600 + parts[2] * 60;
        prop_assert_eq!(total, seconds - seconds % 60);
    }
}

#[test]
fn zero_time_remaining_reads_ready() {
    assert_eq!(format_time_remaining(0), "Ready to withdraw");
}
