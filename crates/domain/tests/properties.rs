//! Property-based invariant checks for the constant-product math.

use cpmm_domain::fee::FeeRate;
use cpmm_domain::math::constant_product::{k, swap_output};
use cpmm_domain::math::liquidity::{
    proportional_mint, redemption_amounts, required_paired_amount,
};
use cpmm_domain::token::{Amount, Shares};
use proptest::prelude::*;

/// Reserve values away from degenerate extremes.
fn reserve_strategy() -> impl Strategy<Value = u128> {
    10_000u128..=10_000_000_000u128
}

fn fee_strategy() -> impl Strategy<Value = u32> {
    0u32..=500u32
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// `k` never decreases across a swap, strictly grows with a nonzero fee.
    #[test]
    fn prop_product_never_decreases(
        r_in in reserve_strategy(),
        r_out in reserve_strategy(),
        input in 1u128..=1_000_000u128,
        fee_bps in fee_strategy(),
    ) {
        let fee = FeeRate::from_bps(fee_bps).expect("bps in range");
        let reserve_in = Amount::new(r_in);
        let reserve_out = Amount::new(r_out);
        let amount_in = Amount::new(input);

        let out = swap_output(amount_in, reserve_in, reserve_out, fee)
            .expect("funded reserves");
        prop_assert!(out < reserve_out);

        let k_before = k(reserve_in, reserve_out);
        let k_after = k(
            Amount::new(r_in + input),
            Amount::new(r_out - out.raw()),
        );
        prop_assert!(
            k_after >= k_before,
            "k_after={k_after} < k_before={k_before}"
        );
    }

    /// A full round trip (in then back out) never profits the trader.
    #[test]
    fn prop_round_trip_loses_value(
        r_low in reserve_strategy(),
        r_high in reserve_strategy(),
        input in 100u128..=100_000u128,
    ) {
        let fee = FeeRate::from_bps(30).expect("valid fee");
        let mut low = Amount::new(r_low);
        let mut high = Amount::new(r_high);

        let leg_one = swap_output(Amount::new(input), low, high, fee)
            .expect("funded reserves");
        if leg_one.is_zero() {
            return Ok(());
        }
        low = Amount::new(low.raw() + input);
        high = Amount::new(high.raw() - leg_one.raw());

        let leg_two = swap_output(leg_one, high, low, fee).expect("funded reserves");
        prop_assert!(
            leg_two.raw() < input,
            "round trip returned {} from {input}",
            leg_two.raw()
        );
    }

    /// Deposit then redeem of the minted shares returns no more than the
    /// deposit, and no less than the deposit minus rounding slack.
    #[test]
    fn prop_mint_redeem_round_trip(
        r_low in reserve_strategy(),
        r_high in reserve_strategy(),
        total in 10_000u128..=1_000_000_000u128,
        deposit in 1_000u128..=1_000_000u128,
    ) {
        let reserve_low = Amount::new(r_low);
        let reserve_high = Amount::new(r_high);
        let total_shares = Shares::new(total);

        let deposit_low = Amount::new(deposit);
        let deposit_high = required_paired_amount(deposit_low, reserve_low, reserve_high)
            .expect("funded reserves");
        let Ok(minted) = proportional_mint(deposit_low, reserve_low, total_shares) else {
            // Deposit too small relative to the pool to mint anything.
            return Ok(());
        };

        let new_low = Amount::new(r_low + deposit);
        let new_high = Amount::new(r_high + deposit_high.raw());
        let new_total = Shares::new(total + minted.raw());

        let (out_low, out_high) =
            redemption_amounts(minted, new_low, new_high, new_total)
                .expect("shares outstanding");

        prop_assert!(out_low <= deposit_low);
        prop_assert!(out_high <= deposit_high.checked_add(Amount::new(1)).expect("no overflow"));
        // Rounding slack is bounded by the pro-rata granularity.
        let slack_low = deposit_low.raw() - out_low.raw();
        prop_assert!(
            slack_low <= new_low.raw() / new_total.raw() + 2,
            "slack {slack_low} too large"
        );
    }
}
