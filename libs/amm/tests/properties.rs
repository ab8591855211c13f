//! Accounting Property Tests
//!
//! Economic invariants of the liquidity and swap engines over random reserves.

use proptest::prelude::*;
use tidepool_amm::{
    CurveType, DepositLeg, InvariantCurve, LiquidityMath, PoolError, Reserve, SwapDirection,
    SwapMath,
};
use tidepool_config::PoolLimits;
use tidepool_types::{FixedPoint, Rounding};

const DECIMALS: u8 = 6;

prop_compose! {
    /// Between 1 and 1e6 whole units at 6 decimals
    fn reserve()
        (units in 1_000_000u64..1_000_000_000_000u64) -> Reserve {
        Reserve::new(FixedPoint::from_u64(units, DECIMALS).unwrap(), DECIMALS)
    }
}

prop_compose! {
    fn amount()
        (units in 1u64..1_000_000_000_000u64) -> FixedPoint {
        FixedPoint::from_u64(units, DECIMALS).unwrap()
    }
}

prop_compose! {
    fn fee_rate()
        (bps in 1u32..1_000u32) -> FixedPoint {
        FixedPoint::from_bps(bps)
    }
}

fn curve_type() -> impl Strategy<Value = CurveType> {
    prop_oneof![Just(CurveType::ConstantProduct), Just(CurveType::StableSwap)]
}

fn limits() -> PoolLimits {
    PoolLimits::default()
}

proptest! {
    #[test]
    fn deposit_never_mints_more_than_its_share(
        i in reserve(),
        q in reserve(),
        lp in amount(),
        i_amt in amount(),
        q_amt in amount(),
    ) {
        let outcome = match LiquidityMath::deposit(
            &limits(),
            lp,
            DepositLeg::new(i, i_amt),
            DepositLeg::new(q, q_amt),
        ) {
            Ok(outcome) => outcome,
            Err(PoolError::DepositPrecisionLoss | PoolError::MaxLPReached) => return Ok(()),
            Err(err) => return Err(TestCaseError::fail(format!("unexpected error {}", err))),
        };

        prop_assert_eq!(outcome.i_used.add(outcome.i_unused).unwrap(), i_amt);
        prop_assert_eq!(outcome.q_used.add(outcome.q_unused).unwrap(), q_amt);

        // minted / lp <= used / supply on both sides
        let minted = outcome.lp_minted;
        prop_assert!(minted.mul_div(i.supply, lp, Rounding::Up).unwrap() <= outcome.i_used);
        prop_assert!(minted.mul_div(q.supply, lp, Rounding::Up).unwrap() <= outcome.q_used);
    }

    #[test]
    fn deposit_then_withdraw_returns_at_most_the_deposit(
        i in reserve(),
        q in reserve(),
        lp in amount(),
        i_amt in amount(),
        q_amt in amount(),
    ) {
        let Ok(deposit) = LiquidityMath::deposit(
            &limits(),
            lp,
            DepositLeg::new(i, i_amt),
            DepositLeg::new(q, q_amt),
        ) else {
            return Ok(());
        };

        let i_after = Reserve::new(i.supply.add(deposit.i_used).unwrap(), DECIMALS);
        let q_after = Reserve::new(q.supply.add(deposit.q_used).unwrap(), DECIMALS);
        let lp_after = lp.add(deposit.lp_minted).unwrap();

        match LiquidityMath::withdraw(deposit.lp_minted, lp_after, i_after, q_after) {
            Ok(withdraw) => {
                prop_assert!(withdraw.i_out <= deposit.i_used);
                prop_assert!(withdraw.q_out <= deposit.q_used);
            }
            Err(PoolError::WithdrawPrecisionLoss) => {}
            Err(err) => return Err(TestCaseError::fail(format!("unexpected error {}", err))),
        }
    }

    #[test]
    fn swap_never_decreases_the_invariant(
        curve_type in curve_type(),
        x in reserve(),
        y in reserve(),
        x_in in amount(),
        fee in fee_rate(),
    ) {
        let curve = curve_type.curve(x.supply, y.supply).unwrap();
        let outcome = SwapMath::swap(&curve, x, y, x_in, fee, FixedPoint::ZERO).unwrap();
        let (new_x, new_y) = outcome.apply(x.supply, y.supply).unwrap();

        prop_assert!(!new_y.is_zero());
        prop_assert!(outcome.y_out < y.supply);

        let before = curve.invariant(x.supply, y.supply).unwrap();
        let after = curve.invariant(new_x, new_y).unwrap();
        prop_assert!(after >= before, "{} < {}", after, before);
    }

    #[test]
    fn swap_output_is_at_most_the_fee_free_output(
        curve_type in curve_type(),
        x in reserve(),
        y in reserve(),
        x_in in amount(),
        fee in fee_rate(),
    ) {
        let curve = curve_type.curve(x.supply, y.supply).unwrap();
        let with_fee = SwapMath::swap(&curve, x, y, x_in, fee, FixedPoint::ZERO).unwrap();
        let without_fee =
            SwapMath::swap(&curve, x, y, x_in, FixedPoint::ZERO, FixedPoint::ZERO).unwrap();
        prop_assert!(with_fee.y_out <= without_fee.y_out);
        prop_assert!(!with_fee.fee_charged.is_zero());
    }

    #[test]
    fn pricing_is_pure_and_moves_against_the_trade(
        curve_type in curve_type(),
        i in reserve(),
        q in reserve(),
        amount_in in amount(),
        fee in fee_rate(),
    ) {
        let current = SwapMath::marginal_price(curve_type, i.supply, q.supply).unwrap();
        let unchanged = SwapMath::price_after_swap(
            curve_type, i, q, SwapDirection::IForQ, FixedPoint::ZERO, fee,
        ).unwrap();
        prop_assert_eq!(current, unchanged);

        let price_after = |direction| {
            SwapMath::price_after_swap(curve_type, i, q, direction, amount_in, fee).unwrap()
        };
        let first = price_after(SwapDirection::IForQ);
        let second = price_after(SwapDirection::IForQ);
        prop_assert_eq!(first, second);
        prop_assert!(first <= current);

        let sell = price_after(SwapDirection::QForI);
        prop_assert!(sell >= current);
    }
}
