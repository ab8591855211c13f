//! Swap invariant engine
//!
//! Prices an exact-in swap of `x` for `y` against any [`InvariantCurve`]:
//!
//! 1. clip the input at the limit price (clipped part returned, rounded up)
//! 2. skim the proportional fee from the input (rounded up)
//! 3. run the post-fee input through the curve and truncate the output to
//!    the output asset's decimals
//!
//! Nothing here mutates pool state; callers apply [`SwapOutcome`] themselves.

use crate::error::PoolError;
use crate::pool::Reserve;
use crate::pool_traits::{CurveType, InvariantCurve};
use serde::{Deserialize, Serialize};
use tidepool_types::FixedPoint;
use tracing::debug;

/// Which reserve receives the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    /// I in, Q out
    IForQ,
    /// Q in, I out
    QForI,
}

impl SwapDirection {
    /// (input reserve, output reserve) for this direction
    pub fn orient(self, i: Reserve, q: Reserve) -> (Reserve, Reserve) {
        match self {
            SwapDirection::IForQ => (i, q),
            SwapDirection::QForI => (q, i),
        }
    }
}

/// Result of pricing one swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    /// Paid out of the `y` reserve, truncated to the `y` decimals
    pub y_out: FixedPoint,
    /// Skimmed from the used input; stays in the pool
    pub fee_charged: FixedPoint,
    /// Input above the limit-price ceiling, returned to the caller
    pub unused_x_in: FixedPoint,
    /// Input actually taken into the `x` reserve (fee included)
    pub x_used: FixedPoint,
}

impl SwapOutcome {
    fn untouched(x_in: FixedPoint) -> Self {
        Self {
            y_out: FixedPoint::ZERO,
            fee_charged: FixedPoint::ZERO,
            unused_x_in: x_in,
            x_used: FixedPoint::ZERO,
        }
    }

    /// Reserves after applying this outcome to `x` and `y`
    pub fn apply(
        &self,
        x: FixedPoint,
        y: FixedPoint,
    ) -> Result<(FixedPoint, FixedPoint), PoolError> {
        Ok((x.add(self.x_used)?, y.sub(self.y_out)?))
    }
}

/// Swap math shared by every curve family
pub struct SwapMath;

impl SwapMath {
    /// Price an exact-in swap of `x_in`
    ///
    /// # Arguments
    /// * `curve` - Curve built for the current reserves
    /// * `x` - Input-side reserve and decimals
    /// * `y` - Output-side reserve and decimals
    /// * `x_in` - Offered input amount
    /// * `fee_rate` - Fraction of the input kept as fee (`0.0001` = 1 bps)
    /// * `limit_price` - Worst acceptable price in `x` per `y`; zero disables the limit
    ///
    /// # Returns
    /// Output, fee and unused input. A limit at or below the current level
    /// returns the whole input unused with zero output.
    pub fn swap<C: InvariantCurve>(
        curve: &C,
        x: Reserve,
        y: Reserve,
        x_in: FixedPoint,
        fee_rate: FixedPoint,
        limit_price: FixedPoint,
    ) -> Result<SwapOutcome, PoolError> {
        if x.supply.is_zero() {
            return Err(PoolError::InvalidXSupply);
        }
        if y.supply.is_zero() {
            return Err(PoolError::InvalidYSupply);
        }
        if x_in.is_zero() {
            return Err(PoolError::InvalidXAmt);
        }
        if fee_rate >= FixedPoint::ONE {
            return Err(PoolError::InvalidFeeRate(fee_rate));
        }

        let (x_used, unused_x_in) = if limit_price.is_zero() {
            (x_in, FixedPoint::ZERO)
        } else {
            // truncating the ceiling keeps the clip conservative
            let ceiling = y.supply.multiply_trunc(limit_price)?;
            if ceiling <= x.supply {
                debug!(%ceiling, x_supply = %x.supply, "limit price at or below current level");
                return Ok(SwapOutcome::untouched(x_in));
            }
            let max_x_in = ceiling.sub(x.supply)?;
            if x_in <= max_x_in {
                (x_in, FixedPoint::ZERO)
            } else {
                let unused = x_in.sub(max_x_in)?.round_up_to(x.decimals)?.min(x_in);
                debug!(%x_in, %max_x_in, %unused, "input clipped at limit price");
                (x_in.sub(unused)?, unused)
            }
        };

        if x_used.is_zero() {
            return Ok(SwapOutcome::untouched(x_in));
        }

        let fee_charged = x_used.multiply_round_up(fee_rate)?;
        let net_in = x_used.sub(fee_charged)?;

        let y_out = if net_in.is_zero() {
            FixedPoint::ZERO
        } else {
            let new_x = x.supply.add(net_in)?;
            let new_y = curve.new_opposite_reserve(x.supply, y.supply, new_x)?;
            y.supply.saturating_sub(new_y).trunc_to(y.decimals)?
        };

        Ok(SwapOutcome {
            y_out,
            fee_charged,
            unused_x_in,
            x_used,
        })
    }

    /// Current price of I in units of Q
    pub fn marginal_price(
        curve_type: CurveType,
        i_supply: FixedPoint,
        q_supply: FixedPoint,
    ) -> Result<FixedPoint, PoolError> {
        if i_supply.is_zero() || q_supply.is_zero() {
            return Err(PoolError::InvalidSupply);
        }
        curve_type.curve(i_supply, q_supply)?.marginal_price(i_supply, q_supply)
    }

    /// Price of I in units of Q after simulating a swap of `amount_in`
    ///
    /// A zero `amount_in` returns the current marginal price. The curve is
    /// built once from the pre-swap reserves so the stable-swap amplification
    /// does not drift within the simulation.
    pub fn price_after_swap(
        curve_type: CurveType,
        i: Reserve,
        q: Reserve,
        direction: SwapDirection,
        amount_in: FixedPoint,
        fee_rate: FixedPoint,
    ) -> Result<FixedPoint, PoolError> {
        if amount_in.is_zero() {
            return Self::marginal_price(curve_type, i.supply, q.supply);
        }
        let curve = curve_type.curve(i.supply, q.supply)?;
        let (x, y) = direction.orient(i, q);
        let outcome = Self::swap(&curve, x, y, amount_in, fee_rate, FixedPoint::ZERO)?;
        let (new_x, new_y) = outcome.apply(x.supply, y.supply)?;
        let (new_i, new_q) = match direction {
            SwapDirection::IForQ => (new_x, new_y),
            SwapDirection::QForI => (new_y, new_x),
        };
        if new_i.is_zero() || new_q.is_zero() {
            return Ok(FixedPoint::ZERO);
        }
        curve.marginal_price(new_i, new_q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant_product::ConstantProduct;
    use rust_decimal_macros::dec;

    fn fp(s: &str) -> FixedPoint {
        FixedPoint::from_decimal_str(s).unwrap()
    }

    fn reserve(units: u64, decimals: u8) -> Reserve {
        Reserve::new(FixedPoint::from_integer(units), decimals)
    }

    #[test]
    fn test_constant_product_swap_with_fee() {
        // 0.01% of 250 = 0.025; 250 - 125000 / 749.975 = 83.3277775925
        let outcome = SwapMath::swap(
            &ConstantProduct,
            reserve(500, 10),
            reserve(250, 10),
            fp("250"),
            fp("0.0001"),
            fp("100"),
        )
        .unwrap();

        assert_eq!(outcome.fee_charged, fp("0.025"));
        assert_eq!(outcome.y_out.to_decimal().unwrap(), dec!(83.3277775925));
        assert!(outcome.unused_x_in.is_zero());
        assert_eq!(outcome.x_used, fp("250"));
    }

    #[test]
    fn test_balanced_reserves_swap() {
        let outcome = SwapMath::swap(
            &ConstantProduct,
            reserve(500, 6),
            reserve(500, 6),
            fp("250"),
            fp("0.0001"),
            fp("100"),
        )
        .unwrap();

        assert_eq!(outcome.fee_charged, fp("0.025"));
        // truncated to 6 places from 166.6555551851
        assert_eq!(outcome.y_out, fp("166.655555"));
        assert!(outcome.unused_x_in.is_zero());
    }

    #[test]
    fn test_limit_price_clips_input() {
        // ceiling = 250 * 3 = 750, so at most 250 of the 400 offered is taken
        let outcome = SwapMath::swap(
            &ConstantProduct,
            reserve(500, 0),
            reserve(250, 0),
            fp("400"),
            FixedPoint::ZERO,
            fp("3"),
        )
        .unwrap();

        assert_eq!(outcome.unused_x_in, fp("150"));
        assert_eq!(outcome.x_used, fp("250"));
        // 250 - ceil(125000 / 750) = 83.33.. truncated to 0 decimals
        assert_eq!(outcome.y_out, fp("83"));
    }

    #[test]
    fn test_clip_rounds_unused_up_to_asset_decimals() {
        let outcome = SwapMath::swap(
            &ConstantProduct,
            Reserve::new(fp("500"), 0),
            Reserve::new(fp("250.25"), 2),
            fp("10"),
            FixedPoint::ZERO,
            fp("2"),
        )
        .unwrap();

        // ceiling 500.5 leaves room for 0.5; 9.5 rounds up to 10 at 0 decimals
        assert_eq!(outcome.unused_x_in, fp("10"));
        assert!(outcome.x_used.is_zero());
        assert!(outcome.y_out.is_zero());
    }

    #[test]
    fn test_limit_below_current_level_returns_everything() {
        let outcome = SwapMath::swap(
            &ConstantProduct,
            reserve(500, 0),
            reserve(250, 0),
            fp("10"),
            fp("0.0001"),
            fp("2"),
        )
        .unwrap();

        assert_eq!(outcome.unused_x_in, fp("10"));
        assert!(outcome.y_out.is_zero());
        assert!(outcome.fee_charged.is_zero());
    }

    #[test]
    fn test_invalid_inputs() {
        let ok = reserve(10, 0);
        let empty = Reserve::new(FixedPoint::ZERO, 0);
        let zero = FixedPoint::ZERO;
        assert_eq!(
            SwapMath::swap(&ConstantProduct, empty, ok, fp("1"), zero, zero),
            Err(PoolError::InvalidXSupply)
        );
        assert_eq!(
            SwapMath::swap(&ConstantProduct, ok, empty, fp("1"), zero, zero),
            Err(PoolError::InvalidYSupply)
        );
        assert_eq!(
            SwapMath::swap(&ConstantProduct, ok, ok, zero, zero, zero),
            Err(PoolError::InvalidXAmt)
        );
        assert_eq!(
            SwapMath::swap(&ConstantProduct, ok, ok, fp("1"), FixedPoint::ONE, zero),
            Err(PoolError::InvalidFeeRate(FixedPoint::ONE))
        );
    }

    #[test]
    fn test_price_after_zero_swap_is_marginal_price() {
        let i = reserve(800, 6);
        let q = reserve(200, 6);
        for curve in [CurveType::ConstantProduct, CurveType::StableSwap] {
            let current = SwapMath::marginal_price(curve, i.supply, q.supply).unwrap();
            let after = SwapMath::price_after_swap(
                curve,
                i,
                q,
                SwapDirection::IForQ,
                FixedPoint::ZERO,
                fp("0.0001"),
            )
            .unwrap();
            assert_eq!(current, after);
        }
    }

    #[test]
    fn test_price_moves_against_the_swap() {
        let i = reserve(1000, 6);
        let q = reserve(1000, 6);
        let fee = fp("0.0001");
        for curve in [CurveType::ConstantProduct, CurveType::StableSwap] {
            let current = SwapMath::marginal_price(curve, i.supply, q.supply).unwrap();
            let after = |direction| {
                SwapMath::price_after_swap(curve, i, q, direction, fp("50"), fee).unwrap()
            };
            let after_sell_i = after(SwapDirection::IForQ);
            let after_buy_i = after(SwapDirection::QForI);
            assert!(after_sell_i < current);
            assert!(after_buy_i > current);
        }
    }
}
