//! Constant product (x*y=k) curve math with exact calculations
//!
//! All arithmetic uses [`FixedPoint`] with explicit rounding: the new
//! opposite reserve is rounded up so the pool keeps any residual.

use crate::error::PoolError;
use crate::pool_traits::InvariantCurve;
use crate::signed::SignedFixed;
use tidepool_types::FixedPoint;

/// `x * y = k`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantProduct;

impl InvariantCurve for ConstantProduct {
    /// `k / new_x`, with `k` and the quotient both rounded up
    ///
    /// # Arguments
    /// * `x` - Input-side reserve before the swap
    /// * `y` - Output-side reserve before the swap
    /// * `new_x` - Input-side reserve after the post-fee input is added
    fn new_opposite_reserve(
        &self,
        x: FixedPoint,
        y: FixedPoint,
        new_x: FixedPoint,
    ) -> Result<FixedPoint, PoolError> {
        if new_x.is_zero() {
            return Err(PoolError::InvalidXSupply);
        }
        let k = x.multiply_round_up(y)?;
        Ok(k.divide_round_up(new_x)?)
    }

    /// `y / x`
    fn marginal_price(&self, x: FixedPoint, y: FixedPoint) -> Result<FixedPoint, PoolError> {
        if x.is_zero() {
            return Err(PoolError::InvalidXSupply);
        }
        Ok(y.divide_trunc(x)?)
    }

    fn invariant(&self, x: FixedPoint, y: FixedPoint) -> Result<SignedFixed, PoolError> {
        Ok(SignedFixed::positive(x.multiply_trunc(y)?))
    }
}
