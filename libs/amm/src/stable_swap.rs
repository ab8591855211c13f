//! Stable-swap curve: `x - A/x + y - A/y = D`
//!
//! Near balance the curve behaves like a constant sum (price close to 1); as
//! one reserve shrinks, the `-A/x` term dominates and the price diverges like
//! a constant product. The amplification is tied to pool depth:
//! `A = 10 * (i + q)`.
//!
//! Solving for the new output reserve `y'` after the input reserve moves to
//! `x'` gives the quadratic `y'^2 - b*y' - A = 0` with
//! `b = D - (x' - A/x')`, whose positive root is
//!
//! ```text
//! y' = (sqrt(b^2 + 4A) + b) / 2
//! ```
//!
//! `b` can be negative for small reserves, so it is carried as a
//! [`SignedFixed`]. Every intermediate is rounded in the direction that makes
//! `y'` larger, which makes the amount paid out smaller.

use crate::error::PoolError;
use crate::pool_traits::InvariantCurve;
use crate::signed::SignedFixed;
use tidepool_types::FixedPoint;

/// Amplification per unit of combined reserves
pub const AMPLIFICATION_FACTOR: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StableSwap {
    amp: FixedPoint,
}

impl StableSwap {
    /// Curve with an explicit amplification
    pub fn new(amp: FixedPoint) -> Self {
        Self { amp }
    }

    /// `A = 10 * (i + q)`
    pub fn for_reserves(i_supply: FixedPoint, q_supply: FixedPoint) -> Result<Self, PoolError> {
        let depth = i_supply.add(q_supply)?;
        let amp = depth.multiply_trunc(FixedPoint::from_integer(AMPLIFICATION_FACTOR))?;
        Ok(Self { amp })
    }

    pub fn amp(&self) -> FixedPoint {
        self.amp
    }

    /// `x - A/x`, with `A/x` rounded as requested
    fn side_term(&self, x: FixedPoint, round_up_quotient: bool) -> Result<SignedFixed, PoolError> {
        if x.is_zero() {
            return Err(PoolError::InvalidXSupply);
        }
        let quotient = if round_up_quotient {
            self.amp.divide_round_up(x)?
        } else {
            self.amp.divide_trunc(x)?
        };
        Ok(SignedFixed::positive(x).sub(SignedFixed::positive(quotient))?)
    }
}

/// Smallest value whose square is at least `value`
fn sqrt_round_up(value: FixedPoint) -> Result<FixedPoint, PoolError> {
    let root = value.sqrt_approx();
    // floor(root^2 / S) < value  <=>  root^2 < value * S, since value * S is a multiple of S
    if root.multiply_trunc(root)? < value {
        Ok(root.add(FixedPoint::from_raw(1))?)
    } else {
        Ok(root)
    }
}

impl InvariantCurve for StableSwap {
    fn new_opposite_reserve(
        &self,
        x: FixedPoint,
        y: FixedPoint,
        new_x: FixedPoint,
    ) -> Result<FixedPoint, PoolError> {
        if y.is_zero() {
            return Err(PoolError::InvalidYSupply);
        }
        // D rounded up, the x' term rounded down: b only errs upward
        let d = self.side_term(x, false)?.add(self.side_term(y, false)?)?;
        let b = d.sub(self.side_term(new_x, true)?)?;

        let b_abs = b.magnitude();
        let four_a = self.amp.multiply_trunc(FixedPoint::from_integer(4))?;
        let discriminant = b_abs.multiply_round_up(b_abs)?.add(four_a)?;
        let root = sqrt_round_up(discriminant)?;

        // root >= |b| because the discriminant exceeds b^2 by 4A
        let numerator = if b.is_negative() {
            root.sub(b_abs)?
        } else {
            root.add(b_abs)?
        };
        Ok(numerator.divide_round_up(FixedPoint::from_integer(2))?)
    }

    /// `(1 + A/x^2) / (1 + A/y^2)`
    fn marginal_price(&self, x: FixedPoint, y: FixedPoint) -> Result<FixedPoint, PoolError> {
        if x.is_zero() {
            return Err(PoolError::InvalidXSupply);
        }
        if y.is_zero() {
            return Err(PoolError::InvalidYSupply);
        }
        let slope_x = FixedPoint::ONE.add(self.amp.divide_trunc(x)?.divide_trunc(x)?)?;
        let slope_y = FixedPoint::ONE.add(self.amp.divide_trunc(y)?.divide_trunc(y)?)?;
        Ok(slope_x.divide_trunc(slope_y)?)
    }

    fn invariant(&self, x: FixedPoint, y: FixedPoint) -> Result<SignedFixed, PoolError> {
        if y.is_zero() {
            return Err(PoolError::InvalidYSupply);
        }
        Ok(self.side_term(x, false)?.add(self.side_term(y, false)?)?)
    }
}
