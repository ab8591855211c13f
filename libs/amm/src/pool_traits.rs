//! Curve trait definitions for a unified invariant interface

use crate::constant_product::ConstantProduct;
use crate::error::PoolError;
use crate::signed::SignedFixed;
use crate::stable_swap::StableSwap;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use tidepool_types::FixedPoint;

/// Curve family tag, stored on-ledger as a `u8`
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum CurveType {
    ConstantProduct = 0,
    StableSwap = 1,
}

impl CurveType {
    /// Decode an on-ledger tag; unknown tags are `InvalidPoolType`
    pub fn from_tag(tag: u8) -> Result<Self, PoolError> {
        Self::try_from(tag).map_err(|err| PoolError::InvalidPoolType(err.number))
    }

    /// Curve instance parameterized by the current reserves
    ///
    /// The stable-swap amplification depends on the reserves, so the same
    /// instance must be used for every step of one simulated swap.
    pub fn curve(self, i_supply: FixedPoint, q_supply: FixedPoint) -> Result<Curve, PoolError> {
        Ok(match self {
            CurveType::ConstantProduct => Curve::ConstantProduct(ConstantProduct),
            CurveType::StableSwap => {
                Curve::StableSwap(StableSwap::for_reserves(i_supply, q_supply)?)
            }
        })
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveType::ConstantProduct => write!(f, "constant-product"),
            CurveType::StableSwap => write!(f, "stable-swap"),
        }
    }
}

/// Unified invariant interface for swap pricing
///
/// `x` is the reserve receiving input and `y` the reserve paying output.
pub trait InvariantCurve {
    /// Reserve of `y` that keeps the invariant when `x` grows to `new_x`.
    /// Rounded up so the pool never pays out more than the curve allows.
    fn new_opposite_reserve(
        &self,
        x: FixedPoint,
        y: FixedPoint,
        new_x: FixedPoint,
    ) -> Result<FixedPoint, PoolError>;

    /// Units of `y` per unit of `x` at the margin (`-dy/dx`)
    fn marginal_price(&self, x: FixedPoint, y: FixedPoint) -> Result<FixedPoint, PoolError>;

    /// Invariant value at the given reserves
    fn invariant(&self, x: FixedPoint, y: FixedPoint) -> Result<SignedFixed, PoolError>;
}

/// Curve selected by a pool's [`CurveType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    ConstantProduct(ConstantProduct),
    StableSwap(StableSwap),
}

impl InvariantCurve for Curve {
    fn new_opposite_reserve(
        &self,
        x: FixedPoint,
        y: FixedPoint,
        new_x: FixedPoint,
    ) -> Result<FixedPoint, PoolError> {
        match self {
            Curve::ConstantProduct(curve) => curve.new_opposite_reserve(x, y, new_x),
            Curve::StableSwap(curve) => curve.new_opposite_reserve(x, y, new_x),
        }
    }

    fn marginal_price(&self, x: FixedPoint, y: FixedPoint) -> Result<FixedPoint, PoolError> {
        match self {
            Curve::ConstantProduct(curve) => curve.marginal_price(x, y),
            Curve::StableSwap(curve) => curve.marginal_price(x, y),
        }
    }

    fn invariant(&self, x: FixedPoint, y: FixedPoint) -> Result<SignedFixed, PoolError> {
        match self {
            Curve::ConstantProduct(curve) => curve.invariant(x, y),
            Curve::StableSwap(curve) => curve.invariant(x, y),
        }
    }
}
