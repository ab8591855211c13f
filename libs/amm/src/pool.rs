//! Pool record and its identity
//!
//! One [`PoolRecord`] exists per [`PoolKey`]. The record is plain data: the
//! engines compute new values and the registry swaps the whole record in
//! once every side effect has succeeded.

use crate::error::PoolError;
use crate::pool_traits::CurveType;
use crate::swap::SwapMath;
use serde::{Deserialize, Serialize};
use std::fmt;
use tidepool_config::PoolLimits;
use tidepool_types::{AssetId, FixedPoint};

/// A reserve amount together with the decimal count of its asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    pub supply: FixedPoint,
    pub decimals: u8,
}

impl Reserve {
    pub const fn new(supply: FixedPoint, decimals: u8) -> Self {
        Self { supply, decimals }
    }
}

/// (asset I, asset Q, curve) triple identifying a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub asset_i: AssetId,
    pub asset_q: AssetId,
    pub curve: CurveType,
}

impl PoolKey {
    pub const fn new(asset_i: AssetId, asset_q: AssetId, curve: CurveType) -> Self {
        Self {
            asset_i,
            asset_q,
            curve,
        }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.asset_i, self.asset_q, self.curve)
    }
}

/// Persisted pool state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecord {
    pub key: PoolKey,
    pub i_decimals: u8,
    pub q_decimals: u8,
    pub i_supply: FixedPoint,
    pub q_supply: FixedPoint,
    pub lp_supply: FixedPoint,
}

impl PoolRecord {
    /// Empty pool
    pub fn new(key: PoolKey, i_decimals: u8, q_decimals: u8) -> Self {
        Self {
            key,
            i_decimals,
            q_decimals,
            i_supply: FixedPoint::ZERO,
            q_supply: FixedPoint::ZERO,
            lp_supply: FixedPoint::ZERO,
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.lp_supply.is_zero()
    }

    pub fn i_reserve(&self) -> Reserve {
        Reserve::new(self.i_supply, self.i_decimals)
    }

    pub fn q_reserve(&self) -> Reserve {
        Reserve::new(self.q_supply, self.q_decimals)
    }

    /// Current price of I in units of Q
    pub fn marginal_price(&self) -> Result<FixedPoint, PoolError> {
        SwapMath::marginal_price(self.key.curve, self.i_supply, self.q_supply)
    }

    /// Reserves are zero together with the share supply, and all stay below their ceilings
    pub fn check_invariants(&self, limits: &PoolLimits) -> Result<(), PoolError> {
        let empty = [self.i_supply, self.q_supply, self.lp_supply]
            .iter()
            .filter(|value| value.is_zero())
            .count();
        if empty != 0 && empty != 3 {
            return Err(PoolError::InvalidSupply);
        }
        if self.i_supply > limits.max_pool_coins || self.q_supply > limits.max_pool_coins {
            return Err(PoolError::MaxPoolCoinReached);
        }
        if self.lp_supply > limits.max_lp_supply {
            return Err(PoolError::MaxLPReached);
        }
        Ok(())
    }
}
