//! Liquidity accounting: share minting on deposit, pro-rata payout on withdrawal
//!
//! Pure functions over reserve and supply values. The registry applies the
//! returned deltas to the pool record and token custody.

use crate::error::PoolError;
use crate::pool::Reserve;
use serde::{Deserialize, Serialize};
use tidepool_config::PoolLimits;
use tidepool_types::{FixedPoint, Rounding};
use tracing::debug;

/// One side of a deposit: the current reserve and the amount offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositLeg {
    pub supply: FixedPoint,
    pub amount: FixedPoint,
    pub decimals: u8,
}

impl DepositLeg {
    pub const fn new(reserve: Reserve, amount: FixedPoint) -> Self {
        Self {
            supply: reserve.supply,
            amount,
            decimals: reserve.decimals,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositOutcome {
    pub lp_minted: FixedPoint,
    pub i_used: FixedPoint,
    pub q_used: FixedPoint,
    pub i_unused: FixedPoint,
    pub q_unused: FixedPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawOutcome {
    pub i_out: FixedPoint,
    pub q_out: FixedPoint,
}

pub struct LiquidityMath;

impl LiquidityMath {
    /// Shares minted for a deposit of `i.amount` and `q.amount`
    ///
    /// An empty pool mints `limits.initial_lp_supply` and takes both amounts
    /// whole. Otherwise the side with the smaller `amount / supply` ratio is
    /// taken whole and the other side only up to the matching ratio; the
    /// remainder is returned unused.
    pub fn deposit(
        limits: &PoolLimits,
        lp_supply: FixedPoint,
        i: DepositLeg,
        q: DepositLeg,
    ) -> Result<DepositOutcome, PoolError> {
        if lp_supply.is_zero() {
            return Self::initial_deposit(limits, i, q);
        }
        if i.supply.is_zero() || q.supply.is_zero() {
            return Err(PoolError::InvalidSupply);
        }

        let i_ratio = i.amount.divide_trunc(i.supply)?;
        let q_ratio = q.amount.divide_trunc(q.supply)?;

        let (i_used, q_used) = if i_ratio <= q_ratio {
            debug!(%i_ratio, %q_ratio, "deposit bound by I");
            (i.amount, Self::partial_leg(i_ratio, q)?)
        } else {
            debug!(%i_ratio, %q_ratio, "deposit bound by Q");
            (Self::partial_leg(q_ratio, i)?, q.amount)
        };

        let by_i = i_used.mul_div(lp_supply, i.supply, Rounding::Trunc)?;
        let by_q = q_used.mul_div(lp_supply, q.supply, Rounding::Trunc)?;
        let lp_minted = by_i.min(by_q).trunc_to(limits.lp_decimals)?;
        if lp_minted.is_zero() {
            return Err(PoolError::DepositPrecisionLoss);
        }

        Self::check_ceilings(
            limits,
            i.supply.add(i_used)?,
            q.supply.add(q_used)?,
            lp_supply.add(lp_minted)?,
        )?;

        Ok(DepositOutcome {
            lp_minted,
            i_used,
            q_used,
            i_unused: i.amount.sub(i_used)?,
            q_unused: q.amount.sub(q_used)?,
        })
    }

    /// Reserves returned for burning `lp_burn` of `lp_supply` shares
    pub fn withdraw(
        lp_burn: FixedPoint,
        lp_supply: FixedPoint,
        i: Reserve,
        q: Reserve,
    ) -> Result<WithdrawOutcome, PoolError> {
        if lp_burn.is_zero() || lp_burn > lp_supply {
            return Err(PoolError::InvalidLpTokenAmount {
                requested: lp_burn,
                supply: lp_supply,
            });
        }
        if i.supply.is_zero() || q.supply.is_zero() {
            return Err(PoolError::InvalidSupply);
        }

        if lp_burn == lp_supply {
            return Ok(WithdrawOutcome {
                i_out: i.supply,
                q_out: q.supply,
            });
        }

        let i_out = lp_burn
            .mul_div(i.supply, lp_supply, Rounding::Trunc)?
            .trunc_to(i.decimals)?;
        let q_out = lp_burn
            .mul_div(q.supply, lp_supply, Rounding::Trunc)?
            .trunc_to(q.decimals)?;
        if i_out.is_zero() || q_out.is_zero() {
            return Err(PoolError::WithdrawPrecisionLoss);
        }

        Ok(WithdrawOutcome { i_out, q_out })
    }

    fn initial_deposit(
        limits: &PoolLimits,
        i: DepositLeg,
        q: DepositLeg,
    ) -> Result<DepositOutcome, PoolError> {
        if !i.supply.is_zero() || !q.supply.is_zero() {
            return Err(PoolError::InvalidSupply);
        }
        if i.amount.is_zero() || q.amount.is_zero() {
            return Err(PoolError::InitWithZeroAsset);
        }
        Self::check_ceilings(limits, i.amount, q.amount, limits.initial_lp_supply)?;

        Ok(DepositOutcome {
            lp_minted: limits.initial_lp_supply,
            i_used: i.amount,
            q_used: q.amount,
            i_unused: FixedPoint::ZERO,
            q_unused: FixedPoint::ZERO,
        })
    }

    /// Amount of `leg` needed to match `ratio`, rounded up; the remainder is
    /// truncated to the asset's decimals before being handed back
    fn partial_leg(ratio: FixedPoint, leg: DepositLeg) -> Result<FixedPoint, PoolError> {
        let needed = ratio.multiply_round_up(leg.supply)?.min(leg.amount);
        let unused = leg.amount.sub(needed)?.trunc_to(leg.decimals)?;
        Ok(leg.amount.sub(unused)?)
    }

    fn check_ceilings(
        limits: &PoolLimits,
        i_supply: FixedPoint,
        q_supply: FixedPoint,
        lp_supply: FixedPoint,
    ) -> Result<(), PoolError> {
        if i_supply > limits.max_pool_coins || q_supply > limits.max_pool_coins {
            return Err(PoolError::MaxPoolCoinReached);
        }
        if lp_supply > limits.max_lp_supply {
            return Err(PoolError::MaxLPReached);
        }
        Ok(())
    }
}
