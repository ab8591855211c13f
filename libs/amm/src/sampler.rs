//! Rebalance price-curve sampler
//!
//! Approximates the pool's curve with a ladder of resting orders. Each point
//! is the marginal price after a simulated swap of a fraction of one
//! reserve; nothing is committed.
//!
//! - **Buy** points: the pool buys I. Simulates I flowing in, so the price
//!   falls as the fraction grows. Quantity is an even split of the Q reserve.
//! - **Sell** points: the pool sells I. Simulates Q flowing in, so the price
//!   rises. Quantity is an even split of the I reserve.
//!
//! Sides are named from the pool's view of I: a buy point is a bid below mid,
//! reached by swapping a fraction of the I reserve in, and it pays out Q.
//! Points whose price truncates to zero are skipped.

use crate::error::PoolError;
use crate::pool::Reserve;
use crate::pool_traits::CurveType;
use crate::swap::{SwapDirection, SwapMath};
use serde::{Deserialize, Serialize};
use std::fmt;
use tidepool_config::PoolConfig;
use tidepool_types::FixedPoint;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// One resting order: price of I in units of Q, quantity in the asset the pool pays out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub side: Side,
    pub price: FixedPoint,
    pub quantity: FixedPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceSampler {
    fractions: Vec<FixedPoint>,
    fee_rate: FixedPoint,
}

impl RebalanceSampler {
    pub fn new(fractions: Vec<FixedPoint>, fee_rate: FixedPoint) -> Self {
        Self {
            fractions,
            fee_rate,
        }
    }

    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(config.sampler.fractions(), FixedPoint::from_bps(config.fee_bps))
    }

    pub fn fractions(&self) -> &[FixedPoint] {
        &self.fractions
    }

    /// Buy points in fraction order, then sell points in fraction order
    pub fn sample(
        &self,
        curve_type: CurveType,
        i: Reserve,
        q: Reserve,
    ) -> Result<Vec<PricePoint>, PoolError> {
        if i.supply.is_zero() || q.supply.is_zero() {
            return Err(PoolError::InvalidSupply);
        }
        if self.fractions.is_empty() {
            return Ok(Vec::new());
        }

        let count = FixedPoint::from_integer(self.fractions.len() as u64);
        let buy_quantity = q.supply.divide_trunc(count)?.trunc_to(q.decimals)?;
        let sell_quantity = i.supply.divide_trunc(count)?.trunc_to(i.decimals)?;

        let mut points = Vec::with_capacity(self.fractions.len() * 2);
        for (side, direction, reserve, quantity) in [
            (Side::Buy, SwapDirection::IForQ, i, buy_quantity),
            (Side::Sell, SwapDirection::QForI, q, sell_quantity),
        ] {
            for &fraction in &self.fractions {
                let amount_in = reserve.supply.multiply_trunc(fraction)?;
                let price = SwapMath::price_after_swap(
                    curve_type,
                    i,
                    q,
                    direction,
                    amount_in,
                    self.fee_rate,
                )?;
                if price.is_zero() {
                    debug!(%side, %fraction, "skipping zero price point");
                    continue;
                }
                points.push(PricePoint {
                    side,
                    price,
                    quantity,
                });
            }
        }
        Ok(points)
    }
}
