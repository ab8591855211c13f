//! Pool registry: the external entry points
//!
//! Holds one [`PoolRecord`] per [`PoolKey`] and drives the collaborators.
//! Every operation computes its full result first, then runs its ledger
//! steps in order. If a step fails, the completed steps are reversed and the
//! record is left untouched, so a call either commits entirely or not at all.

use crate::collaborators::{AssetLedger, Holder, OrderBook, ShareLedger};
use crate::error::PoolError;
use crate::liquidity::{DepositLeg, LiquidityMath};
use crate::pool::{PoolKey, PoolRecord};
use crate::pool_traits::CurveType;
use crate::sampler::{PricePoint, RebalanceSampler};
use crate::swap::{SwapDirection, SwapMath, SwapOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tidepool_config::{PoolConfig, PoolLimits};
use tidepool_types::{AccountId, AssetId, AssetInfo, AssetPair, FixedPoint, DECIMAL_PLACES};
use tracing::{debug, info, warn};

/// Integer amounts moved by a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub lp_minted: u64,
    pub i_used: u64,
    pub q_used: u64,
    pub i_unused: u64,
    pub q_unused: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub lp_burned: u64,
    pub i_out: u64,
    pub q_out: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub direction: SwapDirection,
    /// Input taken into the pool, fee included
    pub amount_in: u64,
    pub amount_out: u64,
    /// Input returned because of the limit price
    pub unused_in: u64,
    pub fee_charged: FixedPoint,
}

/// One ledger mutation; each has an exact inverse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Transfer {
        asset: AssetId,
        from: Holder,
        to: Holder,
        amount: u64,
    },
    Mint {
        to: AccountId,
        amount: u64,
    },
    Burn {
        from: AccountId,
        amount: u64,
    },
}

impl Step {
    fn inverse(self) -> Self {
        match self {
            Step::Transfer {
                asset,
                from,
                to,
                amount,
            } => Step::Transfer {
                asset,
                from: to,
                to: from,
                amount,
            },
            Step::Mint { to, amount } => Step::Burn { from: to, amount },
            Step::Burn { from, amount } => Step::Mint { to: from, amount },
        }
    }

    fn amount(&self) -> u64 {
        match self {
            Step::Transfer { amount, .. }
            | Step::Mint { amount, .. }
            | Step::Burn { amount, .. } => *amount,
        }
    }
}

pub struct PoolRegistry<A, S, B> {
    config: PoolConfig,
    limits: PoolLimits,
    sampler: RebalanceSampler,
    fee_rate: FixedPoint,
    pools: BTreeMap<PoolKey, PoolRecord>,
    assets: A,
    shares: S,
    book: B,
}

impl<A, S, B> PoolRegistry<A, S, B>
where
    A: AssetLedger,
    S: ShareLedger,
    B: OrderBook,
{
    pub fn new(config: PoolConfig, assets: A, shares: S, book: B) -> Result<Self, PoolError> {
        let limits = config
            .limits()
            .map_err(|err| PoolError::InvalidConfig(format!("{:#}", err)))?;
        let sampler = RebalanceSampler::from_config(&config);
        let fee_rate = FixedPoint::from_bps(config.fee_bps);
        Ok(Self {
            config,
            limits,
            sampler,
            fee_rate,
            pools: BTreeMap::new(),
            assets,
            shares,
            book,
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    pub fn shares(&self) -> &S {
        &self.shares
    }

    pub fn book(&self) -> &B {
        &self.book
    }

    pub fn pool(&self, key: &PoolKey) -> Result<&PoolRecord, PoolError> {
        self.pools.get(key).ok_or(PoolError::PoolDoesNotExist(*key))
    }

    pub fn pools(&self) -> impl Iterator<Item = &PoolRecord> {
        self.pools.values()
    }

    /// Current price of I in units of Q
    pub fn marginal_price(&self, key: &PoolKey) -> Result<FixedPoint, PoolError> {
        self.pool(key)?.marginal_price()
    }

    /// Register an empty pool for `(asset_i, asset_q, curve_tag)`
    ///
    /// Only the configured administrator may create pools, and the combined
    /// decimal count of the two assets must stay below the configured limit.
    pub fn create_pool(
        &mut self,
        caller: AccountId,
        asset_i: AssetId,
        asset_q: AssetId,
        curve_tag: u8,
    ) -> Result<PoolKey, PoolError> {
        if caller != self.config.admin {
            warn!(%caller, "pool creation refused");
            return Err(PoolError::NotAllowed { caller });
        }
        let curve = CurveType::from_tag(curve_tag)?;
        let pair = AssetPair::new(asset_i, asset_q)?;
        let i = self.asset_info(pair.i)?;
        let q = self.asset_info(pair.q)?;

        let max = self.config.max_combined_decimals;
        let combined = u16::from(i.decimals) + u16::from(q.decimals);
        if combined >= u16::from(max) || i.decimals > DECIMAL_PLACES || q.decimals > DECIMAL_PLACES
        {
            return Err(PoolError::UnsupportedDecimalPlaces {
                i_decimals: i.decimals,
                q_decimals: q.decimals,
                max,
            });
        }

        let key = PoolKey::new(pair.i, pair.q, curve);
        if self.pools.contains_key(&key) {
            return Err(PoolError::PoolExists(key));
        }
        self.pools.insert(key, PoolRecord::new(key, i.decimals, q.decimals));
        info!(pool = %key, i_decimals = i.decimals, q_decimals = q.decimals, "pool created");
        Ok(key)
    }

    /// Deposit up to `i_amt`/`q_amt` and mint shares to `caller`
    pub fn deposit(
        &mut self,
        caller: AccountId,
        key: &PoolKey,
        i_amt: u64,
        q_amt: u64,
    ) -> Result<DepositReceipt, PoolError> {
        let record = *self.pool(key)?;
        let i_amt = FixedPoint::from_u64(i_amt, record.i_decimals)?;
        let q_amt = FixedPoint::from_u64(q_amt, record.q_decimals)?;
        let i = DepositLeg::new(record.i_reserve(), i_amt);
        let q = DepositLeg::new(record.q_reserve(), q_amt);

        let outcome = LiquidityMath::deposit(&self.limits, record.lp_supply, i, q)?;

        let receipt = DepositReceipt {
            lp_minted: outcome.lp_minted.to_u64_trunc(self.limits.lp_decimals)?,
            i_used: outcome.i_used.to_u64_round_up(record.i_decimals)?,
            q_used: outcome.q_used.to_u64_round_up(record.q_decimals)?,
            i_unused: outcome.i_unused.to_u64_trunc(record.i_decimals)?,
            q_unused: outcome.q_unused.to_u64_trunc(record.q_decimals)?,
        };

        let mut updated = record;
        updated.i_supply = record.i_supply.add(outcome.i_used)?;
        updated.q_supply = record.q_supply.add(outcome.q_used)?;
        updated.lp_supply = record.lp_supply.add(outcome.lp_minted)?;
        updated.check_invariants(&self.limits)?;

        let user = Holder::Account(caller);
        let pool = Holder::Pool(*key);
        self.run_steps(
            key,
            &[
                Step::Transfer {
                    asset: key.asset_i,
                    from: user,
                    to: pool,
                    amount: receipt.i_used,
                },
                Step::Transfer {
                    asset: key.asset_q,
                    from: user,
                    to: pool,
                    amount: receipt.q_used,
                },
                Step::Mint {
                    to: caller,
                    amount: receipt.lp_minted,
                },
            ],
        )?;

        self.pools.insert(*key, updated);
        info!(
            pool = %key,
            %caller,
            lp_minted = receipt.lp_minted,
            i_used = receipt.i_used,
            q_used = receipt.q_used,
            i_unused = receipt.i_unused,
            q_unused = receipt.q_unused,
            "deposit"
        );
        Ok(receipt)
    }

    /// Burn `lp_amt` of `caller`'s shares and pay out the pro-rata reserves
    pub fn withdraw(
        &mut self,
        caller: AccountId,
        key: &PoolKey,
        lp_amt: u64,
    ) -> Result<WithdrawReceipt, PoolError> {
        let record = *self.pool(key)?;
        let lp_burn = FixedPoint::from_u64(lp_amt, self.limits.lp_decimals)?;
        let outcome = LiquidityMath::withdraw(
            lp_burn,
            record.lp_supply,
            record.i_reserve(),
            record.q_reserve(),
        )?;

        let receipt = WithdrawReceipt {
            lp_burned: lp_amt,
            i_out: outcome.i_out.to_u64_trunc(record.i_decimals)?,
            q_out: outcome.q_out.to_u64_trunc(record.q_decimals)?,
        };

        let mut updated = record;
        updated.i_supply = record.i_supply.sub(outcome.i_out)?;
        updated.q_supply = record.q_supply.sub(outcome.q_out)?;
        updated.lp_supply = record.lp_supply.sub(lp_burn)?;
        updated.check_invariants(&self.limits)?;

        let user = Holder::Account(caller);
        let pool = Holder::Pool(*key);
        self.run_steps(
            key,
            &[
                Step::Burn {
                    from: caller,
                    amount: lp_amt,
                },
                Step::Transfer {
                    asset: key.asset_i,
                    from: pool,
                    to: user,
                    amount: receipt.i_out,
                },
                Step::Transfer {
                    asset: key.asset_q,
                    from: pool,
                    to: user,
                    amount: receipt.q_out,
                },
            ],
        )?;

        self.pools.insert(*key, updated);
        info!(
            pool = %key,
            %caller,
            lp_burned = lp_amt,
            i_out = receipt.i_out,
            q_out = receipt.q_out,
            "withdraw"
        );
        Ok(receipt)
    }

    /// Price a swap against the live reserves without committing it
    pub fn quote_swap(
        &self,
        key: &PoolKey,
        direction: SwapDirection,
        amount_in: u64,
        limit_price: FixedPoint,
    ) -> Result<SwapOutcome, PoolError> {
        let record = self.pool(key)?;
        let (x, y) = direction.orient(record.i_reserve(), record.q_reserve());
        let x_in = FixedPoint::from_u64(amount_in, x.decimals)?;
        let curve = key.curve.curve(record.i_supply, record.q_supply)?;
        SwapMath::swap(&curve, x, y, x_in, self.fee_rate, limit_price)
    }

    /// Exact-in swap; the fee stays in the pool
    pub fn swap(
        &mut self,
        caller: AccountId,
        key: &PoolKey,
        direction: SwapDirection,
        amount_in: u64,
        limit_price: FixedPoint,
    ) -> Result<SwapReceipt, PoolError> {
        let record = *self.pool(key)?;
        let outcome = self.quote_swap(key, direction, amount_in, limit_price)?;
        let (x, y) = direction.orient(record.i_reserve(), record.q_reserve());
        let (new_x, new_y) = outcome.apply(x.supply, y.supply)?;

        let (asset_in, asset_out) = match direction {
            SwapDirection::IForQ => (key.asset_i, key.asset_q),
            SwapDirection::QForI => (key.asset_q, key.asset_i),
        };
        let receipt = SwapReceipt {
            direction,
            amount_in: outcome.x_used.to_u64_round_up(x.decimals)?,
            amount_out: outcome.y_out.to_u64_trunc(y.decimals)?,
            unused_in: outcome.unused_x_in.to_u64_trunc(x.decimals)?,
            fee_charged: outcome.fee_charged,
        };

        if receipt.amount_in == 0 {
            debug!(pool = %key, %caller, "swap fully clipped by limit price");
            return Ok(receipt);
        }

        let mut updated = record;
        match direction {
            SwapDirection::IForQ => {
                updated.i_supply = new_x;
                updated.q_supply = new_y;
            }
            SwapDirection::QForI => {
                updated.q_supply = new_x;
                updated.i_supply = new_y;
            }
        }
        updated.check_invariants(&self.limits)?;

        let user = Holder::Account(caller);
        let pool = Holder::Pool(*key);
        self.run_steps(
            key,
            &[
                Step::Transfer {
                    asset: asset_in,
                    from: user,
                    to: pool,
                    amount: receipt.amount_in,
                },
                Step::Transfer {
                    asset: asset_out,
                    from: pool,
                    to: user,
                    amount: receipt.amount_out,
                },
            ],
        )?;

        self.pools.insert(*key, updated);
        info!(
            pool = %key,
            %caller,
            ?direction,
            amount_in = receipt.amount_in,
            amount_out = receipt.amount_out,
            unused_in = receipt.unused_in,
            fee = %receipt.fee_charged,
            "swap"
        );
        Ok(receipt)
    }

    /// Replace the pool's resting orders with a fresh sample of its curve
    ///
    /// The ladder is computed before anything is cancelled, so a sampling
    /// failure leaves the existing orders in place.
    pub fn rebalance(
        &mut self,
        caller: AccountId,
        key: &PoolKey,
    ) -> Result<Vec<PricePoint>, PoolError> {
        let record = *self.pool(key)?;
        if !record.is_initialized() {
            return Err(PoolError::InvalidSupply);
        }
        let points = self
            .sampler
            .sample(key.curve, record.i_reserve(), record.q_reserve())?;

        self.book.cancel_all(key);
        for point in &points {
            self.book.place(key, *point);
        }
        info!(pool = %key, %caller, orders = points.len(), "rebalanced");
        Ok(points)
    }

    /// Every pool record, in key order
    pub fn snapshot(&self) -> Vec<PoolRecord> {
        self.pools.values().copied().collect()
    }

    /// Replace all pool records; nothing changes if any record is invalid
    pub fn restore(&mut self, records: Vec<PoolRecord>) -> Result<(), PoolError> {
        let mut pools = BTreeMap::new();
        for record in records {
            record.check_invariants(&self.limits)?;
            if pools.insert(record.key, record).is_some() {
                return Err(PoolError::PoolExists(record.key));
            }
        }
        info!(pools = pools.len(), "pool records restored");
        self.pools = pools;
        Ok(())
    }

    /// Check that ledger custody and share supply match the pool record
    pub fn reconcile(&self, key: &PoolKey) -> Result<(), PoolError> {
        let record = self.pool(key)?;
        let custody = Holder::Pool(*key);
        let expected = [
            (
                record.i_supply.to_u64_trunc(record.i_decimals)?,
                self.assets.balance_of(key.asset_i, custody),
            ),
            (
                record.q_supply.to_u64_trunc(record.q_decimals)?,
                self.assets.balance_of(key.asset_q, custody),
            ),
            (
                record.lp_supply.to_u64_trunc(self.limits.lp_decimals)?,
                self.shares.total_supply(key),
            ),
        ];
        if expected.iter().any(|(recorded, held)| recorded != held) {
            warn!(pool = %key, ?expected, "pool record out of sync with ledgers");
            return Err(PoolError::InvalidSupply);
        }
        Ok(())
    }

    fn asset_info(&self, asset: AssetId) -> Result<AssetInfo, PoolError> {
        let decimals = self
            .assets
            .decimals(asset)
            .map_err(|_| PoolError::UnknownAsset(asset))?;
        Ok(AssetInfo::new(asset, decimals))
    }

    fn apply_step(&mut self, key: &PoolKey, step: Step) -> Result<(), PoolError> {
        match step {
            Step::Transfer {
                asset,
                from,
                to,
                amount,
            } => self.assets.transfer(asset, from, to, amount)?,
            Step::Mint { to, amount } => self.shares.mint(key, to, amount)?,
            Step::Burn { from, amount } => self.shares.burn(key, from, amount)?,
        }
        Ok(())
    }

    /// Run `steps` in order; on failure reverse the completed ones
    fn run_steps(&mut self, key: &PoolKey, steps: &[Step]) -> Result<(), PoolError> {
        for (index, step) in steps.iter().enumerate() {
            if step.amount() == 0 {
                continue;
            }
            if let Err(err) = self.apply_step(key, *step) {
                warn!(pool = %key, ?step, error = %err, "ledger step failed, rolling back");
                for done in steps[..index].iter().rev().filter(|s| s.amount() != 0) {
                    if let Err(undo_err) = self.apply_step(key, done.inverse()) {
                        warn!(pool = %key, step = ?done, error = %undo_err, "rollback step failed");
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}
