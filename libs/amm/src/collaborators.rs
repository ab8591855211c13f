//! External collaborator interfaces
//!
//! The engine never owns token balances. Asset custody, LP share supply and
//! resting orders live behind these traits so the registry can run against
//! an on-ledger backend or the in-memory implementations in [`crate::memory`].
//!
//! Ledger amounts are integer token units at the asset's own decimal count;
//! share amounts are integer units at the configured LP decimal count.

use crate::pool::PoolKey;
use crate::sampler::PricePoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tidepool_types::{AccountId, AssetId};

/// Owner of an asset balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Holder {
    Account(AccountId),
    /// Custody account of a pool
    Pool(PoolKey),
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Holder::Account(account) => write!(f, "{}", account),
            Holder::Pool(key) => write!(f, "pool({})", key),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance: needed {needed}, available {available}")]
    InsufficientBalance { needed: u64, available: u64 },

    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),

    #[error("supply overflow")]
    SupplyOverflow,

    #[error("rejected: {0}")]
    Rejected(String),
}

/// Custody of the two pooled assets
pub trait AssetLedger {
    /// Decimal places of a registered asset
    fn decimals(&self, asset: AssetId) -> Result<u8, LedgerError>;

    fn transfer(
        &mut self,
        asset: AssetId,
        from: Holder,
        to: Holder,
        amount: u64,
    ) -> Result<(), LedgerError>;

    fn balance_of(&self, asset: AssetId, holder: Holder) -> u64;
}

/// LP share supply, one share class per pool
pub trait ShareLedger {
    fn mint(&mut self, pool: &PoolKey, to: AccountId, amount: u64) -> Result<(), LedgerError>;

    fn burn(&mut self, pool: &PoolKey, from: AccountId, amount: u64) -> Result<(), LedgerError>;

    fn total_supply(&self, pool: &PoolKey) -> u64;

    fn balance_of(&self, pool: &PoolKey, holder: AccountId) -> u64;
}

/// External order book receiving the rebalance ladder
///
/// Placement and cancellation cannot fail from the pool's point of view;
/// the book handles its own rejections.
pub trait OrderBook {
    fn cancel_all(&mut self, pool: &PoolKey);

    fn place(&mut self, pool: &PoolKey, order: PricePoint);
}
