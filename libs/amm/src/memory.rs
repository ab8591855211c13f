//! In-memory collaborators for tests and simulation

use crate::collaborators::{AssetLedger, Holder, LedgerError, OrderBook, ShareLedger};
use crate::pool::PoolKey;
use crate::sampler::PricePoint;
use std::collections::{HashMap, HashSet};
use tidepool_types::{AccountId, AssetId};

#[derive(Debug, Default, Clone)]
pub struct InMemoryAssetLedger {
    decimals: HashMap<AssetId, u8>,
    balances: HashMap<(AssetId, Holder), u64>,
    frozen: HashSet<(AssetId, Holder)>,
}

impl InMemoryAssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_asset(&mut self, asset: AssetId, decimals: u8) {
        self.decimals.insert(asset, decimals);
    }

    /// Mint `amount` straight into `holder`'s balance
    pub fn credit(
        &mut self,
        asset: AssetId,
        holder: Holder,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if !self.decimals.contains_key(&asset) {
            return Err(LedgerError::UnknownAsset(asset));
        }
        let balance = self.balances.entry((asset, holder)).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::SupplyOverflow)?;
        Ok(())
    }

    /// Reject every later transfer of `asset` out of `holder`
    pub fn freeze(&mut self, asset: AssetId, holder: Holder) {
        self.frozen.insert((asset, holder));
    }

    pub fn unfreeze(&mut self, asset: AssetId, holder: Holder) {
        self.frozen.remove(&(asset, holder));
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn decimals(&self, asset: AssetId) -> Result<u8, LedgerError> {
        self.decimals
            .get(&asset)
            .copied()
            .ok_or(LedgerError::UnknownAsset(asset))
    }

    fn transfer(
        &mut self,
        asset: AssetId,
        from: Holder,
        to: Holder,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if !self.decimals.contains_key(&asset) {
            return Err(LedgerError::UnknownAsset(asset));
        }
        if self.frozen.contains(&(asset, from)) {
            return Err(LedgerError::Rejected(format!("{} is frozen for {}", from, asset)));
        }
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let receiving = self.balance_of(asset, to);
        let credited = receiving.checked_add(amount).ok_or(LedgerError::SupplyOverflow)?;

        self.balances.insert((asset, from), available - amount);
        self.balances.insert((asset, to), credited);
        Ok(())
    }

    fn balance_of(&self, asset: AssetId, holder: Holder) -> u64 {
        self.balances.get(&(asset, holder)).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryShareLedger {
    supply: HashMap<PoolKey, u64>,
    balances: HashMap<(PoolKey, AccountId), u64>,
}

impl InMemoryShareLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShareLedger for InMemoryShareLedger {
    fn mint(&mut self, pool: &PoolKey, to: AccountId, amount: u64) -> Result<(), LedgerError> {
        let supply = self.total_supply(pool);
        let new_supply = supply.checked_add(amount).ok_or(LedgerError::SupplyOverflow)?;
        let new_balance = self
            .balance_of(pool, to)
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;

        self.supply.insert(*pool, new_supply);
        self.balances.insert((*pool, to), new_balance);
        Ok(())
    }

    fn burn(&mut self, pool: &PoolKey, from: AccountId, amount: u64) -> Result<(), LedgerError> {
        let available = self.balance_of(pool, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        let supply = self.total_supply(pool);
        self.balances.insert((*pool, from), available - amount);
        self.supply.insert(*pool, supply.saturating_sub(amount));
        Ok(())
    }

    fn total_supply(&self, pool: &PoolKey) -> u64 {
        self.supply.get(pool).copied().unwrap_or(0)
    }

    fn balance_of(&self, pool: &PoolKey, holder: AccountId) -> u64 {
        self.balances.get(&(*pool, holder)).copied().unwrap_or(0)
    }
}

/// Order book that keeps the latest ladder per pool and counts cancellations
#[derive(Debug, Default, Clone)]
pub struct RecordingOrderBook {
    resting: HashMap<PoolKey, Vec<PricePoint>>,
    cancellations: HashMap<PoolKey, usize>,
}

impl RecordingOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resting(&self, pool: &PoolKey) -> &[PricePoint] {
        self.resting.get(pool).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cancellations(&self, pool: &PoolKey) -> usize {
        self.cancellations.get(pool).copied().unwrap_or(0)
    }
}

impl OrderBook for RecordingOrderBook {
    fn cancel_all(&mut self, pool: &PoolKey) {
        self.resting.remove(pool);
        *self.cancellations.entry(*pool).or_insert(0) += 1;
    }

    fn place(&mut self, pool: &PoolKey, order: PricePoint) {
        self.resting.entry(*pool).or_default().push(order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool_traits::CurveType;

    const USDC: AssetId = AssetId::new(1);
    const ALICE: Holder = Holder::Account(AccountId::new(7));
    const BOB: Holder = Holder::Account(AccountId::new(8));

    #[test]
    fn test_asset_transfer() {
        let mut ledger = InMemoryAssetLedger::new();
        ledger.register_asset(USDC, 6);
        ledger.credit(USDC, ALICE, 100).unwrap();

        ledger.transfer(USDC, ALICE, BOB, 40).unwrap();
        assert_eq!(ledger.balance_of(USDC, ALICE), 60);
        assert_eq!(ledger.balance_of(USDC, BOB), 40);

        assert_eq!(
            ledger.transfer(USDC, ALICE, BOB, 61),
            Err(LedgerError::InsufficientBalance {
                needed: 61,
                available: 60
            })
        );
        assert_eq!(
            ledger.transfer(AssetId::new(2), ALICE, BOB, 1),
            Err(LedgerError::UnknownAsset(AssetId::new(2)))
        );
    }

    #[test]
    fn test_frozen_holder() {
        let mut ledger = InMemoryAssetLedger::new();
        ledger.register_asset(USDC, 6);
        ledger.credit(USDC, ALICE, 100).unwrap();
        ledger.freeze(USDC, ALICE);
        assert!(matches!(
            ledger.transfer(USDC, ALICE, BOB, 1),
            Err(LedgerError::Rejected(_))
        ));
        ledger.unfreeze(USDC, ALICE);
        ledger.transfer(USDC, ALICE, BOB, 1).unwrap();
    }

    #[test]
    fn test_share_mint_burn() {
        let pool = PoolKey::new(USDC, AssetId::new(2), CurveType::StableSwap);
        let alice = AccountId::new(7);
        let mut shares = InMemoryShareLedger::new();

        shares.mint(&pool, alice, 1_000).unwrap();
        shares.burn(&pool, alice, 400).unwrap();
        assert_eq!(shares.total_supply(&pool), 600);
        assert_eq!(shares.balance_of(&pool, alice), 600);
        assert!(shares.burn(&pool, alice, 601).is_err());
    }
}
