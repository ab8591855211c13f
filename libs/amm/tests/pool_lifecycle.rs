//! Pool Lifecycle Integration Tests
//!
//! Drives the registry end to end against the in-memory ledgers and checks
//! that custody, share supply and pool records stay in step.

use tidepool_amm::{
    AssetLedger, Holder, InMemoryAssetLedger, InMemoryShareLedger, OrderBook, PoolError, PoolKey,
    PoolRecord, PoolRegistry, RecordingOrderBook, ShareLedger, Side, SwapDirection,
};
use tidepool_config::PoolConfig;
use tidepool_types::{AccountId, AssetId, FixedPoint};

type Registry = PoolRegistry<InMemoryAssetLedger, InMemoryShareLedger, RecordingOrderBook>;

const ADMIN: AccountId = AccountId::new(1);
const ALICE: AccountId = AccountId::new(2);
const BOB: AccountId = AccountId::new(3);

const REEF: AssetId = AssetId::new(100);
const KELP: AssetId = AssetId::new(101);
const USDX: AssetId = AssetId::new(102);
const USDY: AssetId = AssetId::new(103);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("tidepool_amm=debug")
        .try_init();
}

fn fp(s: &str) -> FixedPoint {
    FixedPoint::from_decimal_str(s).unwrap()
}

fn config() -> PoolConfig {
    PoolConfig {
        admin: ADMIN,
        lp_decimals: 0,
        initial_lp_supply: 100,
        ..PoolConfig::default()
    }
}

fn registry_with(config: PoolConfig) -> Registry {
    init_tracing();
    let mut assets = InMemoryAssetLedger::new();
    assets.register_asset(REEF, 0);
    assets.register_asset(KELP, 0);
    assets.register_asset(USDX, 6);
    assets.register_asset(USDY, 6);
    for account in [ALICE, BOB] {
        let holder = Holder::Account(account);
        assets.credit(REEF, holder, 10_000).unwrap();
        assets.credit(KELP, holder, 10_000).unwrap();
        assets.credit(USDX, holder, 10_000_000_000).unwrap();
        assets.credit(USDY, holder, 10_000_000_000).unwrap();
    }
    let shares = InMemoryShareLedger::new();
    PoolRegistry::new(config, assets, shares, RecordingOrderBook::new()).unwrap()
}

/// Constant-product REEF/KELP pool seeded by ALICE with 500/250 for 100 shares
fn seeded() -> (Registry, PoolKey) {
    let mut registry = registry_with(config());
    let key = registry.create_pool(ADMIN, REEF, KELP, 0).unwrap();
    let receipt = registry.deposit(ALICE, &key, 500, 250).unwrap();
    assert_eq!(receipt.lp_minted, 100);
    (registry, key)
}

fn balance(registry: &Registry, asset: AssetId, account: AccountId) -> u64 {
    registry.assets().balance_of(asset, Holder::Account(account))
}

#[test]
fn test_first_deposit_mints_initial_supply() {
    let mut registry = registry_with(config());
    let key = registry.create_pool(ADMIN, REEF, KELP, 0).unwrap();

    let receipt = registry.deposit(ALICE, &key, 100, 100).unwrap();
    assert_eq!(receipt.lp_minted, 100);
    assert_eq!((receipt.i_unused, receipt.q_unused), (0, 0));
    assert_eq!(registry.shares().balance_of(&key, ALICE), 100);
    registry.reconcile(&key).unwrap();
}

#[test]
fn test_first_deposit_needs_both_assets() {
    let mut registry = registry_with(config());
    let key = registry.create_pool(ADMIN, REEF, KELP, 0).unwrap();

    assert_eq!(registry.deposit(ALICE, &key, 100, 0), Err(PoolError::InitWithZeroAsset));
    assert_eq!(balance(&registry, REEF, ALICE), 10_000);
    assert!(!registry.pool(&key).unwrap().is_initialized());
}

#[test]
fn test_proportional_deposit() {
    let (mut registry, key) = seeded();

    let receipt = registry.deposit(BOB, &key, 200, 100).unwrap();
    assert_eq!(receipt.lp_minted, 40);
    assert_eq!((receipt.i_unused, receipt.q_unused), (0, 0));

    let record = registry.pool(&key).unwrap();
    assert_eq!(record.i_supply, FixedPoint::from_integer(700));
    assert_eq!(record.q_supply, FixedPoint::from_integer(350));
    assert_eq!(record.lp_supply, FixedPoint::from_integer(140));
    registry.reconcile(&key).unwrap();
}

#[test]
fn test_excess_side_is_returned() {
    let (mut registry, key) = seeded();

    let receipt = registry.deposit(BOB, &key, 100, 100).unwrap();
    assert_eq!(receipt.lp_minted, 20);
    assert_eq!(receipt.q_used, 50);
    assert_eq!(receipt.q_unused, 50);
    assert_eq!(balance(&registry, KELP, BOB), 10_000 - 50);
    assert_eq!(balance(&registry, REEF, BOB), 10_000 - 100);
    registry.reconcile(&key).unwrap();
}

#[test]
fn test_swap_keeps_fee_in_pool() {
    let (mut registry, key) = seeded();

    let receipt = registry
        .swap(BOB, &key, SwapDirection::IForQ, 250, fp("100"))
        .unwrap();
    assert_eq!(receipt.fee_charged, fp("0.025"));
    assert_eq!(receipt.amount_in, 250);
    // 83.3277775925 truncated to whole KELP
    assert_eq!(receipt.amount_out, 83);
    assert_eq!(receipt.unused_in, 0);

    let record = registry.pool(&key).unwrap();
    assert_eq!(record.i_supply, FixedPoint::from_integer(750));
    assert_eq!(record.q_supply, FixedPoint::from_integer(167));
    assert_eq!(balance(&registry, KELP, BOB), 10_000 + 83);
    registry.reconcile(&key).unwrap();
}

#[test]
fn test_quote_matches_swap() {
    let (mut registry, key) = seeded();

    let quote = registry
        .quote_swap(&key, SwapDirection::QForI, 40, FixedPoint::ZERO)
        .unwrap();
    let receipt = registry
        .swap(BOB, &key, SwapDirection::QForI, 40, FixedPoint::ZERO)
        .unwrap();
    assert_eq!(FixedPoint::from_integer(receipt.amount_out), quote.y_out);
    assert_eq!(receipt.fee_charged, quote.fee_charged);
}

#[test]
fn test_swap_above_limit_is_a_no_op() {
    let (mut registry, key) = seeded();
    let before = registry.snapshot();

    let receipt = registry
        .swap(BOB, &key, SwapDirection::IForQ, 10, fp("2"))
        .unwrap();
    assert_eq!(receipt.unused_in, 10);
    assert_eq!(receipt.amount_out, 0);
    assert_eq!(registry.snapshot(), before);
    assert_eq!(balance(&registry, REEF, BOB), 10_000);
}

#[test]
fn test_swap_respects_reserve_ceiling() {
    let mut registry = registry_with(PoolConfig {
        max_pool_coins: 1_000,
        ..config()
    });
    let key = registry.create_pool(ADMIN, REEF, KELP, 0).unwrap();
    registry.deposit(ALICE, &key, 500, 250).unwrap();
    let before = registry.snapshot();

    assert_eq!(
        registry.swap(BOB, &key, SwapDirection::IForQ, 600, FixedPoint::ZERO),
        Err(PoolError::MaxPoolCoinReached)
    );
    assert_eq!(registry.snapshot(), before);
    assert_eq!(balance(&registry, REEF, BOB), 10_000);
}

#[test]
fn test_stable_swap_pool_trades_near_par() {
    let mut registry = registry_with(PoolConfig {
        lp_decimals: 6,
        ..config()
    });
    let key = registry.create_pool(ADMIN, USDX, USDY, 1).unwrap();
    registry
        .deposit(ALICE, &key, 1_000_000_000, 1_000_000_000)
        .unwrap();
    assert_eq!(registry.marginal_price(&key).unwrap(), FixedPoint::ONE);

    let receipt = registry
        .swap(BOB, &key, SwapDirection::IForQ, 10_000_000, FixedPoint::ZERO)
        .unwrap();
    assert!(receipt.amount_out > 9_900_000 && receipt.amount_out < 10_000_000);
    assert!(registry.marginal_price(&key).unwrap() < FixedPoint::ONE);
    registry.reconcile(&key).unwrap();
}

#[test]
fn test_withdraw_more_than_supply_changes_nothing() {
    let (mut registry, key) = seeded();
    let before = registry.snapshot();

    assert_eq!(
        registry.withdraw(ALICE, &key, 101),
        Err(PoolError::InvalidLpTokenAmount {
            requested: FixedPoint::from_integer(101),
            supply: FixedPoint::from_integer(100),
        })
    );
    assert_eq!(registry.snapshot(), before);
    assert_eq!(registry.shares().balance_of(&key, ALICE), 100);
}

#[test]
fn test_partial_and_full_withdraw() {
    let (mut registry, key) = seeded();
    registry.deposit(BOB, &key, 200, 100).unwrap();

    let receipt = registry.withdraw(BOB, &key, 40).unwrap();
    assert_eq!((receipt.i_out, receipt.q_out), (200, 100));

    let receipt = registry.withdraw(ALICE, &key, 100).unwrap();
    assert_eq!((receipt.i_out, receipt.q_out), (500, 250));
    assert!(!registry.pool(&key).unwrap().is_initialized());
    assert_eq!(balance(&registry, REEF, ALICE), 10_000);
    registry.reconcile(&key).unwrap();

    // an emptied pool can be seeded again
    assert_eq!(registry.deposit(BOB, &key, 10, 10).unwrap().lp_minted, 100);
}

#[test]
fn test_withdraw_rolls_back_on_ledger_failure() {
    let (mut registry, key) = seeded();
    let before = registry.snapshot();
    registry.assets_mut().freeze(KELP, Holder::Pool(key));

    assert!(matches!(
        registry.withdraw(ALICE, &key, 50),
        Err(PoolError::Ledger(_))
    ));
    assert_eq!(registry.snapshot(), before);
    assert_eq!(registry.shares().balance_of(&key, ALICE), 100);
    assert_eq!(registry.shares().total_supply(&key), 100);
    assert_eq!(balance(&registry, REEF, ALICE), 10_000 - 500);
    registry.reconcile(&key).unwrap();
}

#[test]
fn test_rebalance_replaces_resting_orders() {
    let (mut registry, key) = seeded();
    let fractions = registry.config().sampler.fractions_bps.len();

    let points = registry.rebalance(BOB, &key).unwrap();
    assert_eq!(points.len(), 2 * fractions);
    assert_eq!(registry.book().resting(&key), points.as_slice());

    registry.swap(BOB, &key, SwapDirection::IForQ, 50, FixedPoint::ZERO).unwrap();
    let refreshed = registry.rebalance(BOB, &key).unwrap();
    assert_eq!(registry.book().cancellations(&key), 2);
    assert_eq!(registry.book().resting(&key), refreshed.as_slice());

    let mid = registry.marginal_price(&key).unwrap();
    for point in &refreshed {
        match point.side {
            Side::Buy => assert!(point.price < mid),
            Side::Sell => assert!(point.price > mid),
        }
    }
}

#[test]
fn test_rebalance_on_empty_pool_keeps_orders() {
    let mut registry = registry_with(config());
    let key = registry.create_pool(ADMIN, REEF, KELP, 0).unwrap();
    assert_eq!(registry.rebalance(BOB, &key), Err(PoolError::InvalidSupply));
    assert_eq!(registry.book().cancellations(&key), 0);
}

#[test]
fn test_snapshot_survives_serialization() {
    let (mut registry, key) = seeded();
    registry.swap(BOB, &key, SwapDirection::QForI, 30, FixedPoint::ZERO).unwrap();

    let json = serde_json::to_string(&registry.snapshot()).unwrap();
    let records: Vec<PoolRecord> = serde_json::from_str(&json).unwrap();

    let mut restored = registry_with(config());
    restored.restore(records).unwrap();
    assert_eq!(restored.pool(&key).unwrap(), registry.pool(&key).unwrap());
    assert_eq!(
        restored.marginal_price(&key).unwrap(),
        registry.marginal_price(&key).unwrap()
    );
}

#[test]
fn test_order_book_trait_is_object_safe() {
    let mut book = RecordingOrderBook::new();
    let key = PoolKey::new(REEF, KELP, tidepool_amm::CurveType::ConstantProduct);
    let dyn_book: &mut dyn OrderBook = &mut book;
    dyn_book.cancel_all(&key);
    assert_eq!(book.cancellations(&key), 1);
}
