//! # Tidepool AMM Library - Invariant Accounting Engine
//!
//! ## Purpose
//!
//! Exact fixed-point accounting for two-asset liquidity pools. Mints and burns
//! LP shares against pooled reserves, prices exact-in swaps on a
//! constant-product or stable-swap curve, and samples the curve into a ladder
//! of resting orders for an external order book. No floating point anywhere;
//! every rounding step favors the pool.
//!
//! ## Integration Points
//!
//! - **Input Sources**: caller requests through [`PoolRegistry`], limits and
//!   fees from [`tidepool_config::PoolConfig`]
//! - **Output Destinations**: token custody via [`AssetLedger`], share supply
//!   via [`ShareLedger`], resting orders via [`OrderBook`]
//! - **Curves**: [`CurveType::ConstantProduct`] (`x*y=k`) and
//!   [`CurveType::StableSwap`] (`x - A/x + y - A/y = D`, `A = 10*(x+y)`)
//!
//! ## Architecture Role
//!
//! ```text
//!   caller ──▶ PoolRegistry ──▶ LiquidityMath  (deposit / withdraw)
//!                  │        ──▶ SwapMath ──▶ Curve (ConstantProduct | StableSwap)
//!                  │        ──▶ RebalanceSampler ──▶ SwapMath::price_after_swap
//!                  ▼
//!     AssetLedger / ShareLedger / OrderBook
//! ```
//!
//! The math modules are pure: they take reserve values and return deltas.
//! Only the registry mutates a [`PoolRecord`], and only after every ledger
//! step of the operation has gone through.
//!
//! ## Rounding
//!
//! - Amounts the pool pays out are truncated (withdrawals, swap output,
//!   returned deposit excess)
//! - Amounts the pool receives are rounded up (swap fees, the matching side
//!   of a deposit, input clipped at a limit price)

pub mod collaborators;
pub mod constant_product;
pub mod error;
pub mod liquidity;
pub mod memory;
pub mod pool;
pub mod pool_traits;
pub mod registry;
pub mod sampler;
pub mod signed;
pub mod stable_swap;
pub mod swap;

pub use collaborators::{AssetLedger, Holder, LedgerError, OrderBook, ShareLedger};
pub use constant_product::ConstantProduct;
pub use error::{ErrorCategory, PoolError};
pub use liquidity::{DepositLeg, DepositOutcome, LiquidityMath, WithdrawOutcome};
pub use memory::{InMemoryAssetLedger, InMemoryShareLedger, RecordingOrderBook};
pub use pool::{PoolKey, PoolRecord, Reserve};
pub use pool_traits::{Curve, CurveType, InvariantCurve};
pub use registry::{DepositReceipt, PoolRegistry, SwapReceipt, WithdrawReceipt};
pub use sampler::{PricePoint, RebalanceSampler, Side};
pub use signed::SignedFixed;
pub use stable_swap::StableSwap;
pub use swap::{SwapDirection, SwapMath, SwapOutcome};

/// Common types for reporting
pub use rust_decimal::Decimal;
pub use tidepool_types::FixedPoint;
