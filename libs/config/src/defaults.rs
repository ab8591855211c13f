//! Default values for pool configuration
//!
//! Kept in one place so the config loader, the engine and tests agree on
//! what an unconfigured pool looks like.

/// Swap fee in basis points (0.01%)
pub const FEE_BPS: u32 = 1;

/// Decimal places of LP share amounts
pub const LP_DECIMALS: u8 = 6;

/// Shares minted by the first deposit into an empty pool, in whole shares
pub const INITIAL_LP_SUPPLY: u64 = 1_000;

/// Per-reserve ceiling, in whole units.
///
/// Keeps `k = x * y` and the stable-swap discriminant far below the
/// `u128` range of the fixed-point type.
pub const MAX_POOL_COINS: u64 = 1_000_000_000;

/// Ceiling on outstanding LP shares, in whole shares
pub const MAX_LP_SUPPLY: u64 = 1_000_000_000_000;

/// Exclusive bound on `decimals(I) + decimals(Q)` at pool creation
pub const MAX_COMBINED_DECIMALS: u8 = 18;

/// Sampler fractions of the reserve, in basis points: 0.1%, 1%, 2% .. 10%
pub const SAMPLE_FRACTIONS_BPS: [u32; 11] = [10, 100, 200, 300, 400, 500, 600, 700, 800, 900, 1000];

/// Prefix for environment variable overrides (`TIDEPOOL_FEE_BPS=5`)
pub const ENV_PREFIX: &str = "TIDEPOOL";
