//! # Tidepool Configuration
//!
//! Centralized pool configuration: fee schedule, supply ceilings, decimal
//! limits and the rebalance sampler grid.
//!
//! ## Usage
//!
//! ```rust
//! use tidepool_config::PoolConfig;
//!
//! let config = PoolConfig::from_toml_str("fee_bps = 30\nadmin = 1").unwrap();
//! assert_eq!(config.fee_bps, 30);
//! let limits = config.limits().unwrap();
//! assert!(!limits.max_pool_coins.is_zero());
//! ```

pub mod defaults;
pub mod pool_config;

pub use pool_config::{load_config, PoolConfig, PoolLimits, SamplerConfig};
