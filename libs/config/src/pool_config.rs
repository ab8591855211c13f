//! Pool Configuration Module
//!
//! Loads pool parameters from TOML files with environment variable overrides.
//! Every field has a default, so an empty file yields a usable configuration.

use crate::defaults;
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tidepool_types::{AccountId, FixedPoint, DECIMAL_PLACES};
use tracing::{debug, info};

/// Main pool configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    /// Only this account may create pools
    pub admin: AccountId,

    /// Swap fee charged on the input side, in basis points
    pub fee_bps: u32,

    /// Decimal places of minted LP share amounts
    pub lp_decimals: u8,

    /// Shares minted by the first deposit, in whole shares
    pub initial_lp_supply: u64,

    /// Per-reserve ceiling, in whole units
    pub max_pool_coins: u64,

    /// Outstanding share ceiling, in whole shares
    pub max_lp_supply: u64,

    /// Largest accepted `decimals(I) + decimals(Q)`
    pub max_combined_decimals: u8,

    /// Rebalance price-curve sampling grid
    pub sampler: SamplerConfig,
}

/// Fractions of a reserve simulated by the rebalance sampler
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SamplerConfig {
    /// Strictly increasing, each in `1..=10_000` basis points
    pub fractions_bps: Vec<u32>,
}

/// Engine-side ceilings derived from [`PoolConfig`], already at fixed-point scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    pub max_pool_coins: FixedPoint,
    pub max_lp_supply: FixedPoint,
    pub initial_lp_supply: FixedPoint,
    pub lp_decimals: u8,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            admin: AccountId::new(0),
            fee_bps: defaults::FEE_BPS,
            lp_decimals: defaults::LP_DECIMALS,
            initial_lp_supply: defaults::INITIAL_LP_SUPPLY,
            max_pool_coins: defaults::MAX_POOL_COINS,
            max_lp_supply: defaults::MAX_LP_SUPPLY,
            max_combined_decimals: defaults::MAX_COMBINED_DECIMALS,
            sampler: SamplerConfig::default(),
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            fractions_bps: defaults::SAMPLE_FRACTIONS_BPS.to_vec(),
        }
    }
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_pool_coins: FixedPoint::from_integer(defaults::MAX_POOL_COINS),
            max_lp_supply: FixedPoint::from_integer(defaults::MAX_LP_SUPPLY),
            initial_lp_supply: FixedPoint::from_integer(defaults::INITIAL_LP_SUPPLY),
            lp_decimals: defaults::LP_DECIMALS,
        }
    }
}

impl PoolConfig {
    /// Load configuration from a TOML file with `TIDEPOOL_*` environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading pool config: {:?}", path);

        let builder = Config::builder()
            .add_source(File::from(path).required(true))
            // TIDEPOOL_FEE_BPS, TIDEPOOL_SAMPLER__FRACTIONS_BPS
            .add_source(
                Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(?config, "pool config loaded");
        Ok(config)
    }

    /// Parse inline TOML without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse pool config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.fee_bps >= 10_000 {
            bail!("fee_bps must be below 10000, got {}", self.fee_bps);
        }
        if self.lp_decimals > DECIMAL_PLACES {
            bail!(
                "lp_decimals must be at most {}, got {}",
                DECIMAL_PLACES,
                self.lp_decimals
            );
        }
        if self.max_pool_coins == 0 || self.max_lp_supply == 0 {
            bail!("max_pool_coins and max_lp_supply must be non-zero");
        }
        if self.initial_lp_supply == 0 || self.initial_lp_supply > self.max_lp_supply {
            bail!(
                "initial_lp_supply must be in 1..={}, got {}",
                self.max_lp_supply,
                self.initial_lp_supply
            );
        }
        if self.max_combined_decimals > 2 * DECIMAL_PLACES {
            bail!(
                "max_combined_decimals must be at most {}, got {}",
                2 * DECIMAL_PLACES,
                self.max_combined_decimals
            );
        }
        self.sampler.validate()
    }

    /// Ceilings at fixed-point scale
    pub fn limits(&self) -> Result<PoolLimits> {
        self.validate()?;
        Ok(PoolLimits {
            max_pool_coins: FixedPoint::from_integer(self.max_pool_coins),
            max_lp_supply: FixedPoint::from_integer(self.max_lp_supply),
            initial_lp_supply: FixedPoint::from_integer(self.initial_lp_supply),
            lp_decimals: self.lp_decimals,
        })
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fractions_bps.is_empty() {
            bail!("sampler.fractions_bps must not be empty");
        }
        if self.fractions_bps.iter().any(|&bps| bps == 0 || bps > 10_000) {
            bail!("sampler.fractions_bps entries must be in 1..=10000");
        }
        if self.fractions_bps.windows(2).any(|pair| pair[0] >= pair[1]) {
            bail!("sampler.fractions_bps must be strictly increasing");
        }
        Ok(())
    }

    /// Fractions as fixed-point values, in configured order
    pub fn fractions(&self) -> Vec<FixedPoint> {
        self.fractions_bps
            .iter()
            .map(|&bps| FixedPoint::from_bps(bps))
            .collect()
    }
}

/// Convenience function to load configuration from the default location
pub fn load_config() -> Result<PoolConfig> {
    PoolConfig::load(Path::new("config/pool.toml"))
}
