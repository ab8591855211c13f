//! # Tidepool Types Library
//!
//! Value types shared by the Tidepool pool engine and its configuration layer.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: all amounts stored as scaled integers, never `f64`
//! - **Explicit Rounding**: every inexact operation names its rounding direction
//! - **Type Safety**: distinct id types keep assets and accounts from being mixed up
//!
//! ## Quick Start
//!
//! ```rust
//! use tidepool_types::FixedPoint;
//!
//! // 1.5 units of a 6-decimal token
//! let amount = FixedPoint::from_u64(1_500_000, 6).unwrap();
//! let fee = amount.multiply_round_up(FixedPoint::from_bps(30)).unwrap();
//! assert_eq!(fee.to_string(), "0.0045");
//!
//! // Pool never pays out below the integer granularity of the asset
//! assert_eq!(amount.to_u64_trunc(0).unwrap(), 1);
//! ```

pub mod common;

pub use common::errors::{FixedPointError, ValidationError};
pub use common::fixed_point::{FixedPoint, Rounding, DECIMAL_PLACES, SCALE};
pub use common::identifiers::{AccountId, AssetId, AssetInfo, AssetPair};
