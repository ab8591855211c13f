//! Pool error types
//!
//! Every failure aborts the whole operation. Variants are grouped into
//! [`ErrorCategory`] so callers can tell a bad request from an arithmetic
//! limit or an economically pointless trade.

use crate::collaborators::LedgerError;
use crate::pool::PoolKey;
use thiserror::Error;
use tidepool_types::{AccountId, AssetId, FixedPoint, FixedPointError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Zero/absent reserves, bad caller, missing or duplicate pool, bad config
    Precondition,
    /// Division by zero, underflow, overflow or configured ceilings
    Arithmetic,
    /// Operations that would move zero value or seed a one-sided pool
    Economic,
    /// Token ledger refused a transfer, mint or burn
    Collaborator,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PoolError {
    #[error("pool {0} already exists")]
    PoolExists(PoolKey),

    #[error("pool {0} does not exist")]
    PoolDoesNotExist(PoolKey),

    #[error("caller {caller} is not allowed to perform this operation")]
    NotAllowed { caller: AccountId },

    #[error("invalid pool type tag {0}")]
    InvalidPoolType(u8),

    #[error("unsupported decimals: I={i_decimals}, Q={q_decimals}, sum must be below {max}")]
    UnsupportedDecimalPlaces { i_decimals: u8, q_decimals: u8, max: u8 },

    #[error("asset {0} is not known to the ledger")]
    UnknownAsset(AssetId),

    #[error("invalid asset pair: {0}")]
    InvalidAssetPair(#[from] ValidationError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("pool reserves and share supply are inconsistent")]
    InvalidSupply,

    #[error("input-side reserve is zero")]
    InvalidXSupply,

    #[error("output-side reserve is zero")]
    InvalidYSupply,

    #[error("swap input amount is zero")]
    InvalidXAmt,

    #[error("fee rate {0} must be below 1")]
    InvalidFeeRate(FixedPoint),

    #[error("invalid LP token amount {requested} (supply {supply})")]
    InvalidLpTokenAmount { requested: FixedPoint, supply: FixedPoint },

    #[error(transparent)]
    Arithmetic(#[from] FixedPointError),

    #[error("pool reserve would exceed the configured maximum coin count")]
    MaxPoolCoinReached,

    #[error("LP supply would exceed the configured maximum")]
    MaxLPReached,

    #[error("cannot initialize a pool with a zero amount of either asset")]
    InitWithZeroAsset,

    #[error("deposit is too small to mint any LP tokens")]
    DepositPrecisionLoss,

    #[error("withdrawal is too small to return a non-zero amount of each asset")]
    WithdrawPrecisionLoss,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl PoolError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PoolError::PoolExists(_)
            | PoolError::PoolDoesNotExist(_)
            | PoolError::NotAllowed { .. }
            | PoolError::InvalidPoolType(_)
            | PoolError::UnsupportedDecimalPlaces { .. }
            | PoolError::UnknownAsset(_)
            | PoolError::InvalidAssetPair(_)
            | PoolError::InvalidConfig(_)
            | PoolError::InvalidSupply
            | PoolError::InvalidXSupply
            | PoolError::InvalidYSupply
            | PoolError::InvalidXAmt
            | PoolError::InvalidFeeRate(_)
            | PoolError::InvalidLpTokenAmount { .. } => ErrorCategory::Precondition,
            PoolError::Arithmetic(_) | PoolError::MaxPoolCoinReached | PoolError::MaxLPReached => {
                ErrorCategory::Arithmetic
            }
            PoolError::InitWithZeroAsset
            | PoolError::DepositPrecisionLoss
            | PoolError::WithdrawPrecisionLoss => ErrorCategory::Economic,
            PoolError::Ledger(_) => ErrorCategory::Collaborator,
        }
    }
}
