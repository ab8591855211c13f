//! Error types for fixed-point arithmetic and identifier validation
//!
//! Every arithmetic failure is a distinct variant so callers can abort an
//! operation with an enumerable reason instead of clamping.

use thiserror::Error;

/// Errors that can occur during typed ID validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// ID value is null/zero when non-null required
    #[error("ID cannot be null/zero")]
    NullId,

    /// Both sides of a pair refer to the same asset
    #[error("asset pair must contain two distinct assets, got {asset} twice")]
    DuplicateAsset { asset: u64 },
}

/// Errors that can occur during fixed-point arithmetic operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    /// Result exceeds the maximum representable value
    #[error("Overflow: result of {op} exceeds maximum representable value")]
    Overflow { op: &'static str },

    /// Subtraction would produce a negative value
    #[error("Underflow: cannot subtract {rhs} from {lhs}")]
    Underflow { lhs: u128, rhs: u128 },

    /// Division by zero in fixed-point arithmetic
    #[error("Division by zero in fixed-point arithmetic")]
    DivisionByZero,

    /// Decimal count is larger than the internal scale can hold losslessly
    #[error("Unsupported decimal places: {decimals} (max {max})")]
    UnsupportedDecimals { decimals: u8, max: u8 },

    /// Invalid decimal string format
    #[error("Invalid decimal string: '{input}' - expected non-negative numeric format")]
    InvalidDecimal { input: String },

    /// Value cannot be represented exactly at the internal scale
    #[error("Precision loss: '{input}' has more fractional digits than the internal scale")]
    PrecisionLoss { input: String },
}
