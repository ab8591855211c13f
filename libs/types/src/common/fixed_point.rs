//! Unsigned fixed-point arithmetic for pool accounting
//!
//! [`FixedPoint`] stores a non-negative decimal value as a `u128` scaled by
//! `10^10`. Every multiply and divide names its rounding direction so the
//! caller decides which party absorbs the residual:
//!
//! - **Truncate** when computing what the pool *owes*
//! - **Round up** when computing what the pool must *receive*
//!
//! Products are formed at full 256-bit width before being reduced back to the
//! internal scale, so `multiply_*` and `divide_*` are exact up to the final
//! rounding step and only fail when the *result* is not representable.
//!
//! ## Design Principles
//!
//! - **No Precision Loss**: integer storage, no floating point anywhere
//! - **Overflow Protection**: every fallible operation returns [`FixedPointError`]
//! - **Explicit Rounding**: no operation picks a rounding mode implicitly

use crate::common::errors::FixedPointError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of fractional decimal digits held internally
pub const DECIMAL_PLACES: u8 = 10;

/// Scale factor for [`DECIMAL_PLACES`]
pub const SCALE: u128 = 10_000_000_000;

const LOW_MASK: u128 = u64::MAX as u128;

/// Direction applied to the residual of an inexact operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Toward zero
    Trunc,
    /// Away from zero
    Up,
}

/// Non-negative decimal with 10 fractional digits
///
/// Examples:
/// - 1 = FixedPoint(10_000_000_000)
/// - 0.0001 = FixedPoint(1_000_000)
/// - 0.0000000001 = FixedPoint(1), the smallest non-zero value
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FixedPoint(u128);

impl FixedPoint {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// One whole unit
    pub const ONE: Self = Self(SCALE);

    /// Largest representable value
    pub const MAX: Self = Self(u128::MAX);

    /// Create from the raw scaled integer
    #[inline]
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Get the raw scaled integer value
    #[inline]
    pub const fn raw_value(self) -> u128 {
        self.0
    }

    /// Whole units with no fractional part. Never overflows for a `u64` input.
    #[inline]
    pub const fn from_integer(value: u64) -> Self {
        Self(value as u128 * SCALE)
    }

    /// Fraction expressed in basis points (1 bps = 0.0001)
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Self(bps as u128 * (SCALE / 10_000))
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert an integer token amount with `decimals` fractional digits
    ///
    /// `from_u64(1_500_000, 6)` is 1.5. Lossless for every supported decimal
    /// count.
    pub fn from_u64(value: u64, decimals: u8) -> Result<Self, FixedPointError> {
        let factor = scale_gap(decimals)?;
        // u64::MAX * 10^10 < u128::MAX, so this cannot overflow
        Ok(Self(value as u128 * factor))
    }

    /// Integer amount at `decimals` places, dropping any finer residual
    pub fn to_u64_trunc(self, decimals: u8) -> Result<u64, FixedPointError> {
        let factor = scale_gap(decimals)?;
        u64::try_from(self.0 / factor).map_err(|_| FixedPointError::Overflow { op: "to_u64" })
    }

    /// Integer amount at `decimals` places, rounding any finer residual up
    pub fn to_u64_round_up(self, decimals: u8) -> Result<u64, FixedPointError> {
        let factor = scale_gap(decimals)?;
        let units = self.0 / factor + u128::from(self.0 % factor != 0);
        u64::try_from(units).map_err(|_| FixedPointError::Overflow { op: "to_u64" })
    }

    /// Drop every digit finer than `decimals` places
    pub fn trunc_to(self, decimals: u8) -> Result<Self, FixedPointError> {
        let factor = scale_gap(decimals)?;
        Ok(Self(self.0 - self.0 % factor))
    }

    /// Round up to the next multiple of `10^-decimals`
    pub fn round_up_to(self, decimals: u8) -> Result<Self, FixedPointError> {
        let factor = scale_gap(decimals)?;
        match self.0 % factor {
            0 => Ok(self),
            residual => self
                .0
                .checked_add(factor - residual)
                .map(Self)
                .ok_or(FixedPointError::Overflow { op: "round_up_to" }),
        }
    }

    pub fn add(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(FixedPointError::Overflow { op: "add" })
    }

    /// Fails with `Underflow` if `rhs > self`
    pub fn sub(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.0.checked_sub(rhs.0).map(Self).ok_or(FixedPointError::Underflow {
            lhs: self.0,
            rhs: rhs.0,
        })
    }

    /// `self - rhs`, or zero when `rhs > self`
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    pub fn multiply_trunc(self, rhs: Self) -> Result<Self, FixedPointError> {
        mul_div(self.0, rhs.0, SCALE, Rounding::Trunc, "multiply").map(Self)
    }

    pub fn multiply_round_up(self, rhs: Self) -> Result<Self, FixedPointError> {
        mul_div(self.0, rhs.0, SCALE, Rounding::Up, "multiply").map(Self)
    }

    pub fn divide_trunc(self, rhs: Self) -> Result<Self, FixedPointError> {
        mul_div(self.0, SCALE, rhs.0, Rounding::Trunc, "divide").map(Self)
    }

    pub fn divide_round_up(self, rhs: Self) -> Result<Self, FixedPointError> {
        mul_div(self.0, SCALE, rhs.0, Rounding::Up, "divide").map(Self)
    }

    /// `self * num / den` with a single rounding step at the end
    ///
    /// Used where two chained operations would round twice, e.g. share
    /// accounting `amount * lp_supply / reserve`.
    pub fn mul_div(
        self,
        num: Self,
        den: Self,
        rounding: Rounding,
    ) -> Result<Self, FixedPointError> {
        mul_div(self.0, num.0, den.0, rounding, "mul_div").map(Self)
    }

    /// Floor of the square root at the internal scale
    ///
    /// Monotonic in its input and never above the true root. Only used for
    /// curve sampling and the stable-swap root, never for balance output.
    pub fn sqrt_approx(self) -> Self {
        // sqrt(raw / S) * S == sqrt(raw * S)
        let (hi, lo) = widening_mul(self.0, SCALE);
        Self(isqrt_wide(hi, lo))
    }

    /// Parse an exact decimal string such as `"0.025"`
    pub fn from_decimal_str(s: &str) -> Result<Self, FixedPointError> {
        let decimal = Decimal::from_str(s).map_err(|_| FixedPointError::InvalidDecimal {
            input: s.to_string(),
        })?;
        Self::try_from_decimal(decimal).map_err(|err| match err {
            FixedPointError::Overflow { .. } => err,
            FixedPointError::PrecisionLoss { .. } => FixedPointError::PrecisionLoss {
                input: s.to_string(),
            },
            _ => FixedPointError::InvalidDecimal {
                input: s.to_string(),
            },
        })
    }

    /// Exact conversion from a [`Decimal`]; negative values are rejected
    pub fn try_from_decimal(value: Decimal) -> Result<Self, FixedPointError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(FixedPointError::InvalidDecimal {
                input: value.to_string(),
            });
        }
        let value = value.normalize();
        let scale = value.scale();
        if scale > DECIMAL_PLACES as u32 {
            return Err(FixedPointError::PrecisionLoss {
                input: value.to_string(),
            });
        }
        let mantissa = value.mantissa().unsigned_abs();
        mantissa
            .checked_mul(pow10(DECIMAL_PLACES - scale as u8))
            .map(Self)
            .ok_or(FixedPointError::Overflow { op: "from_decimal" })
    }

    /// Convert to a [`Decimal`] for reporting; fails above ~7.9e18 whole units
    pub fn to_decimal(self) -> Result<Decimal, FixedPointError> {
        let raw = i128::try_from(self.0)
            .map_err(|_| FixedPointError::Overflow { op: "to_decimal" })?;
        Decimal::try_from_i128_with_scale(raw, DECIMAL_PLACES as u32)
            .map(|d| d.normalize())
            .map_err(|_| FixedPointError::Overflow { op: "to_decimal" })
    }
}

/// Exact decimal expansion for logging
impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:010}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl FromStr for FixedPoint {
    type Err = FixedPointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

const fn pow10(exp: u8) -> u128 {
    let mut value = 1u128;
    let mut i = 0;
    while i < exp {
        value *= 10;
        i += 1;
    }
    value
}

/// Raw units per integer unit at `decimals` places
fn scale_gap(decimals: u8) -> Result<u128, FixedPointError> {
    if decimals > DECIMAL_PLACES {
        return Err(FixedPointError::UnsupportedDecimals {
            decimals,
            max: DECIMAL_PLACES,
        });
    }
    Ok(pow10(DECIMAL_PLACES - decimals))
}

/// Full 256-bit product as (high, low) words
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LOW_MASK);
    let (b1, b0) = (b >> 64, b & LOW_MASK);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    // < 3 * 2^64, cannot overflow
    let mid = (p00 >> 64) + (p01 & LOW_MASK) + (p10 & LOW_MASK);
    let lo = (p00 & LOW_MASK) | (mid << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

/// `a * b / d` computed at 256-bit width, rounded once
fn mul_div(
    a: u128,
    b: u128,
    d: u128,
    rounding: Rounding,
    op: &'static str,
) -> Result<u128, FixedPointError> {
    if d == 0 {
        return Err(FixedPointError::DivisionByZero);
    }
    let (hi, lo) = widening_mul(a, b);
    if hi >= d {
        return Err(FixedPointError::Overflow { op });
    }

    // Restoring long division; rem < d holds at the top of every step
    let mut rem = hi;
    let mut quo = 0u128;
    for bit in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> bit) & 1);
        quo <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quo |= 1;
        }
    }

    match rounding {
        Rounding::Up if rem != 0 => quo.checked_add(1).ok_or(FixedPointError::Overflow { op }),
        _ => Ok(quo),
    }
}

/// Floor square root of a 256-bit value
fn isqrt_wide(hi: u128, lo: u128) -> u128 {
    let (mut low, mut high) = (0u128, u128::MAX);
    while low < high {
        // upper midpoint so the loop always makes progress
        let mid = low + (high - low) / 2 + (high - low) % 2;
        if widening_mul(mid, mid) <= (hi, lo) {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}
