//! Sign-magnitude wrapper over [`FixedPoint`]
//!
//! The stable-swap invariant `x - A/x + y - A/y` goes negative when a reserve
//! is small relative to the amplification, while the fixed-point type is
//! unsigned. Only the handful of operations the curve needs are provided.

use std::cmp::Ordering;
use std::fmt;
use tidepool_types::{FixedPoint, FixedPointError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignedFixed {
    negative: bool,
    magnitude: FixedPoint,
}

impl SignedFixed {
    pub const ZERO: Self = Self {
        negative: false,
        magnitude: FixedPoint::ZERO,
    };

    pub const fn positive(magnitude: FixedPoint) -> Self {
        Self {
            negative: false,
            magnitude,
        }
    }

    pub fn negative(magnitude: FixedPoint) -> Self {
        // zero is always non-negative so equality stays structural
        Self {
            negative: !magnitude.is_zero(),
            magnitude,
        }
    }

    pub const fn is_negative(self) -> bool {
        self.negative
    }

    pub const fn magnitude(self) -> FixedPoint {
        self.magnitude
    }

    pub fn negate(self) -> Self {
        if self.negative {
            Self::positive(self.magnitude)
        } else {
            Self::negative(self.magnitude)
        }
    }

    pub fn add(self, rhs: Self) -> Result<Self, FixedPointError> {
        if self.negative == rhs.negative {
            let magnitude = self.magnitude.add(rhs.magnitude)?;
            return Ok(if self.negative {
                Self::negative(magnitude)
            } else {
                Self::positive(magnitude)
            });
        }
        // opposite signs: the larger magnitude wins
        let (larger, smaller) = if self.magnitude >= rhs.magnitude {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let magnitude = larger.magnitude.sub(smaller.magnitude)?;
        Ok(if larger.negative {
            Self::negative(magnitude)
        } else {
            Self::positive(magnitude)
        })
    }

    pub fn sub(self, rhs: Self) -> Result<Self, FixedPointError> {
        self.add(rhs.negate())
    }
}

impl From<FixedPoint> for SignedFixed {
    fn from(value: FixedPoint) -> Self {
        Self::positive(value)
    }
}

impl Ord for SignedFixed {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for SignedFixed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SignedFixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}
