//! # Typed Identifiers
//!
//! Zero-cost wrappers around `u64` for the identities the pool engine passes
//! to its collaborators. Distinct types keep an asset id from being handed
//! where an account id is expected.
//!
//! ```rust
//! use tidepool_types::{AccountId, AssetId};
//!
//! let usdc = AssetId::new(2);
//! let alice = AccountId::new(7);
//! assert_ne!(usdc.inner(), 0);
//! assert_eq!(alice.to_string(), "AccountId#7");
//! ```

use crate::common::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Macro for generating zero-cost typed ID wrappers
///
/// Creates a new type that wraps `u64` with complete type safety while maintaining
/// identical runtime layout.
#[macro_export]
macro_rules! define_typed_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize
        )]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new typed ID
            #[inline(always)]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Create a new typed ID, rejecting the null value
            #[inline]
            pub fn new_validated(id: u64) -> Result<Self, $crate::common::errors::ValidationError> {
                if id == 0 {
                    return Err($crate::common::errors::ValidationError::NullId);
                }
                Ok(Self(id))
            }

            /// Extract the inner u64 value
            #[inline(always)]
            pub const fn inner(&self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }

        impl From<u64> for $name {
            #[inline(always)]
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            #[inline(always)]
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

define_typed_id!(
    /// Fungible asset type held by a pool or a ledger account
    AssetId
);

define_typed_id!(
    /// Caller identity; compared for equality against the pool administrator
    AccountId
);

/// Asset identity plus the decimal count of its integer amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetInfo {
    pub id: AssetId,
    pub decimals: u8,
}

impl AssetInfo {
    pub const fn new(id: AssetId, decimals: u8) -> Self {
        Self { id, decimals }
    }
}

/// Ordered (I, Q) asset pair; the two sides must differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetPair {
    pub i: AssetId,
    pub q: AssetId,
}

impl AssetPair {
    pub fn new(i: AssetId, q: AssetId) -> Result<Self, ValidationError> {
        if i == q {
            return Err(ValidationError::DuplicateAsset { asset: i.inner() });
        }
        Ok(Self { i, q })
    }
}
