//! Account and token identity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A 20-byte account identity.
///
/// Tokens, pools, wrappers, routers and the vault itself are all named by
/// an `Address`.  Ordering is lexicographic over the bytes, which is the
/// order pool tokens are registered in.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::Address;
///
/// let a = Address::repeat_byte(0x11);
/// assert_eq!(a.to_string(), "0x1111111111111111111111111111111111111111");
/// assert!(Address::ZERO.is_zero());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address.  Receives permanently locked BPT and buffer
    /// shares, and marks an invalid wrapper asset.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an `Address` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address with every byte set to `byte`.
    #[must_use]
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 20] {
        self.0
    }

    /// Returns `true` for the all-zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}
