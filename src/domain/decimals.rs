//! Token decimal places.

use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// Maximum allowed decimal places.
const MAX_DECIMALS: u8 = 18;

/// Number of decimal places of a token.
///
/// Valid range is `0..=18`.  The vault normalizes every raw balance to 18
/// decimals by multiplying with [`scaling_factor`](Decimals::scaling_factor).
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::Decimals;
///
/// let usdc = Decimals::new(6).expect("6 is valid");
/// assert_eq!(usdc.scaling_factor(), 1_000_000_000_000);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Decimals(u8);

impl Default for Decimals {
    fn default() -> Self {
        Self::MAX
    }
}

impl Decimals {
    /// Eighteen decimal places; the scaled18 representation itself.
    pub const MAX: Self = Self(MAX_DECIMALS);

    /// Creates a new `Decimals` value after validating the range.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] if `value` exceeds 18.
    pub const fn new(value: u8) -> Result<Self, VaultError> {
        if value > MAX_DECIMALS {
            return Err(VaultError::InvalidConfiguration("decimals must be 0..=18"));
        }
        Ok(Self(value))
    }

    /// Returns the raw decimal count.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Returns `10^(18 - decimals)`, the multiplier from raw units to
    /// 18-decimal units.
    #[must_use]
    pub const fn scaling_factor(&self) -> u128 {
        10u128.pow((MAX_DECIMALS - self.0) as u32)
    }
}

impl TryFrom<u8> for Decimals {
    type Error = VaultError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Decimals> for u8 {
    fn from(value: Decimals) -> Self {
        value.0
    }
}
