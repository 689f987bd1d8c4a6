//! Token quantity newtype.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Rounding;

/// A non-negative token quantity in the smallest unit.
///
/// The same type carries raw (token-native decimals) and scaled18
/// (18-decimal, rate-adjusted) quantities; the surrounding API says which.
/// Arithmetic is checked and yields `None` instead of wrapping; the
/// [`CheckedArithmetic`](crate::math::CheckedArithmetic) trait turns those
/// into [`VaultError`](crate::error::VaultError)s.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::{Amount, Rounding};
///
/// let paid = Amount::new(150);
/// let owed = Amount::new(100);
/// assert_eq!(paid.checked_sub(&owed), Some(Amount::new(50)));
/// assert_eq!(owed.checked_add_signed(-40), Some(Amount::new(60)));
/// assert_eq!(paid.checked_div(&Amount::new(4), Rounding::Up), Some(Amount::new(38)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[must_use]
pub struct Amount(u128);

impl Amount {
    /// Nothing.
    pub const ZERO: Self = Self(0);

    /// Largest quantity; also used as "no limit".
    pub const MAX: Self = Self(u128::MAX);

    /// Wraps a quantity.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// The wrapped quantity.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// `true` for [`Amount::ZERO`].
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `self + other`, or `None` outside the `u128` range.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// `self - other`, or `None` outside the `u128` range.
    #[must_use]
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// `self * other`, or `None` outside the `u128` range.
    #[must_use]
    pub fn checked_mul(&self, other: &Self) -> Option<Self> {
        self.0.checked_mul(other.0).map(Self)
    }

    /// Division in the given direction; `None` for a zero divisor.
    #[must_use]
    pub fn checked_div(&self, divisor: &Self, rounding: Rounding) -> Option<Self> {
        crate::math::div_round(self.0, divisor.0, rounding).map(Self)
    }

    /// Adds a signed delta (debt positive, credit negative).  `None` if
    /// the result leaves the `u128` range.
    #[must_use]
    pub fn checked_add_signed(&self, delta: i128) -> Option<Self> {
        let magnitude = delta.unsigned_abs();
        if delta < 0 {
            self.0.checked_sub(magnitude).map(Self)
        } else {
            self.0.checked_add(magnitude).map(Self)
        }
    }

    /// The quantity as a signed delta; `None` above `i128::MAX`.
    #[must_use]
    pub fn to_signed(&self) -> Option<i128> {
        i128::try_from(self.0).ok()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}
