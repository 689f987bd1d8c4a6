//! Checked arithmetic trait for domain wrapper types.
//!
//! The [`CheckedArithmetic`] trait provides fallible arithmetic that returns
//! [`Result<Self, VaultError>`](crate::error::VaultError) instead of
//! panicking on overflow, underflow, or division by zero.
//!
//! # Examples
//!
//! ```
//! use hydra_vault::domain::Amount;
//! use hydra_vault::math::CheckedArithmetic;
//!
//! let a = Amount::new(100);
//! let b = Amount::new(200);
//! assert!(a.safe_add(&b).is_ok());
//! assert!(a.safe_sub(&b).is_err());
//! ```

use crate::domain::{Amount, Rounding};
use crate::error::VaultError;

/// Fallible arithmetic for domain wrapper types.
///
/// # Contract
///
/// - **No panics**: all error conditions produce `Err`.
/// - **No saturation**: errors propagate instead.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the result exceeds the
    /// representable range.
    fn safe_add(&self, other: &Self) -> Result<Self, VaultError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Underflow`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self, VaultError>;

    /// Checked multiplication.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Overflow`] if the result exceeds the
    /// representable range.
    fn safe_mul(&self, other: &Self) -> Result<Self, VaultError>;

    /// Checked division with explicit [`Rounding`] direction.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::DivisionByZero`] if `other` is zero.
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, VaultError>;

    /// Applies a signed delta.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Underflow`] if the result would be negative
    /// and [`VaultError::Overflow`] if it exceeds the range.
    fn safe_add_signed(&self, delta: i128) -> Result<Self, VaultError>;
}

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, VaultError> {
        self.checked_add(other)
            .ok_or(VaultError::Overflow("amount addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, VaultError> {
        self.checked_sub(other)
            .ok_or(VaultError::Underflow("amount subtraction underflow"))
    }

    #[inline]
    fn safe_mul(&self, other: &Self) -> Result<Self, VaultError> {
        self.checked_mul(other)
            .ok_or(VaultError::Overflow("amount multiplication overflow"))
    }

    #[inline]
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, VaultError> {
        self.checked_div(other, rounding)
            .ok_or(VaultError::DivisionByZero)
    }

    fn safe_add_signed(&self, delta: i128) -> Result<Self, VaultError> {
        self.checked_add_signed(delta).ok_or(if delta < 0 {
            VaultError::Underflow("signed delta underflow")
        } else {
            VaultError::Overflow("signed delta overflow")
        })
    }
}
