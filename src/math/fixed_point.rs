//! 18-decimal fixed-point arithmetic.
//!
//! Products are formed in 256 bits and divided back down, so `a * b / c`
//! never loses precision to an intermediate overflow.  Results that do not
//! fit in `u128` fail with [`VaultError::Overflow`].

use alloy_primitives::U256;

use super::div_round;
use crate::domain::{Amount, Rounding};
use crate::error::{Result, VaultError};

/// `1.0` in 18-decimal fixed point.
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// Computes `a * b / denominator` with the requested rounding.
///
/// # Errors
///
/// [`VaultError::DivisionByZero`] for a zero denominator,
/// [`VaultError::Overflow`] if the quotient exceeds `u128`.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::Rounding;
/// use hydra_vault::math::mul_div;
///
/// // The product overflows u128 but the quotient does not.
/// let big = u128::MAX / 2;
/// assert_eq!(mul_div(big, 4, 2, Rounding::Down), Ok(big * 2));
/// assert_eq!(mul_div(10, 1, 3, Rounding::Up), Ok(4));
/// ```
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Result<u128> {
    if denominator == 0 {
        return Err(VaultError::DivisionByZero);
    }
    if let Some(product) = a.checked_mul(b) {
        return div_round(product, denominator, rounding).ok_or(VaultError::DivisionByZero);
    }

    let product = U256::from(a) * U256::from(b);
    let (quotient, remainder) = product.div_rem(U256::from(denominator));
    let quotient = if rounding.is_up() && !remainder.is_zero() {
        quotient
            .checked_add(U256::from(1u8))
            .ok_or(VaultError::Overflow("mul_div rounding overflow"))?
    } else {
        quotient
    };
    u128::try_from(quotient).map_err(|_| VaultError::Overflow("mul_div result exceeds u128"))
}

/// `a * b / denominator` over amounts.
///
/// # Errors
///
/// See [`mul_div`].
pub fn mul_div_amount(
    a: Amount,
    b: Amount,
    denominator: Amount,
    rounding: Rounding,
) -> Result<Amount> {
    mul_div(a.get(), b.get(), denominator.get(), rounding).map(Amount::new)
}

/// Fixed-point product rounded down.
///
/// # Errors
///
/// [`VaultError::Overflow`] if the result exceeds `u128`.
pub fn mul_down(a: Amount, b: Amount) -> Result<Amount> {
    mul_div(a.get(), b.get(), ONE, Rounding::Down).map(Amount::new)
}

/// Fixed-point product rounded up.
///
/// # Errors
///
/// [`VaultError::Overflow`] if the result exceeds `u128`.
pub fn mul_up(a: Amount, b: Amount) -> Result<Amount> {
    mul_div(a.get(), b.get(), ONE, Rounding::Up).map(Amount::new)
}

/// Fixed-point quotient rounded down.
///
/// # Errors
///
/// [`VaultError::DivisionByZero`] or [`VaultError::Overflow`].
pub fn div_down(a: Amount, b: Amount) -> Result<Amount> {
    mul_div(a.get(), ONE, b.get(), Rounding::Down).map(Amount::new)
}

/// Fixed-point quotient rounded up.
///
/// # Errors
///
/// [`VaultError::DivisionByZero`] or [`VaultError::Overflow`].
pub fn div_up(a: Amount, b: Amount) -> Result<Amount> {
    mul_div(a.get(), ONE, b.get(), Rounding::Up).map(Amount::new)
}
