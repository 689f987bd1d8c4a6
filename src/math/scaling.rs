//! Conversions between raw token amounts and live scaled18 amounts.
//!
//! `scaled18 = raw * scaling_factor * rate / 1e18`, where the scaling factor
//! is `10^(18 - decimals)` and the rate is 18-decimal (1e18 for standard
//! tokens).  Each direction exists in both roundings so callers can round
//! against the user.

use alloy_primitives::U256;

use super::{mul_div, ONE};
use crate::domain::{Amount, Rounding};
use crate::error::{Result, VaultError};

fn scale(raw: Amount, scaling_factor: u128) -> Result<u128> {
    raw.get()
        .checked_mul(scaling_factor)
        .ok_or(VaultError::Overflow("decimal scaling overflow"))
}

/// `scaled * 1e18 / (scaling_factor * rate)`, with the divisor kept in
/// 256 bits.
fn undo_rate(
    scaled: Amount,
    scaling_factor: u128,
    rate: Amount,
    rounding: Rounding,
) -> Result<Amount> {
    if scaling_factor == 1 {
        return mul_div(scaled.get(), ONE, rate.get(), rounding).map(Amount::new);
    }
    let divisor = U256::from(scaling_factor) * U256::from(rate.get());
    if divisor.is_zero() {
        return Err(VaultError::DivisionByZero);
    }
    let numerator = U256::from(scaled.get()) * U256::from(ONE);
    let (quotient, remainder) = numerator.div_rem(divisor);
    let quotient = if rounding.is_up() && !remainder.is_zero() {
        quotient + U256::from(1u8)
    } else {
        quotient
    };
    u128::try_from(quotient)
        .map(Amount::new)
        .map_err(|_| VaultError::Overflow("undo rate result exceeds u128"))
}

/// Raw to scaled18, rounded down.
///
/// # Errors
///
/// [`VaultError::Overflow`] if the scaled value exceeds `u128`.
pub fn to_scaled18_apply_rate_round_down(
    raw: Amount,
    scaling_factor: u128,
    rate: Amount,
) -> Result<Amount> {
    mul_div(scale(raw, scaling_factor)?, rate.get(), ONE, Rounding::Down).map(Amount::new)
}

/// Raw to scaled18, rounded up.
///
/// # Errors
///
/// [`VaultError::Overflow`] if the scaled value exceeds `u128`.
pub fn to_scaled18_apply_rate_round_up(
    raw: Amount,
    scaling_factor: u128,
    rate: Amount,
) -> Result<Amount> {
    mul_div(scale(raw, scaling_factor)?, rate.get(), ONE, Rounding::Up).map(Amount::new)
}

/// Scaled18 to raw, rounded down.
///
/// # Errors
///
/// [`VaultError::DivisionByZero`] for a zero rate, [`VaultError::Overflow`]
/// if the raw value exceeds `u128`.
pub fn to_raw_undo_rate_round_down(
    scaled: Amount,
    scaling_factor: u128,
    rate: Amount,
) -> Result<Amount> {
    undo_rate(scaled, scaling_factor, rate, Rounding::Down)
}

/// Scaled18 to raw, rounded up.
///
/// # Errors
///
/// [`VaultError::DivisionByZero`] for a zero rate, [`VaultError::Overflow`]
/// if the raw value exceeds `u128`.
pub fn to_raw_undo_rate_round_up(
    scaled: Amount,
    scaling_factor: u128,
    rate: Amount,
) -> Result<Amount> {
    undo_rate(scaled, scaling_factor, rate, Rounding::Up)
}

/// Raw to scaled18 with an explicit rounding.
///
/// # Errors
///
/// See [`to_scaled18_apply_rate_round_down`].
pub fn to_scaled18(
    raw: Amount,
    scaling_factor: u128,
    rate: Amount,
    rounding: Rounding,
) -> Result<Amount> {
    match rounding {
        Rounding::Down => to_scaled18_apply_rate_round_down(raw, scaling_factor, rate),
        Rounding::Up => to_scaled18_apply_rate_round_up(raw, scaling_factor, rate),
    }
}

/// Scaled18 to raw with an explicit rounding.
///
/// # Errors
///
/// See [`to_raw_undo_rate_round_down`].
pub fn to_raw(
    scaled: Amount,
    scaling_factor: u128,
    rate: Amount,
    rounding: Rounding,
) -> Result<Amount> {
    match rounding {
        Rounding::Down => to_raw_undo_rate_round_down(scaled, scaling_factor, rate),
        Rounding::Up => to_raw_undo_rate_round_up(scaled, scaling_factor, rate),
    }
}
