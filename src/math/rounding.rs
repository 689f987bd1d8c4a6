//! Rounding helpers for integer division.
//!
//! [`div_round`] performs `u128` division with an explicit [`Rounding`]
//! direction.  It is the narrow fast path underneath
//! [`mul_div`](super::mul_div) and [`Amount::checked_div`](crate::domain::Amount::checked_div).
//!
//! # Convention
//!
//! **Always round against the user**:
//!
//! | Quantity | Direction |
//! |----------|-----------|
//! | Amount paid out, BPT or shares minted | [`Rounding::Down`] |
//! | Amount pulled in, BPT burned | [`Rounding::Up`] |
//!
//! # Examples
//!
//! ```
//! use hydra_vault::domain::Rounding;
//! use hydra_vault::math::div_round;
//!
//! assert_eq!(div_round(10, 3, Rounding::Down), Some(3));
//! assert_eq!(div_round(10, 3, Rounding::Up), Some(4));
//! assert_eq!(div_round(10, 0, Rounding::Down), None);
//! ```

use crate::domain::Rounding;

/// Integer division of `u128` values with explicit rounding direction.
///
/// Returns [`None`] if `denominator` is zero.
#[must_use]
pub const fn div_round(numerator: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let q = numerator / denominator;
    match rounding {
        Rounding::Down => Some(q),
        Rounding::Up => {
            // q < u128::MAX whenever the remainder is non-zero.
            if numerator % denominator != 0 {
                Some(q + 1)
            } else {
                Some(q)
            }
        }
    }
}
