//! Arithmetic for the vault accounting core.
//!
//! - [`div_round`] and [`CheckedArithmetic`]: narrow checked primitives.
//! - [`mul_div`], [`mul_down`], [`mul_up`], [`div_down`], [`div_up`]:
//!   18-decimal fixed point with a 256-bit intermediate.
//! - [`scaling`]: raw to live scaled18 conversions and back.
//! - [`base_pool_math`]: proportional, unbalanced and single-token
//!   liquidity math over a pool's invariant callbacks.

pub mod base_pool_math;
mod checked;
mod fixed_point;
mod rounding;
pub mod scaling;

pub use checked::CheckedArithmetic;
pub use fixed_point::{div_down, div_up, mul_div, mul_div_amount, mul_down, mul_up, ONE};
pub use rounding::div_round;
