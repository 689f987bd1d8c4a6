//! Reference pool implementations of [`BasePool`](crate::traits::BasePool).
//!
//! The vault is agnostic to pool math; anything implementing the trait
//! can be registered.  [`ConstantSumPool`] ships as the linear reference.

mod constant_sum;

pub use constant_sum::ConstantSumPool;
