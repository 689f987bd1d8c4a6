//! Linear (constant sum) pool.

use crate::domain::{Amount, Rounding};
use crate::error::Result;
use crate::math::{mul_up, CheckedArithmetic};
use crate::traits::{BasePool, PoolSwapParams};

/// A pool whose invariant is the sum of its live balances.
///
/// Every token trades 1:1 in scaled18 terms, so the pool's price is purely
/// the ratio of token rates.  Useful as a linear sub-pool and wherever a
/// test needs exact, rounding-free pool math.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::{Amount, Rounding};
/// use hydra_vault::pools::ConstantSumPool;
/// use hydra_vault::traits::BasePool;
///
/// let pool = ConstantSumPool;
/// let inv = pool.compute_invariant(&[Amount::new(3), Amount::new(4)], Rounding::Down);
/// assert_eq!(inv, Ok(Amount::new(7)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantSumPool;

impl BasePool for ConstantSumPool {
    fn compute_invariant(&self, balances_scaled18: &[Amount], _rounding: Rounding) -> Result<Amount> {
        balances_scaled18
            .iter()
            .try_fold(Amount::ZERO, |acc, b| acc.safe_add(b))
    }

    fn compute_balance(
        &self,
        balances_scaled18: &[Amount],
        token_index: usize,
        invariant_ratio: Amount,
    ) -> Result<Amount> {
        let invariant = self.compute_invariant(balances_scaled18, Rounding::Up)?;
        let new_invariant = mul_up(invariant, invariant_ratio)?;
        let others = invariant.safe_sub(&balances_scaled18[token_index])?;
        new_invariant.safe_sub(&others)
    }

    fn on_swap(&self, params: &PoolSwapParams<'_>) -> Result<Amount> {
        Ok(params.amount_given_scaled18)
    }
}
