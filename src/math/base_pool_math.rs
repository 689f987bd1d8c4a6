//! Pool-agnostic liquidity math.
//!
//! Proportional operations need only balances and the BPT supply.  The
//! unbalanced and single-token variants go through the pool's invariant
//! callbacks.  Every function rounds against the user: BPT minted and
//! tokens paid out round down, BPT burned and tokens pulled in round up.
//! All balances and token amounts are live scaled18.

use super::{div_down, div_up, mul_div_amount, mul_down, mul_up, CheckedArithmetic, ONE};
use crate::domain::{Amount, Rounding};
use crate::error::{Result, VaultError};
use crate::traits::BasePool;

/// Token amounts required to mint `bpt_amount_out`, rounded up.
///
/// # Errors
///
/// [`VaultError::DivisionByZero`] for a zero supply.
pub fn compute_proportional_amounts_in(
    balances: &[Amount],
    total_supply: Amount,
    bpt_amount_out: Amount,
) -> Result<Vec<Amount>> {
    balances
        .iter()
        .map(|b| mul_div_amount(*b, bpt_amount_out, total_supply, Rounding::Up))
        .collect()
}

/// Token amounts returned for burning `bpt_amount_in`, rounded down.
///
/// # Errors
///
/// [`VaultError::DivisionByZero`] for a zero supply.
pub fn compute_proportional_amounts_out(
    balances: &[Amount],
    total_supply: Amount,
    bpt_amount_in: Amount,
) -> Result<Vec<Amount>> {
    balances
        .iter()
        .map(|b| mul_div_amount(*b, bpt_amount_in, total_supply, Rounding::Down))
        .collect()
}

/// BPT minted for adding `exact_amounts` on top of `balances`.
///
/// # Errors
///
/// Pool or arithmetic errors; [`VaultError::Underflow`] if the invariant
/// does not grow.
pub fn compute_add_liquidity_unbalanced(
    pool: &dyn BasePool,
    balances: &[Amount],
    exact_amounts: &[Amount],
    total_supply: Amount,
) -> Result<Amount> {
    let new_balances = balances
        .iter()
        .zip(exact_amounts)
        .map(|(b, a)| b.safe_add(a))
        .collect::<Result<Vec<_>>>()?;

    let current_invariant = pool.compute_invariant(balances, Rounding::Up)?;
    let new_invariant = pool.compute_invariant(&new_balances, Rounding::Down)?;
    let ratio = div_down(new_invariant, current_invariant)?;
    let growth = ratio
        .checked_sub(&Amount::new(ONE))
        .ok_or(VaultError::Underflow("invariant decreased on unbalanced add"))?;
    mul_down(total_supply, growth)
}

/// Amount of `token_index` required to mint exactly `bpt_amount_out`.
///
/// # Errors
///
/// Pool or arithmetic errors.
pub fn compute_add_liquidity_single_token_exact_out(
    pool: &dyn BasePool,
    balances: &[Amount],
    token_index: usize,
    bpt_amount_out: Amount,
    total_supply: Amount,
) -> Result<Amount> {
    let new_supply = total_supply.safe_add(&bpt_amount_out)?;
    let ratio = div_up(new_supply, total_supply)?;
    let new_balance = pool.compute_balance(balances, token_index, ratio)?;
    new_balance.safe_sub(&balances[token_index])
}

/// Amount of `token_index` returned for burning exactly `bpt_amount_in`.
///
/// # Errors
///
/// Pool or arithmetic errors.
pub fn compute_remove_liquidity_single_token_exact_in(
    pool: &dyn BasePool,
    balances: &[Amount],
    token_index: usize,
    bpt_amount_in: Amount,
    total_supply: Amount,
) -> Result<Amount> {
    let remaining = total_supply.safe_sub(&bpt_amount_in)?;
    let ratio = div_up(remaining, total_supply)?;
    let new_balance = pool.compute_balance(balances, token_index, ratio)?;
    balances[token_index].safe_sub(&new_balance)
}

/// BPT burned to receive exactly `amount_out` of `token_index`.
///
/// # Errors
///
/// Pool or arithmetic errors; [`VaultError::Underflow`] if `amount_out`
/// exceeds the balance.
pub fn compute_remove_liquidity_single_token_exact_out(
    pool: &dyn BasePool,
    balances: &[Amount],
    token_index: usize,
    amount_out: Amount,
    total_supply: Amount,
) -> Result<Amount> {
    let mut new_balances = balances.to_vec();
    new_balances[token_index] = new_balances[token_index].safe_sub(&amount_out)?;

    let current_invariant = pool.compute_invariant(balances, Rounding::Up)?;
    let new_invariant = pool.compute_invariant(&new_balances, Rounding::Down)?;
    let ratio = div_down(new_invariant, current_invariant)?;
    let complement = Amount::new(ONE).safe_sub(&ratio)?;
    mul_up(total_supply, complement)
}
