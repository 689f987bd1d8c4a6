//! Pool pricing callback consumed by the vault.
//!
//! [`BasePool`] is the only thing the vault needs from a pool: invariant
//! math for liquidity operations and a swap quote.  Balances handed to the
//! pool are always live scaled18 values pulled fresh for the operation.
//!
//! # Rounding contract
//!
//! - `compute_invariant` honours the requested [`Rounding`].
//! - `compute_balance` must round the returned balance **up**; the vault
//!   derives amounts out from it.
//! - `on_swap` returns the amount out for exact-in (the vault treats it
//!   as already rounded down) and the amount in for exact-out (already
//!   rounded up).

use core::fmt;

use crate::domain::{Amount, Rounding, SwapKind};
use crate::error::{Result, VaultError};

/// Swap request handed to [`BasePool::on_swap`].
#[derive(Debug, Clone, Copy)]
pub struct PoolSwapParams<'a> {
    /// Exactness of the trade.
    pub kind: SwapKind,
    /// Fixed side, scaled18.
    pub amount_given_scaled18: Amount,
    /// Live balances of every pool token, scaled18.
    pub balances_scaled18: &'a [Amount],
    /// Index of the token the vault receives.
    pub index_in: usize,
    /// Index of the token the vault pays out.
    pub index_out: usize,
}

/// Result of a custom add liquidity callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAddLiquidity {
    /// Amounts in per token, scaled18.
    pub amounts_in_scaled18: Vec<Amount>,
    /// BPT to mint.
    pub bpt_amount_out: Amount,
    /// Opaque data returned to the caller.
    pub return_data: Vec<u8>,
}

/// Result of a custom remove liquidity callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRemoveLiquidity {
    /// BPT to burn.
    pub bpt_amount_in: Amount,
    /// Amounts out per token, scaled18.
    pub amounts_out_scaled18: Vec<Amount>,
    /// Opaque data returned to the caller.
    pub return_data: Vec<u8>,
}

/// Pricing and invariant callbacks of a pool registered with the vault.
pub trait BasePool: fmt::Debug + Send + Sync {
    /// Invariant of `balances_scaled18`.
    ///
    /// # Errors
    ///
    /// Arithmetic errors from the pool math.
    fn compute_invariant(&self, balances_scaled18: &[Amount], rounding: Rounding)
        -> Result<Amount>;

    /// New balance of `token_index` such that the invariant becomes
    /// `invariant_ratio` (18-decimal) times the current one, other balances
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Arithmetic errors from the pool math.
    fn compute_balance(
        &self,
        balances_scaled18: &[Amount],
        token_index: usize,
        invariant_ratio: Amount,
    ) -> Result<Amount>;

    /// Computed side of a swap, scaled18.
    ///
    /// # Errors
    ///
    /// Arithmetic errors or insufficient liquidity.
    fn on_swap(&self, params: &PoolSwapParams<'_>) -> Result<Amount>;

    /// Custom add liquidity.  Unsupported unless overridden.
    ///
    /// # Errors
    ///
    /// [`VaultError::DoesNotSupportAddLiquidityCustom`] by default.
    fn on_add_liquidity_custom(
        &self,
        _max_amounts_in_scaled18: &[Amount],
        _min_bpt_amount_out: Amount,
        _balances_scaled18: &[Amount],
        _user_data: &[u8],
    ) -> Result<CustomAddLiquidity> {
        Err(VaultError::DoesNotSupportAddLiquidityCustom)
    }

    /// Custom remove liquidity.  Unsupported unless overridden.
    ///
    /// # Errors
    ///
    /// [`VaultError::DoesNotSupportRemoveLiquidityCustom`] by default.
    fn on_remove_liquidity_custom(
        &self,
        _max_bpt_amount_in: Amount,
        _min_amounts_out_scaled18: &[Amount],
        _balances_scaled18: &[Amount],
        _user_data: &[u8],
    ) -> Result<CustomRemoveLiquidity> {
        Err(VaultError::DoesNotSupportRemoveLiquidityCustom)
    }
}
