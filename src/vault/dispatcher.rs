//! Pool operations: initialization, swaps and liquidity.
//!
//! Every operation follows the same shape: validate, sync the reserves of
//! the pool's tokens, convert raw amounts to live scaled18 with rounding
//! against the caller, ask the pool, convert back, check limits, write
//! balances, then record debt for tokens the vault receives and credit for
//! tokens it pays out.
//!
//! | conversion                    | rounding |
//! |-------------------------------|----------|
//! | given amount in, to scaled18  | down     |
//! | given amount out, to scaled18 | up       |
//! | computed amount in, to raw    | up       |
//! | computed amount out, to raw   | down     |

use std::sync::Arc;

use tracing::{debug, info};

use super::registry::PoolTokenInfo;
use super::Session;
use crate::config::LiquidityManagement;
use crate::domain::{
    Address, AddLiquidityKind, AddLiquidityOutcome, AddLiquidityParams, Amount,
    RemoveLiquidityKind, RemoveLiquidityOutcome, RemoveLiquidityParams, Rounding, SwapKind,
    SwapOutcome, SwapParams,
};
use crate::error::{Result, VaultError};
use crate::math::base_pool_math;
use crate::math::scaling::{to_raw, to_scaled18};
use crate::traits::{BasePool, PoolSwapParams, TokenLedger};

/// Pool data copied out of the ledger for one operation.
struct PoolContext {
    pool: Address,
    hooks: Arc<dyn BasePool>,
    infos: Vec<PoolTokenInfo>,
    rates: Vec<Amount>,
    liquidity: LiquidityManagement,
}

impl PoolContext {
    fn len(&self) -> usize {
        self.infos.len()
    }

    fn token(&self, index: usize) -> Address {
        self.infos[index].token
    }

    fn index_of(&self, token: Address) -> Result<usize> {
        self.infos
            .iter()
            .position(|info| info.token == token)
            .ok_or(VaultError::TokenNotRegistered {
                pool: self.pool,
                token,
            })
    }

    fn ensure_len(&self, actual: usize) -> Result<()> {
        if actual != self.len() {
            return Err(VaultError::InputLengthMismatch {
                expected: self.len(),
                actual,
            });
        }
        Ok(())
    }

    fn scaled(&self, index: usize, raw: Amount, rounding: Rounding) -> Result<Amount> {
        to_scaled18(
            raw,
            self.infos[index].decimal_scaling_factor,
            self.rates[index],
            rounding,
        )
    }

    fn raw(&self, index: usize, scaled: Amount, rounding: Rounding) -> Result<Amount> {
        to_raw(
            scaled,
            self.infos[index].decimal_scaling_factor,
            self.rates[index],
            rounding,
        )
    }

    fn all_scaled(&self, raw: &[Amount], rounding: Rounding) -> Result<Vec<Amount>> {
        raw.iter()
            .enumerate()
            .map(|(i, amount)| self.scaled(i, *amount, rounding))
            .collect()
    }

    fn all_raw(&self, scaled: &[Amount], rounding: Rounding) -> Result<Vec<Amount>> {
        scaled
            .iter()
            .enumerate()
            .map(|(i, amount)| self.raw(i, *amount, rounding))
            .collect()
    }

    fn deltas(&self, amounts: &[Amount], sign: i128) -> Result<Vec<(Address, i128)>> {
        self.infos
            .iter()
            .zip(amounts)
            .map(|(info, amount)| Ok((info.token, sign * signed(*amount)?)))
            .collect()
    }
}

fn signed(amount: Amount) -> Result<i128> {
    amount
        .to_signed()
        .ok_or(VaultError::Overflow("amount exceeds i128"))
}

/// Index of the only non-zero entry.
fn single_input_index(amounts: &[Amount]) -> Result<usize> {
    let mut non_zero = amounts
        .iter()
        .enumerate()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(i, _)| i);
    let Some(index) = non_zero.next() else {
        return Err(VaultError::AllZeroInputs);
    };
    if non_zero.next().is_some() {
        return Err(VaultError::MultipleNonZeroInputs);
    }
    Ok(index)
}

fn with_single(len: usize, index: usize, amount: Amount) -> Vec<Amount> {
    let mut amounts = vec![Amount::ZERO; len];
    amounts[index] = amount;
    amounts
}

impl<L: TokenLedger> Session<'_, L> {
    fn pool_context(&self, pool: Address, require_initialized: bool) -> Result<PoolContext> {
        let entry = self.vault.state.balances.entry(pool)?;
        if require_initialized && !entry.initialized {
            return Err(VaultError::PoolNotInitialized(pool));
        }
        Ok(PoolContext {
            pool,
            hooks: Arc::clone(&entry.hooks),
            infos: entry.registry.infos().to_vec(),
            rates: entry.registry.rates()?,
            liquidity: entry.liquidity,
        })
    }

    fn sync_pool_tokens(&mut self, ctx: &PoolContext) -> Result<()> {
        for info in &ctx.infos {
            self.sync_before(info.token)?;
        }
        Ok(())
    }

    fn take_debts(&mut self, ctx: &PoolContext, amounts: &[Amount]) -> Result<()> {
        for (i, amount) in amounts.iter().enumerate() {
            self.guard.take_debt(ctx.token(i), *amount)?;
        }
        Ok(())
    }

    fn supply_credits(&mut self, ctx: &PoolContext, amounts: &[Amount]) -> Result<()> {
        for (i, amount) in amounts.iter().enumerate() {
            self.guard.supply_credit(ctx.token(i), *amount)?;
        }
        Ok(())
    }

    /// Seeds `pool` with `exact_amounts_in` (pool token order) and mints
    /// BPT equal to the invariant.  The vault's minimum supply is locked to
    /// the zero address; the rest goes to `to` and is returned.
    ///
    /// # Errors
    ///
    /// - [`VaultError::PoolAlreadyInitialized`],
    ///   [`VaultError::InputLengthMismatch`].
    /// - [`VaultError::PoolTotalSupplyTooLow`] if the invariant is below the
    ///   minimum supply.
    /// - [`VaultError::BptAmountOutBelowMin`].
    pub fn initialize(
        &mut self,
        caller: Address,
        pool: Address,
        to: Address,
        exact_amounts_in: &[Amount],
        min_bpt_amount_out: Amount,
    ) -> Result<Amount> {
        self.atomic(|session| {
            session.guard.ensure_locker(caller)?;
            let ctx = session.pool_context(pool, false)?;
            if session.vault.state.balances.is_initialized(pool) {
                return Err(VaultError::PoolAlreadyInitialized(pool));
            }
            ctx.ensure_len(exact_amounts_in.len())?;
            session.sync_pool_tokens(&ctx)?;

            let scaled = ctx.all_scaled(exact_amounts_in, Rounding::Down)?;
            let invariant = ctx.hooks.compute_invariant(&scaled, Rounding::Down)?;
            let minimum = session.vault.config.pool_minimum_total_supply();
            let bpt_amount_out = invariant
                .checked_sub(&minimum)
                .ok_or(VaultError::PoolTotalSupplyTooLow(invariant))?;
            if bpt_amount_out < min_bpt_amount_out {
                return Err(VaultError::BptAmountOutBelowMin {
                    amount: bpt_amount_out,
                    min: min_bpt_amount_out,
                });
            }

            let state = &mut session.vault.state;
            state
                .balances
                .update_balances(pool, &ctx.deltas(exact_amounts_in, 1)?)?;
            state.balances.entry_mut(pool)?.initialized = true;
            state.bpt.mint_minimum_supply(pool, minimum)?;
            state.bpt.mint(pool, to, bpt_amount_out)?;
            session.take_debts(&ctx, exact_amounts_in)?;
            info!(pool = %pool, to = %to, bpt = %bpt_amount_out, "pool initialized");
            Ok(bpt_amount_out)
        })
    }

    /// Swaps through `params.pool`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AmountGivenZero`], [`VaultError::CannotSwapSameToken`].
    /// - [`VaultError::PoolNotRegistered`], [`VaultError::PoolNotInitialized`],
    ///   [`VaultError::TokenNotRegistered`].
    /// - [`VaultError::TradeAmountTooSmall`] for dust on either side.
    /// - [`VaultError::SwapLimit`] when the computed side violates the limit.
    pub fn swap(&mut self, caller: Address, params: &SwapParams) -> Result<SwapOutcome> {
        self.atomic(|session| session.swap_unchecked(caller, params))
    }

    fn swap_unchecked(&mut self, caller: Address, params: &SwapParams) -> Result<SwapOutcome> {
        self.guard.ensure_locker(caller)?;
        if params.amount_given_raw.is_zero() {
            return Err(VaultError::AmountGivenZero);
        }
        if params.token_in == params.token_out {
            return Err(VaultError::CannotSwapSameToken);
        }
        let ctx = self.pool_context(params.pool, true)?;
        let index_in = ctx.index_of(params.token_in)?;
        let index_out = ctx.index_of(params.token_out)?;
        self.sync_before(params.token_in)?;
        self.sync_before(params.token_out)?;

        let balances = self.vault.state.balances.current_live_balances(params.pool)?;
        let amount_given_scaled18 = match params.kind {
            SwapKind::ExactIn => ctx.scaled(index_in, params.amount_given_raw, Rounding::Down)?,
            SwapKind::ExactOut => ctx.scaled(index_out, params.amount_given_raw, Rounding::Up)?,
        };
        self.ensure_valid_trade_amount(amount_given_scaled18)?;

        let calculated_scaled18 = ctx.hooks.on_swap(&PoolSwapParams {
            kind: params.kind,
            amount_given_scaled18,
            balances_scaled18: &balances,
            index_in,
            index_out,
        })?;
        self.ensure_valid_trade_amount(calculated_scaled18)?;

        let (amount_in, amount_out, amount_calculated) = match params.kind {
            SwapKind::ExactIn => {
                let amount_out = ctx.raw(index_out, calculated_scaled18, Rounding::Down)?;
                if amount_out < params.limit_raw {
                    return Err(VaultError::SwapLimit {
                        amount: amount_out,
                        limit: params.limit_raw,
                    });
                }
                (params.amount_given_raw, amount_out, amount_out)
            }
            SwapKind::ExactOut => {
                let amount_in = ctx.raw(index_in, calculated_scaled18, Rounding::Up)?;
                if amount_in > params.limit_raw {
                    return Err(VaultError::SwapLimit {
                        amount: amount_in,
                        limit: params.limit_raw,
                    });
                }
                (amount_in, params.amount_given_raw, amount_in)
            }
        };

        self.vault.state.balances.update_balances(
            params.pool,
            &[
                (params.token_in, signed(amount_in)?),
                (params.token_out, -signed(amount_out)?),
            ],
        )?;
        self.guard.take_debt(params.token_in, amount_in)?;
        self.guard.supply_credit(params.token_out, amount_out)?;
        debug!(
            pool = %params.pool,
            kind = %params.kind,
            token_in = %params.token_in,
            token_out = %params.token_out,
            amount_in = %amount_in,
            amount_out = %amount_out,
            "swap"
        );
        Ok(SwapOutcome {
            amount_calculated,
            amount_in,
            amount_out,
        })
    }

    /// Adds liquidity to an initialized pool and mints BPT to `params.to`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InputLengthMismatch`].
    /// - [`VaultError::DoesNotSupportUnbalancedLiquidity`],
    ///   [`VaultError::DoesNotSupportDonation`] or
    ///   [`VaultError::DoesNotSupportAddLiquidityCustom`] when the pool's
    ///   flags forbid the kind.
    /// - [`VaultError::AllZeroInputs`], [`VaultError::MultipleNonZeroInputs`]
    ///   for single-token kinds.
    /// - [`VaultError::AmountInAboveMax`], [`VaultError::BptAmountOutBelowMin`].
    pub fn add_liquidity(
        &mut self,
        caller: Address,
        params: &AddLiquidityParams,
    ) -> Result<AddLiquidityOutcome> {
        self.atomic(|session| session.add_liquidity_unchecked(caller, params))
    }

    fn add_liquidity_unchecked(
        &mut self,
        caller: Address,
        params: &AddLiquidityParams,
    ) -> Result<AddLiquidityOutcome> {
        self.guard.ensure_locker(caller)?;
        let ctx = self.pool_context(params.pool, true)?;
        ctx.ensure_len(params.max_amounts_in.len())?;
        self.sync_pool_tokens(&ctx)?;

        let balances = self.vault.state.balances.current_live_balances(params.pool)?;
        let total_supply = self.vault.state.bpt.total_supply(params.pool);
        let flags = ctx.liquidity;

        let (amounts_in_raw, amounts_in_scaled18, bpt_amount_out, return_data) = match params.kind
        {
            AddLiquidityKind::Proportional => {
                let bpt_amount_out = params.min_bpt_amount_out;
                let scaled = base_pool_math::compute_proportional_amounts_in(
                    &balances,
                    total_supply,
                    bpt_amount_out,
                )?;
                (ctx.all_raw(&scaled, Rounding::Up)?, scaled, bpt_amount_out, Vec::new())
            }
            AddLiquidityKind::Unbalanced => {
                if flags.disable_unbalanced_liquidity {
                    return Err(VaultError::DoesNotSupportUnbalancedLiquidity);
                }
                let scaled = ctx.all_scaled(&params.max_amounts_in, Rounding::Down)?;
                let bpt_amount_out = base_pool_math::compute_add_liquidity_unbalanced(
                    ctx.hooks.as_ref(),
                    &balances,
                    &scaled,
                    total_supply,
                )?;
                (params.max_amounts_in.clone(), scaled, bpt_amount_out, Vec::new())
            }
            AddLiquidityKind::SingleTokenExactOut => {
                if flags.disable_unbalanced_liquidity {
                    return Err(VaultError::DoesNotSupportUnbalancedLiquidity);
                }
                let index = single_input_index(&params.max_amounts_in)?;
                let bpt_amount_out = params.min_bpt_amount_out;
                let amount_scaled18 = base_pool_math::compute_add_liquidity_single_token_exact_out(
                    ctx.hooks.as_ref(),
                    &balances,
                    index,
                    bpt_amount_out,
                    total_supply,
                )?;
                let amount_raw = ctx.raw(index, amount_scaled18, Rounding::Up)?;
                (
                    with_single(ctx.len(), index, amount_raw),
                    with_single(ctx.len(), index, amount_scaled18),
                    bpt_amount_out,
                    Vec::new(),
                )
            }
            AddLiquidityKind::Donation => {
                if !flags.enable_donation {
                    return Err(VaultError::DoesNotSupportDonation);
                }
                let scaled = ctx.all_scaled(&params.max_amounts_in, Rounding::Down)?;
                (params.max_amounts_in.clone(), scaled, Amount::ZERO, Vec::new())
            }
            AddLiquidityKind::Custom => {
                if !flags.enable_add_liquidity_custom {
                    return Err(VaultError::DoesNotSupportAddLiquidityCustom);
                }
                let max_scaled = ctx.all_scaled(&params.max_amounts_in, Rounding::Down)?;
                let custom = ctx.hooks.on_add_liquidity_custom(
                    &max_scaled,
                    params.min_bpt_amount_out,
                    &balances,
                    &params.user_data,
                )?;
                ctx.ensure_len(custom.amounts_in_scaled18.len())?;
                (
                    ctx.all_raw(&custom.amounts_in_scaled18, Rounding::Up)?,
                    custom.amounts_in_scaled18,
                    custom.bpt_amount_out,
                    custom.return_data,
                )
            }
        };

        for (i, (amount, max)) in amounts_in_raw.iter().zip(&params.max_amounts_in).enumerate() {
            if amount > max {
                return Err(VaultError::AmountInAboveMax {
                    token: ctx.token(i),
                    amount: *amount,
                    max: *max,
                });
            }
            self.ensure_valid_trade_amount(amounts_in_scaled18[i])?;
        }
        if matches!(
            params.kind,
            AddLiquidityKind::Unbalanced | AddLiquidityKind::Custom
        ) && bpt_amount_out < params.min_bpt_amount_out
        {
            return Err(VaultError::BptAmountOutBelowMin {
                amount: bpt_amount_out,
                min: params.min_bpt_amount_out,
            });
        }

        let state = &mut self.vault.state;
        state
            .balances
            .update_balances(params.pool, &ctx.deltas(&amounts_in_raw, 1)?)?;
        state.bpt.mint(params.pool, params.to, bpt_amount_out)?;
        self.take_debts(&ctx, &amounts_in_raw)?;
        debug!(
            pool = %params.pool,
            kind = ?params.kind,
            to = %params.to,
            bpt_out = %bpt_amount_out,
            "add liquidity"
        );
        Ok(AddLiquidityOutcome {
            amounts_in: amounts_in_raw,
            bpt_amount_out,
            return_data,
        })
    }

    /// Burns BPT of `params.from` and credits the caller with pool tokens.
    /// Burning from another account spends the caller's allowance.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InputLengthMismatch`].
    /// - [`VaultError::DoesNotSupportUnbalancedLiquidity`] or
    ///   [`VaultError::DoesNotSupportRemoveLiquidityCustom`] when the pool's
    ///   flags forbid the kind.
    /// - [`VaultError::AllZeroInputs`], [`VaultError::MultipleNonZeroInputs`]
    ///   for single-token kinds.
    /// - [`VaultError::AmountOutBelowMin`], [`VaultError::BptAmountInAboveMax`].
    /// - [`VaultError::InsufficientAllowance`],
    ///   [`VaultError::InsufficientBptBalance`].
    /// - [`VaultError::LockedBpt`] when burning from the zero address.
    /// - [`VaultError::PoolTotalSupplyTooLow`] if the supply would fall
    ///   below the locked minimum.
    pub fn remove_liquidity(
        &mut self,
        caller: Address,
        params: &RemoveLiquidityParams,
    ) -> Result<RemoveLiquidityOutcome> {
        self.atomic(|session| session.remove_liquidity_unchecked(caller, params))
    }

    fn remove_liquidity_unchecked(
        &mut self,
        caller: Address,
        params: &RemoveLiquidityParams,
    ) -> Result<RemoveLiquidityOutcome> {
        self.guard.ensure_locker(caller)?;
        if params.from.is_zero() {
            return Err(VaultError::LockedBpt(params.pool));
        }
        let ctx = self.pool_context(params.pool, true)?;
        ctx.ensure_len(params.min_amounts_out.len())?;
        self.sync_pool_tokens(&ctx)?;

        let balances = self.vault.state.balances.current_live_balances(params.pool)?;
        let total_supply = self.vault.state.bpt.total_supply(params.pool);
        let flags = ctx.liquidity;

        let (bpt_amount_in, amounts_out_raw, amounts_out_scaled18, return_data) = match params.kind
        {
            RemoveLiquidityKind::Proportional => {
                let bpt_amount_in = params.max_bpt_amount_in;
                let scaled = base_pool_math::compute_proportional_amounts_out(
                    &balances,
                    total_supply,
                    bpt_amount_in,
                )?;
                (bpt_amount_in, ctx.all_raw(&scaled, Rounding::Down)?, scaled, Vec::new())
            }
            RemoveLiquidityKind::SingleTokenExactIn => {
                if flags.disable_unbalanced_liquidity {
                    return Err(VaultError::DoesNotSupportUnbalancedLiquidity);
                }
                let index = single_input_index(&params.min_amounts_out)?;
                let bpt_amount_in = params.max_bpt_amount_in;
                let amount_scaled18 =
                    base_pool_math::compute_remove_liquidity_single_token_exact_in(
                        ctx.hooks.as_ref(),
                        &balances,
                        index,
                        bpt_amount_in,
                        total_supply,
                    )?;
                let amount_raw = ctx.raw(index, amount_scaled18, Rounding::Down)?;
                (
                    bpt_amount_in,
                    with_single(ctx.len(), index, amount_raw),
                    with_single(ctx.len(), index, amount_scaled18),
                    Vec::new(),
                )
            }
            RemoveLiquidityKind::SingleTokenExactOut => {
                if flags.disable_unbalanced_liquidity {
                    return Err(VaultError::DoesNotSupportUnbalancedLiquidity);
                }
                let index = single_input_index(&params.min_amounts_out)?;
                let amount_raw = params.min_amounts_out[index];
                let amount_scaled18 = ctx.scaled(index, amount_raw, Rounding::Up)?;
                let bpt_amount_in =
                    base_pool_math::compute_remove_liquidity_single_token_exact_out(
                        ctx.hooks.as_ref(),
                        &balances,
                        index,
                        amount_scaled18,
                        total_supply,
                    )?;
                (
                    bpt_amount_in,
                    with_single(ctx.len(), index, amount_raw),
                    with_single(ctx.len(), index, amount_scaled18),
                    Vec::new(),
                )
            }
            RemoveLiquidityKind::Custom => {
                if !flags.enable_remove_liquidity_custom {
                    return Err(VaultError::DoesNotSupportRemoveLiquidityCustom);
                }
                let min_scaled = ctx.all_scaled(&params.min_amounts_out, Rounding::Up)?;
                let custom = ctx.hooks.on_remove_liquidity_custom(
                    params.max_bpt_amount_in,
                    &min_scaled,
                    &balances,
                    &params.user_data,
                )?;
                ctx.ensure_len(custom.amounts_out_scaled18.len())?;
                (
                    custom.bpt_amount_in,
                    ctx.all_raw(&custom.amounts_out_scaled18, Rounding::Down)?,
                    custom.amounts_out_scaled18,
                    custom.return_data,
                )
            }
        };

        if bpt_amount_in > params.max_bpt_amount_in {
            return Err(VaultError::BptAmountInAboveMax {
                amount: bpt_amount_in,
                max: params.max_bpt_amount_in,
            });
        }
        for (i, (amount, min)) in amounts_out_raw.iter().zip(&params.min_amounts_out).enumerate() {
            if amount < min {
                return Err(VaultError::AmountOutBelowMin {
                    token: ctx.token(i),
                    amount: *amount,
                    min: *min,
                });
            }
            self.ensure_valid_trade_amount(amounts_out_scaled18[i])?;
        }

        let minimum_supply = self.vault.config.pool_minimum_total_supply();
        let state = &mut self.vault.state;
        state
            .balances
            .update_balances(params.pool, &ctx.deltas(&amounts_out_raw, -1)?)?;
        state
            .bpt
            .spend_allowance(params.pool, params.from, caller, bpt_amount_in)?;
        state.bpt.burn(params.pool, params.from, bpt_amount_in)?;
        let remaining = state.bpt.total_supply(params.pool);
        if remaining < minimum_supply {
            return Err(VaultError::PoolTotalSupplyTooLow(remaining));
        }
        self.supply_credits(&ctx, &amounts_out_raw)?;
        debug!(
            pool = %params.pool,
            kind = ?params.kind,
            from = %params.from,
            bpt_in = %bpt_amount_in,
            "remove liquidity"
        );
        Ok(RemoveLiquidityOutcome {
            bpt_amount_in,
            amounts_out: amounts_out_raw,
            return_data,
        })
    }
}
