//! ERC4626 buffer operations of a session.

use std::sync::Arc;

use tracing::{debug, info};

use super::buffer::WrapperCall;
use super::session::SessionMode;
use super::Session;
use crate::domain::{Address, Amount, BufferWrapOrUnwrapParams, SwapKind, SwapOutcome, WrappingDirection};
use crate::error::{Result, VaultError};
use crate::traits::{Erc4626, TokenLedger};

impl<L: TokenLedger> Session<'_, L> {
    /// Wraps or unwraps through the buffer of `params.wrapped_token`.
    ///
    /// The caller owes the incoming token and is credited with the outgoing
    /// one, exactly as for a swap.  External wrapper calls spend the vault's
    /// own holdings, so a caller wrapping through the wrapper must have paid
    /// and settled first when the vault holds nothing else of that token.
    ///
    /// # Errors
    ///
    /// - [`VaultError::AmountGivenZero`], [`VaultError::WrapAmountTooSmall`].
    /// - [`VaultError::BufferNotInitialized`].
    /// - [`VaultError::SwapLimit`].
    /// - [`VaultError::NotEnoughUnderlying`] or [`VaultError::NotEnoughWrapped`]
    ///   if the wrapper moved tokens other than declared.
    pub fn erc4626_buffer_wrap_or_unwrap(
        &mut self,
        caller: Address,
        params: &BufferWrapOrUnwrapParams,
    ) -> Result<SwapOutcome> {
        self.atomic(|session| session.wrap_or_unwrap_unchecked(caller, params))
    }

    fn wrap_or_unwrap_unchecked(
        &mut self,
        caller: Address,
        params: &BufferWrapOrUnwrapParams,
    ) -> Result<SwapOutcome> {
        self.guard.ensure_locker(caller)?;
        if params.amount_given_raw.is_zero() {
            return Err(VaultError::AmountGivenZero);
        }
        if params.amount_given_raw < self.vault.config.minimum_wrap_amount() {
            return Err(VaultError::WrapAmountTooSmall(params.amount_given_raw));
        }
        let wrapped = params.wrapped_token;
        let underlying = self.vault.state.buffers.get(wrapped)?.underlying_token();
        let (token_in, token_out) = match params.direction {
            WrappingDirection::Wrap => (underlying, wrapped),
            WrappingDirection::Unwrap => (wrapped, underlying),
        };
        self.sync_before(token_in)?;
        self.sync_before(token_out)?;

        let vault = &mut *self.vault;
        let outcome = match self.mode {
            SessionMode::Query => vault.state.buffers.quote(params, &vault.ledger)?,
            SessionMode::Execute => {
                let mut call = WrapperCall {
                    ledger: &mut vault.ledger,
                    reserves: &mut vault.state.reserves,
                    vault: vault.address,
                };
                vault.state.buffers.wrap_or_unwrap(params, &mut call)?
            }
        };

        match params.kind {
            SwapKind::ExactIn if outcome.amount_out < params.limit_raw => {
                return Err(VaultError::SwapLimit {
                    amount: outcome.amount_out,
                    limit: params.limit_raw,
                });
            }
            SwapKind::ExactOut if outcome.amount_in > params.limit_raw => {
                return Err(VaultError::SwapLimit {
                    amount: outcome.amount_in,
                    limit: params.limit_raw,
                });
            }
            _ => {}
        }

        self.guard.take_debt(token_in, outcome.amount_in)?;
        self.guard.supply_credit(token_out, outcome.amount_out)?;
        debug!(
            wrapped = %wrapped,
            direction = ?params.direction,
            kind = %params.kind,
            amount_in = %outcome.amount_in,
            amount_out = %outcome.amount_out,
            "buffer wrap/unwrap"
        );
        Ok(outcome)
    }

    /// Creates the buffer of `wrapper` from `exact_underlying_in` and
    /// `exact_wrapped_in`, which the caller owes.  Returns the shares issued
    /// to `shares_owner`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::BufferAlreadyInitialized`],
    ///   [`VaultError::InvalidUnderlyingToken`].
    /// - [`VaultError::BufferTotalSupplyTooLow`],
    ///   [`VaultError::IssuedSharesBelowMin`].
    pub fn initialize_buffer(
        &mut self,
        caller: Address,
        wrapper: Arc<dyn Erc4626<L>>,
        exact_underlying_in: Amount,
        exact_wrapped_in: Amount,
        min_issued_shares: Amount,
        shares_owner: Address,
    ) -> Result<Amount> {
        self.atomic(|session| {
            session.guard.ensure_locker(caller)?;
            let wrapped = wrapper.wrapped_token();
            let underlying = wrapper.asset();
            let minimum = session.vault.config.buffer_minimum_total_supply();
            let vault = &mut *session.vault;
            let issued = vault.state.buffers.initialize(
                wrapper,
                &vault.ledger,
                exact_underlying_in,
                exact_wrapped_in,
                min_issued_shares,
                shares_owner,
                minimum,
            )?;
            session.sync_before(underlying)?;
            session.sync_before(wrapped)?;
            session.guard.take_debt(underlying, exact_underlying_in)?;
            session.guard.take_debt(wrapped, exact_wrapped_in)?;
            info!(
                wrapped = %wrapped,
                underlying = %underlying,
                owner = %shares_owner,
                issued = %issued,
                "buffer initialized"
            );
            Ok(issued)
        })
    }

    /// Adds `exact_underlying_in` and `exact_wrapped_in` to the buffer of
    /// `wrapped`.  Returns the shares issued to `shares_owner`.
    ///
    /// # Errors
    ///
    /// [`VaultError::BufferNotInitialized`], [`VaultError::IssuedSharesBelowMin`].
    pub fn add_liquidity_to_buffer(
        &mut self,
        caller: Address,
        wrapped: Address,
        exact_underlying_in: Amount,
        exact_wrapped_in: Amount,
        min_shares_out: Amount,
        shares_owner: Address,
    ) -> Result<Amount> {
        self.atomic(|session| {
            session.guard.ensure_locker(caller)?;
            let vault = &mut *session.vault;
            let underlying = vault.state.buffers.get(wrapped)?.underlying_token();
            let issued = vault.state.buffers.add_liquidity(
                wrapped,
                &vault.ledger,
                exact_underlying_in,
                exact_wrapped_in,
                min_shares_out,
                shares_owner,
            )?;
            session.sync_before(underlying)?;
            session.sync_before(wrapped)?;
            session.guard.take_debt(underlying, exact_underlying_in)?;
            session.guard.take_debt(wrapped, exact_wrapped_in)?;
            debug!(wrapped = %wrapped, owner = %shares_owner, issued = %issued, "buffer liquidity added");
            Ok(issued)
        })
    }

    /// Burns `shares_in` of the caller's buffer shares and credits the
    /// caller with `(underlying, wrapped)`.
    ///
    /// # Errors
    ///
    /// - [`VaultError::BufferNotInitialized`],
    ///   [`VaultError::NotEnoughBufferShares`].
    /// - [`VaultError::AmountOutBelowMin`].
    /// - [`VaultError::BufferTotalSupplyTooLow`] if the locked shares would
    ///   be touched.
    pub fn remove_liquidity_from_buffer(
        &mut self,
        caller: Address,
        wrapped: Address,
        shares_in: Amount,
        min_underlying_out: Amount,
        min_wrapped_out: Amount,
    ) -> Result<(Amount, Amount)> {
        self.atomic(|session| {
            session.guard.ensure_locker(caller)?;
            let minimum = session.vault.config.buffer_minimum_total_supply();
            let buffers = &mut session.vault.state.buffers;
            let underlying = buffers.get(wrapped)?.underlying_token();
            let (underlying_out, wrapped_out) = buffers.remove_liquidity(
                wrapped,
                caller,
                shares_in,
                min_underlying_out,
                min_wrapped_out,
                minimum,
            )?;
            session.sync_before(underlying)?;
            session.sync_before(wrapped)?;
            session.guard.supply_credit(underlying, underlying_out)?;
            session.guard.supply_credit(wrapped, wrapped_out)?;
            debug!(
                wrapped = %wrapped,
                owner = %caller,
                underlying_out = %underlying_out,
                wrapped_out = %wrapped_out,
                "buffer liquidity removed"
            );
            Ok((underlying_out, wrapped_out))
        })
    }
}
