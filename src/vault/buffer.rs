//! ERC4626 liquidity buffers.
//!
//! A buffer holds idle underlying and wrapped tokens for one wrapper.  A
//! wrap or unwrap is first served from the buffer's own balance on the
//! outgoing side; only when that side is short does the vault call the
//! wrapper, and then for the whole request plus half of any surplus the
//! buffer holds on the side being spent:
//!
//! ```text
//! underlying surplus = (underlying - assets(wrapped)) / 2, floored at 0
//! wrapped surplus    = (wrapped - shares(underlying)) / 2, floored at 0
//! ```
//!
//! Adding the surplus to the external call moves the buffer towards a
//! 50/50 split.  A surplus on the other side is left alone.
//!
//! Amounts paid to or taken from the caller are always the wrapper's
//! previews, whether or not the wrapper is called, so a query and an
//! execution from the same state agree.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::reserves::ReserveTracker;
use crate::domain::{
    Address, Amount, BufferWrapOrUnwrapParams, Rounding, SwapKind, SwapOutcome, WrappingDirection,
};
use crate::error::{Result, VaultError};
use crate::math::{mul_div_amount, CheckedArithmetic};
use crate::traits::{Erc4626, TokenLedger};

/// Mutable context for calls into a wrapper.
pub(crate) struct WrapperCall<'a, L> {
    pub(crate) ledger: &'a mut L,
    pub(crate) reserves: &'a mut ReserveTracker,
    pub(crate) vault: Address,
}

/// Liquidity buffer of one wrapped token.
#[derive(Debug, Clone)]
pub struct Buffer<L: TokenLedger> {
    wrapper: Arc<dyn Erc4626<L>>,
    underlying_token: Address,
    underlying_balance: Amount,
    wrapped_balance: Amount,
    total_shares: Amount,
    owner_shares: BTreeMap<Address, Amount>,
}

impl<L: TokenLedger> Buffer<L> {
    /// The wrapper behind the buffer.
    #[must_use]
    pub fn wrapper(&self) -> &Arc<dyn Erc4626<L>> {
        &self.wrapper
    }

    /// Wrapped (share) token.
    #[must_use]
    pub fn wrapped_token(&self) -> Address {
        self.wrapper.wrapped_token()
    }

    /// Underlying asset.
    #[must_use]
    pub const fn underlying_token(&self) -> Address {
        self.underlying_token
    }

    /// Idle underlying held by the buffer.
    pub const fn underlying_balance(&self) -> Amount {
        self.underlying_balance
    }

    /// Idle wrapped tokens held by the buffer.
    pub const fn wrapped_balance(&self) -> Amount {
        self.wrapped_balance
    }

    /// Shares issued, including the locked minimum.
    pub const fn total_shares(&self) -> Amount {
        self.total_shares
    }

    /// Shares held by `owner`.
    pub fn owner_shares(&self, owner: Address) -> Amount {
        self.owner_shares.get(&owner).copied().unwrap_or_default()
    }

    fn add_owner_shares(&mut self, owner: Address, shares: Amount) -> Result<()> {
        let next = self.owner_shares(owner).safe_add(&shares)?;
        self.owner_shares.insert(owner, next);
        Ok(())
    }

    /// Underlying value of both balances at the wrapper's current rate.
    fn total_value(&self, ledger: &L) -> Result<Amount> {
        let wrapped_value = self
            .wrapper
            .convert_to_assets(ledger, self.wrapped_balance)?;
        self.underlying_balance.safe_add(&wrapped_value)
    }

    fn underlying_surplus(&self, ledger: &L) -> Result<Amount> {
        let wrapped_value = self
            .wrapper
            .convert_to_assets(ledger, self.wrapped_balance)?;
        Ok(self
            .underlying_balance
            .checked_sub(&wrapped_value)
            .map_or(Amount::ZERO, |excess| Amount::new(excess.get() / 2)))
    }

    fn wrapped_surplus(&self, ledger: &L) -> Result<Amount> {
        let underlying_value = self
            .wrapper
            .convert_to_shares(ledger, self.underlying_balance)?;
        Ok(self
            .wrapped_balance
            .checked_sub(&underlying_value)
            .map_or(Amount::ZERO, |excess| Amount::new(excess.get() / 2)))
    }

    /// `(amount_in, amount_out)` the caller gets for `params`.
    fn preview(&self, params: &BufferWrapOrUnwrapParams, ledger: &L) -> Result<(Amount, Amount)> {
        let given = params.amount_given_raw;
        match (params.direction, params.kind) {
            (WrappingDirection::Wrap, SwapKind::ExactIn) => {
                Ok((given, self.wrapper.preview_deposit(ledger, given)?))
            }
            (WrappingDirection::Wrap, SwapKind::ExactOut) => {
                Ok((self.wrapper.preview_mint(ledger, given)?, given))
            }
            (WrappingDirection::Unwrap, SwapKind::ExactIn) => {
                Ok((given, self.wrapper.preview_redeem(ledger, given)?))
            }
            (WrappingDirection::Unwrap, SwapKind::ExactOut) => {
                Ok((self.wrapper.preview_withdraw(ledger, given)?, given))
            }
        }
    }

    fn vault_holdings(&self, ledger: &L, vault: Address) -> (Amount, Amount) {
        (
            ledger.balance_of(self.underlying_token, vault),
            ledger.balance_of(self.wrapped_token(), vault),
        )
    }

    fn wrap(
        &mut self,
        kind: SwapKind,
        underlying_in: Amount,
        wrapped_out: Amount,
        call: &mut WrapperCall<'_, L>,
    ) -> Result<()> {
        if self.wrapped_balance >= wrapped_out {
            self.underlying_balance = self.underlying_balance.safe_add(&underlying_in)?;
            self.wrapped_balance = self.wrapped_balance.safe_sub(&wrapped_out)?;
            debug!(
                wrapped = %self.wrapped_token(),
                underlying_in = %underlying_in,
                wrapped_out = %wrapped_out,
                "wrap served from buffer"
            );
            return Ok(());
        }

        let surplus = self.underlying_surplus(call.ledger)?;
        let before = self.vault_holdings(call.ledger, call.vault);
        let (underlying_spent, wrapped_received) = match kind {
            SwapKind::ExactIn => {
                let deposit = underlying_in.safe_add(&surplus)?;
                let minted = self
                    .wrapper
                    .deposit(call.ledger, call.vault, deposit, call.vault)?;
                (deposit, minted)
            }
            SwapKind::ExactOut => {
                let extra = if surplus.is_zero() {
                    Amount::ZERO
                } else {
                    self.wrapper.convert_to_shares(call.ledger, surplus)?
                };
                let shares = wrapped_out.safe_add(&extra)?;
                let cost = self
                    .wrapper
                    .mint(call.ledger, call.vault, shares, call.vault)?;
                (cost, shares)
            }
        };

        let (underlying_after, wrapped_after) = self.vault_holdings(call.ledger, call.vault);
        let expected_underlying = before.0.safe_sub(&underlying_spent)?;
        if underlying_after < expected_underlying {
            return Err(VaultError::NotEnoughUnderlying {
                expected: expected_underlying,
                actual: underlying_after,
            });
        }
        let expected_wrapped = before.1.safe_add(&wrapped_received)?;
        if wrapped_after < expected_wrapped {
            return Err(VaultError::NotEnoughWrapped {
                expected: expected_wrapped,
                actual: wrapped_after,
            });
        }
        call.reserves.debit(self.underlying_token, underlying_spent)?;
        call.reserves.credit(self.wrapped_token(), wrapped_received)?;

        self.underlying_balance = self
            .underlying_balance
            .safe_add(&underlying_in)?
            .safe_sub(&underlying_spent)?;
        self.wrapped_balance = self
            .wrapped_balance
            .safe_add(&wrapped_received)?
            .safe_sub(&wrapped_out)?;
        debug!(
            wrapped = %self.wrapped_token(),
            deposited = %underlying_spent,
            minted = %wrapped_received,
            surplus = %surplus,
            "wrap routed through wrapper"
        );
        Ok(())
    }

    fn unwrap(
        &mut self,
        kind: SwapKind,
        wrapped_in: Amount,
        underlying_out: Amount,
        call: &mut WrapperCall<'_, L>,
    ) -> Result<()> {
        if self.underlying_balance >= underlying_out {
            self.wrapped_balance = self.wrapped_balance.safe_add(&wrapped_in)?;
            self.underlying_balance = self.underlying_balance.safe_sub(&underlying_out)?;
            debug!(
                wrapped = %self.wrapped_token(),
                wrapped_in = %wrapped_in,
                underlying_out = %underlying_out,
                "unwrap served from buffer"
            );
            return Ok(());
        }

        let surplus = self.wrapped_surplus(call.ledger)?;
        let before = self.vault_holdings(call.ledger, call.vault);
        let (wrapped_spent, underlying_received) = match kind {
            SwapKind::ExactIn => {
                let shares = wrapped_in.safe_add(&surplus)?;
                let assets =
                    self.wrapper
                        .redeem(call.ledger, call.vault, shares, call.vault, call.vault)?;
                (shares, assets)
            }
            SwapKind::ExactOut => {
                let extra = if surplus.is_zero() {
                    Amount::ZERO
                } else {
                    self.wrapper.convert_to_assets(call.ledger, surplus)?
                };
                let assets = underlying_out.safe_add(&extra)?;
                let burned =
                    self.wrapper
                        .withdraw(call.ledger, call.vault, assets, call.vault, call.vault)?;
                (burned, assets)
            }
        };

        let (underlying_after, wrapped_after) = self.vault_holdings(call.ledger, call.vault);
        let expected_wrapped = before.1.safe_sub(&wrapped_spent)?;
        if wrapped_after < expected_wrapped {
            return Err(VaultError::NotEnoughWrapped {
                expected: expected_wrapped,
                actual: wrapped_after,
            });
        }
        let expected_underlying = before.0.safe_add(&underlying_received)?;
        if underlying_after < expected_underlying {
            return Err(VaultError::NotEnoughUnderlying {
                expected: expected_underlying,
                actual: underlying_after,
            });
        }
        call.reserves.debit(self.wrapped_token(), wrapped_spent)?;
        call.reserves.credit(self.underlying_token, underlying_received)?;

        self.wrapped_balance = self
            .wrapped_balance
            .safe_add(&wrapped_in)?
            .safe_sub(&wrapped_spent)?;
        self.underlying_balance = self
            .underlying_balance
            .safe_add(&underlying_received)?
            .safe_sub(&underlying_out)?;
        debug!(
            wrapped = %self.wrapped_token(),
            redeemed = %wrapped_spent,
            received = %underlying_received,
            surplus = %surplus,
            "unwrap routed through wrapper"
        );
        Ok(())
    }
}

/// Every buffer, keyed by wrapped token.
#[derive(Debug, Clone)]
pub struct BufferManager<L: TokenLedger> {
    buffers: BTreeMap<Address, Buffer<L>>,
}

impl<L: TokenLedger> Default for BufferManager<L> {
    fn default() -> Self {
        Self {
            buffers: BTreeMap::new(),
        }
    }
}

impl<L: TokenLedger> BufferManager<L> {
    /// Buffer of `wrapped`.
    ///
    /// # Errors
    ///
    /// [`VaultError::BufferNotInitialized`].
    pub fn get(&self, wrapped: Address) -> Result<&Buffer<L>> {
        self.buffers
            .get(&wrapped)
            .ok_or(VaultError::BufferNotInitialized(wrapped))
    }

    fn get_mut(&mut self, wrapped: Address) -> Result<&mut Buffer<L>> {
        self.buffers
            .get_mut(&wrapped)
            .ok_or(VaultError::BufferNotInitialized(wrapped))
    }

    /// `true` once `wrapped` has a buffer.
    #[must_use]
    pub fn is_initialized(&self, wrapped: Address) -> bool {
        self.buffers.contains_key(&wrapped)
    }

    /// Caller-facing amounts of a wrap/unwrap without touching any state.
    pub(crate) fn quote(
        &self,
        params: &BufferWrapOrUnwrapParams,
        ledger: &L,
    ) -> Result<SwapOutcome> {
        let buffer = self.get(params.wrapped_token)?;
        let (amount_in, amount_out) = buffer.preview(params, ledger)?;
        Ok(outcome(params.kind, amount_in, amount_out))
    }

    /// Executes a wrap/unwrap against the buffer, calling the wrapper when
    /// the buffer is short.
    pub(crate) fn wrap_or_unwrap(
        &mut self,
        params: &BufferWrapOrUnwrapParams,
        call: &mut WrapperCall<'_, L>,
    ) -> Result<SwapOutcome> {
        let buffer = self.get_mut(params.wrapped_token)?;
        let (amount_in, amount_out) = buffer.preview(params, call.ledger)?;
        match params.direction {
            WrappingDirection::Wrap => buffer.wrap(params.kind, amount_in, amount_out, call)?,
            WrappingDirection::Unwrap => buffer.unwrap(params.kind, amount_in, amount_out, call)?,
        }
        Ok(outcome(params.kind, amount_in, amount_out))
    }

    /// Creates the buffer of `wrapper` and returns the shares issued to
    /// `owner`.  `minimum_total_supply` shares are locked to the zero
    /// address.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn initialize(
        &mut self,
        wrapper: Arc<dyn Erc4626<L>>,
        ledger: &L,
        underlying_in: Amount,
        wrapped_in: Amount,
        min_issued_shares: Amount,
        owner: Address,
        minimum_total_supply: Amount,
    ) -> Result<Amount> {
        let wrapped = wrapper.wrapped_token();
        if self.buffers.contains_key(&wrapped) {
            return Err(VaultError::BufferAlreadyInitialized(wrapped));
        }
        let underlying_token = wrapper.asset();
        if underlying_token.is_zero() {
            return Err(VaultError::InvalidUnderlyingToken(wrapped));
        }

        let wrapped_value = wrapper.convert_to_assets(ledger, wrapped_in)?;
        let total_shares = underlying_in.safe_add(&wrapped_value)?;
        if total_shares < minimum_total_supply {
            return Err(VaultError::BufferTotalSupplyTooLow(total_shares));
        }
        let issued = total_shares.safe_sub(&minimum_total_supply)?;
        if issued < min_issued_shares {
            return Err(VaultError::IssuedSharesBelowMin {
                issued,
                min: min_issued_shares,
            });
        }

        let mut buffer = Buffer {
            wrapper,
            underlying_token,
            underlying_balance: underlying_in,
            wrapped_balance: wrapped_in,
            total_shares,
            owner_shares: BTreeMap::new(),
        };
        buffer.add_owner_shares(Address::ZERO, minimum_total_supply)?;
        buffer.add_owner_shares(owner, issued)?;
        self.buffers.insert(wrapped, buffer);
        Ok(issued)
    }

    /// Adds liquidity to an existing buffer, issuing shares in proportion
    /// to the value contributed (rounded down).
    pub(crate) fn add_liquidity(
        &mut self,
        wrapped: Address,
        ledger: &L,
        underlying_in: Amount,
        wrapped_in: Amount,
        min_shares_out: Amount,
        owner: Address,
    ) -> Result<Amount> {
        let buffer = self.get_mut(wrapped)?;
        let current_value = buffer.total_value(ledger)?;
        let value_in = underlying_in.safe_add(&buffer.wrapper.convert_to_assets(ledger, wrapped_in)?)?;
        let issued = mul_div_amount(value_in, buffer.total_shares, current_value, Rounding::Down)?;
        if issued < min_shares_out {
            return Err(VaultError::IssuedSharesBelowMin {
                issued,
                min: min_shares_out,
            });
        }
        buffer.underlying_balance = buffer.underlying_balance.safe_add(&underlying_in)?;
        buffer.wrapped_balance = buffer.wrapped_balance.safe_add(&wrapped_in)?;
        buffer.total_shares = buffer.total_shares.safe_add(&issued)?;
        buffer.add_owner_shares(owner, issued)?;
        Ok(issued)
    }

    /// Burns `shares_in` of `owner` and returns the proportional
    /// `(underlying, wrapped)` amounts, rounded down.
    pub(crate) fn remove_liquidity(
        &mut self,
        wrapped: Address,
        owner: Address,
        shares_in: Amount,
        min_underlying_out: Amount,
        min_wrapped_out: Amount,
        minimum_total_supply: Amount,
    ) -> Result<(Amount, Amount)> {
        let buffer = self.get_mut(wrapped)?;
        // Locked shares are never redeemable.
        let held = if owner.is_zero() {
            Amount::ZERO
        } else {
            buffer.owner_shares(owner)
        };
        let remaining_owner = held
            .checked_sub(&shares_in)
            .ok_or(VaultError::NotEnoughBufferShares {
                balance: held,
                needed: shares_in,
            })?;
        let remaining_total = buffer.total_shares.safe_sub(&shares_in)?;
        if remaining_total < minimum_total_supply {
            return Err(VaultError::BufferTotalSupplyTooLow(remaining_total));
        }

        let underlying_out = mul_div_amount(
            buffer.underlying_balance,
            shares_in,
            buffer.total_shares,
            Rounding::Down,
        )?;
        let wrapped_out = mul_div_amount(
            buffer.wrapped_balance,
            shares_in,
            buffer.total_shares,
            Rounding::Down,
        )?;
        if underlying_out < min_underlying_out {
            return Err(VaultError::AmountOutBelowMin {
                token: buffer.underlying_token,
                amount: underlying_out,
                min: min_underlying_out,
            });
        }
        if wrapped_out < min_wrapped_out {
            return Err(VaultError::AmountOutBelowMin {
                token: wrapped,
                amount: wrapped_out,
                min: min_wrapped_out,
            });
        }

        buffer.underlying_balance = buffer.underlying_balance.safe_sub(&underlying_out)?;
        buffer.wrapped_balance = buffer.wrapped_balance.safe_sub(&wrapped_out)?;
        buffer.total_shares = remaining_total;
        buffer.owner_shares.insert(owner, remaining_owner);
        Ok((underlying_out, wrapped_out))
    }
}

const fn outcome(kind: SwapKind, amount_in: Amount, amount_out: Amount) -> SwapOutcome {
    let amount_calculated = match kind {
        SwapKind::ExactIn => amount_out,
        SwapKind::ExactOut => amount_in,
    };
    SwapOutcome {
        amount_calculated,
        amount_in,
        amount_out,
    }
}
