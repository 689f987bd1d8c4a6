//! Unlocked sessions and the settlement primitives.

use tracing::debug;

use super::guard::TransactionGuard;
use super::Vault;
use crate::domain::{Address, Amount};
use crate::error::{Result, VaultError};
use crate::traits::TokenLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionMode {
    Execute,
    Query,
}

/// Handle to an unlocked vault.
///
/// Obtained from [`Vault::unlock`] or [`Vault::query`].  Every operation
/// takes the calling identity, which must be the innermost locker, and is
/// atomic: an operation that fails leaves the session exactly as it was.
///
/// Token payments are declared, never inferred.  A caller either pays
/// first and calls [`settle`](Self::settle) before any operation on that
/// token, or runs the operation first and pays and settles afterwards.
/// Tokens that arrive unannounced before a token's first use in the
/// session are absorbed as surplus and credited to no one.
#[derive(Debug)]
pub struct Session<'v, L: TokenLedger> {
    pub(crate) vault: &'v mut Vault<L>,
    pub(crate) guard: TransactionGuard,
    pub(crate) mode: SessionMode,
}

impl<'v, L: TokenLedger> Session<'v, L> {
    pub(crate) fn new(vault: &'v mut Vault<L>, mode: SessionMode) -> Self {
        Self {
            vault,
            guard: TransactionGuard::new(),
            mode,
        }
    }

    /// The vault behind this session.
    #[must_use]
    pub fn vault(&self) -> &Vault<L> {
        &*self.vault
    }

    /// Account holding the vault's tokens.
    #[must_use]
    pub fn vault_address(&self) -> Address {
        self.vault.address
    }

    /// The token world.
    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.vault.ledger
    }

    /// Mutable token world; used by callers to pay the vault.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.vault.ledger
    }

    /// Locker stack and deltas.
    #[must_use]
    pub const fn guard(&self) -> &TransactionGuard {
        &self.guard
    }

    /// Outstanding delta of `token` in the innermost frame; positive is
    /// owed to the vault.
    #[must_use]
    pub fn delta_of(&self, token: Address) -> i128 {
        self.guard.delta_of(token)
    }

    /// `true` when running as a query.
    #[must_use]
    pub fn is_query(&self) -> bool {
        self.mode == SessionMode::Query
    }

    /// Runs `f` under a new locker frame for `caller`.
    ///
    /// The frame must be settled when `f` returns, except in queries.
    pub(crate) fn run_frame<T, F>(&mut self, caller: Address, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.guard.push(caller);
        debug!(locker = %caller, depth = self.guard.depth(), "frame opened");
        match f(self) {
            Ok(value) => {
                match self.mode {
                    SessionMode::Execute => self.guard.pop_settled()?,
                    SessionMode::Query => self.guard.pop_unchecked(),
                }
                Ok(value)
            }
            Err(err) => {
                self.guard.pop_unchecked();
                Err(err)
            }
        }
    }

    /// Runs `f` and restores vault state, token ledger and guard if it
    /// fails.
    pub(crate) fn atomic<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let checkpoint = (
            self.vault.state.clone(),
            self.vault.ledger.clone(),
            self.guard.clone(),
        );
        let result = f(self);
        if result.is_err() {
            (self.vault.state, self.vault.ledger, self.guard) = checkpoint;
        }
        result
    }

    /// Opens a nested frame for `caller`.  The nested frame keeps its own
    /// deltas and must settle them before it returns.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, or [`VaultError::BalanceNotSettled`].
    pub fn unlock<T, F>(&mut self, caller: Address, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.atomic(|session| session.run_frame(caller, f))
    }

    /// Aligns the tracked reserve of `token` with the vault's balance the
    /// first time the token is used in this session.
    pub(crate) fn sync_before(&mut self, token: Address) -> Result<()> {
        if self.guard.mark_synced(token) {
            let actual = self.vault.ledger.balance_of(token, self.vault.address);
            self.vault.state.reserves.sync(token, actual)?;
        }
        Ok(())
    }

    /// Credits the caller with what it has paid in `token` since the last
    /// reconciliation, capped at `amount_hint`.  Returns the credit.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NoLocker`] or [`VaultError::WrongLocker`].
    /// - [`VaultError::ReservesMismatch`] if the vault holds less than it
    ///   tracks.
    pub fn settle(&mut self, caller: Address, token: Address, amount_hint: Amount) -> Result<Amount> {
        self.atomic(|session| {
            session.guard.ensure_locker(caller)?;
            session.guard.mark_synced(token);
            let actual = session.vault.ledger.balance_of(token, session.vault.address);
            let credit = session
                .vault
                .state
                .reserves
                .settle(token, actual, amount_hint)?;
            session.guard.supply_credit(token, credit)?;
            debug!(locker = %caller, token = %token, credit = %credit, "settled");
            Ok(credit)
        })
    }

    /// Transfers `amount` of `token` from the vault to `to` and charges it
    /// to the caller.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NoLocker`] or [`VaultError::WrongLocker`].
    /// - [`VaultError::Underflow`] if the vault tracks less than `amount`.
    /// - Ledger errors from the transfer.
    pub fn send_to(
        &mut self,
        caller: Address,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.atomic(|session| {
            session.guard.ensure_locker(caller)?;
            session.sync_before(token)?;
            session.guard.take_debt(token, amount)?;
            session.vault.state.reserves.debit(token, amount)?;
            let from = session.vault.address;
            session.vault.ledger.transfer(token, from, to, amount)?;
            debug!(locker = %caller, token = %token, to = %to, amount = %amount, "sent");
            Ok(())
        })
    }

    /// Fails if any token used in this session is held in a smaller
    /// amount than tracked.
    pub(crate) fn ensure_reserves_covered(&self) -> Result<()> {
        for token in self.guard.synced_tokens() {
            let actual = self.vault.ledger.balance_of(token, self.vault.address);
            self.vault.state.reserves.ensure_covered(token, actual)?;
        }
        Ok(())
    }

    /// Fails with [`VaultError::TradeAmountTooSmall`] for a non-zero
    /// scaled18 amount below the vault minimum.
    pub(crate) fn ensure_valid_trade_amount(&self, amount_scaled18: Amount) -> Result<()> {
        if !amount_scaled18.is_zero() && amount_scaled18 < self.vault.config.minimum_trade_amount() {
            return Err(VaultError::TradeAmountTooSmall(amount_scaled18));
        }
        Ok(())
    }
}
