//! The token world the vault holds balances in.

use core::fmt;

use crate::domain::{Address, Amount};
use crate::error::Result;

/// Fungible token balances keyed by `(token, account)`.
///
/// The vault only ever observes its own balances through this trait and
/// moves tokens out with [`transfer`](TokenLedger::transfer).  Routers and
/// wrappers use the same ledger to push tokens in.  `Clone` is required so
/// an unlock session can snapshot the ledger and restore it on failure.
pub trait TokenLedger: Clone + fmt::Debug {
    /// Balance of `account` in `token`.
    fn balance_of(&self, token: Address, account: Address) -> Amount;

    /// Total supply of `token`.
    fn total_supply(&self, token: Address) -> Amount;

    /// Moves `amount` of `token` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// [`VaultError::InsufficientBalance`](crate::error::VaultError::InsufficientBalance)
    /// if `from` holds less than `amount`.
    fn transfer(&mut self, token: Address, from: Address, to: Address, amount: Amount)
        -> Result<()>;

    /// Creates `amount` of `token` for `to`.
    ///
    /// # Errors
    ///
    /// Overflow of the balance or the supply.
    fn mint(&mut self, token: Address, to: Address, amount: Amount) -> Result<()>;

    /// Destroys `amount` of `token` held by `from`.
    ///
    /// # Errors
    ///
    /// [`VaultError::InsufficientBalance`](crate::error::VaultError::InsufficientBalance)
    /// if `from` holds less than `amount`.
    fn burn(&mut self, token: Address, from: Address, amount: Amount) -> Result<()>;
}
