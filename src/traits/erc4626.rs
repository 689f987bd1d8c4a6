//! Tokenized vault (ERC4626) interface used by buffers.

use core::fmt;

use super::TokenLedger;
use crate::domain::{Address, Amount};
use crate::error::Result;

/// A yield-bearing wrapper whose shares are the wrapped token.
///
/// Implementations are stateless over the [`TokenLedger`]: total assets and
/// total supply are read from the ledger, so a snapshot of the ledger is a
/// snapshot of the wrapper.  Previews follow the ERC4626 rounding rules:
/// `preview_deposit` and `preview_redeem` round down, `preview_mint` and
/// `preview_withdraw` round up.
pub trait Erc4626<L: TokenLedger>: fmt::Debug + Send + Sync {
    /// Address of the share token.
    fn wrapped_token(&self) -> Address;

    /// Address of the underlying asset.
    fn asset(&self) -> Address;

    /// Shares worth `assets`, rounded down.
    ///
    /// # Errors
    ///
    /// Arithmetic errors.
    fn convert_to_shares(&self, ledger: &L, assets: Amount) -> Result<Amount>;

    /// Assets worth `shares`, rounded down.
    ///
    /// # Errors
    ///
    /// Arithmetic errors.
    fn convert_to_assets(&self, ledger: &L, shares: Amount) -> Result<Amount>;

    /// Shares minted by depositing `assets`.
    ///
    /// # Errors
    ///
    /// Arithmetic errors.
    fn preview_deposit(&self, ledger: &L, assets: Amount) -> Result<Amount>;

    /// Assets required to mint `shares`.
    ///
    /// # Errors
    ///
    /// Arithmetic errors.
    fn preview_mint(&self, ledger: &L, shares: Amount) -> Result<Amount>;

    /// Shares burned to withdraw `assets`.
    ///
    /// # Errors
    ///
    /// Arithmetic errors.
    fn preview_withdraw(&self, ledger: &L, assets: Amount) -> Result<Amount>;

    /// Assets returned by redeeming `shares`.
    ///
    /// # Errors
    ///
    /// Arithmetic errors.
    fn preview_redeem(&self, ledger: &L, shares: Amount) -> Result<Amount>;

    /// Pulls `assets` from `caller` and mints shares to `receiver`.
    /// Returns the shares minted.
    ///
    /// # Errors
    ///
    /// Ledger or arithmetic errors.
    fn deposit(&self, ledger: &mut L, caller: Address, assets: Amount, receiver: Address)
        -> Result<Amount>;

    /// Mints exactly `shares` to `receiver`, pulling assets from `caller`.
    /// Returns the assets pulled.
    ///
    /// # Errors
    ///
    /// Ledger or arithmetic errors.
    fn mint(&self, ledger: &mut L, caller: Address, shares: Amount, receiver: Address)
        -> Result<Amount>;

    /// Burns shares of `owner` and sends exactly `assets` to `receiver`.
    /// Returns the shares burned.
    ///
    /// # Errors
    ///
    /// Ledger or arithmetic errors.
    fn withdraw(
        &self,
        ledger: &mut L,
        caller: Address,
        assets: Amount,
        receiver: Address,
        owner: Address,
    ) -> Result<Amount>;

    /// Burns exactly `shares` of `owner` and sends the assets to `receiver`.
    /// Returns the assets sent.
    ///
    /// # Errors
    ///
    /// Ledger or arithmetic errors.
    fn redeem(
        &self,
        ledger: &mut L,
        caller: Address,
        shares: Amount,
        receiver: Address,
        owner: Address,
    ) -> Result<Amount>;
}
