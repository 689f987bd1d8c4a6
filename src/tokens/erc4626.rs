//! Reference ERC4626 wrapper over a [`TokenLedger`].

use crate::domain::{Address, Amount, Rounding};
use crate::error::Result;
use crate::math::{mul_div_amount, CheckedArithmetic};
use crate::traits::{Erc4626, TokenLedger};

/// A minimal ERC4626 wrapper.
///
/// The wrapper's own address is the share token.  Total assets are the
/// underlying held at that address, so transferring underlying to it
/// accrues yield to every shareholder.  Conversions use one virtual share
/// and one virtual asset:
///
/// ```text
/// shares = assets * (supply + 1) / (total_assets + 1)
/// assets = shares * (total_assets + 1) / (supply + 1)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleErc4626 {
    address: Address,
    asset: Address,
}

impl SimpleErc4626 {
    /// Creates a wrapper at `address` over `asset`.
    #[must_use]
    pub const fn new(address: Address, asset: Address) -> Self {
        Self { address, asset }
    }

    fn total_assets<L: TokenLedger>(&self, ledger: &L) -> Result<Amount> {
        ledger
            .balance_of(self.asset, self.address)
            .safe_add(&Amount::new(1))
    }

    fn virtual_supply<L: TokenLedger>(&self, ledger: &L) -> Result<Amount> {
        ledger.total_supply(self.address).safe_add(&Amount::new(1))
    }

    fn to_shares<L: TokenLedger>(
        &self,
        ledger: &L,
        assets: Amount,
        rounding: Rounding,
    ) -> Result<Amount> {
        mul_div_amount(
            assets,
            self.virtual_supply(ledger)?,
            self.total_assets(ledger)?,
            rounding,
        )
    }

    fn to_assets<L: TokenLedger>(
        &self,
        ledger: &L,
        shares: Amount,
        rounding: Rounding,
    ) -> Result<Amount> {
        mul_div_amount(
            shares,
            self.total_assets(ledger)?,
            self.virtual_supply(ledger)?,
            rounding,
        )
    }
}

impl<L: TokenLedger> Erc4626<L> for SimpleErc4626 {
    fn wrapped_token(&self) -> Address {
        self.address
    }

    fn asset(&self) -> Address {
        self.asset
    }

    fn convert_to_shares(&self, ledger: &L, assets: Amount) -> Result<Amount> {
        self.to_shares(ledger, assets, Rounding::Down)
    }

    fn convert_to_assets(&self, ledger: &L, shares: Amount) -> Result<Amount> {
        self.to_assets(ledger, shares, Rounding::Down)
    }

    fn preview_deposit(&self, ledger: &L, assets: Amount) -> Result<Amount> {
        self.to_shares(ledger, assets, Rounding::Down)
    }

    fn preview_mint(&self, ledger: &L, shares: Amount) -> Result<Amount> {
        self.to_assets(ledger, shares, Rounding::Up)
    }

    fn preview_withdraw(&self, ledger: &L, assets: Amount) -> Result<Amount> {
        self.to_shares(ledger, assets, Rounding::Up)
    }

    fn preview_redeem(&self, ledger: &L, shares: Amount) -> Result<Amount> {
        self.to_assets(ledger, shares, Rounding::Down)
    }

    fn deposit(
        &self,
        ledger: &mut L,
        caller: Address,
        assets: Amount,
        receiver: Address,
    ) -> Result<Amount> {
        let shares = self.preview_deposit(ledger, assets)?;
        ledger.transfer(self.asset, caller, self.address, assets)?;
        ledger.mint(self.address, receiver, shares)?;
        Ok(shares)
    }

    fn mint(
        &self,
        ledger: &mut L,
        caller: Address,
        shares: Amount,
        receiver: Address,
    ) -> Result<Amount> {
        let assets = self.preview_mint(ledger, shares)?;
        ledger.transfer(self.asset, caller, self.address, assets)?;
        ledger.mint(self.address, receiver, shares)?;
        Ok(assets)
    }

    fn withdraw(
        &self,
        ledger: &mut L,
        _caller: Address,
        assets: Amount,
        receiver: Address,
        owner: Address,
    ) -> Result<Amount> {
        let shares = self.preview_withdraw(ledger, assets)?;
        ledger.burn(self.address, owner, shares)?;
        ledger.transfer(self.asset, self.address, receiver, assets)?;
        Ok(shares)
    }

    fn redeem(
        &self,
        ledger: &mut L,
        _caller: Address,
        shares: Amount,
        receiver: Address,
        owner: Address,
    ) -> Result<Amount> {
        let assets = self.preview_redeem(ledger, shares)?;
        ledger.burn(self.address, owner, shares)?;
        ledger.transfer(self.asset, self.address, receiver, assets)?;
        Ok(assets)
    }
}
