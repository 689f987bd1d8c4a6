//! Pool token (BPT) supply, balances and allowances.

use std::collections::BTreeMap;

use crate::domain::{Address, Amount};
use crate::error::{Result, VaultError};
use crate::math::CheckedArithmetic;

/// BPT accounting for every registered pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BptLedger {
    supplies: BTreeMap<Address, Amount>,
    balances: BTreeMap<(Address, Address), Amount>,
    allowances: BTreeMap<(Address, Address, Address), Amount>,
}

impl BptLedger {
    /// Total supply of `pool`'s BPT.
    pub fn total_supply(&self, pool: Address) -> Amount {
        self.supplies.get(&pool).copied().unwrap_or_default()
    }

    /// BPT of `pool` held by `owner`.
    pub fn balance_of(&self, pool: Address, owner: Address) -> Amount {
        self.balances
            .get(&(pool, owner))
            .copied()
            .unwrap_or_default()
    }

    /// Amount `spender` may burn or move on behalf of `owner`.
    pub fn allowance(&self, pool: Address, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(pool, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn mint(&mut self, pool: Address, to: Address, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let supply = self.total_supply(pool).safe_add(&amount)?;
        let balance = self.balance_of(pool, to).safe_add(&amount)?;
        self.supplies.insert(pool, supply);
        self.balances.insert((pool, to), balance);
        Ok(())
    }

    /// Locks `amount` permanently by minting it to the zero address.
    pub(crate) fn mint_minimum_supply(&mut self, pool: Address, amount: Amount) -> Result<()> {
        self.mint(pool, Address::ZERO, amount)
    }

    pub(crate) fn burn(&mut self, pool: Address, from: Address, amount: Amount) -> Result<()> {
        let balance = self.balance_of(pool, from);
        let remaining = balance
            .checked_sub(&amount)
            .ok_or(VaultError::InsufficientBptBalance {
                owner: from,
                balance,
                needed: amount,
            })?;
        let supply = self.total_supply(pool).safe_sub(&amount)?;
        self.balances.insert((pool, from), remaining);
        self.supplies.insert(pool, supply);
        Ok(())
    }

    pub(crate) fn transfer(
        &mut self,
        pool: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.burn(pool, from, amount)?;
        self.mint(pool, to, amount)
    }

    pub(crate) fn approve(&mut self, pool: Address, owner: Address, spender: Address, amount: Amount) {
        self.allowances.insert((pool, owner, spender), amount);
    }

    /// Consumes allowance unless `spender` is `owner`.  [`Amount::MAX`] is
    /// an unlimited allowance and is never reduced.
    pub(crate) fn spend_allowance(
        &mut self,
        pool: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<()> {
        if owner == spender {
            return Ok(());
        }
        let allowance = self.allowance(pool, owner, spender);
        if allowance == Amount::MAX {
            return Ok(());
        }
        let remaining = allowance
            .checked_sub(&amount)
            .ok_or(VaultError::InsufficientAllowance {
                spender,
                allowance,
                needed: amount,
            })?;
        self.allowances.insert((pool, owner, spender), remaining);
        Ok(())
    }
}
