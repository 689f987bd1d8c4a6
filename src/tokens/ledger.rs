//! In-memory token ledger.

use std::collections::BTreeMap;

use crate::domain::{Address, Amount};
use crate::error::{Result, VaultError};
use crate::math::CheckedArithmetic;
use crate::traits::TokenLedger;

/// A [`TokenLedger`] backed by ordered maps.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::{Address, Amount};
/// use hydra_vault::tokens::InMemoryLedger;
/// use hydra_vault::traits::TokenLedger;
///
/// let dai = Address::repeat_byte(1);
/// let alice = Address::repeat_byte(0xa1);
/// let bob = Address::repeat_byte(0xb0);
///
/// let mut ledger = InMemoryLedger::new();
/// ledger.mint(dai, alice, Amount::new(100)).expect("mint");
/// ledger.transfer(dai, alice, bob, Amount::new(40)).expect("transfer");
/// assert_eq!(ledger.balance_of(dai, bob), Amount::new(40));
/// assert_eq!(ledger.total_supply(dai), Amount::new(100));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryLedger {
    balances: BTreeMap<(Address, Address), Amount>,
    supplies: BTreeMap<Address, Amount>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn debit(&mut self, token: Address, account: Address, amount: Amount) -> Result<()> {
        let balance = self.balance_of(token, account);
        let remaining = balance
            .checked_sub(&amount)
            .ok_or(VaultError::InsufficientBalance {
                token,
                account,
                balance,
                needed: amount,
            })?;
        if remaining.is_zero() {
            self.balances.remove(&(token, account));
        } else {
            self.balances.insert((token, account), remaining);
        }
        Ok(())
    }

    fn credit(&mut self, token: Address, account: Address, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let balance = self.balance_of(token, account).safe_add(&amount)?;
        self.balances.insert((token, account), balance);
        Ok(())
    }
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, token: Address, account: Address) -> Amount {
        self.balances
            .get(&(token, account))
            .copied()
            .unwrap_or_default()
    }

    fn total_supply(&self, token: Address) -> Amount {
        self.supplies.get(&token).copied().unwrap_or_default()
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.debit(token, from, amount)?;
        self.credit(token, to, amount)
    }

    fn mint(&mut self, token: Address, to: Address, amount: Amount) -> Result<()> {
        let supply = self.total_supply(token).safe_add(&amount)?;
        self.credit(token, to, amount)?;
        self.supplies.insert(token, supply);
        Ok(())
    }

    fn burn(&mut self, token: Address, from: Address, amount: Amount) -> Result<()> {
        self.debit(token, from, amount)?;
        let supply = self.total_supply(token).safe_sub(&amount)?;
        self.supplies.insert(token, supply);
        Ok(())
    }
}
