//! Tracked token reserves.
//!
//! The vault never infers a transfer from a balance change alone.  For each
//! token it tracks the amount it believes it holds; inbound payments are
//! recognized only through [`ReserveTracker::settle`], capped at the
//! caller's declared amount, and outbound transfers move the tracked value
//! by exactly the declared amount.  Anything else that shows up on the
//! vault's balance is an untracked surplus and is absorbed without
//! crediting anyone.

use std::collections::BTreeMap;

use tracing::warn;

use crate::domain::{Address, Amount};
use crate::error::{Result, VaultError};
use crate::math::CheckedArithmetic;

/// Tracked reserve per token, process-wide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReserveTracker {
    reserves: BTreeMap<Address, Amount>,
}

impl ReserveTracker {
    /// Tracked reserve of `token`; zero if never touched.
    pub fn reserve_of(&self, token: Address) -> Amount {
        self.reserves.get(&token).copied().unwrap_or_default()
    }

    fn surplus(&self, token: Address, actual: Amount) -> Result<Amount> {
        let tracked = self.reserve_of(token);
        actual
            .checked_sub(&tracked)
            .ok_or(VaultError::ReservesMismatch {
                token,
                tracked,
                actual,
            })
    }

    /// Aligns the tracked reserve with the actual balance before a
    /// sequence of operations on `token`, absorbing any surplus.
    ///
    /// # Errors
    ///
    /// [`VaultError::ReservesMismatch`] if the vault holds less than it
    /// tracks.
    pub(crate) fn sync(&mut self, token: Address, actual: Amount) -> Result<()> {
        let surplus = self.surplus(token, actual)?;
        if !surplus.is_zero() {
            warn!(token = %token, surplus = %surplus, "absorbed untracked surplus on sync");
        }
        self.reserves.insert(token, actual);
        Ok(())
    }

    /// Recognizes an inbound payment of at most `hint`.  Returns the credit.
    ///
    /// The received amount is `actual - tracked`.  Anything beyond `hint`
    /// is absorbed into the tracked reserve and credited to no one.
    ///
    /// # Errors
    ///
    /// [`VaultError::ReservesMismatch`] if the vault holds less than it
    /// tracks.
    pub(crate) fn settle(&mut self, token: Address, actual: Amount, hint: Amount) -> Result<Amount> {
        let received = self.surplus(token, actual)?;
        let credit = received.min(hint);
        if received > hint {
            warn!(
                token = %token,
                received = %received,
                hint = %hint,
                "absorbed surplus beyond settlement hint"
            );
        }
        self.reserves.insert(token, actual);
        Ok(credit)
    }

    /// Lowers the tracked reserve by an outbound transfer.
    ///
    /// # Errors
    ///
    /// [`VaultError::Underflow`] if more leaves than is tracked.
    pub(crate) fn debit(&mut self, token: Address, amount: Amount) -> Result<()> {
        let next = self.reserve_of(token).safe_sub(&amount)?;
        self.reserves.insert(token, next);
        Ok(())
    }

    /// Raises the tracked reserve by a verified inbound transfer.
    ///
    /// # Errors
    ///
    /// [`VaultError::Overflow`].
    pub(crate) fn credit(&mut self, token: Address, amount: Amount) -> Result<()> {
        let next = self.reserve_of(token).safe_add(&amount)?;
        self.reserves.insert(token, next);
        Ok(())
    }

    /// Fails if the vault holds less of `token` than it tracks.
    ///
    /// # Errors
    ///
    /// [`VaultError::ReservesMismatch`].
    pub(crate) fn ensure_covered(&self, token: Address, actual: Amount) -> Result<()> {
        self.surplus(token, actual).map(|_| ())
    }
}
