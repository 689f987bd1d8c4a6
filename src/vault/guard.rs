//! Locker stack and token deltas of an unlocked session.
//!
//! Each [`unlock`](crate::vault::Vault::unlock) pushes a frame naming its
//! locker.  Operations record signed token deltas in the innermost frame:
//! positive is debt the locker owes the vault, negative is credit the vault
//! owes the locker.  A frame can only be popped once every delta is zero.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Address, Amount};
use crate::error::{Result, VaultError};

#[derive(Debug, Clone)]
struct LockerFrame {
    locker: Address,
    deltas: BTreeMap<Address, i128>,
}

/// Transactional envelope state.
#[derive(Debug, Clone, Default)]
pub struct TransactionGuard {
    frames: Vec<LockerFrame>,
    synced: BTreeSet<Address>,
}

impl TransactionGuard {
    /// A locked guard with no frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while at least one frame is open.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Number of open frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Innermost locker.
    #[must_use]
    pub fn current_locker(&self) -> Option<Address> {
        self.frames.last().map(|frame| frame.locker)
    }

    /// Fails unless `caller` is the innermost locker.
    ///
    /// # Errors
    ///
    /// [`VaultError::NoLocker`] when locked, [`VaultError::WrongLocker`]
    /// for any other identity.
    pub fn ensure_locker(&self, caller: Address) -> Result<()> {
        let expected = self.current_locker().ok_or(VaultError::NoLocker)?;
        if expected != caller {
            return Err(VaultError::WrongLocker {
                expected,
                actual: caller,
            });
        }
        Ok(())
    }

    /// Outstanding delta of `token` in the innermost frame.
    #[must_use]
    pub fn delta_of(&self, token: Address) -> i128 {
        self.frames
            .last()
            .and_then(|frame| frame.deltas.get(&token).copied())
            .unwrap_or(0)
    }

    /// Tokens whose reserves were synced during this session.
    pub fn synced_tokens(&self) -> impl Iterator<Item = Address> + '_ {
        self.synced.iter().copied()
    }

    pub(crate) fn push(&mut self, locker: Address) {
        self.frames.push(LockerFrame {
            locker,
            deltas: BTreeMap::new(),
        });
    }

    /// Pops the innermost frame, requiring every delta to be zero.  The
    /// frame is removed either way.
    pub(crate) fn pop_settled(&mut self) -> Result<()> {
        let frame = self.frames.pop().ok_or(VaultError::NoLocker)?;
        if let Some((token, delta)) = frame.deltas.into_iter().find(|(_, d)| *d != 0) {
            return Err(VaultError::BalanceNotSettled { token, delta });
        }
        Ok(())
    }

    pub(crate) fn pop_unchecked(&mut self) {
        self.frames.pop();
    }

    /// Records that the caller owes `amount` of `token`.
    pub(crate) fn take_debt(&mut self, token: Address, amount: Amount) -> Result<()> {
        let delta = amount
            .to_signed()
            .ok_or(VaultError::Overflow("debt exceeds i128"))?;
        self.account_delta(token, delta)
    }

    /// Records that the vault owes the caller `amount` of `token`.
    pub(crate) fn supply_credit(&mut self, token: Address, amount: Amount) -> Result<()> {
        let delta = amount
            .to_signed()
            .ok_or(VaultError::Overflow("credit exceeds i128"))?;
        self.account_delta(token, -delta)
    }

    fn account_delta(&mut self, token: Address, delta: i128) -> Result<()> {
        if delta == 0 {
            return Ok(());
        }
        let frame = self.frames.last_mut().ok_or(VaultError::NoLocker)?;
        let current = frame.deltas.get(&token).copied().unwrap_or(0);
        let next = current
            .checked_add(delta)
            .ok_or(VaultError::Overflow("token delta overflow"))?;
        if next == 0 {
            frame.deltas.remove(&token);
        } else {
            frame.deltas.insert(token, next);
        }
        Ok(())
    }

    /// Marks `token` as touched.  Returns `true` the first time.
    pub(crate) fn mark_synced(&mut self, token: Address) -> bool {
        self.synced.insert(token)
    }
}
