//! Authoritative raw and live balances per pool.
//!
//! Raw balances are stored; live scaled18 balances are stored next to them
//! and recomputed on every write, so the two sequences always describe the
//! same state.  [`BalanceLedger::current_live_balances`] recomputes with
//! fresh rates and is what pool math must use.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::registry::{PoolTokenInfo, TokenRegistry};
use crate::config::LiquidityManagement;
use crate::domain::{Address, Amount};
use crate::error::{Result, VaultError};
use crate::math::scaling::to_scaled18_apply_rate_round_down;
use crate::math::CheckedArithmetic;
use crate::traits::BasePool;

/// Everything the vault stores about one pool.
#[derive(Debug, Clone)]
pub(crate) struct PoolEntry {
    pub(crate) registry: TokenRegistry,
    pub(crate) raw_balances: Vec<Amount>,
    pub(crate) live_balances: Vec<Amount>,
    pub(crate) hooks: Arc<dyn BasePool>,
    pub(crate) liquidity: LiquidityManagement,
    pub(crate) initialized: bool,
}

impl PoolEntry {
    pub(crate) fn new(
        registry: TokenRegistry,
        hooks: Arc<dyn BasePool>,
        liquidity: LiquidityManagement,
    ) -> Self {
        let zeros = vec![Amount::ZERO; registry.len()];
        Self {
            registry,
            raw_balances: zeros.clone(),
            live_balances: zeros,
            hooks,
            liquidity,
            initialized: false,
        }
    }

    fn live_from_raw(&self, raw: &[Amount]) -> Result<Vec<Amount>> {
        self.registry
            .infos()
            .iter()
            .zip(raw)
            .map(|(info, balance)| {
                to_scaled18_apply_rate_round_down(
                    *balance,
                    info.decimal_scaling_factor,
                    info.rate()?,
                )
            })
            .collect()
    }
}

/// Read-only view of a pool's tokens and balances.
#[derive(Debug, Clone)]
pub struct PoolTokenSnapshot {
    /// Tokens in index order.
    pub tokens: Vec<Address>,
    /// Token metadata in index order.
    pub infos: Vec<PoolTokenInfo>,
    /// Raw balances.
    pub raw_balances: Vec<Amount>,
    /// Live scaled18 balances as of the last write.
    pub live_balances_scaled18: Vec<Amount>,
}

/// Pool balances keyed by pool address.
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    pools: BTreeMap<Address, PoolEntry>,
}

impl BalanceLedger {
    pub(crate) fn register(&mut self, pool: Address, entry: PoolEntry) -> Result<()> {
        if self.pools.contains_key(&pool) {
            return Err(VaultError::PoolAlreadyRegistered(pool));
        }
        self.pools.insert(pool, entry);
        Ok(())
    }

    pub(crate) fn entry(&self, pool: Address) -> Result<&PoolEntry> {
        self.pools
            .get(&pool)
            .ok_or(VaultError::PoolNotRegistered(pool))
    }

    pub(crate) fn entry_mut(&mut self, pool: Address) -> Result<&mut PoolEntry> {
        self.pools
            .get_mut(&pool)
            .ok_or(VaultError::PoolNotRegistered(pool))
    }

    /// `true` if `pool` is registered.
    #[must_use]
    pub fn is_registered(&self, pool: Address) -> bool {
        self.pools.contains_key(&pool)
    }

    /// `true` if `pool` has been initialized.
    #[must_use]
    pub fn is_initialized(&self, pool: Address) -> bool {
        self.pools.get(&pool).is_some_and(|entry| entry.initialized)
    }

    /// Tokens, metadata, raw and live balances of `pool`.
    ///
    /// # Errors
    ///
    /// [`VaultError::PoolNotRegistered`].
    pub fn get_pool_token_info(&self, pool: Address) -> Result<PoolTokenSnapshot> {
        let entry = self.entry(pool)?;
        Ok(PoolTokenSnapshot {
            tokens: entry.registry.tokens(),
            infos: entry.registry.infos().to_vec(),
            raw_balances: entry.raw_balances.clone(),
            live_balances_scaled18: entry.live_balances.clone(),
        })
    }

    /// Live scaled18 balances recomputed from raw balances and fresh rates.
    ///
    /// # Errors
    ///
    /// [`VaultError::PoolNotRegistered`], rate or arithmetic errors.
    pub fn current_live_balances(&self, pool: Address) -> Result<Vec<Amount>> {
        let entry = self.entry(pool)?;
        entry.live_from_raw(&entry.raw_balances)
    }

    /// Applies signed raw deltas to `pool`.
    ///
    /// Either every delta is applied to both the raw and the live balances
    /// or nothing changes.
    ///
    /// # Errors
    ///
    /// - [`VaultError::PoolNotRegistered`] for an unknown pool.
    /// - [`VaultError::TokenNotRegistered`] for a token outside the pool.
    /// - [`VaultError::Underflow`] if a balance would go negative.
    pub fn update_balances(&mut self, pool: Address, deltas: &[(Address, i128)]) -> Result<()> {
        let entry = self.entry_mut(pool)?;
        let mut raw = entry.raw_balances.clone();
        for (token, delta) in deltas {
            let index = entry
                .registry
                .index_of(*token)
                .ok_or(VaultError::TokenNotRegistered {
                    pool,
                    token: *token,
                })?;
            raw[index] = raw[index].safe_add_signed(*delta)?;
        }
        let live = entry.live_from_raw(&raw)?;
        entry.raw_balances = raw;
        entry.live_balances = live;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Decimals, TokenConfig};
    use crate::math::ONE;
    use crate::pools::ConstantSumPool;
    use crate::tokens::AdjustableRateProvider;

    const POOL: Address = Address::repeat_byte(0x50);
    const DAI: Address = Address::repeat_byte(1);
    const WSTETH: Address = Address::repeat_byte(2);

    fn ledger_with_rate(provider: Arc<AdjustableRateProvider>) -> BalanceLedger {
        let configs = [
            TokenConfig::standard(DAI, Decimals::MAX),
            TokenConfig::with_rate(WSTETH, Decimals::MAX, provider),
        ];
        let entry = PoolEntry::new(
            TokenRegistry::from_configs(&configs),
            Arc::new(ConstantSumPool),
            LiquidityManagement::default(),
        );
        let mut ledger = BalanceLedger::default();
        assert!(ledger.register(POOL, entry).is_ok());
        ledger
    }

    #[test]
    fn registered_with_zero_balances() {
        let ledger = ledger_with_rate(Arc::new(AdjustableRateProvider::new(Amount::new(ONE))));
        let Ok(snapshot) = ledger.get_pool_token_info(POOL) else {
            panic!("expected Ok");
        };
        assert_eq!(snapshot.tokens, vec![DAI, WSTETH]);
        assert_eq!(snapshot.raw_balances, vec![Amount::ZERO; 2]);
        assert_eq!(snapshot.live_balances_scaled18, vec![Amount::ZERO; 2]);
    }

    #[test]
    fn update_moves_raw_and_live_together() {
        let provider = Arc::new(AdjustableRateProvider::new(Amount::new(2 * ONE)));
        let mut ledger = ledger_with_rate(provider);
        assert!(ledger
            .update_balances(POOL, &[(DAI, 10), (WSTETH, 10)])
            .is_ok());
        let Ok(snapshot) = ledger.get_pool_token_info(POOL) else {
            panic!("expected Ok");
        };
        assert_eq!(snapshot.raw_balances, vec![Amount::new(10), Amount::new(10)]);
        assert_eq!(
            snapshot.live_balances_scaled18,
            vec![Amount::new(10), Amount::new(20)]
        );
    }

    #[test]
    fn unknown_token_changes_nothing() {
        let mut ledger = ledger_with_rate(Arc::new(AdjustableRateProvider::new(Amount::new(ONE))));
        let stranger = Address::repeat_byte(9);
        let result = ledger.update_balances(POOL, &[(DAI, 5), (stranger, 5)]);
        assert_eq!(
            result,
            Err(VaultError::TokenNotRegistered {
                pool: POOL,
                token: stranger
            })
        );
        let Ok(snapshot) = ledger.get_pool_token_info(POOL) else {
            panic!("expected Ok");
        };
        assert_eq!(snapshot.raw_balances, vec![Amount::ZERO; 2]);
    }

    #[test]
    fn negative_balance_rejected() {
        let mut ledger = ledger_with_rate(Arc::new(AdjustableRateProvider::new(Amount::new(ONE))));
        let Err(VaultError::Underflow(_)) = ledger.update_balances(POOL, &[(DAI, -1)]) else {
            panic!("expected Underflow");
        };
    }

    #[test]
    fn live_balances_follow_rate_changes() {
        let provider = Arc::new(AdjustableRateProvider::new(Amount::new(ONE)));
        let mut ledger = ledger_with_rate(provider.clone());
        assert!(ledger.update_balances(POOL, &[(WSTETH, 100)]).is_ok());
        provider.set_rate(Amount::new(3 * ONE / 2));
        let Ok(live) = ledger.current_live_balances(POOL) else {
            panic!("expected Ok");
        };
        assert_eq!(live, vec![Amount::ZERO, Amount::new(150)]);
        // The stored snapshot still reflects the rate at the last write.
        let Ok(snapshot) = ledger.get_pool_token_info(POOL) else {
            panic!("expected Ok");
        };
        assert_eq!(snapshot.live_balances_scaled18[1], Amount::new(100));
    }

    #[test]
    fn unknown_pool() {
        let ledger = BalanceLedger::default();
        assert_eq!(
            ledger.current_live_balances(POOL).map(|_| ()),
            Err(VaultError::PoolNotRegistered(POOL))
        );
    }
}
