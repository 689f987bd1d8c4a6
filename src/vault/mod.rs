//! The vault accounting core.
//!
//! A [`Vault`] owns every pool balance, tracked reserve, buffer and BPT
//! ledger, plus the token world it settles against.  All state-changing
//! operations run inside a [`Session`] opened by [`Vault::unlock`]:
//!
//! ```text
//! unlock(caller) ──► session ops (swap, add/remove liquidity, wrap, settle, send_to)
//!        │                         │ record signed deltas per token
//!        ▼                         ▼
//!   every delta == 0 ?  ──no──►  BalanceNotSettled, state restored
//!        │ yes
//!        ▼
//!   reserves covered by actual balances ? ──no──► ReservesMismatch, state restored
//!        │ yes
//!        ▼
//!     committed
//! ```
//!
//! Queries ([`Vault::query`] and the `query_*` helpers) run the same code
//! on a scratch copy and never commit.

mod balances;
mod bpt;
mod buffer;
mod dispatcher;
mod guard;
mod registry;
mod reserves;
mod session;
mod wrapping;

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;

use std::sync::Arc;

use tracing::info;

pub use balances::{BalanceLedger, PoolTokenSnapshot};
pub use bpt::BptLedger;
pub use buffer::{Buffer, BufferManager};
pub use guard::TransactionGuard;
pub use registry::{PoolTokenInfo, TokenRegistry};
pub use reserves::ReserveTracker;
pub use session::Session;

use balances::PoolEntry;
use session::SessionMode;

use crate::config::{PoolConfig, VaultConfig};
use crate::domain::{
    Address, AddLiquidityOutcome, AddLiquidityParams, Amount, BufferWrapOrUnwrapParams,
    RemoveLiquidityOutcome, RemoveLiquidityParams, SwapOutcome, SwapParams,
};
use crate::error::{Result, VaultError};
use crate::traits::{BasePool, TokenLedger};

/// Everything a session may roll back, apart from the token ledger.
#[derive(Debug, Clone)]
pub(crate) struct VaultState<L: TokenLedger> {
    pub(crate) balances: BalanceLedger,
    pub(crate) reserves: ReserveTracker,
    pub(crate) buffers: BufferManager<L>,
    pub(crate) bpt: BptLedger,
}

impl<L: TokenLedger> Default for VaultState<L> {
    fn default() -> Self {
        Self {
            balances: BalanceLedger::default(),
            reserves: ReserveTracker::default(),
            buffers: BufferManager::default(),
            bpt: BptLedger::default(),
        }
    }
}

/// Shared-liquidity vault over a token ledger `L`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use hydra_vault::prelude::*;
///
/// let dai = Address::repeat_byte(1);
/// let usdc = Address::repeat_byte(2);
/// let pool = Address::repeat_byte(0x50);
/// let router = Address::repeat_byte(0xaa);
/// let vault_address = Address::repeat_byte(0x7a);
///
/// let mut vault = Vault::new(VaultConfig::default(), vault_address, InMemoryLedger::new())?;
/// let tokens = vec![
///     TokenConfig::standard(dai, Decimals::MAX),
///     TokenConfig::standard(usdc, Decimals::new(6)?),
/// ];
/// vault.register_pool(pool, PoolConfig::new(tokens, LiquidityManagement::default())?, Arc::new(ConstantSumPool))?;
/// assert!(vault.is_pool_registered(pool));
/// assert!(!vault.is_pool_initialized(pool));
/// # Ok::<(), VaultError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Vault<L: TokenLedger> {
    config: VaultConfig,
    address: Address,
    ledger: L,
    state: VaultState<L>,
}

impl<L: TokenLedger> Vault<L> {
    /// Creates an empty vault holding tokens at `address` in `ledger`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] if `config` is invalid.
    pub fn new(config: VaultConfig, address: Address, ledger: L) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            address,
            ledger,
            state: VaultState::default(),
        })
    }

    /// Vault configuration.
    #[must_use]
    pub const fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Account holding the vault's tokens.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The token world.
    #[must_use]
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the token world, outside any session.  Transfers
    /// made here to the vault's address are donations until settled.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Registers `pool` with zero balances.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidConfiguration`] for an invalid config or more
    ///   tokens than this vault allows.
    /// - [`VaultError::PoolAlreadyRegistered`].
    pub fn register_pool(
        &mut self,
        pool: Address,
        config: PoolConfig,
        hooks: Arc<dyn BasePool>,
    ) -> Result<()> {
        config.validate()?;
        if config.tokens().len() > self.config.max_tokens_per_pool() {
            return Err(VaultError::InvalidConfiguration(
                "pool has more tokens than the vault allows",
            ));
        }
        let registry = TokenRegistry::from_configs(config.tokens());
        let token_count = registry.len();
        self.state.balances.register(
            pool,
            PoolEntry::new(registry, hooks, config.liquidity_management()),
        )?;
        info!(pool = %pool, tokens = token_count, "pool registered");
        Ok(())
    }

    /// Opens a session for `caller`, runs `f` and commits only if every
    /// token delta nets to zero and tracked reserves are covered by the
    /// vault's actual balances.  Any error restores the state from before
    /// the call.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, [`VaultError::BalanceNotSettled`] or
    /// [`VaultError::ReservesMismatch`].
    pub fn unlock<T, F>(&mut self, caller: Address, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session<'_, L>) -> Result<T>,
    {
        let checkpoint = (self.state.clone(), self.ledger.clone());
        let result = {
            let mut session = Session::new(self, SessionMode::Execute);
            session
                .run_frame(caller, f)
                .and_then(|value| session.ensure_reserves_covered().map(|()| value))
        };
        if result.is_err() {
            (self.state, self.ledger) = checkpoint;
        }
        result
    }

    /// Runs `f` in a session over a scratch copy of the vault.  Nothing is
    /// committed and settlement is not enforced.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns.
    pub fn query<T, F>(&self, caller: Address, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session<'_, L>) -> Result<T>,
    {
        let mut scratch = self.clone();
        let mut session = Session::new(&mut scratch, SessionMode::Query);
        session.run_frame(caller, f)
    }

    /// Result of [`Session::swap`] from the current state.
    ///
    /// # Errors
    ///
    /// Same as [`Session::swap`].
    pub fn query_swap(&self, caller: Address, params: &SwapParams) -> Result<SwapOutcome> {
        self.query(caller, |session| session.swap(caller, params))
    }

    /// Result of [`Session::add_liquidity`] from the current state.
    ///
    /// # Errors
    ///
    /// Same as [`Session::add_liquidity`].
    pub fn query_add_liquidity(
        &self,
        caller: Address,
        params: &AddLiquidityParams,
    ) -> Result<AddLiquidityOutcome> {
        self.query(caller, |session| session.add_liquidity(caller, params))
    }

    /// Result of [`Session::remove_liquidity`] from the current state.
    ///
    /// # Errors
    ///
    /// Same as [`Session::remove_liquidity`].
    pub fn query_remove_liquidity(
        &self,
        caller: Address,
        params: &RemoveLiquidityParams,
    ) -> Result<RemoveLiquidityOutcome> {
        self.query(caller, |session| session.remove_liquidity(caller, params))
    }

    /// Result of [`Session::erc4626_buffer_wrap_or_unwrap`] from the
    /// current state.
    ///
    /// # Errors
    ///
    /// Same as [`Session::erc4626_buffer_wrap_or_unwrap`].
    pub fn query_buffer_wrap_or_unwrap(
        &self,
        caller: Address,
        params: &BufferWrapOrUnwrapParams,
    ) -> Result<SwapOutcome> {
        self.query(caller, |session| {
            session.erc4626_buffer_wrap_or_unwrap(caller, params)
        })
    }

    // ── BPT ─────────────────────────────────────────────────────────────

    /// Lets `spender` burn up to `amount` of `owner`'s BPT of `pool`.
    ///
    /// # Errors
    ///
    /// [`VaultError::PoolNotRegistered`], or [`VaultError::LockedBpt`] for
    /// the zero address.
    pub fn approve_bpt(
        &mut self,
        owner: Address,
        pool: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<()> {
        self.state.balances.entry(pool)?;
        if owner.is_zero() {
            return Err(VaultError::LockedBpt(pool));
        }
        self.state.bpt.approve(pool, owner, spender, amount);
        Ok(())
    }

    /// Moves BPT of `pool` between accounts.  The locked supply held by
    /// the zero address never moves.
    ///
    /// # Errors
    ///
    /// [`VaultError::PoolNotRegistered`], [`VaultError::InsufficientBptBalance`],
    /// [`VaultError::LockedBpt`].
    pub fn transfer_bpt(
        &mut self,
        pool: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<()> {
        self.state.balances.entry(pool)?;
        if from.is_zero() {
            return Err(VaultError::LockedBpt(pool));
        }
        self.state.bpt.transfer(pool, from, to, amount)
    }

    // ── Read-only surface ───────────────────────────────────────────────

    /// `true` if `pool` is registered.
    #[must_use]
    pub fn is_pool_registered(&self, pool: Address) -> bool {
        self.state.balances.is_registered(pool)
    }

    /// `true` if `pool` has been initialized.
    #[must_use]
    pub fn is_pool_initialized(&self, pool: Address) -> bool {
        self.state.balances.is_initialized(pool)
    }

    /// Tokens, metadata and balances of `pool`.
    ///
    /// # Errors
    ///
    /// [`VaultError::PoolNotRegistered`].
    pub fn get_pool_token_info(&self, pool: Address) -> Result<PoolTokenSnapshot> {
        self.state.balances.get_pool_token_info(pool)
    }

    /// Live scaled18 balances of `pool` at current rates.
    ///
    /// # Errors
    ///
    /// [`VaultError::PoolNotRegistered`], rate or arithmetic errors.
    pub fn get_current_live_balances(&self, pool: Address) -> Result<Vec<Amount>> {
        self.state.balances.current_live_balances(pool)
    }

    /// BPT supply of `pool`, including the locked minimum.
    pub fn total_supply(&self, pool: Address) -> Amount {
        self.state.bpt.total_supply(pool)
    }

    /// BPT of `pool` held by `owner`.
    pub fn bpt_balance_of(&self, pool: Address, owner: Address) -> Amount {
        self.state.bpt.balance_of(pool, owner)
    }

    /// Remaining BPT allowance.
    pub fn bpt_allowance(&self, pool: Address, owner: Address, spender: Address) -> Amount {
        self.state.bpt.allowance(pool, owner, spender)
    }

    /// `(underlying, wrapped)` idle balances of the buffer of `wrapped`.
    ///
    /// # Errors
    ///
    /// [`VaultError::BufferNotInitialized`].
    pub fn get_buffer_balance(&self, wrapped: Address) -> Result<(Amount, Amount)> {
        let buffer = self.state.buffers.get(wrapped)?;
        Ok((buffer.underlying_balance(), buffer.wrapped_balance()))
    }

    /// Total shares of the buffer of `wrapped`.
    ///
    /// # Errors
    ///
    /// [`VaultError::BufferNotInitialized`].
    pub fn get_buffer_total_shares(&self, wrapped: Address) -> Result<Amount> {
        Ok(self.state.buffers.get(wrapped)?.total_shares())
    }

    /// Shares of the buffer of `wrapped` held by `owner`.
    ///
    /// # Errors
    ///
    /// [`VaultError::BufferNotInitialized`].
    pub fn get_buffer_owner_shares(&self, wrapped: Address, owner: Address) -> Result<Amount> {
        Ok(self.state.buffers.get(wrapped)?.owner_shares(owner))
    }

    /// Underlying asset of the buffer of `wrapped`, if initialized.
    #[must_use]
    pub fn get_buffer_asset(&self, wrapped: Address) -> Option<Address> {
        self.state
            .buffers
            .get(wrapped)
            .ok()
            .map(Buffer::underlying_token)
    }

    /// Tracked reserve of `token`.
    pub fn reserves_of(&self, token: Address) -> Amount {
        self.state.reserves.reserve_of(token)
    }
}
