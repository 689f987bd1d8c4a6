//! # Hydra Vault
//!
//! Shared-liquidity vault accounting core: one vault holds the tokens of
//! every pool and settles all of a caller's operations against a single
//! ledger of deltas.
//!
//! The crate provides:
//!
//! - **Pool accounting**: registration, initialization, swaps and every
//!   add/remove liquidity variant, with raw and live (scaled18,
//!   rate-adjusted) balances kept side by side.
//! - **Transient settlement**: operations only record debts and credits;
//!   a session commits when every token delta nets to zero.
//! - **ERC4626 buffers**: wrap and unwrap requests served from internal
//!   liquidity, falling back to the wrapper when the buffer runs short.
//! - **Pool tokens (BPT)**: supply, balances and allowances per pool.
//!
//! # Quick Start
//!
//! ```toml
//! [dependencies]
//! hydra-vault = "0.1"
//! ```
//!
//! ## Register a pool, seed it and swap
//!
//! ```rust
//! use std::sync::Arc;
//! use hydra_vault::prelude::*;
//!
//! let e18 = |units: u128| Amount::new(units * 1_000_000_000_000_000_000);
//! let e6 = |units: u128| Amount::new(units * 1_000_000);
//!
//! let dai = Address::repeat_byte(1);
//! let usdc = Address::repeat_byte(2);
//! let pool = Address::repeat_byte(0x50);
//! let router = Address::repeat_byte(0xaa);
//! let vault_address = Address::repeat_byte(0x7a);
//!
//! // 1. A token world where the router holds some funds
//! let mut ledger = InMemoryLedger::new();
//! ledger.mint(dai, router, e18(2_000))?;
//! ledger.mint(usdc, router, e6(2_000))?;
//!
//! // 2. A vault with one linear pool
//! let mut vault = Vault::new(VaultConfig::default(), vault_address, ledger)?;
//! let tokens = vec![
//!     TokenConfig::standard(dai, Decimals::MAX),
//!     TokenConfig::standard(usdc, Decimals::new(6)?),
//! ];
//! let config = PoolConfig::new(tokens, LiquidityManagement::default())?;
//! vault.register_pool(pool, config, Arc::new(ConstantSumPool))?;
//!
//! // 3. Seed it: record the debt, pay, settle
//! let _bpt = vault.unlock(router, |s| {
//!     let bpt = s.initialize(router, pool, router, &[e18(1_000), e6(1_000)], Amount::ZERO)?;
//!     s.ledger_mut().transfer(dai, router, vault_address, e18(1_000))?;
//!     s.ledger_mut().transfer(usdc, router, vault_address, e6(1_000))?;
//!     let _credit = s.settle(router, dai, Amount::MAX)?;
//!     let _credit = s.settle(router, usdc, Amount::MAX)?;
//!     Ok(bpt)
//! })?;
//!
//! // 4. Swap, then pay what is owed and take what is due
//! let params = SwapParams::exact_in(pool, dai, usdc, e18(10), e6(9));
//! let outcome = vault.unlock(router, |s| {
//!     let outcome = s.swap(router, &params)?;
//!     s.ledger_mut().transfer(dai, router, vault_address, outcome.amount_in)?;
//!     let _credit = s.settle(router, dai, outcome.amount_in)?;
//!     s.send_to(router, usdc, router, outcome.amount_out)?;
//!     Ok(outcome)
//! })?;
//!
//! assert_eq!(outcome.amount_out, e6(10));
//! assert_eq!(vault.get_current_live_balances(pool)?, vec![e18(1_010), e18(990)]);
//! # Ok::<(), VaultError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Router     │  opens sessions, moves tokens, settles
//! └──────┬──────┘
//!        │ Vault::unlock(caller, |session| ...)
//!        ▼
//! ┌─────────────┐
//! │   Session    │  swap, add/remove liquidity, wrap/unwrap, settle, send_to
//! └──────┬──────┘
//!        │ signed deltas per token (TransactionGuard)
//!        ▼
//! ┌─────────────┐
//! │ Vault state  │  BalanceLedger, ReserveTracker, BufferManager, BptLedger
//! └──────┬──────┘
//!        │ BasePool / Erc4626 / RateProvider / TokenLedger
//!        ▼
//! ┌─────────────┐
//! │ Collaborators│  pool math, wrappers, rate oracles, token balances
//! └─────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`Amount`](domain::Amount), [`Address`](domain::Address), operation params and outcomes |
//! | [`traits`] | Collaborator seams: [`BasePool`](traits::BasePool), [`Erc4626`](traits::Erc4626), [`RateProvider`](traits::RateProvider), [`TokenLedger`](traits::TokenLedger) |
//! | [`config`] | [`VaultConfig`](config::VaultConfig) limits and [`PoolConfig`](config::PoolConfig) blueprints |
//! | [`vault`] | The [`Vault`](vault::Vault), its [`Session`](vault::Session) and internal ledgers |
//! | [`pools`] | Reference pool math ([`ConstantSumPool`](pools::ConstantSumPool)) |
//! | [`tokens`] | In-memory ledger, reference ERC4626 wrapper and adjustable rate provider |
//! | [`math`] | Checked and fixed-point arithmetic, scaling, base pool math |
//! | [`error`] | [`VaultError`](error::VaultError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod config;
pub mod domain;
pub mod error;
pub mod math;
pub mod pools;
pub mod prelude;
pub mod tokens;
pub mod traits;
pub mod vault;
