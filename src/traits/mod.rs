//! Collaborator interfaces the vault is generic over.
//!
//! | Trait | Role |
//! |-------|------|
//! | [`BasePool`] | Pricing and invariant callbacks of a registered pool |
//! | [`RateProvider`] | Fresh rate of a rate-bearing token |
//! | [`TokenLedger`] | Token balances the vault holds and moves |
//! | [`Erc4626`] | Yield-bearing wrapper behind a buffer |

mod base_pool;
mod erc4626;
mod rate_provider;
mod token_ledger;

pub use base_pool::{BasePool, CustomAddLiquidity, CustomRemoveLiquidity, PoolSwapParams};
pub use erc4626::Erc4626;
pub use rate_provider::RateProvider;
pub use token_ledger::TokenLedger;
