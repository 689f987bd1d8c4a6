//! Reference implementations of the collaborator traits.
//!
//! These back the crate's tests and are usable by embedders that simulate
//! the vault off-chain.

mod erc4626;
mod ledger;
mod rate_provider;

pub use erc4626::SimpleErc4626;
pub use ledger::InMemoryLedger;
pub use rate_provider::AdjustableRateProvider;
