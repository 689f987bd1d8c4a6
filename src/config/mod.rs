//! Declarative configuration for the vault and its pools.
//!
//! Each config struct validates itself on construction (`new`) and exposes
//! `validate()` for values built through serde.

mod pool_config;
mod vault_config;

pub use pool_config::{LiquidityManagement, PoolConfig};
pub use vault_config::{VaultConfig, MAX_TOKENS, MIN_TOKENS};
