//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use hydra_vault::prelude::*;
//! ```
//!
//! Brings the domain types, collaborator traits, configuration, the
//! reference collaborators and the vault itself into scope.

pub use crate::domain::{
    AddLiquidityKind, AddLiquidityOutcome, AddLiquidityParams, Address, Amount,
    BufferWrapOrUnwrapParams, Decimals, RemoveLiquidityKind, RemoveLiquidityOutcome,
    RemoveLiquidityParams, Rounding, SwapKind, SwapOutcome, SwapParams, TokenConfig, TokenType,
    WrappingDirection,
};

pub use crate::traits::{BasePool, Erc4626, RateProvider, TokenLedger};

pub use crate::math::CheckedArithmetic;

pub use crate::config::{LiquidityManagement, PoolConfig, VaultConfig};

pub use crate::pools::ConstantSumPool;
pub use crate::tokens::{AdjustableRateProvider, InMemoryLedger, SimpleErc4626};

pub use crate::vault::{Session, Vault};

pub use crate::error::{Result, VaultError};
