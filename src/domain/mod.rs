//! Value types of the vault domain.
//!
//! Identities, amounts, rounding, token registration metadata and the
//! request/result shapes of every vault operation.

mod address;
mod amount;
mod decimals;
mod liquidity;
mod rounding;
mod swap;
mod token_config;
mod wrapping;

pub use address::Address;
pub use amount::Amount;
pub use decimals::Decimals;
pub use liquidity::{
    AddLiquidityKind, AddLiquidityOutcome, AddLiquidityParams, RemoveLiquidityKind,
    RemoveLiquidityOutcome, RemoveLiquidityParams,
};
pub use rounding::Rounding;
pub use swap::{SwapKind, SwapOutcome, SwapParams};
pub use token_config::{TokenConfig, TokenType};
pub use wrapping::{BufferWrapOrUnwrapParams, WrappingDirection};
