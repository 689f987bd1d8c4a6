//! Pool registration blueprint.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::MIN_TOKENS;
use crate::domain::{TokenConfig, TokenType};
use crate::error::VaultError;

/// Which liquidity operations a pool accepts beyond the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityManagement {
    /// Rejects unbalanced adds and single-token operations.
    pub disable_unbalanced_liquidity: bool,
    /// Enables [`AddLiquidityKind::Custom`](crate::domain::AddLiquidityKind::Custom).
    pub enable_add_liquidity_custom: bool,
    /// Enables [`RemoveLiquidityKind::Custom`](crate::domain::RemoveLiquidityKind::Custom).
    pub enable_remove_liquidity_custom: bool,
    /// Enables [`AddLiquidityKind::Donation`](crate::domain::AddLiquidityKind::Donation).
    pub enable_donation: bool,
}

/// Tokens and liquidity flags of a pool about to be registered.
///
/// # Validation
///
/// - At least two tokens.
/// - No zero-address token, no duplicates.
/// - Standard tokens cannot be flagged for yield fees.
///
/// The upper token bound is vault-wide and checked at registration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    tokens: Vec<TokenConfig>,
    liquidity_management: LiquidityManagement,
}

impl PoolConfig {
    /// Creates a validated `PoolConfig`.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn new(
        tokens: Vec<TokenConfig>,
        liquidity_management: LiquidityManagement,
    ) -> Result<Self, VaultError> {
        let config = Self {
            tokens,
            liquidity_management,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// - [`VaultError::InvalidConfiguration`] for too few tokens, a zero
    ///   address, or a standard token paying yield fees.
    /// - [`VaultError::TokenAlreadyRegistered`] for duplicates.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.tokens.len() < MIN_TOKENS {
            return Err(VaultError::InvalidConfiguration(
                "a pool needs at least two tokens",
            ));
        }
        let mut seen = BTreeSet::new();
        for cfg in &self.tokens {
            if cfg.token.is_zero() {
                return Err(VaultError::InvalidConfiguration(
                    "pool token cannot be the zero address",
                ));
            }
            if !seen.insert(cfg.token) {
                return Err(VaultError::TokenAlreadyRegistered(cfg.token));
            }
            if cfg.pays_yield_fees && matches!(cfg.token_type, TokenType::Standard) {
                return Err(VaultError::InvalidConfiguration(
                    "standard tokens cannot pay yield fees",
                ));
            }
        }
        Ok(())
    }

    /// Token registrations in the order given.
    #[must_use]
    pub fn tokens(&self) -> &[TokenConfig] {
        &self.tokens
    }

    /// Liquidity flags.
    #[must_use]
    pub const fn liquidity_management(&self) -> LiquidityManagement {
        self.liquidity_management
    }
}
