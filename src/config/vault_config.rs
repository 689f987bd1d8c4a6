//! Vault-wide limits.

use serde::{Deserialize, Serialize};

use crate::domain::Amount;
use crate::error::VaultError;

/// Smallest number of tokens a pool may register.
pub const MIN_TOKENS: usize = 2;

/// Largest value accepted for [`VaultConfig::max_tokens_per_pool`].
pub const MAX_TOKENS: usize = 8;

/// Configuration of a [`Vault`](crate::vault::Vault).
///
/// | Field | Default | Enforced by |
/// |-------|---------|-------------|
/// | `minimum_trade_amount` | 1e6 (scaled18) | swaps and unbalanced liquidity, [`VaultError::TradeAmountTooSmall`] |
/// | `minimum_wrap_amount` | 1e3 (raw) | buffer wrap/unwrap, [`VaultError::WrapAmountTooSmall`] |
/// | `pool_minimum_total_supply` | 1e6 | BPT locked at pool initialization |
/// | `buffer_minimum_total_supply` | 1e4 | shares locked at buffer initialization |
/// | `max_tokens_per_pool` | 8 | pool registration |
///
/// Every field has a serde default, so a partial document deserializes.
///
/// # Examples
///
/// ```
/// use hydra_vault::config::VaultConfig;
///
/// let cfg: VaultConfig = serde_json::from_str(r#"{ "max_tokens_per_pool": 4 }"#).expect("valid");
/// assert!(cfg.validate().is_ok());
/// assert_eq!(cfg.max_tokens_per_pool(), 4);
/// assert_eq!(cfg.minimum_wrap_amount().get(), 1_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    minimum_trade_amount: Amount,
    minimum_wrap_amount: Amount,
    pool_minimum_total_supply: Amount,
    buffer_minimum_total_supply: Amount,
    max_tokens_per_pool: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            minimum_trade_amount: Amount::new(1_000_000),
            minimum_wrap_amount: Amount::new(1_000),
            pool_minimum_total_supply: Amount::new(1_000_000),
            buffer_minimum_total_supply: Amount::new(10_000),
            max_tokens_per_pool: MAX_TOKENS,
        }
    }
}

impl VaultConfig {
    /// Creates a validated `VaultConfig`.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn new(
        minimum_trade_amount: Amount,
        minimum_wrap_amount: Amount,
        pool_minimum_total_supply: Amount,
        buffer_minimum_total_supply: Amount,
        max_tokens_per_pool: usize,
    ) -> Result<Self, VaultError> {
        let config = Self {
            minimum_trade_amount,
            minimum_wrap_amount,
            pool_minimum_total_supply,
            buffer_minimum_total_supply,
            max_tokens_per_pool,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfiguration`] if `max_tokens_per_pool`
    /// is outside `2..=8` or either minimum supply is zero.
    pub fn validate(&self) -> Result<(), VaultError> {
        if !(MIN_TOKENS..=MAX_TOKENS).contains(&self.max_tokens_per_pool) {
            return Err(VaultError::InvalidConfiguration(
                "max_tokens_per_pool must be within 2..=8",
            ));
        }
        if self.pool_minimum_total_supply.is_zero() {
            return Err(VaultError::InvalidConfiguration(
                "pool_minimum_total_supply must be non-zero",
            ));
        }
        if self.buffer_minimum_total_supply.is_zero() {
            return Err(VaultError::InvalidConfiguration(
                "buffer_minimum_total_supply must be non-zero",
            ));
        }
        Ok(())
    }

    /// Minimum scaled18 amount of any swap leg or unbalanced liquidity entry.
    pub const fn minimum_trade_amount(&self) -> Amount {
        self.minimum_trade_amount
    }

    /// Minimum raw amount of a buffer wrap/unwrap.
    pub const fn minimum_wrap_amount(&self) -> Amount {
        self.minimum_wrap_amount
    }

    /// BPT minted to the zero address at pool initialization.
    pub const fn pool_minimum_total_supply(&self) -> Amount {
        self.pool_minimum_total_supply
    }

    /// Buffer shares minted to the zero address at buffer initialization.
    pub const fn buffer_minimum_total_supply(&self) -> Amount {
        self.buffer_minimum_total_supply
    }

    /// Largest token count a pool may register.
    #[must_use]
    pub const fn max_tokens_per_pool(&self) -> usize {
        self.max_tokens_per_pool
    }
}
