//! Per-token registration metadata.

use std::sync::Arc;

use super::{Address, Amount, Decimals};
use crate::error::{Result, VaultError};
use crate::math::ONE;
use crate::traits::RateProvider;

/// How the vault values a pool token.
#[derive(Debug, Clone)]
pub enum TokenType {
    /// Rate is always 1.
    Standard,
    /// Rate is pulled from the provider on every live-balance read.
    WithRate(Arc<dyn RateProvider>),
}

impl TokenType {
    /// Returns `true` for [`TokenType::WithRate`].
    #[must_use]
    pub const fn is_with_rate(&self) -> bool {
        matches!(self, Self::WithRate(_))
    }

    /// Current 18-decimal rate of the token.
    ///
    /// # Errors
    ///
    /// Propagates provider errors and returns [`VaultError::InvalidRate`]
    /// for a zero rate.
    pub fn rate(&self) -> Result<Amount> {
        match self {
            Self::Standard => Ok(Amount::new(ONE)),
            Self::WithRate(provider) => {
                let rate = provider.rate()?;
                if rate.is_zero() {
                    return Err(VaultError::InvalidRate);
                }
                Ok(rate)
            }
        }
    }
}

/// Registration entry for one pool token.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::{Address, Decimals, TokenConfig};
///
/// let dai = TokenConfig::standard(Address::repeat_byte(1), Decimals::MAX);
/// assert!(!dai.token_type.is_with_rate());
/// ```
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Token identity.
    pub token: Address,
    /// Decimals of the raw token amounts.
    pub decimals: Decimals,
    /// Valuation kind.
    pub token_type: TokenType,
    /// Whether the token is flagged for yield fees.
    pub pays_yield_fees: bool,
}

impl TokenConfig {
    /// A standard (rate 1) token.
    #[must_use]
    pub const fn standard(token: Address, decimals: Decimals) -> Self {
        Self {
            token,
            decimals,
            token_type: TokenType::Standard,
            pays_yield_fees: false,
        }
    }

    /// A token valued through a rate provider.
    #[must_use]
    pub fn with_rate(token: Address, decimals: Decimals, provider: Arc<dyn RateProvider>) -> Self {
        Self {
            token,
            decimals,
            token_type: TokenType::WithRate(provider),
            pays_yield_fees: false,
        }
    }

    /// Sets the yield-fee flag.
    #[must_use]
    pub const fn paying_yield_fees(mut self, pays: bool) -> Self {
        self.pays_yield_fees = pays;
        self
    }
}
