//! Per-pool token metadata.

use crate::domain::{Address, Amount, TokenConfig, TokenType};
use crate::error::Result;

/// Static metadata of one registered pool token.
#[derive(Debug, Clone)]
pub struct PoolTokenInfo {
    /// Token identity.
    pub token: Address,
    /// Valuation kind.
    pub token_type: TokenType,
    /// `10^(18 - decimals)`.
    pub decimal_scaling_factor: u128,
    /// Yield-fee flag; recorded only.
    pub pays_yield_fees: bool,
}

impl PoolTokenInfo {
    /// Current rate of the token.
    ///
    /// # Errors
    ///
    /// Propagates rate provider failures.
    pub fn rate(&self) -> Result<Amount> {
        self.token_type.rate()
    }
}

impl From<&TokenConfig> for PoolTokenInfo {
    fn from(cfg: &TokenConfig) -> Self {
        Self {
            token: cfg.token,
            token_type: cfg.token_type.clone(),
            decimal_scaling_factor: cfg.decimals.scaling_factor(),
            pays_yield_fees: cfg.pays_yield_fees,
        }
    }
}

/// Sorted, deduplicated token list of one pool.
///
/// Token indices are positions in address order and never change after
/// registration.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    infos: Vec<PoolTokenInfo>,
}

impl TokenRegistry {
    /// Builds the registry from validated configs, sorting by address.
    #[must_use]
    pub fn from_configs(configs: &[TokenConfig]) -> Self {
        let mut infos: Vec<PoolTokenInfo> = configs.iter().map(PoolTokenInfo::from).collect();
        infos.sort_by_key(|info| info.token);
        Self { infos }
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// `true` if no token is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Token addresses in index order.
    #[must_use]
    pub fn tokens(&self) -> Vec<Address> {
        self.infos.iter().map(|info| info.token).collect()
    }

    /// Metadata in index order.
    #[must_use]
    pub fn infos(&self) -> &[PoolTokenInfo] {
        &self.infos
    }

    /// Index of `token`, if registered.
    #[must_use]
    pub fn index_of(&self, token: Address) -> Option<usize> {
        self.infos
            .binary_search_by_key(&token, |info| info.token)
            .ok()
    }

    /// Fresh rates of every token, in index order.
    ///
    /// # Errors
    ///
    /// Propagates rate provider failures.
    pub fn rates(&self) -> Result<Vec<Amount>> {
        self.infos.iter().map(PoolTokenInfo::rate).collect()
    }

    /// Decimal scaling factors in index order.
    #[must_use]
    pub fn scaling_factors(&self) -> Vec<u128> {
        self.infos
            .iter()
            .map(|info| info.decimal_scaling_factor)
            .collect()
    }
}
