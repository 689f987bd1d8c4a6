//! Add/remove liquidity request and result types.
//!
//! The meaning of the amount and limit fields depends on the kind:
//!
//! | Kind | Token amounts | BPT amount |
//! |------|---------------|------------|
//! | `Proportional` (add) | maximum in | exact out |
//! | `Unbalanced` | exact in | minimum out |
//! | `SingleTokenExactOut` (add) | maximum in, one non-zero entry | exact out |
//! | `Donation` | exact in | must be zero |
//! | `Proportional` (remove) | minimum out | exact in |
//! | `SingleTokenExactIn` | minimum out, one non-zero entry | exact in |
//! | `SingleTokenExactOut` (remove) | exact out, one non-zero entry | maximum in |
//! | `Custom` | passed to the pool | passed to the pool |

use serde::{Deserialize, Serialize};

use super::{Address, Amount};

/// Add liquidity variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddLiquidityKind {
    /// Tokens in proportion to current balances for an exact BPT amount.
    Proportional,
    /// Arbitrary exact token amounts for a computed BPT amount.
    Unbalanced,
    /// One token in for an exact BPT amount.
    SingleTokenExactOut,
    /// Tokens in without minting BPT.
    Donation,
    /// Pool-defined logic.
    Custom,
}

/// Remove liquidity variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoveLiquidityKind {
    /// Every token out in proportion to an exact BPT amount.
    Proportional,
    /// Exact BPT in for a computed amount of one token.
    SingleTokenExactIn,
    /// Exact amount of one token out for a computed BPT amount.
    SingleTokenExactOut,
    /// Pool-defined logic.
    Custom,
}

/// Add liquidity request.  Token amounts are raw and ordered like the
/// pool's registered tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityParams {
    /// Target pool.
    pub pool: Address,
    /// Receiver of the minted BPT.
    pub to: Address,
    /// Per-token amounts, see the module table.
    pub max_amounts_in: Vec<Amount>,
    /// BPT amount, see the module table.
    pub min_bpt_amount_out: Amount,
    /// Variant.
    pub kind: AddLiquidityKind,
    /// Opaque data forwarded to custom pool logic.
    pub user_data: Vec<u8>,
}

impl AddLiquidityParams {
    /// Proportional join for exactly `exact_bpt_out`.
    #[must_use]
    pub fn proportional(
        pool: Address,
        to: Address,
        max_amounts_in: Vec<Amount>,
        exact_bpt_out: Amount,
    ) -> Self {
        Self {
            pool,
            to,
            max_amounts_in,
            min_bpt_amount_out: exact_bpt_out,
            kind: AddLiquidityKind::Proportional,
            user_data: Vec::new(),
        }
    }

    /// Unbalanced join with exact token amounts.
    #[must_use]
    pub fn unbalanced(
        pool: Address,
        to: Address,
        exact_amounts_in: Vec<Amount>,
        min_bpt_out: Amount,
    ) -> Self {
        Self {
            pool,
            to,
            max_amounts_in: exact_amounts_in,
            min_bpt_amount_out: min_bpt_out,
            kind: AddLiquidityKind::Unbalanced,
            user_data: Vec::new(),
        }
    }

    /// Single-token join for exactly `exact_bpt_out`.
    #[must_use]
    pub fn single_token_exact_out(
        pool: Address,
        to: Address,
        max_amounts_in: Vec<Amount>,
        exact_bpt_out: Amount,
    ) -> Self {
        Self {
            pool,
            to,
            max_amounts_in,
            min_bpt_amount_out: exact_bpt_out,
            kind: AddLiquidityKind::SingleTokenExactOut,
            user_data: Vec::new(),
        }
    }

    /// Donation of exact token amounts.
    #[must_use]
    pub fn donation(pool: Address, exact_amounts_in: Vec<Amount>) -> Self {
        Self {
            pool,
            to: Address::ZERO,
            max_amounts_in: exact_amounts_in,
            min_bpt_amount_out: Amount::ZERO,
            kind: AddLiquidityKind::Donation,
            user_data: Vec::new(),
        }
    }

    /// Custom join.
    #[must_use]
    pub fn custom(
        pool: Address,
        to: Address,
        max_amounts_in: Vec<Amount>,
        min_bpt_out: Amount,
        user_data: Vec<u8>,
    ) -> Self {
        Self {
            pool,
            to,
            max_amounts_in,
            min_bpt_amount_out: min_bpt_out,
            kind: AddLiquidityKind::Custom,
            user_data,
        }
    }
}

/// Result of an add liquidity operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityOutcome {
    /// Raw amounts the vault takes in, per pool token.
    pub amounts_in: Vec<Amount>,
    /// BPT minted to the receiver.
    pub bpt_amount_out: Amount,
    /// Data returned by custom pool logic.
    pub return_data: Vec<u8>,
}

/// Remove liquidity request.  Token amounts are raw and ordered like the
/// pool's registered tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityParams {
    /// Target pool.
    pub pool: Address,
    /// Account whose BPT is burned.
    pub from: Address,
    /// BPT amount, see the module table.
    pub max_bpt_amount_in: Amount,
    /// Per-token amounts, see the module table.
    pub min_amounts_out: Vec<Amount>,
    /// Variant.
    pub kind: RemoveLiquidityKind,
    /// Opaque data forwarded to custom pool logic.
    pub user_data: Vec<u8>,
}

impl RemoveLiquidityParams {
    /// Proportional exit burning exactly `exact_bpt_in`.
    #[must_use]
    pub fn proportional(
        pool: Address,
        from: Address,
        exact_bpt_in: Amount,
        min_amounts_out: Vec<Amount>,
    ) -> Self {
        Self {
            pool,
            from,
            max_bpt_amount_in: exact_bpt_in,
            min_amounts_out,
            kind: RemoveLiquidityKind::Proportional,
            user_data: Vec::new(),
        }
    }

    /// Single-token exit burning exactly `exact_bpt_in`.
    #[must_use]
    pub fn single_token_exact_in(
        pool: Address,
        from: Address,
        exact_bpt_in: Amount,
        min_amounts_out: Vec<Amount>,
    ) -> Self {
        Self {
            pool,
            from,
            max_bpt_amount_in: exact_bpt_in,
            min_amounts_out,
            kind: RemoveLiquidityKind::SingleTokenExactIn,
            user_data: Vec::new(),
        }
    }

    /// Single-token exit for an exact token amount.
    #[must_use]
    pub fn single_token_exact_out(
        pool: Address,
        from: Address,
        max_bpt_in: Amount,
        exact_amounts_out: Vec<Amount>,
    ) -> Self {
        Self {
            pool,
            from,
            max_bpt_amount_in: max_bpt_in,
            min_amounts_out: exact_amounts_out,
            kind: RemoveLiquidityKind::SingleTokenExactOut,
            user_data: Vec::new(),
        }
    }

    /// Custom exit.
    #[must_use]
    pub fn custom(
        pool: Address,
        from: Address,
        max_bpt_in: Amount,
        min_amounts_out: Vec<Amount>,
        user_data: Vec<u8>,
    ) -> Self {
        Self {
            pool,
            from,
            max_bpt_amount_in: max_bpt_in,
            min_amounts_out,
            kind: RemoveLiquidityKind::Custom,
            user_data,
        }
    }
}

/// Result of a remove liquidity operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityOutcome {
    /// BPT burned from the owner.
    pub bpt_amount_in: Amount,
    /// Raw amounts the vault pays out, per pool token.
    pub amounts_out: Vec<Amount>,
    /// Data returned by custom pool logic.
    pub return_data: Vec<u8>,
}
