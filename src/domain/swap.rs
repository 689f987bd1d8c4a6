//! Swap request and result types.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Address, Amount};

/// Which side of a trade is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapKind {
    /// The input amount is fixed; the output is computed.
    ExactIn,
    /// The output amount is fixed; the input is computed.
    ExactOut,
}

impl fmt::Display for SwapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactIn => write!(f, "ExactIn"),
            Self::ExactOut => write!(f, "ExactOut"),
        }
    }
}

/// A swap routed through the vault.  Amounts are raw.
///
/// `limit_raw` is the minimum output for [`SwapKind::ExactIn`] and the
/// maximum input for [`SwapKind::ExactOut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapParams {
    /// Exactness of the trade.
    pub kind: SwapKind,
    /// Pool to trade against.
    pub pool: Address,
    /// Token the vault receives.
    pub token_in: Address,
    /// Token the vault pays out.
    pub token_out: Address,
    /// Fixed side of the trade.
    pub amount_given_raw: Amount,
    /// Slippage limit on the computed side.
    pub limit_raw: Amount,
}

impl SwapParams {
    /// Sell exactly `amount_in`, receiving at least `min_amount_out`.
    #[must_use]
    pub const fn exact_in(
        pool: Address,
        token_in: Address,
        token_out: Address,
        amount_in: Amount,
        min_amount_out: Amount,
    ) -> Self {
        Self {
            kind: SwapKind::ExactIn,
            pool,
            token_in,
            token_out,
            amount_given_raw: amount_in,
            limit_raw: min_amount_out,
        }
    }

    /// Buy exactly `amount_out`, paying at most `max_amount_in`.
    #[must_use]
    pub const fn exact_out(
        pool: Address,
        token_in: Address,
        token_out: Address,
        amount_out: Amount,
        max_amount_in: Amount,
    ) -> Self {
        Self {
            kind: SwapKind::ExactOut,
            pool,
            token_in,
            token_out,
            amount_given_raw: amount_out,
            limit_raw: max_amount_in,
        }
    }
}

/// Raw amounts of a completed swap or buffer wrap/unwrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapOutcome {
    /// The computed side: output for exact-in, input for exact-out.
    pub amount_calculated: Amount,
    /// Amount the vault takes in.
    pub amount_in: Amount,
    /// Amount the vault pays out.
    pub amount_out: Amount,
}
