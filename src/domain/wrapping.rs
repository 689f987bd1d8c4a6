//! Buffer wrap/unwrap request types.

use serde::{Deserialize, Serialize};

use super::{Address, Amount, SwapKind};

/// Direction of a buffer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrappingDirection {
    /// Underlying in, wrapped out.
    Wrap,
    /// Wrapped in, underlying out.
    Unwrap,
}

/// A wrap or unwrap routed through the buffer of `wrapped_token`.
///
/// Amounts are raw.  `limit_raw` is the minimum output for
/// [`SwapKind::ExactIn`] and the maximum input for [`SwapKind::ExactOut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferWrapOrUnwrapParams {
    /// Exactness of the conversion.
    pub kind: SwapKind,
    /// Wrap or unwrap.
    pub direction: WrappingDirection,
    /// ERC4626 share token identifying the buffer.
    pub wrapped_token: Address,
    /// Fixed side of the conversion.
    pub amount_given_raw: Amount,
    /// Slippage limit on the computed side.
    pub limit_raw: Amount,
}

impl BufferWrapOrUnwrapParams {
    /// Wraps exactly `underlying_in`, expecting at least `min_wrapped_out`.
    #[must_use]
    pub const fn wrap_exact_in(
        wrapped_token: Address,
        underlying_in: Amount,
        min_wrapped_out: Amount,
    ) -> Self {
        Self {
            kind: SwapKind::ExactIn,
            direction: WrappingDirection::Wrap,
            wrapped_token,
            amount_given_raw: underlying_in,
            limit_raw: min_wrapped_out,
        }
    }

    /// Wraps into exactly `wrapped_out`, paying at most `max_underlying_in`.
    #[must_use]
    pub const fn wrap_exact_out(
        wrapped_token: Address,
        wrapped_out: Amount,
        max_underlying_in: Amount,
    ) -> Self {
        Self {
            kind: SwapKind::ExactOut,
            direction: WrappingDirection::Wrap,
            wrapped_token,
            amount_given_raw: wrapped_out,
            limit_raw: max_underlying_in,
        }
    }

    /// Unwraps exactly `wrapped_in`, expecting at least `min_underlying_out`.
    #[must_use]
    pub const fn unwrap_exact_in(
        wrapped_token: Address,
        wrapped_in: Amount,
        min_underlying_out: Amount,
    ) -> Self {
        Self {
            kind: SwapKind::ExactIn,
            direction: WrappingDirection::Unwrap,
            wrapped_token,
            amount_given_raw: wrapped_in,
            limit_raw: min_underlying_out,
        }
    }

    /// Unwraps into exactly `underlying_out`, paying at most `max_wrapped_in`.
    #[must_use]
    pub const fn unwrap_exact_out(
        wrapped_token: Address,
        underlying_out: Amount,
        max_wrapped_in: Amount,
    ) -> Self {
        Self {
            kind: SwapKind::ExactOut,
            direction: WrappingDirection::Unwrap,
            wrapped_token,
            amount_given_raw: underlying_out,
            limit_raw: max_wrapped_in,
        }
    }
}
