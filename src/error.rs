//! Unified error type for the vault accounting core.
//!
//! Every fallible operation returns [`VaultError`].  Variants follow four
//! families:
//!
//! | Family | Examples | Meaning |
//! |--------|----------|---------|
//! | Configuration | [`VaultError::PoolNotRegistered`], [`VaultError::InputLengthMismatch`] | Caller mistake, fatal |
//! | Limit | [`VaultError::SwapLimit`], [`VaultError::AmountOutBelowMin`] | Slippage, retry with new limits |
//! | Settlement | [`VaultError::BalanceNotSettled`], [`VaultError::WrongLocker`] | Protocol breach, whole session aborts |
//! | Arithmetic | [`VaultError::Overflow`], [`VaultError::DivisionByZero`] | Never saturated, always aborts |
//!
//! Swap slippage ([`VaultError::SwapLimit`]) and liquidity slippage
//! ([`VaultError::AmountOutBelowMin`], [`VaultError::AmountInAboveMax`],
//! [`VaultError::BptAmountOutBelowMin`]) are distinct kinds, so callers
//! can match on them per operation category.

use crate::domain::{Address, Amount};

/// Errors raised by the vault, its ledgers and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    // -- Configuration ------------------------------------------------------
    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// The pool has already been registered.
    #[error("pool {0} is already registered")]
    PoolAlreadyRegistered(Address),

    /// The pool is unknown to the vault.
    #[error("pool {0} is not registered")]
    PoolNotRegistered(Address),

    /// The pool has already been initialized with liquidity.
    #[error("pool {0} is already initialized")]
    PoolAlreadyInitialized(Address),

    /// The pool has not been initialized yet.
    #[error("pool {0} is not initialized")]
    PoolNotInitialized(Address),

    /// The token is not part of the pool.
    #[error("token {token} is not registered in pool {pool}")]
    TokenNotRegistered {
        /// Pool that was queried.
        pool: Address,
        /// Token that is missing.
        token: Address,
    },

    /// The same token appears twice in a pool configuration.
    #[error("token {0} is registered more than once")]
    TokenAlreadyRegistered(Address),

    /// Token and amount sequences differ in length.
    #[error("input length mismatch: expected {expected}, got {actual}")]
    InputLengthMismatch {
        /// Number of tokens in the pool.
        expected: usize,
        /// Number of amounts provided.
        actual: usize,
    },

    /// A swap names the same token on both sides.
    #[error("cannot swap a token for itself")]
    CannotSwapSameToken,

    /// A swap or wrap was requested with a zero amount.
    #[error("amount given must be non-zero")]
    AmountGivenZero,

    /// The scaled trade amount is below the configured minimum.
    #[error("trade amount {0} is below the minimum trade amount")]
    TradeAmountTooSmall(Amount),

    /// A single-token operation received only zero amounts.
    #[error("single-token operation requires one non-zero amount")]
    AllZeroInputs,

    /// A single-token operation received several non-zero amounts.
    #[error("single-token operation received more than one non-zero amount")]
    MultipleNonZeroInputs,

    /// The pool does not accept donations.
    #[error("pool does not support donation")]
    DoesNotSupportDonation,

    /// The pool does not accept unbalanced liquidity operations.
    #[error("pool does not support unbalanced liquidity")]
    DoesNotSupportUnbalancedLiquidity,

    /// The pool does not implement custom add liquidity.
    #[error("pool does not support custom add liquidity")]
    DoesNotSupportAddLiquidityCustom,

    /// The pool does not implement custom remove liquidity.
    #[error("pool does not support custom remove liquidity")]
    DoesNotSupportRemoveLiquidityCustom,

    /// A rate provider returned a zero rate.
    #[error("rate provider returned an invalid rate")]
    InvalidRate,

    // -- Buffers ------------------------------------------------------------
    /// A buffer for this wrapped token already exists.
    #[error("buffer for {0} is already initialized")]
    BufferAlreadyInitialized(Address),

    /// No buffer exists for this wrapped token.
    #[error("buffer for {0} is not initialized")]
    BufferNotInitialized(Address),

    /// The wrapper reports the zero address as its underlying asset.
    #[error("wrapper {0} has an invalid underlying token")]
    InvalidUnderlyingToken(Address),

    /// A wrap or unwrap amount is below the configured minimum.
    #[error("wrap amount {0} is below the minimum wrap amount")]
    WrapAmountTooSmall(Amount),

    /// Buffer initialization would leave fewer shares than the floor.
    #[error("buffer total supply {0} is below the minimum")]
    BufferTotalSupplyTooLow(Amount),

    /// Fewer buffer shares would be issued than requested.
    #[error("issued buffer shares {issued} are below the minimum {min}")]
    IssuedSharesBelowMin {
        /// Shares that would be issued.
        issued: Amount,
        /// Minimum requested by the caller.
        min: Amount,
    },

    /// The owner holds fewer buffer shares than it tries to remove.
    #[error("owner holds {balance} buffer shares, {needed} requested")]
    NotEnoughBufferShares {
        /// Shares held by the owner.
        balance: Amount,
        /// Shares the owner tried to burn.
        needed: Amount,
    },

    /// After a wrapper call the vault holds less underlying than declared.
    #[error("vault underlying balance {actual} is below the expected {expected}")]
    NotEnoughUnderlying {
        /// Balance the vault should hold at least.
        expected: Amount,
        /// Balance observed after the wrapper call.
        actual: Amount,
    },

    /// After a wrapper call the vault holds fewer wrapped tokens than declared.
    #[error("vault wrapped balance {actual} is below the expected {expected}")]
    NotEnoughWrapped {
        /// Balance the vault should hold at least.
        expected: Amount,
        /// Balance observed after the wrapper call.
        actual: Amount,
    },

    // -- Limits -------------------------------------------------------------
    /// A swap or buffer wrap/unwrap crossed the caller's limit.
    #[error("swap amount {amount} violates limit {limit}")]
    SwapLimit {
        /// Amount computed by the vault.
        amount: Amount,
        /// Limit provided by the caller.
        limit: Amount,
    },

    /// A liquidity operation requires more of a token than allowed.
    #[error("amount in {amount} of token {token} is above the maximum {max}")]
    AmountInAboveMax {
        /// Token that is over the limit.
        token: Address,
        /// Amount the vault would pull in.
        amount: Amount,
        /// Maximum provided by the caller.
        max: Amount,
    },

    /// A liquidity operation returns less of a token than required.
    #[error("amount out {amount} of token {token} is below the minimum {min}")]
    AmountOutBelowMin {
        /// Token that is under the limit.
        token: Address,
        /// Amount the vault would pay out.
        amount: Amount,
        /// Minimum provided by the caller.
        min: Amount,
    },

    /// Fewer pool tokens would be minted than required.
    #[error("BPT amount out {amount} is below the minimum {min}")]
    BptAmountOutBelowMin {
        /// BPT that would be minted.
        amount: Amount,
        /// Minimum provided by the caller.
        min: Amount,
    },

    /// More pool tokens would be burned than allowed.
    #[error("BPT amount in {amount} is above the maximum {max}")]
    BptAmountInAboveMax {
        /// BPT that would be burned.
        amount: Amount,
        /// Maximum provided by the caller.
        max: Amount,
    },

    // -- Settlement ---------------------------------------------------------
    /// A locker frame closed with an outstanding token delta.
    #[error("balance of token {token} not settled (delta {delta})")]
    BalanceNotSettled {
        /// Token with a non-zero delta.
        token: Address,
        /// Outstanding delta: positive is debt owed to the vault.
        delta: i128,
    },

    /// The caller is not the innermost locker.
    #[error("caller {actual} is not the active locker {expected}")]
    WrongLocker {
        /// Innermost locker.
        expected: Address,
        /// Identity that attempted the call.
        actual: Address,
    },

    /// A settlement-sensitive operation ran while the vault was locked.
    #[error("vault is not unlocked")]
    NoLocker,

    /// The vault holds less of a token than its tracked reserves.
    #[error("reserves of {token} mismatch: tracked {tracked}, held {actual}")]
    ReservesMismatch {
        /// Token whose reserves diverged.
        token: Address,
        /// Reserve the vault tracks.
        tracked: Amount,
        /// Balance actually held.
        actual: Amount,
    },

    // -- Token balances -----------------------------------------------------
    /// A BPT burn exceeds the holder's balance.
    #[error("account {owner} holds {balance} BPT, {needed} required")]
    InsufficientBptBalance {
        /// BPT holder.
        owner: Address,
        /// Balance held.
        balance: Amount,
        /// Amount required.
        needed: Amount,
    },

    /// A BPT spender exceeds its allowance.
    #[error("spender {spender} allowance {allowance} is below {needed}")]
    InsufficientAllowance {
        /// Account spending on behalf of the owner.
        spender: Address,
        /// Remaining allowance.
        allowance: Amount,
        /// Amount required.
        needed: Amount,
    },

    /// The BPT locked at initialization cannot be moved, approved or
    /// burned.
    #[error("BPT of pool {0} held by the zero address is locked")]
    LockedBpt(Address),

    /// Initialization would mint fewer BPT than the permanent floor.
    #[error("pool total supply {0} is below the minimum")]
    PoolTotalSupplyTooLow(Amount),

    /// A token transfer or burn exceeds the account balance.
    #[error("account {account} holds {balance} of token {token}, {needed} required")]
    InsufficientBalance {
        /// Token being moved.
        token: Address,
        /// Account being debited.
        account: Address,
        /// Balance held.
        balance: Amount,
        /// Amount required.
        needed: Amount,
    },

    // -- Arithmetic ---------------------------------------------------------
    /// Result exceeds the representable range.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Result would be negative.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
}

impl VaultError {
    /// Returns `true` for the slippage family of errors.
    #[must_use]
    pub const fn is_limit_violation(&self) -> bool {
        matches!(
            self,
            Self::SwapLimit { .. }
                | Self::AmountInAboveMax { .. }
                | Self::AmountOutBelowMin { .. }
                | Self::BptAmountOutBelowMin { .. }
                | Self::BptAmountInAboveMax { .. }
                | Self::IssuedSharesBelowMin { .. }
        )
    }

    /// Returns `true` for settlement violations, which abort the session.
    #[must_use]
    pub const fn is_settlement_violation(&self) -> bool {
        matches!(
            self,
            Self::BalanceNotSettled { .. }
                | Self::WrongLocker { .. }
                | Self::NoLocker
                | Self::ReservesMismatch { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, VaultError>;
