//! Exchange rate source for rate-bearing pool tokens.

use core::fmt;

use crate::domain::Amount;
use crate::error::Result;

/// Supplies the 18-decimal rate of a `WithRate` token.
///
/// The vault calls [`rate`](RateProvider::rate) on every live-balance read
/// and never caches the answer across operations.
pub trait RateProvider: fmt::Debug + Send + Sync {
    /// Current rate, 18-decimal.
    ///
    /// # Errors
    ///
    /// Provider-specific failures.
    fn rate(&self) -> Result<Amount>;
}
