//! Settable rate provider.

use parking_lot::RwLock;

use crate::domain::Amount;
use crate::error::Result;
use crate::traits::RateProvider;

/// A [`RateProvider`] whose rate can be changed through a shared handle.
///
/// # Examples
///
/// ```
/// use hydra_vault::domain::Amount;
/// use hydra_vault::tokens::AdjustableRateProvider;
/// use hydra_vault::traits::RateProvider;
///
/// let provider = AdjustableRateProvider::new(Amount::new(1_000_000_000_000_000_000));
/// provider.set_rate(Amount::new(1_100_000_000_000_000_000));
/// assert_eq!(provider.rate(), Ok(Amount::new(1_100_000_000_000_000_000)));
/// ```
#[derive(Debug)]
pub struct AdjustableRateProvider {
    rate: RwLock<Amount>,
}

impl AdjustableRateProvider {
    /// Creates a provider returning `rate`.
    pub fn new(rate: Amount) -> Self {
        Self {
            rate: RwLock::new(rate),
        }
    }

    /// Replaces the rate.
    pub fn set_rate(&self, rate: Amount) {
        *self.rate.write() = rate;
    }
}

impl RateProvider for AdjustableRateProvider {
    fn rate(&self) -> Result<Amount> {
        Ok(*self.rate.read())
    }
}
