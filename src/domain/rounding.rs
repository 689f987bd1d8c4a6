//! Rounding direction.

/// Direction of every division in the vault.
///
/// Amounts flowing into the vault round [`Up`](Rounding::Up), amounts paid
/// out round [`Down`](Rounding::Down), so rounding error always stays with
/// the vault.
///
/// ```
/// use hydra_vault::domain::Rounding;
///
/// assert!(Rounding::Up.is_up());
/// assert!(!Rounding::Down.is_up());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Ceiling.
    Up,
    /// Floor.
    Down,
}

impl Rounding {
    /// `true` for [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, Self::Up)
    }
}
