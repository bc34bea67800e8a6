//! Monetary types for the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An unsigned amount in the smallest indivisible unit.
///
/// Arithmetic is checked; there is no wrapping or saturating form.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// The largest representable amount.
    pub const MAX: Amount = Amount(u128::MAX);

    /// Create a new amount.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Get the raw value.
    pub const fn value(&self) -> u128 {
        self.0
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value as u128)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

/// Sum of amounts, `None` on overflow.
pub fn checked_sum<'a, I>(amounts: I) -> Option<Amount>
where
    I: IntoIterator<Item = &'a Amount>,
{
    amounts
        .into_iter()
        .try_fold(Amount::ZERO, |acc, a| acc.checked_add(*a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_arithmetic() {
        let a = Amount::new(100);
        let b = Amount::new(40);

        assert_eq!(a.checked_add(b), Some(Amount::new(140)));
        assert_eq!(a.checked_sub(b), Some(Amount::new(60)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(Amount::MAX.checked_add(Amount::new(1)), None);
    }

    #[test]
    fn test_checked_sum() {
        let amounts = [Amount::new(1), Amount::new(2), Amount::new(3)];
        assert_eq!(checked_sum(&amounts), Some(Amount::new(6)));

        let overflow = [Amount::MAX, Amount::new(1)];
        assert_eq!(checked_sum(&overflow), None);
    }
}
