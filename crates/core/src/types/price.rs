//! Integer money in the store currency (Indonesian rupiah).
//!
//! Rupiah has no minor unit in practice, so a `Price` is a whole number of
//! rupiah stored as `BIGINT`. Arithmetic saturates rather than wrapping.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// An amount of money in whole rupiah.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Zero rupiah.
    pub const ZERO: Self = Self(0);

    /// Create a price from whole rupiah.
    #[must_use]
    pub const fn from_rupiah(amount: i64) -> Self {
        Self(amount)
    }

    /// The amount in whole rupiah.
    #[must_use]
    pub const fn as_rupiah(&self) -> i64 {
        self.0
    }

    /// Price for `quantity` units at this unit price.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// Whether the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Format for display, e.g. `Rp 15.000`.
    #[must_use]
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}Rp {grouped}")
    }
}

impl core::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_rupiah(0).to_string(), "Rp 0");
        assert_eq!(Price::from_rupiah(950).to_string(), "Rp 950");
        assert_eq!(Price::from_rupiah(15_000).to_string(), "Rp 15.000");
        assert_eq!(Price::from_rupiah(1_250_000).to_string(), "Rp 1.250.000");
        assert_eq!(Price::from_rupiah(-17_500).to_string(), "-Rp 17.500");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_rupiah(15_000).times(2), Price::from_rupiah(20_000)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_rupiah(50_000));
    }

    #[test]
    fn test_times_saturates() {
        assert_eq!(
            Price::from_rupiah(i64::MAX).times(2),
            Price::from_rupiah(i64::MAX)
        );
    }
}
