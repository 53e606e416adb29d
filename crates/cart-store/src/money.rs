//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues that plague monetary calculations. On the wire a value
//! is a plain JSON decimal number, matching what storefront storage holds.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of minor units in one major unit.
const CENTS_PER_UNIT: i64 = 100;

/// Largest decimal amount accepted from the outside world.
const MAX_DECIMAL: f64 = (i64::MAX / CENTS_PER_UNIT) as f64;

/// A monetary value in a single, implied currency.
///
/// Amounts are stored in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    amount_cents: i64,
}

impl Money {
    /// Create a new Money value from cents.
    pub const fn new(amount_cents: i64) -> Self {
        Self { amount_cents }
    }

    /// Create a zero amount.
    pub const fn zero() -> Self {
        Self::new(0)
    }

    /// Create a Money value from a decimal amount, rounding to the cent.
    ///
    /// Returns `None` for NaN, infinities and amounts too large to hold.
    ///
    /// ```
    /// use cart_store::Money;
    /// let price = Money::from_decimal(49.99).unwrap();
    /// assert_eq!(price.amount_cents(), 4999);
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount.abs() > MAX_DECIMAL {
            return None;
        }
        Some(Self::new((amount * CENTS_PER_UNIT as f64).round() as i64))
    }

    /// Amount in cents.
    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / CENTS_PER_UNIT as f64
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.to_decimal())
    }

    /// Add another Money value, returning `None` on overflow.
    pub fn checked_add(&self, other: &Money) -> Option<Money> {
        self.amount_cents.checked_add(other.amount_cents).map(Money::new)
    }

    /// Subtract another Money value, returning `None` on overflow.
    pub fn checked_sub(&self, other: &Money) -> Option<Money> {
        self.amount_cents.checked_sub(other.amount_cents).map(Money::new)
    }

    /// Multiply by a scalar, returning `None` on overflow.
    pub fn checked_mul(&self, factor: i64) -> Option<Money> {
        self.amount_cents.checked_mul(factor).map(Money::new)
    }

    /// Sum an iterator of Money values, returning `None` on overflow.
    pub fn try_sum<I>(iter: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        iter.into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(&m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_amount())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.amount_cents % CENTS_PER_UNIT == 0 {
            serializer.serialize_i64(self.amount_cents / CENTS_PER_UNIT)
        } else {
            serializer.serialize_f64(self.to_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_decimal(amount)
            .ok_or_else(|| de::Error::custom(format!("amount out of range: {amount}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(49.99).unwrap().amount_cents(), 4999);
        assert_eq!(Money::from_decimal(0.1 + 0.2).unwrap().amount_cents(), 30);
        assert!(Money::from_decimal(f64::NAN).is_none());
        assert!(Money::from_decimal(f64::INFINITY).is_none());
        assert!(Money::from_decimal(1e300).is_none());
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4999).to_string(), "49.99");
        assert_eq!(Money::new(1000).display_amount(), "10.00");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::new(1000);
        let b = Money::new(300);
        assert_eq!(a.checked_add(&b), Some(Money::new(1300)));
        assert_eq!(a.checked_sub(&b), Some(Money::new(700)));
        assert_eq!(a.checked_mul(3), Some(Money::new(3000)));
        assert!(Money::new(i64::MAX).checked_add(&Money::new(1)).is_none());
        assert!(Money::new(i64::MAX).checked_mul(2).is_none());
    }

    #[test]
    fn test_try_sum() {
        let total = Money::try_sum([Money::new(100), Money::new(250)]);
        assert_eq!(total, Some(Money::new(350)));
        assert_eq!(Money::try_sum(Vec::<Money>::new()), Some(Money::zero()));
        assert!(Money::try_sum([Money::new(i64::MAX), Money::new(1)]).is_none());
    }

    #[test]
    fn test_json_representation() {
        assert_eq!(serde_json::to_string(&Money::new(1000)).unwrap(), "10");
        assert_eq!(serde_json::to_string(&Money::new(1250)).unwrap(), "12.5");

        let m: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(m, Money::new(1250));
        let m: Money = serde_json::from_str("10").unwrap();
        assert_eq!(m, Money::new(1000));
        assert!(serde_json::from_str::<Money>("\"10\"").is_err());
    }
}
