//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    15.255 × 2 = 30.509999999999998  → rounds to 30.50  ❌ WRONG!        │
//! │                                                                         │
//! │  Catalog prices may carry a third decimal place, so integer cents      │
//! │  cannot hold them either.                                               │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 decimals + HALF-UP to the cent                   │
//! │    15.255 × 2 = 30.510 → 30.51                                          │
//! │    Every total is rounded BEFORE it is compared or summed              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use herostore_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! // Unit prices stay raw, totals are always rounded
//! let unit_price = Decimal::new(15255, 3); // 15.255
//! let total = Money::line_total(unit_price, 2).unwrap();
//! assert_eq!(total, Money::from_cents(3051)); // 30.51
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

use crate::error::{CoreError, CoreResult};

/// Number of decimal places every monetary total is rounded to.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a decimal half-up to two places and pins the scale to two, so
/// `75` and `75.0` both become `75.00`.
///
/// ## Example
/// ```rust
/// use herostore_core::money::round_half_up;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_half_up(Decimal::new(30510, 3)).to_string(), "30.51");
/// assert_eq!(round_half_up(Decimal::new(15255, 3)).to_string(), "15.26");
/// assert_eq!(round_half_up(Decimal::new(75, 0)).to_string(), "75.00");
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount rounded half-up to the cent.
///
/// ## Design Decisions
/// - **Decimal, not cents**: catalog prices can have more precision than a
///   cent, only totals are rounded
/// - **Rounded on construction**: there is no way to hold an unrounded
///   `Money`, so comparisons are always between two rounded values
/// - **Serialized as a string**: `"75.00"`, no precision lost in JSON
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price (raw) ──► OrderLine.total = round(price × qty)           │
/// │                                   │                                     │
/// │                                   ▼                                     │
/// │                      Order.total = round(Σ line totals)                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Creates Money from any decimal, rounding half-up to the cent.
    #[inline]
    pub fn new(amount: Decimal) -> Self {
        Money(round_half_up(amount))
    }

    /// Creates Money from an integer amount of cents.
    ///
    /// ## Example
    /// ```rust
    /// use herostore_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(7500).to_string(), "$75.00");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, MONEY_SCALE))
    }

    /// Returns zero money value.
    #[inline]
    pub fn zero() -> Self {
        Money::from_cents(0)
    }

    /// Returns the rounded decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Computes `round(unit_price × quantity, 2)`.
    ///
    /// ## User Workflow
    /// ```text
    /// Product: Iron Man Cup $25.00
    /// Quantity: 3
    ///      │
    ///      ▼
    /// line_total(25.00, 3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: $75.00
    /// ```
    ///
    /// ## Errors
    /// `CoreError::AmountOverflow` if the product does not fit a decimal.
    pub fn line_total(unit_price: Decimal, quantity: i64) -> CoreResult<Money> {
        unit_price
            .checked_mul(Decimal::from(quantity))
            .map(Money::new)
            .ok_or_else(|| CoreError::AmountOverflow {
                operation: format!("{unit_price} × {quantity}"),
            })
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money::new)
    }

    /// Sums amounts with overflow detection.
    ///
    /// ## Example
    /// ```rust
    /// use herostore_core::money::Money;
    ///
    /// let total = Money::checked_sum([Money::from_cents(150), Money::from_cents(250)]).unwrap();
    /// assert_eq!(total, Money::from_cents(400));
    /// ```
    pub fn checked_sum<I>(amounts: I) -> CoreResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| {
                acc.checked_add(amount).ok_or_else(|| CoreError::AmountOverflow {
                    operation: format!("{acc} + {amount}"),
                })
            })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// Used by the export renderers. Localized formatting belongs to the frontend.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}${}", sign, self.0.abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money::new(self.0 + other.0)
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money::new(self.0 - other.0)
    }
}

/// Sum of Money values. Use [`Money::checked_sum`] where overflow must be
/// reported instead of panicking.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_up_at_third_decimal() {
        assert_eq!(round_half_up(dec!(30.505)), dec!(30.51));
        assert_eq!(round_half_up(dec!(30.504)), dec!(30.50));
        assert_eq!(round_half_up(dec!(-30.505)), dec!(-30.51));
    }

    #[test]
    fn test_scale_is_pinned_to_two_places() {
        assert_eq!(Money::new(dec!(75)).amount().scale(), 2);
        assert_eq!(Money::new(dec!(75)).amount().to_string(), "75.00");
    }

    #[test]
    fn test_line_total_rounds_half_up() {
        // 15.255 × 2 = 30.510, not 30.50
        let total = Money::line_total(dec!(15.255), 2).unwrap();
        assert_eq!(total.amount(), dec!(30.51));

        // 15.255 × 1 = 15.255 → 15.26
        let total = Money::line_total(dec!(15.255), 1).unwrap();
        assert_eq!(total.amount(), dec!(15.26));
    }

    #[test]
    fn test_line_total_overflow_is_an_error() {
        let result = Money::line_total(Decimal::MAX, 2);
        assert!(matches!(result, Err(CoreError::AmountOverflow { .. })));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a + b, Money::from_cents(1500));
        assert_eq!(a - b, Money::from_cents(500));
        assert!((b - a).is_negative());
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_cents(7500), Money::from_cents(3051)].into_iter().sum();
        assert_eq!(total, Money::from_cents(10551));
    }

    #[test]
    fn test_checked_sum() {
        let total = Money::checked_sum(vec![
            Money::from_cents(7500),
            Money::from_cents(3051),
        ])
        .unwrap();
        assert_eq!(total, Money::from_cents(10551));

        assert_eq!(Money::checked_sum(Vec::new()).unwrap(), Money::zero());
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_cents(7500)).unwrap();
        assert_eq!(json, "\"75.00\"");

        let back: Money = serde_json::from_str("\"30.505\"").unwrap();
        assert_eq!(back, Money::from_cents(3051));
    }
}
