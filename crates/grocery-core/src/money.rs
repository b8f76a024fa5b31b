//! # Money Module
//!
//! Provides `Money` for cart totals and `UnitPrice` for catalog prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing float prices:                                                  │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Units                                            │
//! │    Catalog prices load as integer millionths (UnitPrice), exactly.      │
//! │    Line totals are summed in millionths, then rounded to cents ONCE.    │
//! │    0.125 x 3 = 0.375 -> $0.38 (not 3 x $0.13 = $0.39)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use grocery_core::money::Money;
//!
//! let price = Money::from_cents(250); // $2.50
//! let line = price.multiply_quantity(3);
//! assert_eq!(line.cents(), 750);
//! assert_eq!(line.to_major(), 7.5);
//!
//! use grocery_core::money::UnitPrice;
//!
//! let price = UnitPrice::from_major_f64(0.125).unwrap();
//! assert_eq!((price * 3).round_to_cents().cents(), 38);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Anything displayed or charged is `Money`; sub-cent precision lives in
/// [`UnitPrice`] until a total is rounded.
///
/// ## Design Decisions
/// - **i64 (signed)**: matches the quantity type of the cart ledger
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value in major units, for display and JSON only.
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use grocery_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Formats the amount with a currency symbol, e.g. `"$7.50"`.
    ///
    /// The storefront's currency symbol is configurable, so [`fmt::Display`]
    /// is only the dollar-sign default.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("$"))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Price
// =============================================================================

const MICROS_PER_CENT: i64 = 10_000;
const MICROS_PER_MAJOR: f64 = 1_000_000.0;

/// A catalog price, or a running sum of line totals, in millionths of the
/// major unit.
///
/// Catalog JSON carries decimal prices such as `0.125`. Keeping them at this
/// resolution lets a cart total round exactly once, in
/// [`UnitPrice::round_to_cents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitPrice(i64);

impl UnitPrice {
    /// Creates a price from millionths of the major unit.
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        UnitPrice(micros)
    }

    /// Converts a decimal price (as found in JSON catalogs).
    ///
    /// Digits past the sixth decimal place are rounded away. Returns `None`
    /// for NaN, infinities and values outside the i64 range.
    ///
    /// ## Example
    /// ```rust
    /// use grocery_core::money::UnitPrice;
    ///
    /// assert_eq!(UnitPrice::from_major_f64(0.125).unwrap().micros(), 125_000);
    /// assert!(UnitPrice::from_major_f64(f64::NAN).is_none());
    /// ```
    pub fn from_major_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let micros = (amount * MICROS_PER_MAJOR).round();
        if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
            return None;
        }
        Some(UnitPrice(micros as i64))
    }

    #[inline]
    pub const fn micros(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        UnitPrice(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Rounds to whole cents, half away from zero: `0.375 → 0.38`,
    /// `-0.125 → -0.13`.
    pub const fn round_to_cents(&self) -> Money {
        let cents = self.0 / MICROS_PER_CENT;
        let rest = self.0 % MICROS_PER_CENT;
        if rest.abs() * 2 >= MICROS_PER_CENT {
            Money(cents + self.0.signum())
        } else {
            Money(cents)
        }
    }
}

impl From<Money> for UnitPrice {
    fn from(money: Money) -> Self {
        UnitPrice(money.0.saturating_mul(MICROS_PER_CENT))
    }
}

impl Default for UnitPrice {
    fn default() -> Self {
        UnitPrice::zero()
    }
}

impl Add for UnitPrice {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        UnitPrice(self.0.saturating_add(other.0))
    }
}

impl Mul<i64> for UnitPrice {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        UnitPrice(self.0.saturating_mul(qty))
    }
}

impl Sum for UnitPrice {
    fn sum<I: Iterator<Item = UnitPrice>>(iter: I) -> Self {
        iter.fold(UnitPrice::zero(), |acc, p| acc + p)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_unit_price_from_major_f64() {
        assert_eq!(UnitPrice::from_major_f64(2.50).unwrap().micros(), 2_500_000);
        assert_eq!(UnitPrice::from_major_f64(19.99).unwrap().micros(), 19_990_000);
        assert_eq!(UnitPrice::from_major_f64(0.125).unwrap().micros(), 125_000);
        assert!(UnitPrice::from_major_f64(f64::INFINITY).is_none());
        assert!(UnitPrice::from_major_f64(1e30).is_none());
    }

    #[test]
    fn test_round_to_cents_half_away_from_zero() {
        let round = |micros| UnitPrice::from_micros(micros).round_to_cents().cents();
        assert_eq!(round(375_000), 38);
        assert_eq!(round(125_000), 13);
        assert_eq!(round(124_999), 12);
        assert_eq!(round(-125_000), -13);
        assert_eq!(round(-124_999), -12);
        assert_eq!(round(2_500_000), 250);
    }

    /// The sum keeps sub-cent parts; only the total is rounded.
    #[test]
    fn test_sub_cent_prices_round_on_the_total() {
        let eighth = UnitPrice::from_major_f64(0.125).unwrap();
        let total: UnitPrice = vec![eighth, eighth, eighth].into_iter().sum();
        assert_eq!(total.round_to_cents().cents(), 38);
        assert_eq!((eighth * 3).round_to_cents(), total.round_to_cents());
        assert_eq!(UnitPrice::from(Money::from_cents(250)).round_to_cents().cents(), 250);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(750)), "$7.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(Money::from_cents(1234).format_with("₹"), "₹12.34");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    /// Ten cents added ten times is exactly one dollar in integer units.
    #[test]
    fn test_no_float_drift() {
        let dime = UnitPrice::from_major_f64(0.1).unwrap();
        let total: UnitPrice = std::iter::repeat(dime).take(10).sum();
        assert_eq!(total.round_to_cents().cents(), 100);
        assert_eq!(total.round_to_cents().to_major(), 1.0);
    }

    #[test]
    fn test_multiply_saturates() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.multiply_quantity(4).cents(), i64::MAX);
    }
}
