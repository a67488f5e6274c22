//! # Money Module
//!
//! Provides the `Money` type for rounded report amounts and the rounding
//! helpers every stage of the engine shares.
//!
//! ## Two Numeric Worlds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RAW INPUT (Decimal)                  REPORTED OUTPUT (Money)           │
//! │                                                                         │
//! │  catalog price     50000              sold price        47368           │
//! │  line price        33.33              line total        42632           │
//! │  recorded total    90000              detail total      90000           │
//! │  order factor      0.947368421...                                       │
//! │                                                                         │
//! │  Inputs keep every digit the source recorded. Intermediate math is     │
//! │  exact decimal math (no floats). Only the final per-line amounts are   │
//! │  rounded to whole currency units, and those rounded amounts are what   │
//! │  the reconciler balances against the transaction target.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::money::{round_half_up, Money};
//!
//! // 45000 × (90000 / 95000) = 42631.578...
//! let unit = Decimal::from(45000) * Decimal::from(90000) / Decimal::from(95000);
//! let total = Money::from_decimal(unit);
//! assert_eq!(total.units(), 42632);
//!
//! assert_eq!(round_half_up(Decimal::new(335, 1)), Decimal::from(34)); // 33.5 → 34
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Rounding Helpers
// =============================================================================

/// Rounds to the nearest whole unit, halves away from zero.
///
/// For the non-negative amounts a report deals with this is the classic
/// "round half up": 0.5 → 1, 2.5 → 3, 33.33 → 33.
#[inline]
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to two decimal places, halves away from zero.
///
/// Used for every percentage the report shows (discount %, margin %).
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    round_to(value, crate::PERCENT_DECIMALS)
}

/// Rounds to `dp` decimal places, halves away from zero.
#[inline]
pub fn round_to(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Divides, returning zero when the denominator is zero.
///
/// Every ratio in the report (discount %, margin %, factors) goes through
/// here: a zero denominator defines the ratio as 0 and never panics.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use tally_core::money::ratio_or_zero;
///
/// assert_eq!(ratio_or_zero(Decimal::from(50), Decimal::ZERO), Decimal::ZERO);
/// assert_eq!(ratio_or_zero(Decimal::from(50), Decimal::from(200)), Decimal::new(25, 2));
/// ```
#[inline]
pub fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A rounded monetary amount in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: reconciliation deltas can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Only built by rounding**: raw amounts stay `Decimal` until the last step
///
/// ## Where Money Is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  finalUnitPrice ──► round ──► ResolvedLine.sold_price                   │
/// │                                                                         │
/// │  finalUnitPrice × qty ──► round ──► ResolvedLine.line_total ──┐         │
/// │                                                               │         │
/// │  target(T) ──► round ──► targetRounded ◄── Σ line_total ──────┘         │
/// │                               │                                         │
/// │                               ▼                                         │
/// │                     delta applied to the last line                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let total = Money::from_units(90000);
    /// assert_eq!(total.units(), 90000);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Rounds a decimal amount (half away from zero) into Money.
    ///
    /// Amounts beyond the i64 range saturate instead of wrapping.
    pub fn from_decimal(value: Decimal) -> Self {
        let rounded = round_half_up(value);
        match rounded.to_i64() {
            Some(units) => Money(units),
            None if rounded.is_sign_negative() => Money(i64::MIN),
            None => Money(i64::MAX),
        }
    }

    /// Returns the value in whole currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns the amount as an exact decimal.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.0)
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative amounts to zero.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(-7).floor_zero(), Money::zero());
    /// assert_eq!(Money::from_units(7).floor_zero(), Money::from_units(7));
    /// ```
    #[inline]
    pub const fn floor_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Divides by a quantity and rounds to whole units.
    ///
    /// A quantity of zero (or less) divides by one, so a reconciled line with
    /// no units still reports its total as the unit price.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(100).per_unit(3).units(), 33);
    /// assert_eq!(Money::from_units(34).per_unit(0).units(), 34);
    /// ```
    pub fn per_unit(&self, quantity: i64) -> Money {
        let divisor = if quantity > 0 { quantity } else { 1 };
        Money::from_decimal(Decimal::from(self.0) / Decimal::from(divisor))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with thousands separators, e.g. `$90,000`.
///
/// ## Note
/// This is for logs and debugging. The rendering collaborator owns
/// localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{}${}", sign, grouped)
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
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decimal_rounds_half_up() {
        assert_eq!(Money::from_decimal(Decimal::new(335, 1)).units(), 34);
        assert_eq!(Money::from_decimal(Decimal::new(3333, 2)).units(), 33);
        assert_eq!(Money::from_decimal(Decimal::new(6666, 2)).units(), 67);
        assert_eq!(Money::from_decimal(Decimal::new(5, 1)).units(), 1);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(Decimal::new(52631, 4)), Decimal::new(526, 2));
        assert_eq!(round2(Decimal::new(10005, 3)), Decimal::new(1001, 2));
    }

    #[test]
    fn test_ratio_or_zero_guards_division() {
        assert_eq!(ratio_or_zero(Decimal::ONE, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(ratio_or_zero(Decimal::from(3), Decimal::from(4)), Decimal::new(75, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_units(90000)), "$90,000");
        assert_eq!(format!("{}", Money::from_units(1234567)), "$1,234,567");
        assert_eq!(format!("{}", Money::from_units(-550)), "-$550");
        assert_eq!(format!("{}", Money::from_units(0)), "$0");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_units(47368);
        let b = Money::from_units(42632);
        assert_eq!((a + b).units(), 90000);
        assert_eq!((a - b).units(), 4736);
        assert_eq!((b * 2).units(), 85264);

        let total: Money = [a, b].iter().sum();
        assert_eq!(total, Money::from_units(90000));
    }

    #[test]
    fn test_arithmetic_saturates_at_bounds() {
        let huge = Money::from_decimal(Decimal::MAX);
        assert_eq!(huge.units(), i64::MAX);
        assert_eq!((huge + Money::from_units(1)).units(), i64::MAX);
        assert_eq!((Money::from_units(i64::MIN) - Money::from_units(1)).units(), i64::MIN);
        assert_eq!((huge * 3).units(), i64::MAX);

        let mut acc = huge;
        acc += huge;
        assert_eq!(acc.units(), i64::MAX);

        let total: Money = [huge, huge, Money::from_units(5)].iter().sum();
        assert_eq!(total.units(), i64::MAX);
    }

    #[test]
    fn test_per_unit_guards_zero_quantity() {
        assert_eq!(Money::from_units(34).per_unit(1).units(), 34);
        assert_eq!(Money::from_units(101).per_unit(2).units(), 51);
        assert_eq!(Money::from_units(34).per_unit(0).units(), 34);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(Money::from_units(-1).is_negative());
        assert_eq!(Money::from_units(-1).floor_zero(), zero);
    }
}
