//! # Money Module
//!
//! The `Money` type plus the two arithmetic helpers every document total
//! flows through.
//!
//! ## Where Totals Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Document Total Derivation                            │
//! │                                                                         │
//! │  line_item_total(unit_price, qty)   ← every line item                  │
//! │       │                                                                 │
//! │       ▼  Σ                                                              │
//! │  subtotal                                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  document_total(subtotal, tax, discount) = subtotal + tax − discount   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  amount_due = total − amount_paid                                      │
//! │                                                                         │
//! │  Integer cents throughout: no rounding happens in either helper.       │
//! │  Negative results are returned as-is (returns, over-discounting).      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::{document_total, line_item_total, Money};
//!
//! let line = line_item_total(Money::from_cents(1000), 5);
//! assert_eq!(line.cents(), 5000);
//!
//! let total = document_total(line, Money::from_cents(250), Money::from_cents(100));
//! assert_eq!(total.cents(), 5150);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Basis points in 100%.
pub const BPS_SCALE: i64 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Signed: returns and over-discounted documents produce negative amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity. Negative quantities (returns) are allowed.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Computes a percentage of this amount, rounding half away from zero.
    ///
    /// ## Arguments
    /// * `bps` - Rate in basis points (1000 = 10%)
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// // 8.25% of $10.00 = $0.825 → $0.83
    /// assert_eq!(Money::from_cents(1000).percentage(825).cents(), 83);
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        let raw = self.0 as i128 * bps as i128;
        let half = BPS_SCALE as i128 / 2;
        let rounded = if raw >= 0 {
            (raw + half) / BPS_SCALE as i128
        } else {
            (raw - half) / BPS_SCALE as i128
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Document Arithmetic
// =============================================================================

/// `unit_price × quantity`, with no rounding.
///
/// Zero and negative quantities are valid inputs.
#[inline]
pub fn line_item_total(unit_price: Money, quantity: i64) -> Money {
    unit_price.multiply_quantity(quantity)
}

/// `subtotal + tax − discount`.
///
/// A negative result is returned unclamped. Callers treat it as a
/// data-entry warning, not an error.
#[inline]
pub fn document_total(subtotal: Money, tax: Money, discount: Money) -> Money {
    subtotal + tax - discount
}

/// Selling at cost is allowed, below cost is not.
#[inline]
pub fn is_valid_selling_price(selling: Money, cost: Money) -> bool {
    selling >= cost
}

/// Margin over cost in basis points: `(selling − cost) / cost`.
///
/// A zero (or negative) cost reports a flat 100%.
pub fn margin_bps(selling: Money, cost: Money) -> i64 {
    if cost.cents() <= 0 {
        return BPS_SCALE;
    }
    let profit = (selling - cost).cents() as i128 * BPS_SCALE as i128;
    let cost = cost.cents() as i128;
    let half = cost / 2;
    let rounded = if profit >= 0 {
        (profit + half) / cost
    } else {
        (profit - half) / cost
    };
    rounded as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. Presentation layers do their own formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
