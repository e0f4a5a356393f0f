//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing invoice lines as floats:                                       │
//! │    3 × ₹0.10 + ₹0.20 = ₹0.5000000000000001  ❌                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    3 × 10 paise + 20 paise = 50 paise        ✅                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stored Format
//! Documents written by the web back-office hold plain JSON numbers in
//! rupees (`"price": 15`, `"total": 45.5`). `Money` keeps paise in memory and
//! converts at the serde boundary, so existing documents load unchanged and
//! new documents look exactly like the old ones. Older form inputs sometimes
//! stored numbers as strings (`"price": "15"`); those are accepted on read.
//!
//! ## Overflow
//! Arithmetic saturates at the `i64` bounds instead of wrapping or
//! panicking. Callers that must reject oversized values use the `checked_*`
//! methods; stored amounts beyond [`Money::MAX`] fail to deserialize.
//!
//! ## Usage
//! ```rust
//! use medstore_core::money::Money;
//!
//! let price = Money::from_paise(1550); // ₹15.50
//! let line = price * 3;                // ₹46.50
//! assert_eq!(line.paise(), 4650);
//! ```

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: `remainingAmount` goes negative on overpayment, and
///   profit goes negative when a medicine is sold below cost
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Custom serde**: stored as a rupee number for document compatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Largest representable amount.
    pub const MAX: Money = Money(i64::MAX);

    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use medstore_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(15).paise(), 1500);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees.saturating_mul(100))
    }

    /// Whole rupees, or `None` if the paise value does not fit in an i64.
    #[inline]
    pub const fn checked_from_rupees(rupees: i64) -> Option<Self> {
        match rupees.checked_mul(100) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the rupee part carries the sign:
    /// `from_rupees_paise(-5, 50)` is -₹5.50.
    #[inline]
    pub const fn from_rupees_paise(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees.saturating_mul(100).saturating_sub(paise))
        } else {
            Money(rupees.saturating_mul(100).saturating_add(paise))
        }
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use medstore_core::money::Money;
    ///
    /// let unit_price = Money::from_rupees(15);
    /// assert_eq!(unit_price.multiply_quantity(3), Money::from_rupees(45));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Like [`multiply_quantity`](Self::multiply_quantity), but `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Rupee amount as a float, for display and the stored format only.
    pub fn as_rupees_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses a rupee amount written as text ("15", "15.5", " 12.25 ").
    pub fn parse_rupees(text: &str) -> Option<Self> {
        let value: f64 = text.trim().parse().ok()?;
        Self::from_rupees_f64(value)
    }

    fn from_rupees_f64(value: f64) -> Option<Self> {
        let paise = (value * 100.0).round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if !paise.is_finite() || paise.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Money(paise as i64))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `₹10.50`. Display only; the UI formats for locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
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
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Stored Format
// =============================================================================

/// Whole rupees serialize as integers (`15`), anything else as a float (`15.5`).
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.rupees())
        } else {
            serializer.serialize_f64(self.as_rupees_f64())
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredAmount {
    Whole(i64),
    Fractional(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StoredAmount::deserialize(deserializer)? {
            StoredAmount::Whole(rupees) => Money::checked_from_rupees(rupees)
                .ok_or_else(|| de::Error::custom("amount is out of range")),
            StoredAmount::Fractional(value) => Money::from_rupees_f64(value)
                .ok_or_else(|| de::Error::custom("amount must be a finite number in range")),
            StoredAmount::Text(text) => Money::parse_rupees(&text).ok_or_else(|| {
                de::Error::invalid_value(de::Unexpected::Str(&text), &"a rupee amount")
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
