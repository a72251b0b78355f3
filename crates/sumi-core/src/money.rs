//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A 10% member discount on ¥9,999:                                       │
//! │    9999 * 0.1 = 999.9000000000001  → which yen is that?                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Yen                                              │
//! │    Prices are whole ¥ (no minor unit), percentages are basis points,   │
//! │    and rounding happens in exactly one place with integer math.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sumi_core::money::Money;
//!
//! let price = Money::from_yen(1980);
//!
//! // Arithmetic operations
//! let doubled = price * 2;                    // ¥3,960
//! let total = price + Money::from_yen(500);   // ¥2,480
//!
//! // NEVER do this:
//! // let bad = Money::from_float(19.80); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole yen.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Product.price ──► CartLine.unit_price ──► CartLine.line_total
///                                                   │
///            subtotal ◄────────────────────────────┘
///               │
///               ▼
///     compute_totals() ──► PriceBreakdown ──► Order submission
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole yen.
    ///
    /// ## Example
    /// ```rust
    /// use sumi_core::money::Money;
    ///
    /// let price = Money::from_yen(1980);
    /// assert_eq!(price.yen(), 1980);
    /// ```
    #[inline]
    pub const fn from_yen(yen: i64) -> Self {
        Money(yen)
    }

    /// Returns the value in yen.
    #[inline]
    pub const fn yen(&self) -> i64 {
        self.0
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use sumi_core::money::Money;
    ///
    /// let unit_price = Money::from_yen(299);
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.yen(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Computes a percentage of this amount, given in basis points.
    ///
    /// ## Why Basis Points?
    /// 1 basis point = 0.01% = 1/10000. A 20% coupon is 2000 bps.
    /// Integer math with half-up rounding: `(amount * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use sumi_core::money::Money;
    ///
    /// let subtotal = Money::from_yen(10000);
    /// assert_eq!(subtotal.percentage(1000).yen(), 1000); // 10%
    /// assert_eq!(Money::from_yen(999).percentage(1000).yen(), 100); // 99.9 rounds up
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        // Use i128 to prevent overflow on large amounts
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_yen(part as i64)
    }
}

// =============================================================================
// Currency Formatting
// =============================================================================

/// Explicit currency-formatting configuration.
///
/// The storefront used to read symbol/locale from ambient shared state;
/// here the format is injected wherever a display string is produced, so
/// the pricing core stays free of global configuration.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyFormat {
    /// Currency symbol rendered before the amount ("¥").
    pub symbol: String,
    /// BCP 47 locale tag, used by the frontend for digit grouping.
    pub locale: String,
}

impl CurrencyFormat {
    /// Japanese yen, the storefront default.
    pub fn yen() -> Self {
        CurrencyFormat {
            symbol: "¥".to_string(),
            locale: "ja-JP".to_string(),
        }
    }

    /// Formats an amount with the configured symbol and thousands grouping.
    ///
    /// ## Example
    /// ```rust
    /// use sumi_core::money::{CurrencyFormat, Money};
    ///
    /// let fmt = CurrencyFormat::yen();
    /// assert_eq!(fmt.format(Money::from_yen(12800)), "¥12,800");
    /// assert_eq!(fmt.format(Money::from_yen(-500)), "-¥500");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let digits = amount.yen().abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        format!("{}{}{}", sign, self.symbol, grouped)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging. Use [`CurrencyFormat`] for actual UI display
/// to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}¥{}", sign, self.0.abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yen() {
        let money = Money::from_yen(1980);
        assert_eq!(money.yen(), 1980);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_yen(1980)), "¥1980");
        assert_eq!(format!("{}", Money::from_yen(-550)), "-¥550");
        assert_eq!(format!("{}", Money::from_yen(0)), "¥0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_yen(1000);
        let b = Money::from_yen(500);

        assert_eq!((a + b).yen(), 1500);
        assert_eq!((a - b).yen(), 500);
        let result: Money = a * 3;
        assert_eq!(result.yen(), 3000);
    }

    #[test]
    fn test_percentage_basic() {
        // ¥10,000 at 10% = ¥1,000
        let amount = Money::from_yen(10000);
        assert_eq!(amount.percentage(1000).yen(), 1000);
    }

    #[test]
    fn test_percentage_with_rounding() {
        // ¥999 at 10% = ¥99.9 → ¥100 (half-up with +5000)
        assert_eq!(Money::from_yen(999).percentage(1000).yen(), 100);
        // ¥333 at 15% = ¥49.95 → ¥50
        assert_eq!(Money::from_yen(333).percentage(1500).yen(), 50);
    }

    #[test]
    fn test_percentage_on_large_amounts_does_not_overflow() {
        let amount = Money::from_yen(i64::MAX / 2);
        // Sanity check: i128 intermediate keeps this from overflowing
        let half = amount.percentage(5000);
        assert!(half.yen() > 0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_yen(100);
        assert!(positive.is_positive());

        let negative = Money::from_yen(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_yen(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.yen(), 897);
    }

    #[test]
    fn test_min() {
        let a = Money::from_yen(1000);
        let b = Money::from_yen(500);
        assert_eq!(a.min(b), b);
        assert_eq!(b.min(a), b);
    }

    #[test]
    fn test_currency_format_grouping() {
        let fmt = CurrencyFormat::yen();
        assert_eq!(fmt.format(Money::from_yen(0)), "¥0");
        assert_eq!(fmt.format(Money::from_yen(999)), "¥999");
        assert_eq!(fmt.format(Money::from_yen(1000)), "¥1,000");
        assert_eq!(fmt.format(Money::from_yen(1234567)), "¥1,234,567");
        assert_eq!(fmt.format(Money::from_yen(-12800)), "-¥12,800");
    }
}
