//! # Pricing Engine
//!
//! The checkout total calculation: subtotal, member discount, coupon
//! discount, and the combination rule between the two.
//!
//! ## Discount Stacking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Discount Combination Rule                            │
//! │                                                                         │
//! │  subtotal ──► member discount (if eligible)                            │
//! │          └──► coupon discount (scoped to one line, or cart-wide)       │
//! │                                                                         │
//! │  no coupon          → total = member                                   │
//! │  cumulative coupon  → total = member + coupon   (both shown)           │
//! │  exclusive coupon   → total = max(member, coupon)                      │
//! │                       the loser is REPORTED AS ZERO so the UI can      │
//! │                       render it as "superseded", not blank             │
//! │                       tie → coupon wins                                │
//! │                                                                         │
//! │  cap: total ≤ subtotal, so the final total never goes negative         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! `compute_totals` performs no I/O and cannot fail. Coupon validation
//! (expiry, usage limits, applicability) happens before a descriptor ever
//! reaches this function; malformed numeric input is a caller bug, probed
//! by boundary tests but not defended against here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CartLine, CouponDescriptor, DiscountKind, UserDiscountProfile};

// =============================================================================
// Price Breakdown
// =============================================================================

/// The computed checkout totals.
///
/// Recomputed from scratch on every cart/coupon/profile change; never
/// cached across such changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Sum of line totals before any discount.
    pub subtotal: Money,
    /// Member discount actually applied (zero when superseded by an
    /// exclusive coupon, so the UI can show it as crossed out).
    pub user_discount: Money,
    /// Coupon discount actually applied (zero when superseded).
    pub coupon_discount: Money,
    /// The combined discount, capped at `subtotal`.
    pub total_discount: Money,
    /// `subtotal - total_discount`. Never negative.
    pub final_total: Money,
}

// =============================================================================
// Engine
// =============================================================================

/// Computes the full price breakdown for a cart.
///
/// ## Example
/// ```rust
/// use sumi_core::money::Money;
/// use sumi_core::pricing::compute_totals;
/// use sumi_core::types::{CartLine, CouponDescriptor, DiscountKind, UserDiscountProfile};
///
/// let cart = vec![CartLine::new("tee", "T-Shirt", Money::from_yen(2500), 4)];
/// let member = UserDiscountProfile {
///     eligible: true,
///     percentage_bps: 1000, // 10%
///     classification: "gold".into(),
/// };
/// let coupon = CouponDescriptor {
///     code: "SAVE20".into(),
///     discount: DiscountKind::Percentage { bps: 2000 },
///     cumulative: false,
///     product_id: None,
/// };
///
/// let breakdown = compute_totals(&cart, Some(&coupon), &member);
/// // Exclusive coupon (¥2,000) beats the member discount (¥1,000).
/// assert_eq!(breakdown.coupon_discount.yen(), 2000);
/// assert_eq!(breakdown.user_discount.yen(), 0);
/// assert_eq!(breakdown.final_total.yen(), 8000);
/// ```
pub fn compute_totals(
    cart: &[CartLine],
    coupon: Option<&CouponDescriptor>,
    profile: &UserDiscountProfile,
) -> PriceBreakdown {
    let subtotal = cart
        .iter()
        .fold(Money::zero(), |acc, line| acc + line.line_total());

    let user_value = if profile.eligible {
        subtotal.percentage(profile.percentage_bps)
    } else {
        Money::zero()
    };

    let coupon_value = coupon
        .map(|c| coupon_discount_value(cart, subtotal, c))
        .unwrap_or_else(Money::zero);

    let (user_applied, coupon_applied) = match coupon {
        None => (user_value, Money::zero()),
        Some(c) if c.cumulative => (user_value, coupon_value),
        // Exclusive: the larger discount wins outright, the other is
        // reported as zero. Strict `>` on the member branch means an
        // exact tie falls through to the coupon.
        Some(_) => {
            if user_value > coupon_value {
                (user_value, Money::zero())
            } else {
                (Money::zero(), coupon_value)
            }
        }
    };

    let total_discount = (user_applied + coupon_applied).min(subtotal);
    let final_total = subtotal - total_discount;

    PriceBreakdown {
        subtotal,
        user_discount: user_applied,
        coupon_discount: coupon_applied,
        total_discount,
        final_total,
    }
}

/// The raw value of a coupon against a cart, before the combination rule.
///
/// Product-scoped coupons apply to the first matching line; a scoped
/// coupon whose product is absent from the cart is worth zero. A scoped
/// *fixed* coupon subtracts its amount once per line, flat, not per unit.
/// That flat application mirrors the storefront's long-standing behavior
/// and is pinned by tests; order-history amounts depend on it.
fn coupon_discount_value(cart: &[CartLine], subtotal: Money, coupon: &CouponDescriptor) -> Money {
    match &coupon.product_id {
        Some(product_id) => {
            let Some(line) = cart.iter().find(|l| &l.product_id == product_id) else {
                return Money::zero();
            };
            match coupon.discount {
                DiscountKind::Percentage { bps } => line.line_total().percentage(bps),
                DiscountKind::Fixed { amount } => amount,
            }
        }
        None => match coupon.discount {
            DiscountKind::Percentage { bps } => subtotal.percentage(bps),
            DiscountKind::Fixed { amount } => amount,
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
