//! # Domain Types
//!
//! Core domain types for the Sumi storefront checkout.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌──────────────────┐  │
//! │  │    CartLine     │   │  CouponDescriptor   │   │ UserDiscount     │  │
//! │  │  ─────────────  │   │  ─────────────────  │   │ Profile          │  │
//! │  │  product_id     │   │  code               │   │  ──────────────  │  │
//! │  │  unit_price     │   │  discount (kind)    │   │  eligible        │  │
//! │  │  quantity       │   │  cumulative         │   │  percentage_bps  │  │
//! │  │  customization  │   │  product_id?        │   │  classification  │  │
//! │  └─────────────────┘   └─────────────────────┘   └──────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐                         │
//! │  │  DiscountKind   │   │    GuestContact     │                         │
//! │  │  ─────────────  │   │  ─────────────────  │                         │
//! │  │  Percentage     │   │  name, email, phone │                         │
//! │  │  Fixed          │   │  (+ optional addr)  │                         │
//! │  └─────────────────┘   └─────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::canvas_model::CustomizationPayload;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the shopping cart.
///
/// ## Design Notes
/// - `unit_price` is frozen at add-to-cart time: price edits in the admin
///   back-office do not retroactively change a cart.
/// - `customization` is present only for design-studio products and is
///   immutable once attached; replacing it means re-entering the studio.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product ID (catalog identifier).
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding (frozen).
    pub unit_price: Money,

    /// Quantity in cart. Always > 0; setting 0 removes the line.
    pub quantity: i64,

    /// Design-studio payload for custom-print products.
    pub customization: Option<CustomizationPayload>,

    /// When this line was added to the cart.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a plain (non-customized) cart line.
    pub fn new(product_id: impl Into<String>, name: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        CartLine {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
            customization: None,
            added_at: Utc::now(),
        }
    }

    /// Creates a cart line carrying a design-studio customization.
    pub fn customized(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
        customization: CustomizationPayload,
    ) -> Self {
        CartLine {
            customization: Some(customization),
            ..CartLine::new(product_id, name, unit_price, quantity)
        }
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Plain lines are unique by `product_id` (adding again increases quantity)
/// - Customized lines are always distinct (two stickers of the same product
///   with different artwork are different lines)
/// - Because a product can appear as one plain line plus several customized
///   lines, the `product_id`-keyed operations address the plain line only;
///   customized lines are keyed by their print-artifact id
/// - Quantity must be > 0 (updating to 0 removes the line)
/// - Maximum lines: [`MAX_CART_LINES`]; maximum quantity: [`MAX_LINE_QUANTITY`]
#[derive(Debug, Clone, Serialize, Deserialize, Default, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in the cart.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a plain product line, merging quantity with an existing
    /// non-customized line for the same product.
    pub fn add_line(&mut self, line: CartLine) -> CoreResult<()> {
        if line.quantity <= 0 {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        // Customized lines never merge; artwork differs even when the
        // product is the same.
        if line.customization.is_none() {
            if let Some(existing) = self
                .lines
                .iter_mut()
                .find(|l| l.product_id == line.product_id && l.customization.is_none())
            {
                let new_qty = existing.quantity + line.quantity;
                if new_qty > MAX_LINE_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: new_qty,
                        max: MAX_LINE_QUANTITY,
                    });
                }
                existing.quantity = new_qty;
                return Ok(());
            }
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge { max: MAX_CART_LINES });
        }

        self.lines.push(line);
        Ok(())
    }

    /// Updates the quantity of the plain (non-customized) line for a
    /// product. Quantity 0 removes the line.
    ///
    /// A product id can match one plain line *and* several customized
    /// lines, so this never touches customized lines; those are addressed
    /// by print-artifact id.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(product_id);
        }

        if quantity < 0 || quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        match self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.customization.is_none())
        {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::LineNotFound(product_id.to_string())),
        }
    }

    /// Removes the plain (non-customized) line for a product. Customized
    /// lines for the same product are left in place.
    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        match self
            .lines
            .iter()
            .position(|l| l.product_id == product_id && l.customization.is_none())
        {
            Some(index) => {
                self.lines.remove(index);
                Ok(())
            }
            None => Err(CoreError::LineNotFound(product_id.to_string())),
        }
    }

    /// Removes a customized line by the id of its print artifact, which is
    /// unique per studio export and therefore identifies exactly one line.
    pub fn remove_customized_line(&mut self, artifact_id: &str) -> CoreResult<()> {
        match self.lines.iter().position(|l| {
            l.customization
                .as_ref()
                .map_or(false, |c| c.print_file.id == artifact_id)
        }) {
            Some(index) => {
                self.lines.remove(index);
                Ok(())
            }
            None => Err(CoreError::LineNotFound(artifact_id.to_string())),
        }
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Calculates the subtotal (before any discount).
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Coupon Descriptor
// =============================================================================

/// The kind and magnitude of a coupon discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountKind {
    /// Percentage off, in basis points (2000 = 20%).
    Percentage { bps: u32 },
    /// A flat amount off.
    Fixed { amount: Money },
}

/// A validated coupon, as returned by the coupon-resolution service.
///
/// ## Read-Only Contract
/// The pricing engine never mutates or re-validates a descriptor. Expiry,
/// usage limits, and cart applicability are enforced server-side before a
/// descriptor is ever handed to the engine; only the *combination* rule
/// (`cumulative`) is interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CouponDescriptor {
    /// The code the shopper entered.
    pub code: String,

    /// Discount kind and magnitude.
    pub discount: DiscountKind,

    /// Whether this coupon stacks with the member discount.
    /// When false, the larger of the two discounts wins.
    pub cumulative: bool,

    /// When set, the discount applies to this product's line only.
    pub product_id: Option<String>,
}

// =============================================================================
// User Discount Profile
// =============================================================================

/// The shopper's loyalty-discount profile, fetched from the user service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserDiscountProfile {
    /// Whether the shopper qualifies for a member discount at all.
    pub eligible: bool,

    /// Discount percentage in basis points (1000 = 10%).
    pub percentage_bps: u32,

    /// Loyalty tier label ("silver", "gold", ...). Display only.
    pub classification: String,
}

impl UserDiscountProfile {
    /// Profile for guests and for shoppers whose profile failed to load:
    /// ineligible, zero percentage.
    pub fn guest() -> Self {
        UserDiscountProfile {
            eligible: false,
            percentage_bps: 0,
            classification: "guest".to_string(),
        }
    }
}

impl Default for UserDiscountProfile {
    fn default() -> Self {
        UserDiscountProfile::guest()
    }
}

// =============================================================================
// Guest Contact
// =============================================================================

/// Contact details collected when an unauthenticated shopper checks out.
///
/// `name`, `email`, and `phone` are required; the address fields are
/// optional (validated in [`crate::validation`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GuestContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub postal_code: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
