//! # sumi-core: Pure Business Logic for the Sumi Storefront
//!
//! This crate is the **heart** of the Sumi custom-print storefront. It
//! contains the checkout pricing rules and the canvas element data model
//! as pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sumi Architecture                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   Storefront Frontend                           │   │
//! │  │    Catalog ──► Design Studio ──► Cart ──► Checkout             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌──────────────────┐  ┌──────▼──────────┐                             │
//! │  │   sumi-canvas    │  │  sumi-checkout  │                             │
//! │  │  render/export   │  │  orchestration  │                             │
//! │  └────────┬─────────┘  └──────┬──────────┘                             │
//! │           │                   │                                        │
//! │  ┌────────▼───────────────────▼──────────────────────────────────┐    │
//! │  │               ★ sumi-core (THIS CRATE) ★                      │    │
//! │  │                                                               │    │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────────┐ ┌─────────────┐   │    │
//! │  │  │  money  │ │ pricing │ │ canvas_model │ │ validation  │   │    │
//! │  │  │  Money  │ │ totals  │ │   elements   │ │   rules     │   │    │
//! │  │  └─────────┘ └─────────┘ └──────────────┘ └─────────────┘   │    │
//! │  │                                                               │    │
//! │  │  NO I/O • NO NETWORK • NO RASTERIZATION • PURE FUNCTIONS      │    │
//! │  └───────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain types (CartLine, CouponDescriptor, profiles, ...)
//! - [`canvas_model`] - Design-studio element data model
//! - [`pricing`] - The checkout total / discount-combination engine
//! - [`validation`] - Input validation (guest contact, coupon codes)
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Network, file system, and rendering are FORBIDDEN here
//! 3. **Integer Money**: All monetary values are whole yen (i64), no floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use sumi_core::money::Money;
//! use sumi_core::pricing::compute_totals;
//! use sumi_core::types::{CartLine, UserDiscountProfile};
//!
//! let cart = vec![CartLine::new("mug-01", "Mug", Money::from_yen(1500), 2)];
//! let breakdown = compute_totals(&cart, None, &UserDiscountProfile::guest());
//!
//! assert_eq!(breakdown.subtotal.yen(), 3000);
//! assert_eq!(breakdown.final_total.yen(), 3000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod canvas_model;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use sumi_core::Money` instead of
// `use sumi_core::money::Money`

pub use canvas_model::{
    CanvasElement, CustomizationPayload, ElementId, ImageSource, PrintArtifact, Side,
    ICON_COLOR_TOKEN,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CurrencyFormat, Money};
pub use pricing::{compute_totals, PriceBreakdown};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps order payloads reasonably sized.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
