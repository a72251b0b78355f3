//! # Error Types
//!
//! Domain-specific error types for sumi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sumi-core errors (this file)                                          │
//! │  ├── CoreError        - Cart/domain rule violations                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  sumi-canvas errors (separate crate)                                   │
//! │  └── CanvasError      - Upload/decode/print failures                   │
//! │                                                                         │
//! │  sumi-checkout errors (separate crate)                                 │
//! │  ├── CouponRejection  - Server-side coupon refusals                    │
//! │  └── CheckoutError    - Network/integration failures                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → Frontend          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, field name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing inline message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent cart rule violations. They are surfaced inline
/// next to the offending control and never abort the session.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced product has no line in the cart.
    #[error("Product not in cart: {0}")]
    LineNotFound(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity is out of the allowed range.
    #[error("Quantity {requested} is outside the allowed range (max {max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when shopper input doesn't meet requirements. Used for
/// early validation before any network round trip.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., malformed email, bad coupon characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
