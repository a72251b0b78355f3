//! Error types for checkout orchestration.
//!
//! Two layers: [`CouponRejection`] is the server-side refusal taxonomy of
//! the coupon-resolution contract; [`CheckoutError`] covers everything the
//! checkout flow itself can hit. No variant is fatal — every failure path
//! returns the session to an interactive state, and nothing retries
//! automatically.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sumi_core::ValidationError;

// =============================================================================
// Coupon Rejection
// =============================================================================

/// Why the coupon service refused a code.
///
/// Produced server-side; the checkout flow only relays the reason to the
/// shopper inline next to the coupon field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponRejection {
    #[error("Coupon code not recognized")]
    InvalidCode,

    #[error("Coupon has expired")]
    Expired,

    #[error("Coupon has no uses remaining")]
    UsageExhausted,

    #[error("Coupon does not apply to anything in this cart")]
    NotApplicableToCart,
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Checkout flow errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The coupon service refused the code.
    #[error(transparent)]
    CouponRejected(#[from] CouponRejection),

    /// The discount-profile fetch failed. The session degrades to a guest
    /// profile rather than blocking checkout.
    #[error("Discount profile unavailable: {0}")]
    ProfileUnavailable(String),

    /// Order submission failed. The cart is left intact for a retry.
    #[error("Order submission failed: {0}")]
    SubmitFailed(String),

    /// Submission was attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Local input validation failed (guest contact, coupon code shape).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Convenience type alias for Results with CheckoutError.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(CouponRejection::Expired.to_string(), "Coupon has expired");
        assert_eq!(
            CouponRejection::NotApplicableToCart.to_string(),
            "Coupon does not apply to anything in this cart"
        );
    }

    #[test]
    fn test_rejection_wire_shape() {
        let json = serde_json::to_string(&CouponRejection::UsageExhausted).unwrap();
        assert_eq!(json, "\"usage_exhausted\"");
    }

    #[test]
    fn test_rejection_converts_transparent() {
        let err: CheckoutError = CouponRejection::InvalidCode.into();
        assert_eq!(err.to_string(), "Coupon code not recognized");
    }
}
