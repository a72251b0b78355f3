//! # Collaborator Seams
//!
//! The three async services checkout depends on, as object-safe traits.
//! The production implementations sit behind HTTP endpoints
//! (`POST /coupons/validate`, `GET /users/profile`, `POST /orders`);
//! tests use in-memory fakes. The checkout flow treats all three as
//! black boxes and never retries them on its own.

use async_trait::async_trait;

use sumi_core::{CartLine, CouponDescriptor, UserDiscountProfile};

use crate::error::{CheckoutError, CouponRejection};
use crate::session::OrderRequest;

/// Resolves a coupon code against the current cart.
///
/// All validation rules (expiry, usage limits, cart applicability) live
/// behind this seam. A descriptor that comes back is taken at face value;
/// the pricing engine only interprets its *combination* rule.
#[async_trait]
pub trait CouponResolver: Send + Sync {
    async fn validate(
        &self,
        code: &str,
        cart: &[CartLine],
    ) -> Result<CouponDescriptor, CouponRejection>;
}

/// Fetches the shopper's loyalty-discount profile.
#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn fetch(&self, email: &str) -> Result<UserDiscountProfile, CheckoutError>;
}

/// Accepts a finished order.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit(&self, order: &OrderRequest) -> Result<(), CheckoutError>;
}
