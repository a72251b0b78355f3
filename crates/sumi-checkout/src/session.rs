//! # Checkout Session
//!
//! Orchestrates one shopper's checkout: holds the cart, the applied
//! coupon, and the discount profile, and recomputes the price breakdown
//! synchronously on every change to any of the three.
//!
//! ## Sequencing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Sequencing                               │
//! │                                                                         │
//! │  load cart ──► CheckoutSession::new                                    │
//! │                      │                                                  │
//! │  authenticated? ──yes──► refresh_profile() ── fetch ──► apply/degrade  │
//! │        │ no                                                             │
//! │        └── guest profile (ineligible), no fetch                        │
//! │                      │                                                  │
//! │  coupon previously applied? ──► attach_coupon (no re-validation)       │
//! │  shopper enters code ─────────► apply_coupon_code (validate first)     │
//! │                      │                                                  │
//! │  every {cart, coupon, profile} change ──► recompute breakdown          │
//! │                      │                                                  │
//! │  submit ──► guest contact validation ──► OrderGateway::submit          │
//! │             (failure leaves the cart intact for a retry)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stale Fetch Discard
//! Profile fetches resolve over the network and can arrive out of order.
//! Every fetch begins by taking a generation token; a result is applied
//! only if its token is still the latest, so a slow stale response is
//! provably discarded instead of overwriting newer state. Abandoning the
//! page simply means never applying the pending token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use sumi_core::{
    compute_totals, validation, Cart, CouponDescriptor, CustomizationPayload, GuestContact, Money,
    PriceBreakdown, UserDiscountProfile, ValidationError,
};

use crate::error::{CheckoutError, CheckoutResult};
use crate::resolver::{CouponResolver, OrderGateway, ProfileService};

// =============================================================================
// Shopper Identity
// =============================================================================

/// Who is checking out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shopper {
    /// A signed-in shopper; the email keys the profile fetch.
    Authenticated { email: String },
    /// An anonymous shopper. No profile fetch; contact details are
    /// collected at submission.
    Guest,
}

// =============================================================================
// Order Submission DTOs
// =============================================================================

/// One line of a submitted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: Money,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization: Option<CustomizationPayload>,
}

/// The payload for `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Client-generated id so a retried submission can be de-duplicated.
    pub order_id: String,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub discount: Money,
    pub total: Money,
    pub final_total: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_data: Option<GuestContact>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub submitted_at: DateTime<Utc>,
}

// =============================================================================
// Profile Fetch Token
// =============================================================================

/// Generation token for one profile fetch. Only the latest token's result
/// is ever applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileFetchToken(u64);

// =============================================================================
// Checkout Session
// =============================================================================

/// One shopper's checkout state.
pub struct CheckoutSession {
    cart: Cart,
    shopper: Shopper,
    coupon: Option<CouponDescriptor>,
    profile: UserDiscountProfile,
    breakdown: PriceBreakdown,
    profile_generation: u64,
}

impl CheckoutSession {
    /// Opens a session over a loaded cart. The profile starts as guest
    /// until (and unless) a fetch lands.
    pub fn new(cart: Cart, shopper: Shopper) -> Self {
        let profile = UserDiscountProfile::guest();
        let breakdown = compute_totals(&cart.lines, None, &profile);
        CheckoutSession {
            cart,
            shopper,
            coupon: None,
            profile,
            breakdown,
            profile_generation: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The current breakdown. Always consistent with the most recently
    /// settled cart/coupon/profile; never stale, never cached.
    pub fn breakdown(&self) -> &PriceBreakdown {
        &self.breakdown
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn coupon(&self) -> Option<&CouponDescriptor> {
        self.coupon.as_ref()
    }

    pub fn profile(&self) -> &UserDiscountProfile {
        &self.profile
    }

    fn recompute(&mut self) {
        self.breakdown = compute_totals(&self.cart.lines, self.coupon.as_ref(), &self.profile);
        debug!(
            subtotal = self.breakdown.subtotal.yen(),
            total_discount = self.breakdown.total_discount.yen(),
            final_total = self.breakdown.final_total.yen(),
            "recomputed breakdown"
        );
    }

    // -------------------------------------------------------------------------
    // Cart Mutation
    // -------------------------------------------------------------------------

    /// Executes a mutation against the cart, then recomputes the
    /// breakdown. All cart edits during checkout go through here so a
    /// recompute can never be forgotten.
    pub fn with_cart_mut<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let result = f(&mut self.cart);
        self.recompute();
        result
    }

    // -------------------------------------------------------------------------
    // Discount Profile
    // -------------------------------------------------------------------------

    /// Starts a profile fetch, invalidating any fetch still in flight.
    pub fn begin_profile_fetch(&mut self) -> ProfileFetchToken {
        self.profile_generation += 1;
        ProfileFetchToken(self.profile_generation)
    }

    /// Applies a fetch result if its token is still current.
    ///
    /// A stale token is discarded outright. A failed fetch degrades the
    /// profile to guest (checkout is never blocked on the loyalty tier).
    pub fn apply_profile(
        &mut self,
        token: ProfileFetchToken,
        result: Result<UserDiscountProfile, CheckoutError>,
    ) {
        if token.0 != self.profile_generation {
            warn!(
                token = token.0,
                current = self.profile_generation,
                "discarding stale profile fetch result"
            );
            return;
        }

        self.profile = match result {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "profile fetch failed, degrading to guest");
                UserDiscountProfile::guest()
            }
        };
        self.recompute();
    }

    /// Fetches and applies the discount profile for an authenticated
    /// shopper. Guests skip the round trip entirely.
    pub async fn refresh_profile(&mut self, service: &impl ProfileService) {
        let email = match &self.shopper {
            Shopper::Authenticated { email } => email.clone(),
            Shopper::Guest => {
                self.profile = UserDiscountProfile::guest();
                self.recompute();
                return;
            }
        };

        let token = self.begin_profile_fetch();
        let result = service.fetch(&email).await;
        self.apply_profile(token, result);
    }

    // -------------------------------------------------------------------------
    // Coupons
    // -------------------------------------------------------------------------

    /// Validates a shopper-entered code and applies the resulting coupon.
    ///
    /// The code's shape is checked locally first, so an obviously
    /// malformed entry never costs a round trip. Rejections surface
    /// inline; the previously applied coupon (if any) stays in place.
    pub async fn apply_coupon_code(
        &mut self,
        code: &str,
        resolver: &impl CouponResolver,
    ) -> CheckoutResult<()> {
        let code = validation::validate_coupon_code(code)?;
        let coupon = resolver.validate(&code, &self.cart.lines).await?;
        info!(code = %coupon.code, cumulative = coupon.cumulative, "coupon applied");
        self.coupon = Some(coupon);
        self.recompute();
        Ok(())
    }

    /// Attaches an externally supplied descriptor, e.g. a coupon already
    /// applied at the cart level, without re-validating it.
    pub fn attach_coupon(&mut self, coupon: CouponDescriptor) {
        self.coupon = Some(coupon);
        self.recompute();
    }

    /// Removes the applied coupon.
    pub fn remove_coupon(&mut self) {
        if self.coupon.take().is_some() {
            self.recompute();
        }
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Submits the order.
    ///
    /// Guests must supply contact details (name, email, phone required).
    /// On failure the cart is left intact so the shopper can retry; on
    /// success the cart is cleared.
    pub async fn submit(
        &mut self,
        gateway: &impl OrderGateway,
        guest_data: Option<GuestContact>,
    ) -> CheckoutResult<OrderRequest> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let guest_data = match (&self.shopper, guest_data) {
            (Shopper::Authenticated { .. }, _) => None,
            (Shopper::Guest, Some(contact)) => {
                validation::validate_guest_contact(&contact)?;
                Some(contact)
            }
            (Shopper::Guest, None) => {
                return Err(CheckoutError::Validation(ValidationError::Required {
                    field: "guest contact".to_string(),
                }));
            }
        };

        let order = OrderRequest {
            order_id: Uuid::new_v4().to_string(),
            items: self
                .cart
                .lines
                .iter()
                .map(|line| OrderItem {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    price: line.unit_price,
                    quantity: line.quantity,
                    customization: line.customization.clone(),
                })
                .collect(),
            coupon_code: self.coupon.as_ref().map(|c| c.code.clone()),
            discount: self.breakdown.total_discount,
            total: self.breakdown.subtotal,
            final_total: self.breakdown.final_total,
            guest_data,
            submitted_at: Utc::now(),
        };

        gateway.submit(&order).await?;
        info!(order_id = %order.order_id, final_total = order.final_total.yen(), "order submitted");

        self.cart.clear();
        self.coupon = None;
        self.recompute();
        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CouponRejection;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use sumi_core::{CartLine, DiscountKind};

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    struct FixedResolver {
        result: Result<CouponDescriptor, CouponRejection>,
        calls: AtomicUsize,
    }

    impl FixedResolver {
        fn ok(coupon: CouponDescriptor) -> Self {
            FixedResolver {
                result: Ok(coupon),
                calls: AtomicUsize::new(0),
            }
        }

        fn rejecting(reason: CouponRejection) -> Self {
            FixedResolver {
                result: Err(reason),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CouponResolver for FixedResolver {
        async fn validate(
            &self,
            _code: &str,
            _cart: &[CartLine],
        ) -> Result<CouponDescriptor, CouponRejection> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct FixedProfileService(Result<UserDiscountProfile, String>);

    #[async_trait]
    impl ProfileService for FixedProfileService {
        async fn fetch(&self, _email: &str) -> Result<UserDiscountProfile, CheckoutError> {
            self.0
                .clone()
                .map_err(CheckoutError::ProfileUnavailable)
        }
    }

    struct RecordingGateway {
        fail: bool,
        orders: Mutex<Vec<OrderRequest>>,
    }

    impl RecordingGateway {
        fn new(fail: bool) -> Self {
            RecordingGateway {
                fail,
                orders: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl OrderGateway for RecordingGateway {
        async fn submit(&self, order: &OrderRequest) -> Result<(), CheckoutError> {
            if self.fail {
                return Err(CheckoutError::SubmitFailed("503".to_string()));
            }
            self.orders.lock().unwrap().push(order.clone());
            Ok(())
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn cart_with(price: i64, qty: i64) -> Cart {
        let mut cart = Cart::new();
        cart.add_line(CartLine::new("p1", "Product p1", Money::from_yen(price), qty))
            .unwrap();
        cart
    }

    fn member_profile(bps: u32) -> UserDiscountProfile {
        UserDiscountProfile {
            eligible: true,
            percentage_bps: bps,
            classification: "gold".to_string(),
        }
    }

    fn percent_coupon(bps: u32, cumulative: bool) -> CouponDescriptor {
        CouponDescriptor {
            code: "SAVE20".to_string(),
            discount: DiscountKind::Percentage { bps },
            cumulative,
            product_id: None,
        }
    }

    fn auth() -> Shopper {
        Shopper::Authenticated {
            email: "taro@example.com".to_string(),
        }
    }

    fn guest_contact() -> GuestContact {
        GuestContact {
            name: "Taro Yamada".to_string(),
            email: "taro@example.com".to_string(),
            phone: "090-1234-5678".to_string(),
            postal_code: None,
            address: None,
        }
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[test]
    fn cart_mutation_recomputes_breakdown() {
        let mut session = CheckoutSession::new(cart_with(1000, 1), Shopper::Guest);
        assert_eq!(session.breakdown().subtotal.yen(), 1000);

        session.with_cart_mut(|cart| cart.update_quantity("p1", 3).unwrap());
        assert_eq!(session.breakdown().subtotal.yen(), 3000);
        assert_eq!(session.breakdown().final_total.yen(), 3000);
    }

    #[tokio::test]
    async fn coupon_code_applies_and_recomputes() {
        let mut session = CheckoutSession::new(cart_with(10000, 1), Shopper::Guest);
        let resolver = FixedResolver::ok(percent_coupon(2000, false));

        session.apply_coupon_code("save20", &resolver).await.unwrap();

        assert_eq!(session.breakdown().coupon_discount.yen(), 2000);
        assert_eq!(session.breakdown().final_total.yen(), 8000);
    }

    #[tokio::test]
    async fn malformed_code_never_reaches_the_resolver() {
        let mut session = CheckoutSession::new(cart_with(1000, 1), Shopper::Guest);
        let resolver = FixedResolver::ok(percent_coupon(2000, false));

        let err = session.apply_coupon_code("ten% off", &resolver).await;
        assert!(matches!(err, Err(CheckoutError::Validation(_))));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
        assert!(session.coupon().is_none());
    }

    #[tokio::test]
    async fn rejected_coupon_keeps_previous_state() {
        let mut session = CheckoutSession::new(cart_with(1000, 1), Shopper::Guest);
        session.attach_coupon(percent_coupon(1000, true));

        let resolver = FixedResolver::rejecting(CouponRejection::Expired);
        let err = session.apply_coupon_code("OLD-CODE", &resolver).await;

        assert!(matches!(
            err,
            Err(CheckoutError::CouponRejected(CouponRejection::Expired))
        ));
        // The previously applied coupon survives the failed attempt.
        assert_eq!(session.coupon().unwrap().code, "SAVE20");
    }

    #[test]
    fn externally_pushed_coupon_is_attached_without_validation() {
        let mut session = CheckoutSession::new(cart_with(10000, 1), Shopper::Guest);
        session.attach_coupon(percent_coupon(1000, true));

        assert_eq!(session.breakdown().coupon_discount.yen(), 1000);

        session.remove_coupon();
        assert_eq!(session.breakdown().coupon_discount.yen(), 0);
        assert_eq!(session.breakdown().final_total.yen(), 10000);
    }

    #[test]
    fn stale_profile_fetch_is_discarded() {
        let mut session = CheckoutSession::new(cart_with(10000, 1), auth());

        let stale = session.begin_profile_fetch();
        let current = session.begin_profile_fetch();

        // The newer fetch lands first.
        session.apply_profile(current, Ok(member_profile(1000)));
        assert_eq!(session.breakdown().user_discount.yen(), 1000);

        // The older fetch resolves late with a different answer; it must
        // not overwrite the newer state.
        session.apply_profile(stale, Ok(member_profile(5000)));
        assert_eq!(session.profile().percentage_bps, 1000);
        assert_eq!(session.breakdown().user_discount.yen(), 1000);
    }

    #[tokio::test]
    async fn profile_fetch_failure_degrades_to_guest() {
        let mut session = CheckoutSession::new(cart_with(10000, 1), auth());
        let token = session.begin_profile_fetch();
        session.apply_profile(token, Ok(member_profile(1000)));
        assert_eq!(session.breakdown().user_discount.yen(), 1000);

        let failing = FixedProfileService(Err("profile service down".to_string()));
        session.refresh_profile(&failing).await;

        assert!(!session.profile().eligible);
        assert_eq!(session.breakdown().user_discount.yen(), 0);
    }

    #[tokio::test]
    async fn guests_never_fetch_a_profile() {
        let mut session = CheckoutSession::new(cart_with(10000, 1), Shopper::Guest);
        let service = FixedProfileService(Ok(member_profile(9999)));

        session.refresh_profile(&service).await;

        // Guest sessions keep the ineligible profile regardless of what
        // the service would have answered.
        assert!(!session.profile().eligible);
    }

    #[tokio::test]
    async fn guest_submit_requires_contact() {
        let mut session = CheckoutSession::new(cart_with(1000, 1), Shopper::Guest);
        let gateway = RecordingGateway::new(false);

        let err = session.submit(&gateway, None).await;
        assert!(matches!(err, Err(CheckoutError::Validation(_))));
        assert!(gateway.orders.lock().unwrap().is_empty());
        // The cart is untouched by the failed attempt.
        assert!(!session.cart().is_empty());
    }

    #[tokio::test]
    async fn submit_failure_leaves_cart_intact() {
        let mut session = CheckoutSession::new(cart_with(1000, 2), auth());
        let gateway = RecordingGateway::new(true);

        let err = session.submit(&gateway, None).await;
        assert!(matches!(err, Err(CheckoutError::SubmitFailed(_))));
        assert_eq!(session.cart().line_count(), 1);
        assert_eq!(session.breakdown().subtotal.yen(), 2000);
    }

    #[tokio::test]
    async fn successful_submit_carries_breakdown_and_clears_cart() {
        let mut session = CheckoutSession::new(cart_with(10000, 1), auth());
        let token = session.begin_profile_fetch();
        session.apply_profile(token, Ok(member_profile(1000)));
        session.attach_coupon(percent_coupon(2000, true));

        let gateway = RecordingGateway::new(false);
        let order = session.submit(&gateway, None).await.unwrap();

        assert_eq!(order.total.yen(), 10000);
        assert_eq!(order.discount.yen(), 3000);
        assert_eq!(order.final_total.yen(), 7000);
        assert_eq!(order.coupon_code.as_deref(), Some("SAVE20"));
        assert!(order.guest_data.is_none());
        assert_eq!(gateway.orders.lock().unwrap().len(), 1);

        assert!(session.cart().is_empty());
        assert!(session.coupon().is_none());
    }

    #[tokio::test]
    async fn guest_submit_includes_contact() {
        let mut session = CheckoutSession::new(cart_with(500, 1), Shopper::Guest);
        let gateway = RecordingGateway::new(false);

        let order = session.submit(&gateway, Some(guest_contact())).await.unwrap();
        assert_eq!(order.guest_data.as_ref().unwrap().name, "Taro Yamada");
    }

    #[tokio::test]
    async fn empty_cart_cannot_submit() {
        let mut session = CheckoutSession::new(Cart::new(), auth());
        let gateway = RecordingGateway::new(false);

        assert!(matches!(
            session.submit(&gateway, None).await,
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[test]
    fn order_request_wire_shape() {
        let order = OrderRequest {
            order_id: "o-1".to_string(),
            items: vec![OrderItem {
                product_id: "p1".to_string(),
                name: "Product p1".to_string(),
                price: Money::from_yen(1000),
                quantity: 2,
                customization: None,
            }],
            coupon_code: None,
            discount: Money::from_yen(0),
            total: Money::from_yen(2000),
            final_total: Money::from_yen(2000),
            guest_data: None,
            submitted_at: Utc::now(),
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["items"][0]["productId"], "p1");
        assert_eq!(json["items"][0]["price"], 1000);
        assert_eq!(json["finalTotal"], 2000);
        // Absent optionals are omitted, not null.
        assert!(json.get("couponCode").is_none());
        assert!(json.get("guestData").is_none());
    }
}
