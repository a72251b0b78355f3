//! # sumi-checkout: Checkout Orchestration for the Sumi Storefront
//!
//! The thin glue between the pure pricing engine in `sumi-core` and the
//! async world: coupon resolution, discount-profile fetches, and order
//! submission.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     sumi-checkout (THIS CRATE)                          │
//! │                                                                         │
//! │   CheckoutSession ◄──── CouponResolver   (POST /coupons/validate)      │
//! │        │          ◄──── ProfileService   (GET  /users/profile)         │
//! │        │          ────► OrderGateway     (POST /orders)                │
//! │        │                                                                │
//! │        └── every state change ──► sumi_core::compute_totals            │
//! │                                                                         │
//! │   All waiting happens here; sumi-core never blocks, sumi-canvas        │
//! │   never talks to the network.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - the checkout session state machine and order DTOs
//! - [`resolver`] - the three async collaborator traits
//! - [`error`] - coupon rejection reasons and checkout errors

pub mod error;
pub mod resolver;
pub mod session;

pub use error::{CheckoutError, CheckoutResult, CouponRejection};
pub use resolver::{CouponResolver, OrderGateway, ProfileService};
pub use session::{CheckoutSession, OrderItem, OrderRequest, ProfileFetchToken, Shopper};
