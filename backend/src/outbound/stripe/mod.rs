//! Stripe payment provider adapter.

mod client;

pub use client::StripeCheckoutService;
