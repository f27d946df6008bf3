//! Stripe adapter
//!
//! REST client for payment intents and refunds, plus webhook signature checks.

pub mod client;
pub mod webhook;

pub use client::{StripeClient, UnconfiguredStripe};
pub use webhook::verify_stripe_signature;
