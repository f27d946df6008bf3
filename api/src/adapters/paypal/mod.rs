//! PayPal adapter
//!
//! REST client for PayPal Orders v2, refunds and webhook verification.

pub mod client;

pub use client::{PayPalClient, UnconfiguredPayPal};
