//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod payments;
pub mod repositories;

pub use payments::{
    AmountBreakdown, ApplicationContext, CreatePaymentIntent, Money, PayPalGateway, PayPalItem,
    PayPalLink, PayPalOrder, PayPalOrderRequest, PayPalRefundRequest, PaymentIntent,
    PurchaseAmount, PurchaseUnit, StripeGateway, StripeRefund, WebhookVerification,
};
pub use repositories::{
    ActivityRepository, CartRepository, CategoryRepository, OrderRepository, PaymentRepository,
    ProductRepository, TestimonialRepository, UserRepository,
};
