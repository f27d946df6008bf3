//! Payment gateway ports
//!
//! Interfaces to the external payment providers plus the wire types they
//! exchange. Amount values travel as provider-formatted strings (PayPal) or
//! integer minor units (Stripe).

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

// ============================================================================
// PayPal
// ============================================================================

/// `{currency_code, value}` pair used throughout the PayPal API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountBreakdown {
    pub item_total: Money,
    pub tax_total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseAmount {
    pub currency_code: String,
    pub value: String,
    pub breakdown: AmountBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayPalItem {
    pub name: String,
    pub quantity: String,
    pub unit_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseUnit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    /// Echoed back on the capture resource of webhook events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    pub amount: PurchaseAmount,
    pub items: Vec<PayPalItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationContext {
    pub return_url: String,
    pub cancel_url: String,
    pub brand_name: String,
    pub landing_page: String,
    pub user_action: String,
}

/// Body of `POST /v2/checkout/orders`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayPalOrderRequest {
    pub intent: String,
    pub purchase_units: Vec<PurchaseUnit>,
    pub application_context: ApplicationContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayPalLink {
    pub href: String,
    pub rel: String,
    #[serde(default)]
    pub method: Option<String>,
}

/// Order as returned by create and capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPalOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<PayPalLink>,
    #[serde(default)]
    pub purchase_units: Vec<Value>,
}

/// Body of `POST /v2/payments/captures/{id}/refund`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayPalRefundRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    pub note_to_payer: String,
}

/// Body of `POST /v1/notifications/verify-webhook-signature`
#[derive(Debug, Clone, Serialize)]
pub struct WebhookVerification {
    pub auth_algo: String,
    pub cert_url: String,
    pub transmission_id: String,
    pub transmission_sig: String,
    pub transmission_time: String,
    pub webhook_id: String,
    pub webhook_event: Value,
}

/// PayPal REST API client
#[async_trait]
pub trait PayPalGateway: Send + Sync {
    async fn create_order(&self, request: &PayPalOrderRequest)
        -> Result<PayPalOrder, GatewayError>;

    async fn capture_order(&self, order_id: &str) -> Result<PayPalOrder, GatewayError>;

    /// Raw order details
    async fn get_order(&self, order_id: &str) -> Result<Value, GatewayError>;

    /// Refund a capture; returns the raw refund object
    async fn refund_capture(
        &self,
        capture_id: &str,
        request: &PayPalRefundRequest,
    ) -> Result<Value, GatewayError>;

    /// Ask PayPal whether the webhook transmission is authentic
    async fn verify_webhook_signature(
        &self,
        verification: &WebhookVerification,
    ) -> Result<bool, GatewayError>;
}

// ============================================================================
// Stripe
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// requires_payment_method | requires_confirmation | requires_action |
    /// processing | requires_capture | canceled | succeeded
    pub status: String,
    /// Minor units
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub latest_charge: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentIntent {
    /// Minor units
    pub amount: i64,
    /// Lowercase ISO code, as Stripe expects
    pub currency: String,
    pub order_id: String,
    pub payment_method_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StripeRefund {
    pub id: String,
    pub status: String,
    pub amount: i64,
}

/// Stripe REST API client
#[async_trait]
pub trait StripeGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, GatewayError>;

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, GatewayError>;

    /// Refund a payment intent, fully when `amount` is `None`
    async fn create_refund(
        &self,
        payment_intent_id: &str,
        amount: Option<i64>,
        reason: Option<&str>,
    ) -> Result<StripeRefund, GatewayError>;
}
