//! Stripe REST client implementation
//!
//! Stripe takes form-encoded bodies and authenticates with the secret key as
//! a bearer token.

use async_trait::async_trait;
use reqwest::Client;
use urlencoding::encode;

use crate::adapters::handle_response;
use crate::domain::ports::{CreatePaymentIntent, PaymentIntent, StripeGateway, StripeRefund};
use crate::error::GatewayError;

const STRIPE_API_URL: &str = "https://api.stripe.com/v1";

pub struct StripeClient {
    http: Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self::with_base_url(STRIPE_API_URL, secret_key)
    }

    pub fn with_base_url(base_url: &str, secret_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Form fields for `POST /payment_intents`
fn payment_intent_form(request: &CreatePaymentIntent) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), request.amount.to_string()),
        ("currency".to_string(), request.currency.to_lowercase()),
        ("metadata[order_id]".to_string(), request.order_id.clone()),
    ];
    for method in &request.payment_method_types {
        form.push(("payment_method_types[]".to_string(), method.clone()));
    }
    form
}

/// Form fields for `POST /refunds`. Stripe only accepts a fixed set of refund
/// reasons, so free-form text travels as metadata.
fn refund_form(
    payment_intent_id: &str,
    amount: Option<i64>,
    reason: Option<&str>,
) -> Vec<(String, String)> {
    let mut form = vec![("payment_intent".to_string(), payment_intent_id.to_string())];
    if let Some(amount) = amount {
        form.push(("amount".to_string(), amount.to_string()));
    }
    if let Some(reason) = reason {
        form.push(("reason".to_string(), "requested_by_customer".to_string()));
        form.push(("metadata[reason]".to_string(), reason.to_string()));
    }
    form
}

#[async_trait]
impl StripeGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        request: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, GatewayError> {
        let response = self
            .http
            .post(self.api_url("/payment_intents"))
            .bearer_auth(&self.secret_key)
            .form(&payment_intent_form(request))
            .send()
            .await?;

        handle_response(response).await
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, GatewayError> {
        let response = self
            .http
            .get(self.api_url(&format!("/payment_intents/{}", encode(id))))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        handle_response(response).await
    }

    async fn create_refund(
        &self,
        payment_intent_id: &str,
        amount: Option<i64>,
        reason: Option<&str>,
    ) -> Result<StripeRefund, GatewayError> {
        let response = self
            .http
            .post(self.api_url("/refunds"))
            .bearer_auth(&self.secret_key)
            .form(&refund_form(payment_intent_id, amount, reason))
            .send()
            .await?;

        handle_response(response).await
    }
}

/// Stand-in used when no Stripe secret key is configured
pub struct UnconfiguredStripe;

#[async_trait]
impl StripeGateway for UnconfiguredStripe {
    async fn create_payment_intent(
        &self,
        _: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, GatewayError> {
        Err(GatewayError::NotConfigured("Stripe"))
    }

    async fn retrieve_payment_intent(&self, _: &str) -> Result<PaymentIntent, GatewayError> {
        Err(GatewayError::NotConfigured("Stripe"))
    }

    async fn create_refund(
        &self,
        _: &str,
        _: Option<i64>,
        _: Option<&str>,
    ) -> Result<StripeRefund, GatewayError> {
        Err(GatewayError::NotConfigured("Stripe"))
    }
}
