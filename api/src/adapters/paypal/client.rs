//! PayPal REST client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use urlencoding::encode;

use crate::adapters::handle_response;
use crate::domain::ports::{
    PayPalGateway, PayPalOrder, PayPalOrderRequest, PayPalRefundRequest, WebhookVerification,
};
use crate::error::GatewayError;

/// PayPal client authenticating with OAuth2 client credentials
pub struct PayPalClient {
    http: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct VerificationResponse {
    verification_status: String,
}

impl PayPalClient {
    pub fn new(base_url: &str, client_id: String, client_secret: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch a fresh access token; tokens are not cached between calls
    async fn access_token(&self) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(self.api_url("/v1/oauth2/token"))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token: TokenResponse = handle_response(response).await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PayPalGateway for PayPalClient {
    async fn create_order(
        &self,
        request: &PayPalOrderRequest,
    ) -> Result<PayPalOrder, GatewayError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.api_url("/v2/checkout/orders"))
            .bearer_auth(token)
            .header("Prefer", "return=representation")
            .json(request)
            .send()
            .await?;

        handle_response(response).await
    }

    async fn capture_order(&self, order_id: &str) -> Result<PayPalOrder, GatewayError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.api_url(&format!(
                "/v2/checkout/orders/{}/capture",
                encode(order_id)
            )))
            .bearer_auth(token)
            .header("Prefer", "return=representation")
            .json(&json!({}))
            .send()
            .await?;

        handle_response(response).await
    }

    async fn get_order(&self, order_id: &str) -> Result<Value, GatewayError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(self.api_url(&format!("/v2/checkout/orders/{}", encode(order_id))))
            .bearer_auth(token)
            .send()
            .await?;

        handle_response(response).await
    }

    async fn refund_capture(
        &self,
        capture_id: &str,
        request: &PayPalRefundRequest,
    ) -> Result<Value, GatewayError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.api_url(&format!(
                "/v2/payments/captures/{}/refund",
                encode(capture_id)
            )))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        handle_response(response).await
    }

    async fn verify_webhook_signature(
        &self,
        verification: &WebhookVerification,
    ) -> Result<bool, GatewayError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.api_url("/v1/notifications/verify-webhook-signature"))
            .bearer_auth(token)
            .json(verification)
            .send()
            .await?;

        let result: VerificationResponse = handle_response(response).await?;
        Ok(result.verification_status == "SUCCESS")
    }
}

/// Stand-in used when PayPal credentials are missing
pub struct UnconfiguredPayPal;

#[async_trait]
impl PayPalGateway for UnconfiguredPayPal {
    async fn create_order(&self, _: &PayPalOrderRequest) -> Result<PayPalOrder, GatewayError> {
        Err(GatewayError::NotConfigured("PayPal"))
    }

    async fn capture_order(&self, _: &str) -> Result<PayPalOrder, GatewayError> {
        Err(GatewayError::NotConfigured("PayPal"))
    }

    async fn get_order(&self, _: &str) -> Result<Value, GatewayError> {
        Err(GatewayError::NotConfigured("PayPal"))
    }

    async fn refund_capture(
        &self,
        _: &str,
        _: &PayPalRefundRequest,
    ) -> Result<Value, GatewayError> {
        Err(GatewayError::NotConfigured("PayPal"))
    }

    async fn verify_webhook_signature(&self, _: &WebhookVerification) -> Result<bool, GatewayError> {
        Err(GatewayError::NotConfigured("PayPal"))
    }
}
