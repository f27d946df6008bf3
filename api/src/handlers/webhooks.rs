//! Webhook handlers
//!
//! Stripe and PayPal event notifications. Neither route is authenticated;
//! both verify the provider's signature before touching any state.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::adapters::stripe::verify_stripe_signature;
use crate::app::PayPalWebhookHeaders;
use crate::error::{AppError, GatewayError};
use crate::AppState;

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

/// Collect the `paypal-*` transmission headers needed for verification
fn paypal_headers(headers: &HeaderMap) -> PayPalWebhookHeaders {
    PayPalWebhookHeaders {
        auth_algo: header(headers, "paypal-auth-algo"),
        cert_url: header(headers, "paypal-cert-url"),
        transmission_id: header(headers, "paypal-transmission-id"),
        transmission_sig: header(headers, "paypal-transmission-sig"),
        transmission_time: header(headers, "paypal-transmission-time"),
    }
}

/// POST /api/payments/webhooks/stripe
///
/// The raw body is needed as-is: the signature covers the exact bytes sent.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let secret = state
        .config
        .stripe_webhook_secret
        .as_deref()
        .ok_or(GatewayError::NotConfigured("Stripe webhooks"))?;

    let signature = headers
        .get("Stripe-Signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    verify_stripe_signature(&body, signature, secret, chrono::Utc::now().timestamp()).map_err(
        |e| {
            tracing::warn!(error = %e, "Stripe webhook signature verification failed");
            AppError::BadRequest(format!("Webhook signature verification failed: {}", e))
        },
    )?;

    let event: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse Stripe webhook payload");
        AppError::BadRequest(format!("Invalid JSON: {}", e))
    })?;

    tracing::info!(
        event_type = event["type"].as_str().unwrap_or("unknown"),
        event_id = event["id"].as_str().unwrap_or_default(),
        "Received Stripe webhook"
    );

    state.payment_service.handle_event(&event).await?;

    Ok(Json(json!({ "received": true })))
}

/// POST /api/paypal/webhooks
pub async fn paypal_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<Value>,
) -> Result<Json<Value>, AppError> {
    tracing::info!(
        event_type = event["event_type"].as_str().unwrap_or("unknown"),
        "Received PayPal webhook"
    );

    state
        .paypal_service
        .handle_webhook(paypal_headers(&headers), event)
        .await?;

    Ok(Json(json!({ "received": true })))
}
