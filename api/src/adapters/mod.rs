//! Adapters layer
//!
//! Implementations of domain ports for external systems:
//! - SQLite (SeaORM) repositories
//! - PayPal REST client
//! - Stripe REST client

pub mod paypal;
pub mod sqlite;
pub mod stripe;

use serde::de::DeserializeOwned;

use crate::error::GatewayError;

/// Decode a provider response, mapping error statuses to `GatewayError`
pub(crate) async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| GatewayError::Deserialization(e.to_string()))
    } else if status.as_u16() == 401 {
        Err(GatewayError::Unauthorized)
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
