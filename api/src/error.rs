//! Unified error types for the boutique API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic and persistence errors
//! - `GatewayError`: Payment provider (PayPal / Stripe) client errors
//! - `AppError`: Application layer errors (wraps the others for HTTP responses)
//!
//! Every error leaves the server through `AppError::into_response`, which
//! renders the uniform `{success, message, code, data?}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Foreign key constraint error: {0}")]
    ForeignKey(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Payment provider client errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized - invalid provider credentials")]
    Unauthorized,

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Payment provider error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Route {0} not found")]
    RouteNotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl AppError {
    /// Status, machine-readable code, client message and optional details.
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None)
            }
            AppError::Domain(DomainError::AlreadyExists(msg)) => (
                StatusCode::CONFLICT,
                "DUPLICATE_ERROR",
                "Duplicate Entry".to_string(),
                Some(json!({ "details": msg })),
            ),
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation Error".to_string(),
                Some(json!({ "details": msg })),
            ),
            AppError::Domain(DomainError::ForeignKey(msg)) => {
                tracing::debug!("Foreign key violation: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    "FOREIGN_KEY_ERROR",
                    "Foreign Key Constraint Error".to_string(),
                    None,
                )
            }
            AppError::Domain(DomainError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            AppError::Domain(DomainError::Forbidden(msg)) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None)
            }
            AppError::Domain(DomainError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None)
            }
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                internal()
            }
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                internal()
            }
            AppError::Gateway(e) => {
                tracing::error!("Payment provider error: {}", e);
                match e {
                    GatewayError::NotConfigured(provider) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "PAYMENT_PROVIDER_NOT_CONFIGURED",
                        format!("{} is not configured", provider),
                        None,
                    ),
                    GatewayError::Api { status, message } => {
                        let http_status = match *status {
                            404 => StatusCode::NOT_FOUND,
                            400..=499 => StatusCode::UNPROCESSABLE_ENTITY,
                            _ => StatusCode::BAD_GATEWAY,
                        };
                        (
                            http_status,
                            "PAYMENT_PROVIDER_ERROR",
                            "Payment provider rejected the request".to_string(),
                            Some(json!({ "details": message })),
                        )
                    }
                    _ => (
                        StatusCode::BAD_GATEWAY,
                        "PAYMENT_PROVIDER_ERROR",
                        "Payment provider error".to_string(),
                        None,
                    ),
                }
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
                None,
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
                None,
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid Token".to_string(),
                None,
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                "Token Expired".to_string(),
                None,
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Admin access required".to_string(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::RouteNotFound(uri) => (
                StatusCode::NOT_FOUND,
                "ROUTE_NOT_FOUND",
                format!("Route {} not found", uri),
                None,
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                internal()
            }
        }
    }
}

fn internal() -> (StatusCode, &'static str, String, Option<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal Server Error".to_string(),
        None,
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, data) = self.parts();

        let body = Json(ErrorResponse {
            success: false,
            message,
            code,
            data,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_maps_to_400() {
        let (status, body) = render(DomainError::Validation("price".to_string()).into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["data"]["details"], "price");
    }

    #[tokio::test]
    async fn duplicate_maps_to_409() {
        let (status, body) = render(DomainError::AlreadyExists("sku".to_string()).into()).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "DUPLICATE_ERROR");
    }

    #[tokio::test]
    async fn foreign_key_maps_to_400() {
        let (status, body) = render(DomainError::ForeignKey("category_id".to_string()).into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "FOREIGN_KEY_ERROR");
    }

    #[tokio::test]
    async fn database_error_hides_details() {
        let (status, body) =
            render(DomainError::Database("no such table: secrets".to_string()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("secrets"));
    }

    #[tokio::test]
    async fn token_errors_map_to_401() {
        let (status, body) = render(AppError::TokenExpired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "TOKEN_EXPIRED");

        let (status, body) = render(AppError::InvalidToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn unconfigured_gateway_maps_to_503() {
        let (status, body) = render(GatewayError::NotConfigured("PayPal").into()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "PAYMENT_PROVIDER_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn gateway_api_errors_keep_not_found() {
        let (status, _) = render(
            GatewayError::Api {
                status: 404,
                message: "RESOURCE_NOT_FOUND".to_string(),
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = render(
            GatewayError::Api {
                status: 500,
                message: "boom".to_string(),
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn route_not_found_names_the_route() {
        let (status, body) = render(AppError::RouteNotFound("/api/nope".to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
        assert_eq!(body["message"], "Route /api/nope not found");
    }
}
