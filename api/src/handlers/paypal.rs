//! PayPal checkout handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::CreatePayPalOrder;
use crate::domain::entities::User;
use crate::domain::ports::PayPalLink;
use crate::error::AppError;
use crate::handlers::ApiResponse;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPayPalOrder {
    pub order_id: String,
    pub status: String,
    pub links: Vec<PayPalLink>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPayPalOrder {
    pub order_id: String,
    pub status: String,
    pub purchase_units: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PayPalRefundBody {
    pub amount: Option<f64>,
    pub reason: Option<String>,
}

/// POST /api/paypal/orders
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(input): Json<CreatePayPalOrder>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedPayPalOrder>>), AppError> {
    let order = state.paypal_service.create_order(&user, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CreatedPayPalOrder {
            order_id: order.id,
            status: order.status,
            links: order.links,
        })),
    ))
}

/// POST /api/paypal/orders/:order_id/capture
pub async fn capture_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<ApiResponse<CapturedPayPalOrder>>, AppError> {
    let order = state.paypal_service.capture_order(&order_id).await?;
    Ok(Json(ApiResponse::with_message(
        CapturedPayPalOrder {
            order_id: order.id,
            status: order.status,
            purchase_units: order.purchase_units,
        },
        "Payment captured successfully",
    )))
}

/// GET /api/paypal/orders/:order_id
pub async fn order_details(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let details = state.paypal_service.order_details(&order_id).await?;
    Ok(Json(ApiResponse::ok(details)))
}

/// POST /api/paypal/refunds/:capture_id (admin)
pub async fn refund_capture(
    State(state): State<AppState>,
    Path(capture_id): Path<String>,
    body: Option<Json<PayPalRefundBody>>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let Json(body) = body.unwrap_or_default();
    let refund = state
        .paypal_service
        .refund(&capture_id, body.amount, body.reason)
        .await?;
    Ok(Json(ApiResponse::with_message(
        refund,
        "Refund processed successfully",
    )))
}
