//! Stripe payment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::app::{parse_id, CreatedIntent};
use crate::domain::entities::{OrderId, Payment, PaymentId, User};
use crate::error::AppError;
use crate::handlers::{ApiResponse, PageQuery};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    pub order_id: String,
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub payment_intent_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub payment_id: String,
    pub amount: Option<f64>,
    pub reason: Option<String>,
}

/// POST /api/payments/create-intent
pub async fn create_intent(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedIntent>>), AppError> {
    let order_id: OrderId = parse_id(&request.order_id, "order id")?;
    let intent = state
        .payment_service
        .create_intent(&user, &order_id, request.payment_method)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(intent))))
}

/// POST /api/payments/confirm
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let payment = state
        .payment_service
        .confirm(&user, request.payment_intent_id.trim())
        .await?;
    Ok(Json(ApiResponse::ok(payment)))
}

/// GET /api/payments/history
pub async fn payment_history(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, AppError> {
    let page = state
        .payment_service
        .history(&user, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::paged(page)))
}

/// GET /api/payments/:id
pub async fn get_payment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let id: PaymentId = parse_id(&id, "payment id")?;
    let payment = state.payment_service.get(&user, &id).await?;
    Ok(Json(ApiResponse::ok(payment)))
}

/// POST /api/payments/refund (admin)
pub async fn refund_payment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let id: PaymentId = parse_id(&request.payment_id, "payment id")?;
    let payment = state
        .payment_service
        .refund(&user, &id, request.amount, request.reason)
        .await?;
    Ok(Json(ApiResponse::with_message(
        payment,
        "Refund processed successfully",
    )))
}
