//! Order handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::app::{parse_id, PlaceOrder};
use crate::domain::entities::{Order, OrderId, User};
use crate::error::AppError;
use crate::handlers::{ApiResponse, PageQuery};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AllOrdersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
    pub tracking_number: Option<String>,
}

/// POST /api/orders
pub async fn place_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(input): Json<PlaceOrder>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), AppError> {
    let order = state.order_service.place(&user, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(order, "Order created successfully")),
    ))
}

/// GET /api/orders
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let page = state
        .order_service
        .list_mine(&user, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::paged(page)))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let id: OrderId = parse_id(&id, "order id")?;
    let order = state.order_service.get(&user, &id).await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// PUT /api/orders/:id/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let id: OrderId = parse_id(&id, "order id")?;
    let order = state.order_service.cancel(&user, &id).await?;
    Ok(Json(ApiResponse::with_message(
        order,
        "Order cancelled successfully",
    )))
}

/// GET /api/orders/admin/all (admin)
pub async fn all_orders(
    State(state): State<AppState>,
    Query(query): Query<AllOrdersQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let page = state
        .order_service
        .list_all(query.status.as_deref(), query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::paged(page)))
}

/// PUT /api/orders/:id/status (admin)
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let id: OrderId = parse_id(&id, "order id")?;
    let order = state
        .order_service
        .update_status(&user, &id, &request.status, request.tracking_number)
        .await?;
    Ok(Json(ApiResponse::with_message(
        order,
        "Order status updated successfully",
    )))
}
