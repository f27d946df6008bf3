//! Admin handlers
//!
//! Dashboard, user management and reports. Mounted behind the admin gate.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::app::{parse_id, DashboardStats, SalesReport, UserDetail, UserQuery};
use crate::domain::entities::{ActivityLog, TopProduct, User, UserId};
use crate::error::AppError;
use crate::handlers::{ApiResponse, LimitQuery};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role: String,
    pub is_admin: Option<bool>,
}

/// GET /api/admin/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = state
        .admin_service
        .dashboard(query.period.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    let page = state.admin_service.users(&query).await?;
    Ok(Json(ApiResponse::paged(page)))
}

/// GET /api/admin/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDetail>>, AppError> {
    let id: UserId = parse_id(&id, "user id")?;
    let user = state.admin_service.user(&id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/admin/users/:id/role
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let id: UserId = parse_id(&id, "user id")?;
    let user = state
        .admin_service
        .update_role(&actor, &id, &request.role, request.is_admin)
        .await?;
    Ok(Json(ApiResponse::with_message(
        user,
        "User role updated successfully",
    )))
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id: UserId = parse_id(&id, "user id")?;
    state.admin_service.delete_user(&actor, &id).await?;
    Ok(Json(ApiResponse::message("User deactivated successfully")))
}

/// PATCH /api/admin/users/:id/toggle-status
pub async fn toggle_user_status(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let id: UserId = parse_id(&id, "user id")?;
    let user = state.admin_service.toggle_status(&actor, &id).await?;
    let message = if user.is_active {
        "User activated successfully"
    } else {
        "User deactivated successfully"
    };
    Ok(Json(ApiResponse::with_message(user, message)))
}

/// GET /api/admin/activity
pub async fn recent_activity(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityLog>>>, AppError> {
    let activity = state.admin_service.recent_activity(query.limit).await?;
    Ok(Json(ApiResponse::ok(activity)))
}

/// GET /api/admin/sales-report
pub async fn sales_report(
    State(state): State<AppState>,
    Query(query): Query<SalesReportQuery>,
) -> Result<Json<ApiResponse<SalesReport>>, AppError> {
    let report = state
        .admin_service
        .sales_report(
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            query.period.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/admin/top-products
pub async fn top_products(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<TopProduct>>>, AppError> {
    let products = state.admin_service.top_products(query.limit).await?;
    Ok(Json(ApiResponse::ok(products)))
}
