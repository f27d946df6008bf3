//! Category handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::app::{parse_id, CategoryInput};
use crate::domain::entities::{Category, CategoryId, SubCategory};
use crate::error::AppError;
use crate::handlers::ApiResponse;
use crate::AppState;

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    let categories = state.category_service.list().await?;
    Ok(Json(ApiResponse::ok(categories)))
}

/// GET /api/categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let id: CategoryId = parse_id(&id, "category id")?;
    let category = state.category_service.get(&id).await?;
    Ok(Json(ApiResponse::ok(category)))
}

/// POST /api/categories (admin)
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), AppError> {
    let category = state.category_service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(category, "Category created successfully")),
    ))
}

/// PUT /api/categories/:id (admin)
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let id: CategoryId = parse_id(&id, "category id")?;
    let category = state.category_service.update(&id, input).await?;
    Ok(Json(ApiResponse::with_message(
        category,
        "Category updated successfully",
    )))
}

/// DELETE /api/categories/:id (admin)
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id: CategoryId = parse_id(&id, "category id")?;
    state.category_service.delete(&id).await?;
    Ok(Json(ApiResponse::message("Category deleted successfully")))
}

/// GET /api/categories/:id/subcategories
pub async fn list_subcategories(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<SubCategory>>>, AppError> {
    let id: CategoryId = parse_id(&id, "category id")?;
    let subcategories = state.category_service.subcategories(&id).await?;
    Ok(Json(ApiResponse::ok(subcategories)))
}

/// POST /api/categories/:id/subcategories (admin)
pub async fn create_subcategory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<ApiResponse<SubCategory>>), AppError> {
    let id: CategoryId = parse_id(&id, "category id")?;
    let subcategory = state.category_service.create_subcategory(&id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            subcategory,
            "Subcategory created successfully",
        )),
    ))
}
