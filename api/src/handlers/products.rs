//! Product handlers
//!
//! Public catalog browsing plus admin management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::app::{parse_id, CreateProduct, ProductQuery, SearchQuery, UpdateProduct};
use crate::domain::entities::{CategoryId, Product, ProductId, ProductStats, User};
use crate::error::AppError;
use crate::handlers::{ApiResponse, LimitQuery};
use crate::AppState;

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, AppError> {
    let page = state.product_service.list(&query).await?;
    Ok(Json(ApiResponse::paged(page)))
}

/// GET /api/products/featured
pub async fn featured_products(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, AppError> {
    let products = state.product_service.featured(query.limit).await?;
    Ok(Json(ApiResponse::ok(products)))
}

/// GET /api/products/search
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, AppError> {
    let products = state.product_service.search(&query).await?;
    Ok(Json(ApiResponse::ok(products)))
}

/// GET /api/products/category/:category
pub async fn products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, AppError> {
    let category: CategoryId = parse_id(&category, "category id")?;
    let products = state
        .product_service
        .by_category(&category, query.limit)
        .await?;
    Ok(Json(ApiResponse::ok(products)))
}

/// GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let id: ProductId = parse_id(&id, "product id")?;
    let product = state.product_service.get(&id).await?;
    Ok(Json(ApiResponse::ok(product)))
}

/// POST /api/products (admin)
pub async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), AppError> {
    let product = state.product_service.create(&user, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(product, "Product created successfully")),
    ))
}

/// PUT /api/products/:id (admin)
pub async fn update_product(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let id: ProductId = parse_id(&id, "product id")?;
    let product = state.product_service.update(&user, &id, input).await?;
    Ok(Json(ApiResponse::with_message(
        product,
        "Product updated successfully",
    )))
}

/// DELETE /api/products/:id (admin)
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id: ProductId = parse_id(&id, "product id")?;
    state.product_service.delete(&user, &id).await?;
    Ok(Json(ApiResponse::message("Product deleted successfully")))
}

/// GET /api/products/admin/stats (admin)
pub async fn product_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProductStats>>, AppError> {
    let stats = state.product_service.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}
