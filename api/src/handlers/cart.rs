//! Cart handlers
//!
//! Every route acts on the authenticated user's own cart.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::app::parse_id;
use crate::domain::entities::{Cart, CartItemId, ProductId, User};
use crate::error::AppError;
use crate::handlers::ApiResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: i32,
}

/// GET /api/cart
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Cart>>, AppError> {
    let cart = state.cart_service.get(&user.id).await?;
    Ok(Json(ApiResponse::ok(cart)))
}

/// POST /api/cart/add
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<ApiResponse<Cart>>, AppError> {
    let product_id: ProductId = parse_id(&request.product_id, "product id")?;
    let cart = state
        .cart_service
        .add(&user.id, &product_id, request.quantity)
        .await?;
    Ok(Json(ApiResponse::with_message(cart, "Item added to cart")))
}

/// PUT /api/cart/items/:item_id
pub async fn update_cart_item(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(item_id): Path<String>,
    Json(request): Json<UpdateCartItemRequest>,
) -> Result<Json<ApiResponse<Cart>>, AppError> {
    let item_id: CartItemId = parse_id(&item_id, "cart item id")?;
    let cart = state
        .cart_service
        .update_item(&user.id, &item_id, request.quantity)
        .await?;
    Ok(Json(ApiResponse::with_message(cart, "Cart updated")))
}

/// DELETE /api/cart/items/:item_id
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse<Cart>>, AppError> {
    let item_id: CartItemId = parse_id(&item_id, "cart item id")?;
    let cart = state.cart_service.remove_item(&user.id, &item_id).await?;
    Ok(Json(ApiResponse::with_message(cart, "Item removed from cart")))
}

/// DELETE /api/cart/clear
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<Cart>>, AppError> {
    let cart = state.cart_service.clear(&user.id).await?;
    Ok(Json(ApiResponse::with_message(cart, "Cart cleared")))
}

/// GET /api/cart/count
pub async fn cart_count(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<ApiResponse<CartCount>>, AppError> {
    let count = state.cart_service.count(&user.id).await?;
    Ok(Json(ApiResponse::ok(CartCount { count })))
}
