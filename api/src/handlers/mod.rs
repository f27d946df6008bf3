//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod payments;
pub mod paypal;
pub mod products;
pub mod response;
pub mod testimonials;
pub mod webhooks;

pub use admin::{
    dashboard_stats, delete_user, get_user, list_users, recent_activity, sales_report,
    toggle_user_status, top_products, update_user_role,
};
pub use auth::{login, me, register};
pub use cart::{add_to_cart, cart_count, clear_cart, get_cart, remove_cart_item, update_cart_item};
pub use categories::{
    create_category, create_subcategory, delete_category, get_category, list_categories,
    list_subcategories, update_category,
};
pub use orders::{
    all_orders, cancel_order, get_order, my_orders, place_order, update_order_status,
};
pub use payments::{confirm_payment, create_intent, get_payment, payment_history, refund_payment};
pub use paypal::{capture_order, create_order, order_details, refund_capture};
pub use products::{
    create_product, delete_product, featured_products, get_product, list_products,
    product_stats, products_by_category, search_products, update_product,
};
pub use response::{ApiResponse, LimitQuery, PageQuery};
pub use testimonials::{create_testimonial, list_testimonials};
pub use webhooks::{paypal_webhook, stripe_webhook};

use axum::http::Uri;

use crate::error::AppError;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}
