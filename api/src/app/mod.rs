//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and the payment providers.

pub mod activity;
pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod category_service;
pub mod order_service;
pub mod payment_service;
pub mod paypal_service;
pub mod product_service;
pub mod testimonial_service;

pub use admin_service::{AdminService, DashboardStats, SalesReport, UserDetail, UserQuery};
pub use auth_service::{AuthService, Registration};
pub use cart_service::CartService;
pub use category_service::{CategoryInput, CategoryService};
pub use order_service::{OrderService, PlaceOrder};
pub use payment_service::{CreatedIntent, PaymentService};
pub use paypal_service::{CreatePayPalOrder, PayPalService, PayPalWebhookHeaders};
pub use product_service::{CreateProduct, ProductQuery, ProductService, SearchQuery, UpdateProduct};
pub use testimonial_service::{TestimonialInput, TestimonialService};

use uuid::Uuid;

use crate::error::AppError;

/// URL-friendly form of a name: lowercase ASCII alphanumerics joined by `-`
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Parse an id supplied as a query or body string
pub(crate) fn parse_id<T: From<Uuid>>(raw: &str, field: &str) -> Result<T, AppError> {
    raw.trim()
        .parse::<Uuid>()
        .map(T::from)
        .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", field, raw)))
}

/// Parse an enum-like value, turning its error into a 400
pub(crate) fn parse_field<T>(raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>().map_err(AppError::BadRequest)
}
