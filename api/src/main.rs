//! Jewelry Boutique API Server
//!
//! Storefront backend: catalog, carts, orders, Stripe and PayPal payments and
//! an admin back office. Uses hexagonal (ports & adapters) architecture.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::paypal::{PayPalClient, UnconfiguredPayPal};
use adapters::sqlite::{
    create_schema, seed_database, SqliteActivityRepository, SqliteCartRepository,
    SqliteCategoryRepository, SqliteOrderRepository, SqlitePaymentRepository,
    SqliteProductRepository, SqliteTestimonialRepository, SqliteUserRepository,
};
use adapters::stripe::{StripeClient, UnconfiguredStripe};
use app::{
    AdminService, AuthService, CartService, CategoryService, OrderService, PayPalService,
    PaymentService, ProductService, TestimonialService,
};
use auth::JwtService;
use config::Config;
use domain::ports::{PayPalGateway, StripeGateway};

type Activity = SqliteActivityRepository;

pub type Auth = AuthService<SqliteUserRepository, Activity>;
pub type Products = ProductService<SqliteProductRepository, SqliteCategoryRepository, Activity>;
pub type Categories = CategoryService<SqliteCategoryRepository>;
pub type Carts = CartService<SqliteCartRepository, SqliteProductRepository>;
pub type Orders = OrderService<SqliteOrderRepository, SqliteProductRepository, Activity>;
pub type Payments =
    PaymentService<dyn StripeGateway, SqliteOrderRepository, SqlitePaymentRepository, Activity>;
pub type PayPal =
    PayPalService<dyn PayPalGateway, SqliteOrderRepository, SqlitePaymentRepository, Activity>;
pub type Admin =
    AdminService<SqliteUserRepository, SqliteProductRepository, SqliteOrderRepository, Activity>;
pub type Testimonials = TestimonialService<SqliteTestimonialRepository>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<Auth>,
    pub product_service: Arc<Products>,
    pub category_service: Arc<Categories>,
    pub cart_service: Arc<Carts>,
    pub order_service: Arc<Orders>,
    pub payment_service: Arc<Payments>,
    pub paypal_service: Arc<PayPal>,
    pub admin_service: Arc<Admin>,
    pub testimonial_service: Arc<Testimonials>,
    pub config: Config,
}

impl AppState {
    /// Wire repositories, payment gateways and services
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let users = Arc::new(SqliteUserRepository::new(db.clone()));
        let categories = Arc::new(SqliteCategoryRepository::new(db.clone()));
        let products = Arc::new(SqliteProductRepository::new(db.clone()));
        let carts = Arc::new(SqliteCartRepository::new(db.clone()));
        let orders = Arc::new(SqliteOrderRepository::new(db.clone()));
        let payments = Arc::new(SqlitePaymentRepository::new(db.clone()));
        let testimonials = Arc::new(SqliteTestimonialRepository::new(db.clone()));
        let activity = Arc::new(SqliteActivityRepository::new(db));

        let paypal: Arc<dyn PayPalGateway> =
            match (&config.paypal_client_id, &config.paypal_client_secret) {
                (Some(id), Some(secret)) => Arc::new(PayPalClient::new(
                    config.paypal_base_url(),
                    id.clone(),
                    secret.clone(),
                )),
                _ => {
                    tracing::warn!("PayPal credentials not set, PayPal routes will return 503");
                    Arc::new(UnconfiguredPayPal)
                }
            };

        let stripe: Arc<dyn StripeGateway> = match &config.stripe_secret_key {
            Some(key) => Arc::new(StripeClient::new(key.clone())),
            None => {
                tracing::warn!("STRIPE_SECRET_KEY not set, Stripe routes will return 503");
                Arc::new(UnconfiguredStripe)
            }
        };

        let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration_minutes);

        Self {
            auth_service: Arc::new(AuthService::new(users.clone(), activity.clone(), jwt)),
            product_service: Arc::new(ProductService::new(
                products.clone(),
                categories.clone(),
                activity.clone(),
            )),
            category_service: Arc::new(CategoryService::new(categories)),
            cart_service: Arc::new(CartService::new(carts, products.clone())),
            order_service: Arc::new(OrderService::new(
                orders.clone(),
                products.clone(),
                activity.clone(),
            )),
            payment_service: Arc::new(PaymentService::new(
                stripe,
                orders.clone(),
                payments.clone(),
                activity.clone(),
            )),
            paypal_service: Arc::new(PayPalService::new(
                paypal,
                orders.clone(),
                payments,
                activity.clone(),
                config.brand_name.clone(),
                config.paypal_webhook_id.clone(),
            )),
            admin_service: Arc::new(AdminService::new(users, products, orders, activity)),
            testimonial_service: Arc::new(TestimonialService::new(testimonials)),
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the full router: public, authenticated and admin routes under `/api`
pub fn build_router(state: AppState) -> Router {
    // Login and registration, rate limited per peer IP
    let mut auth_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login));

    if state.config.auth_rate_limit {
        // 2 req/sec sustained, burst of 5
        if let Some(config) = GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
        {
            auth_routes = auth_routes.layer(GovernorLayer {
                config: Arc::new(config),
            });
        }
    }

    let public_routes = Router::new()
        // Catalog
        .route("/products", get(handlers::list_products))
        .route("/products/featured", get(handlers::featured_products))
        .route("/products/search", get(handlers::search_products))
        .route(
            "/products/category/:category",
            get(handlers::products_by_category),
        )
        .route("/products/:id", get(handlers::get_product))
        .route("/categories", get(handlers::list_categories))
        .route("/categories/:id", get(handlers::get_category))
        .route(
            "/categories/:id/subcategories",
            get(handlers::list_subcategories),
        )
        .route("/testimonials", get(handlers::list_testimonials))
        // Webhooks (no auth, signature verified)
        .route("/payments/webhooks/stripe", post(handlers::stripe_webhook))
        .route("/paypal/webhooks", post(handlers::paypal_webhook));

    let customer_routes = Router::new()
        .route("/auth/me", get(handlers::me))
        // Cart
        .route("/cart", get(handlers::get_cart))
        .route("/cart/add", post(handlers::add_to_cart))
        .route(
            "/cart/items/:item_id",
            put(handlers::update_cart_item).delete(handlers::remove_cart_item),
        )
        .route("/cart/clear", delete(handlers::clear_cart))
        .route("/cart/count", get(handlers::cart_count))
        // Orders
        .route(
            "/orders",
            post(handlers::place_order).get(handlers::my_orders),
        )
        .route("/orders/:id", get(handlers::get_order))
        .route("/orders/:id/cancel", put(handlers::cancel_order))
        // Stripe
        .route("/payments/create-intent", post(handlers::create_intent))
        .route("/payments/confirm", post(handlers::confirm_payment))
        .route("/payments/history", get(handlers::payment_history))
        .route("/payments/:id", get(handlers::get_payment))
        // PayPal
        .route("/paypal/orders", post(handlers::create_order))
        .route("/paypal/orders/:order_id", get(handlers::order_details))
        .route(
            "/paypal/orders/:order_id/capture",
            post(handlers::capture_order),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    // The admin gate needs the user, so authentication is layered outside it
    let admin_routes = Router::new()
        .route("/products", post(handlers::create_product))
        .route(
            "/products/:id",
            put(handlers::update_product).delete(handlers::delete_product),
        )
        .route("/products/admin/stats", get(handlers::product_stats))
        .route("/categories", post(handlers::create_category))
        .route(
            "/categories/:id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/categories/:id/subcategories",
            post(handlers::create_subcategory),
        )
        .route("/orders/admin/all", get(handlers::all_orders))
        .route("/orders/:id/status", put(handlers::update_order_status))
        .route("/payments/refund", post(handlers::refund_payment))
        .route("/paypal/refunds/:capture_id", post(handlers::refund_capture))
        .route("/testimonials", post(handlers::create_testimonial))
        .route("/admin/dashboard/stats", get(handlers::dashboard_stats))
        .route("/admin/users", get(handlers::list_users))
        .route(
            "/admin/users/:id",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/admin/users/:id/role", put(handlers::update_user_role))
        .route(
            "/admin/users/:id/toggle-status",
            patch(handlers::toggle_user_status),
        )
        .route("/admin/activity", get(handlers::recent_activity))
        .route("/admin/sales-report", get(handlers::sales_report))
        .route("/admin/top-products", get(handlers::top_products))
        .layer(middleware::from_fn(auth::admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let api = Router::new()
        .merge(auth_routes)
        .merge(public_routes)
        .merge(customer_routes)
        .merge(admin_routes);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(handlers::not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,boutique_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Jewelry Boutique API...");

    let config = Config::from_env();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    create_schema(&db)
        .await
        .context("Failed to create database schema")?;
    tracing::info!("Database ready");

    if config.seed_database {
        seed_database(&db)
            .await
            .context("Failed to seed database")?;
    }

    let port = config.port;
    let app = build_router(AppState::new(db, config));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
