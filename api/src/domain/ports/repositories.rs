//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., SQLite).

use async_trait::async_trait;

use crate::domain::entities::{
    ActivityLog, Cart, CartId, CartItem, CartItemId, Category, CategoryId, CategoryUpdate,
    NewActivity, NewCategory, NewOrder, NewPayment, NewProduct, NewSubCategory, NewTestimonial,
    NewUser, Order, OrderFilter, OrderId, OrderStatus, Page, PageRequest, Payment, PaymentId,
    PaymentStatus, PaymentUpdate, Product, ProductFilter, ProductId, ProductStats, ProductUpdate,
    Role, SubCategory, Testimonial, TopProduct, User, UserFilter, UserId,
};
use crate::error::DomainError;

/// Repository for User entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Look up by (already normalized) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;

    async fn update_last_login(&self, id: &UserId) -> Result<(), DomainError>;

    async fn update_role(&self, id: &UserId, role: Role, is_admin: bool)
        -> Result<User, DomainError>;

    async fn set_active(&self, id: &UserId, is_active: bool) -> Result<User, DomainError>;

    /// List users newest first
    async fn list(&self, filter: &UserFilter, page: PageRequest)
        -> Result<Page<User>, DomainError>;

    async fn count_by_role(&self, role: Role) -> Result<u64, DomainError>;
}

/// Repository for categories and subcategories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories with their subcategories, ordered by name
    async fn list(&self) -> Result<Vec<Category>, DomainError>;

    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, DomainError>;

    async fn create(&self, category: &NewCategory) -> Result<Category, DomainError>;

    async fn update(&self, id: &CategoryId, update: &CategoryUpdate)
        -> Result<Category, DomainError>;

    async fn delete(&self, id: &CategoryId) -> Result<(), DomainError>;

    /// Number of products (active or not) referencing the category
    async fn count_products(&self, id: &CategoryId) -> Result<u64, DomainError>;

    async fn list_subcategories(&self, id: &CategoryId) -> Result<Vec<SubCategory>, DomainError>;

    async fn create_subcategory(&self, sub: &NewSubCategory) -> Result<SubCategory, DomainError>;
}

/// Repository for Product entities
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Filtered, sorted and paginated listing of active products
    async fn list(&self, filter: &ProductFilter, page: PageRequest)
        -> Result<Page<Product>, DomainError>;

    /// Find a product regardless of its active flag
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError>;

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, DomainError>;

    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError>;

    async fn update(&self, id: &ProductId, update: &ProductUpdate)
        -> Result<Product, DomainError>;

    /// Soft delete (`is_active = false`)
    async fn deactivate(&self, id: &ProductId) -> Result<(), DomainError>;

    async fn stats(&self) -> Result<ProductStats, DomainError>;

    /// Active products ranked by the number of order lines referencing them
    async fn top_selling(&self, limit: u64) -> Result<Vec<TopProduct>, DomainError>;
}

/// Repository for carts and their lines
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// The user's cart with its lines, created empty when missing
    async fn find_or_create(&self, user_id: &UserId) -> Result<Cart, DomainError>;

    async fn find_item(&self, id: &CartItemId) -> Result<Option<CartItem>, DomainError>;

    async fn add_item(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: i32,
        price: f64,
    ) -> Result<CartItem, DomainError>;

    async fn update_item(
        &self,
        id: &CartItemId,
        quantity: i32,
        price: f64,
    ) -> Result<(), DomainError>;

    async fn remove_item(&self, id: &CartItemId) -> Result<(), DomainError>;

    async fn clear(&self, cart_id: &CartId) -> Result<(), DomainError>;

    /// Persist the derived totals
    async fn save_totals(
        &self,
        cart_id: &CartId,
        total: f64,
        item_count: i32,
    ) -> Result<(), DomainError>;
}

/// Repository for Order entities
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Write the order, its lines and the stock decrements atomically.
    /// Fails with `Validation` when a product no longer has enough stock.
    async fn create(&self, order: &NewOrder) -> Result<Order, DomainError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Newest first, with lines and a summary of the ordering user
    async fn list(&self, filter: &OrderFilter, page: PageRequest)
        -> Result<Page<Order>, DomainError>;

    /// Every matching order, newest first
    async fn list_all(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError>;

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, DomainError>;

    /// Mark cancelled and return every line's quantity to stock atomically.
    /// Only an order still in one of `from` is cancelled; otherwise `Conflict`
    /// and stock is left alone.
    async fn cancel(&self, id: &OrderId, from: &[OrderStatus]) -> Result<Order, DomainError>;

    async fn update_payment_status(
        &self,
        id: &OrderId,
        payment_status: PaymentStatus,
        status: Option<OrderStatus>,
    ) -> Result<(), DomainError>;
}

/// Repository for Payment entities
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &NewPayment) -> Result<Payment, DomainError>;

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    async fn find_by_intent_id(&self, intent_id: &str) -> Result<Option<Payment>, DomainError>;

    async fn find_by_transaction_id(&self, transaction_id: &str)
        -> Result<Option<Payment>, DomainError>;

    async fn update(&self, id: &PaymentId, update: &PaymentUpdate)
        -> Result<Payment, DomainError>;

    /// Payments for orders placed by the user, newest first
    async fn list_by_user(&self, user_id: &UserId, page: PageRequest)
        -> Result<Page<Payment>, DomainError>;
}

#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    /// Verified first, then newest first
    async fn list(&self) -> Result<Vec<Testimonial>, DomainError>;

    async fn create(&self, testimonial: &NewTestimonial) -> Result<Testimonial, DomainError>;
}

/// Append-only activity log
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn record(&self, activity: &NewActivity) -> Result<(), DomainError>;

    /// Newest first
    async fn recent(&self, limit: u64) -> Result<Vec<ActivityLog>, DomainError>;
}
