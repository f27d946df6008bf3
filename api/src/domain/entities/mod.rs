//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

mod id;

pub mod activity;
pub mod cart;
pub mod category;
pub mod order;
pub mod pagination;
pub mod payment;
pub mod product;
pub mod testimonial;
pub mod user;

pub use activity::{ActivityAction, ActivityLog, ActivityLogId, NewActivity};
pub use cart::{Cart, CartId, CartItem, CartItemId, CartProduct};
pub use category::{
    Category, CategoryId, CategoryUpdate, NewCategory, NewSubCategory, SubCategory, SubCategoryId,
};
pub use order::{
    order_total, NewOrder, NewOrderItem, Order, OrderFilter, OrderId, OrderItem, OrderItemId,
    OrderStatus, PaymentStatus,
};
pub use pagination::{Page, PageRequest};
pub use payment::{
    format_minor_units, is_currency_code, to_minor_units, NewPayment, Payment, PaymentId,
    PaymentProvider, PaymentUpdate, TransactionStatus, DEFAULT_CURRENCY,
};
pub use product::{
    CategoryRef, Dimensions, NewProduct, Product, ProductFilter, ProductId, ProductImage,
    ProductImageId, ProductStats, ProductUpdate, SortField, SortOrder, SubCategoryRef, TopProduct,
    LOW_STOCK_THRESHOLD,
};
pub use testimonial::{NewTestimonial, Testimonial, TestimonialId};
pub use user::{
    is_valid_email, normalize_email, Address, NewUser, Role, User, UserFilter, UserId,
    UserSummary,
};
