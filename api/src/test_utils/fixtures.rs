//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::Utc;

use crate::domain::entities::{
    Address, Category, CategoryId, NewCategory, NewOrder, NewOrderItem, NewProduct, Order,
    OrderId, OrderItem, OrderItemId, OrderStatus, Payment, PaymentId, PaymentProvider,
    PaymentStatus, Product, ProductId, Role, TransactionStatus, User, UserId,
};

/// Create a regular active user
pub fn test_user() -> User {
    test_user_with_email("jane@example.com")
}

pub fn test_user_with_email(email: &str) -> User {
    User {
        id: UserId::new(),
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        name: "Jane".to_string(),
        surname: "Doe".to_string(),
        phone: None,
        role: Role::User,
        is_admin: false,
        avatar: None,
        address: None,
        is_active: true,
        last_login_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Create an administrator
pub fn test_admin() -> User {
    User {
        role: Role::Admin,
        name: "Ada".to_string(),
        surname: "Admin".to_string(),
        ..test_user_with_email("admin@example.com")
    }
}

pub fn test_address() -> Address {
    Address {
        street: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip_code: "62701".to_string(),
        country: "US".to_string(),
    }
}

pub fn test_category() -> Category {
    test_category_named("Rings")
}

pub fn test_category_named(name: &str) -> Category {
    Category {
        id: CategoryId::new(),
        name: name.to_string(),
        description: Some(format!("All {}", name.to_lowercase())),
        image: None,
        subcategories: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn new_category(name: &str) -> NewCategory {
    NewCategory {
        name: name.to_string(),
        description: None,
        image: None,
    }
}

/// Create an active product with plenty of stock
pub fn test_product() -> Product {
    test_product_in(CategoryId::new())
}

pub fn test_product_in(category_id: CategoryId) -> Product {
    Product {
        id: ProductId::new(),
        name: "Gold Band".to_string(),
        description: "Plain 18k gold band".to_string(),
        price: 250.0,
        stock: 20,
        image: Some("https://img/band.jpg".to_string()),
        images: vec!["https://img/band.jpg".to_string()],
        sku: format!("SKU-{}", ProductId::new()),
        weight: None,
        dimensions: None,
        materials: vec!["gold".to_string()],
        gemstones: Vec::new(),
        featured: false,
        on_sale: false,
        sale_price: None,
        rating: 0.0,
        review_count: 0,
        is_active: true,
        owner_id: None,
        category_id,
        subcategory_id: None,
        meta_title: None,
        meta_description: None,
        slug: Some("gold-band".to_string()),
        tags: None,
        discount: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        category: None,
        subcategory: None,
        product_images: Vec::new(),
    }
}

/// Product creation input referencing an existing category
pub fn new_product(name: &str, category_id: CategoryId) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: format!("{} description", name),
        price: 100.0,
        stock: 10,
        image: None,
        images: Vec::new(),
        sku: format!("SKU-{}", ProductId::new()),
        weight: None,
        dimensions: None,
        materials: Vec::new(),
        gemstones: Vec::new(),
        featured: false,
        on_sale: false,
        sale_price: None,
        owner_id: None,
        category_id,
        subcategory_id: None,
        meta_title: None,
        meta_description: None,
        slug: None,
        tags: None,
        discount: None,
    }
}

/// Order input buying `quantity` units of one product
pub fn new_order(user: &User, product: &Product, quantity: i32) -> NewOrder {
    NewOrder {
        user_id: user.id,
        customer_name: format!("{} {}", user.name, user.surname),
        customer_email: user.email.clone(),
        total: product.effective_price() * quantity as f64,
        shipping_address: test_address(),
        billing_address: None,
        payment_method: "card".to_string(),
        notes: None,
        items: vec![NewOrderItem {
            product_id: product.id,
            name: product.name.clone(),
            quantity,
            price: product.effective_price(),
            image: product.primary_image(),
        }],
    }
}

pub fn test_order(user_id: UserId, status: OrderStatus) -> Order {
    let id = OrderId::new();
    Order {
        id,
        user_id,
        customer_name: "Jane Doe".to_string(),
        customer_email: "jane@example.com".to_string(),
        total: 500.0,
        status,
        shipping_address: test_address(),
        billing_address: None,
        payment_method: "card".to_string(),
        payment_status: PaymentStatus::Pending,
        tracking_number: None,
        notes: None,
        items: vec![OrderItem {
            id: OrderItemId::new(),
            order_id: id,
            product_id: ProductId::new(),
            name: "Gold Band".to_string(),
            quantity: 2,
            price: 250.0,
            image: String::new(),
        }],
        user: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_payment(order_id: OrderId, provider: PaymentProvider) -> Payment {
    Payment {
        id: PaymentId::new(),
        order_id,
        amount: 500.0,
        currency: "USD".to_string(),
        payment_method: provider,
        status: TransactionStatus::Completed,
        transaction_id: Some("txn_123".to_string()),
        stripe_payment_intent_id: None,
        stripe_charge_id: None,
        refund_amount: None,
        refund_reason: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
