//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    ActivityLog, ActivityLogId, Cart, CartId, CartItem, CartItemId, Category, CategoryId,
    CategoryUpdate, NewActivity, NewCategory, NewOrder, NewPayment, NewProduct, NewSubCategory,
    NewTestimonial, NewUser, Order, OrderFilter, OrderId, OrderItem, OrderItemId, OrderStatus,
    Page, PageRequest, Payment, PaymentId, PaymentStatus, PaymentUpdate, Product, ProductFilter,
    ProductId, ProductStats, ProductUpdate, Role, SortField, SortOrder, SubCategory,
    SubCategoryId, Testimonial, TestimonialId, TopProduct, User, UserFilter, UserId,
};
use crate::domain::ports::{
    ActivityRepository, CartRepository, CategoryRepository, CreatePaymentIntent, OrderRepository,
    PayPalGateway, PayPalOrder, PayPalOrderRequest, PayPalRefundRequest, PaymentIntent,
    PaymentRepository, ProductRepository, StripeGateway, StripeRefund, TestimonialRepository,
    UserRepository, WebhookVerification,
};
use crate::error::{DomainError, GatewayError};

fn paginate<T: Clone>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let slice = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    Page::new(slice, total, page)
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a user for testing
    pub fn with_user(self, user: User) -> Self {
        self.users.write().unwrap().insert(user.id, user);
        self
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, DomainError> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.email == new_user.email) {
            return Err(DomainError::AlreadyExists(
                "UNIQUE constraint failed: users.email".to_string(),
            ));
        }

        let user = User {
            id: UserId::new(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            name: new_user.name.clone(),
            surname: new_user.surname.clone(),
            phone: new_user.phone.clone(),
            role: new_user.role,
            is_admin: new_user.role == Role::Admin,
            avatar: None,
            address: new_user.address.clone(),
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_last_login(&self, id: &UserId) -> Result<(), DomainError> {
        if let Some(user) = self.users.write().unwrap().get_mut(id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
        is_admin: bool,
    ) -> Result<User, DomainError> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;
        user.role = role;
        user.is_admin = is_admin;
        Ok(user.clone())
    }

    async fn set_active(&self, id: &UserId, is_active: bool) -> Result<User, DomainError> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;
        user.is_active = is_active;
        Ok(user.clone())
    }

    async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, DomainError> {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut users: Vec<User> = self
            .users
            .read()
            .unwrap()
            .values()
            .filter(|u| filter.role.map_or(true, |r| u.role == r))
            .filter(|u| filter.is_active.map_or(true, |a| u.is_active == a))
            .filter(|u| {
                search.as_deref().map_or(true, |s| {
                    u.name.to_lowercase().contains(s)
                        || u.surname.to_lowercase().contains(s)
                        || u.email.to_lowercase().contains(s)
                })
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(users, page))
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, DomainError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .filter(|u| u.role == role)
            .count() as u64)
    }
}

// ============================================================================
// In-Memory Category Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<HashMap<CategoryId, Category>>>,
    product_counts: Arc<RwLock<HashMap<CategoryId, u64>>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(self, category: Category) -> Self {
        self.categories
            .write()
            .unwrap()
            .insert(category.id, category);
        self
    }

    /// Pretend `count` products reference the category
    pub fn with_product_count(self, id: CategoryId, count: u64) -> Self {
        self.product_counts.write().unwrap().insert(id, count);
        self
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories: Vec<Category> =
            self.categories.read().unwrap().values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, DomainError> {
        Ok(self.categories.read().unwrap().get(id).cloned())
    }

    async fn create(&self, category: &NewCategory) -> Result<Category, DomainError> {
        let mut categories = self.categories.write().unwrap();
        if categories.values().any(|c| c.name == category.name) {
            return Err(DomainError::AlreadyExists(
                "UNIQUE constraint failed: categories.name".to_string(),
            ));
        }

        let created = Category {
            id: CategoryId::new(),
            name: category.name.clone(),
            description: category.description.clone(),
            image: category.image.clone(),
            subcategories: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, DomainError> {
        let mut categories = self.categories.write().unwrap();
        if let Some(name) = &update.name {
            if categories.values().any(|c| &c.name == name && c.id != *id) {
                return Err(DomainError::AlreadyExists(
                    "UNIQUE constraint failed: categories.name".to_string(),
                ));
            }
        }

        let category = categories
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound("Category not found".to_string()))?;
        if let Some(name) = &update.name {
            category.name = name.clone();
        }
        if let Some(description) = &update.description {
            category.description = Some(description.clone());
        }
        if let Some(image) = &update.image {
            category.image = Some(image.clone());
        }
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), DomainError> {
        self.categories
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound("Category not found".to_string()))
    }

    async fn count_products(&self, id: &CategoryId) -> Result<u64, DomainError> {
        Ok(self
            .product_counts
            .read()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or(0))
    }

    async fn list_subcategories(&self, id: &CategoryId) -> Result<Vec<SubCategory>, DomainError> {
        Ok(self
            .categories
            .read()
            .unwrap()
            .get(id)
            .map(|c| c.subcategories.clone())
            .unwrap_or_default())
    }

    async fn create_subcategory(&self, sub: &NewSubCategory) -> Result<SubCategory, DomainError> {
        let mut categories = self.categories.write().unwrap();
        let category = categories.get_mut(&sub.category_id).ok_or_else(|| {
            DomainError::ForeignKey("FOREIGN KEY constraint failed".to_string())
        })?;

        let created = SubCategory {
            id: SubCategoryId::new(),
            name: sub.name.clone(),
            description: sub.description.clone(),
            category_id: sub.category_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        category.subcategories.push(created.clone());
        Ok(created)
    }
}

// ============================================================================
// In-Memory Product Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    sales: Arc<RwLock<HashMap<ProductId, u64>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(self, product: Product) -> Self {
        self.products.write().unwrap().insert(product.id, product);
        self
    }

    /// Pretend the product appears on `count` order lines
    pub fn with_sales(self, id: ProductId, count: u64) -> Self {
        self.sales.write().unwrap().insert(id, count);
        self
    }

    pub fn get(&self, id: &ProductId) -> Option<Product> {
        self.products.read().unwrap().get(id).cloned()
    }
}

fn sort_products(products: &mut [Product], field: SortField, order: SortOrder) {
    products.sort_by(|a, b| {
        let ordering = match field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Rating => a.rating.total_cmp(&b.rating),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .unwrap()
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        sort_products(&mut products, filter.sort_by, filter.sort_order);
        Ok(paginate(products, page))
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.get(id))
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, DomainError> {
        let products = self.products.read().unwrap();
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn create(&self, input: &NewProduct) -> Result<Product, DomainError> {
        let mut products = self.products.write().unwrap();
        if products.values().any(|p| p.sku == input.sku) {
            return Err(DomainError::AlreadyExists(
                "UNIQUE constraint failed: products.sku".to_string(),
            ));
        }

        let product = Product {
            id: ProductId::new(),
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            stock: input.stock,
            image: input.image.clone(),
            images: input.images.clone(),
            sku: input.sku.clone(),
            weight: input.weight,
            dimensions: input.dimensions,
            materials: input.materials.clone(),
            gemstones: input.gemstones.clone(),
            featured: input.featured,
            on_sale: input.on_sale,
            sale_price: input.sale_price,
            rating: 0.0,
            review_count: 0,
            is_active: true,
            owner_id: input.owner_id,
            category_id: input.category_id,
            subcategory_id: input.subcategory_id,
            meta_title: input.meta_title.clone(),
            meta_description: input.meta_description.clone(),
            slug: input.slug.clone(),
            tags: input.tags.clone(),
            discount: input.discount,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            category: None,
            subcategory: None,
            product_images: Vec::new(),
        };
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: &ProductId, update: &ProductUpdate) -> Result<Product, DomainError> {
        let mut products = self.products.write().unwrap();
        let p = products
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Product {} not found", id)))?;

        if let Some(v) = &update.name {
            p.name = v.clone();
        }
        if let Some(v) = &update.description {
            p.description = v.clone();
        }
        if let Some(v) = update.price {
            p.price = v;
        }
        if let Some(v) = update.stock {
            p.stock = v;
        }
        if let Some(v) = &update.image {
            p.image = Some(v.clone());
        }
        if let Some(v) = &update.images {
            p.images = v.clone();
        }
        if let Some(v) = &update.sku {
            p.sku = v.clone();
        }
        if let Some(v) = &update.materials {
            p.materials = v.clone();
        }
        if let Some(v) = &update.gemstones {
            p.gemstones = v.clone();
        }
        if let Some(v) = update.featured {
            p.featured = v;
        }
        if let Some(v) = update.on_sale {
            p.on_sale = v;
        }
        if let Some(v) = update.sale_price {
            p.sale_price = Some(v);
        }
        if let Some(v) = update.category_id {
            p.category_id = v;
        }
        if let Some(v) = update.subcategory_id {
            p.subcategory_id = Some(v);
        }
        if let Some(v) = update.weight {
            p.weight = Some(v);
        }
        if let Some(v) = update.dimensions {
            p.dimensions = Some(v);
        }
        if let Some(v) = &update.meta_title {
            p.meta_title = Some(v.clone());
        }
        if let Some(v) = &update.meta_description {
            p.meta_description = Some(v.clone());
        }
        if let Some(v) = &update.slug {
            p.slug = Some(v.clone());
        }
        if let Some(v) = &update.tags {
            p.tags = Some(v.clone());
        }
        if let Some(v) = update.discount {
            p.discount = Some(v);
        }
        if let Some(v) = update.is_active {
            p.is_active = v;
        }
        p.updated_at = Utc::now();
        Ok(p.clone())
    }

    async fn deactivate(&self, id: &ProductId) -> Result<(), DomainError> {
        let mut products = self.products.write().unwrap();
        let p = products
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Product {} not found", id)))?;
        p.is_active = false;
        Ok(())
    }

    async fn stats(&self) -> Result<ProductStats, DomainError> {
        let products = self.products.read().unwrap();
        let active: Vec<&Product> = products.values().filter(|p| p.is_active).collect();
        Ok(ProductStats {
            total_products: active.len() as u64,
            featured_products: active.iter().filter(|p| p.featured).count() as u64,
            on_sale_products: active.iter().filter(|p| p.on_sale).count() as u64,
            low_stock_products: active.iter().filter(|p| p.is_low_stock()).count() as u64,
        })
    }

    async fn top_selling(&self, limit: u64) -> Result<Vec<TopProduct>, DomainError> {
        let sales = self.sales.read().unwrap();
        let mut ranked: Vec<(u64, Product)> = self
            .products
            .read()
            .unwrap()
            .values()
            .filter(|p| p.is_active)
            .map(|p| (sales.get(&p.id).copied().unwrap_or(0), p.clone()))
            .collect();
        ranked.sort_by(|(ca, a), (cb, b)| cb.cmp(ca).then(b.created_at.cmp(&a.created_at)));

        Ok(ranked
            .into_iter()
            .take(limit as usize)
            .map(|(count, p)| TopProduct {
                id: p.id,
                name: p.name,
                price: p.price,
                stock: p.stock,
                rating: p.rating,
                review_count: p.review_count,
                sales_count: count,
            })
            .collect())
    }
}

// ============================================================================
// In-Memory Cart Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryCartRepository {
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_item<T>(&self, id: &CartItemId, f: impl FnOnce(&mut Cart, usize) -> T) -> Option<T> {
        let mut carts = self.carts.write().unwrap();
        let (cart, index) = carts.values_mut().find_map(|cart| {
            let index = cart.items.iter().position(|i| i.id == *id)?;
            Some((cart, index))
        })?;
        Some(f(cart, index))
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn find_or_create(&self, user_id: &UserId) -> Result<Cart, DomainError> {
        let mut carts = self.carts.write().unwrap();
        let cart = carts.entry(*user_id).or_insert_with(|| Cart {
            id: CartId::new(),
            user_id: *user_id,
            total: 0.0,
            item_count: 0,
            items: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        Ok(cart.clone())
    }

    async fn find_item(&self, id: &CartItemId) -> Result<Option<CartItem>, DomainError> {
        Ok(self.with_item(id, |cart, i| cart.items[i].clone()))
    }

    async fn add_item(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: i32,
        price: f64,
    ) -> Result<CartItem, DomainError> {
        let mut carts = self.carts.write().unwrap();
        let cart = carts
            .values_mut()
            .find(|c| c.id == *cart_id)
            .ok_or_else(|| DomainError::ForeignKey("FOREIGN KEY constraint failed".to_string()))?;

        let item = CartItem {
            id: CartItemId::new(),
            cart_id: *cart_id,
            product_id: *product_id,
            quantity,
            price,
            added_at: Utc::now(),
            product: None,
        };
        cart.items.push(item.clone());
        Ok(item)
    }

    async fn update_item(
        &self,
        id: &CartItemId,
        quantity: i32,
        price: f64,
    ) -> Result<(), DomainError> {
        self.with_item(id, |cart, i| {
            cart.items[i].quantity = quantity;
            cart.items[i].price = price;
        })
        .ok_or_else(|| DomainError::NotFound("Cart item not found".to_string()))
    }

    async fn remove_item(&self, id: &CartItemId) -> Result<(), DomainError> {
        self.with_item(id, |cart, i| {
            cart.items.remove(i);
        })
        .ok_or_else(|| DomainError::NotFound("Cart item not found".to_string()))
    }

    async fn clear(&self, cart_id: &CartId) -> Result<(), DomainError> {
        if let Some(cart) = self
            .carts
            .write()
            .unwrap()
            .values_mut()
            .find(|c| c.id == *cart_id)
        {
            cart.items.clear();
        }
        Ok(())
    }

    async fn save_totals(
        &self,
        cart_id: &CartId,
        total: f64,
        item_count: i32,
    ) -> Result<(), DomainError> {
        if let Some(cart) = self
            .carts
            .write()
            .unwrap()
            .values_mut()
            .find(|c| c.id == *cart_id)
        {
            cart.total = total;
            cart.item_count = item_count;
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Order Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(self, order: Order) -> Self {
        self.orders.write().unwrap().insert(order.id, order);
        self
    }

    pub fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders.read().unwrap().get(id).cloned()
    }

    fn modify(
        &self,
        id: &OrderId,
        f: impl FnOnce(&mut Order),
    ) -> Result<Order, DomainError> {
        let mut orders = self.orders.write().unwrap();
        let order = orders
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound("Order not found".to_string()))?;
        f(order);
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    fn matching(&self, filter: &OrderFilter) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, input: &NewOrder) -> Result<Order, DomainError> {
        let id = OrderId::new();
        let order = Order {
            id,
            user_id: input.user_id,
            customer_name: input.customer_name.clone(),
            customer_email: input.customer_email.clone(),
            total: input.total,
            status: OrderStatus::Pending,
            shipping_address: input.shipping_address.clone(),
            billing_address: input.billing_address.clone(),
            payment_method: input.payment_method.clone(),
            payment_status: PaymentStatus::Pending,
            tracking_number: None,
            notes: input.notes.clone(),
            items: input
                .items
                .iter()
                .map(|i| OrderItem {
                    id: OrderItemId::new(),
                    order_id: id,
                    product_id: i.product_id,
                    name: i.name.clone(),
                    quantity: i.quantity,
                    price: i.price,
                    image: i.image.clone(),
                })
                .collect(),
            user: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.orders.write().unwrap().insert(id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.get(id))
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        Ok(paginate(self.matching(filter), page))
    }

    async fn list_all(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        Ok(self.matching(filter))
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, DomainError> {
        self.modify(id, |o| {
            o.status = status;
            if tracking_number.is_some() {
                o.tracking_number = tracking_number;
            }
        })
    }

    async fn cancel(&self, id: &OrderId, from: &[OrderStatus]) -> Result<Order, DomainError> {
        let mut orders = self.orders.write().unwrap();
        let order = orders
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound("Order not found".to_string()))?;
        if !from.contains(&order.status) {
            return Err(DomainError::Conflict(format!("Order is already {}", order.status)));
        }
        order.status = OrderStatus::Cancelled;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn update_payment_status(
        &self,
        id: &OrderId,
        payment_status: PaymentStatus,
        status: Option<OrderStatus>,
    ) -> Result<(), DomainError> {
        self.modify(id, |o| {
            o.payment_status = payment_status;
            if let Some(status) = status {
                o.status = status;
            }
        })
        .map(|_| ())
    }
}

// ============================================================================
// In-Memory Payment Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
    order_owners: Arc<RwLock<HashMap<OrderId, UserId>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payment(self, payment: Payment) -> Self {
        self.payments.write().unwrap().insert(payment.id, payment);
        self
    }

    /// Record who placed an order, for `list_by_user`
    pub fn with_order_owner(self, order_id: OrderId, user_id: UserId) -> Self {
        self.order_owners.write().unwrap().insert(order_id, user_id);
        self
    }

    pub fn all(&self) -> Vec<Payment> {
        self.payments.read().unwrap().values().cloned().collect()
    }

    fn find(&self, pred: impl Fn(&Payment) -> bool) -> Option<Payment> {
        self.payments
            .read()
            .unwrap()
            .values()
            .find(|p| pred(p))
            .cloned()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn create(&self, input: &NewPayment) -> Result<Payment, DomainError> {
        let payment = Payment {
            id: PaymentId::new(),
            order_id: input.order_id,
            amount: input.amount,
            currency: input.currency.clone(),
            payment_method: input.payment_method,
            status: input.status,
            transaction_id: input.transaction_id.clone(),
            stripe_payment_intent_id: input.stripe_payment_intent_id.clone(),
            stripe_charge_id: None,
            refund_amount: None,
            refund_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.payments
            .write()
            .unwrap()
            .insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.payments.read().unwrap().get(id).cloned())
    }

    async fn find_by_intent_id(&self, intent_id: &str) -> Result<Option<Payment>, DomainError> {
        Ok(self.find(|p| p.stripe_payment_intent_id.as_deref() == Some(intent_id)))
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self.find(|p| p.transaction_id.as_deref() == Some(transaction_id)))
    }

    async fn update(&self, id: &PaymentId, update: &PaymentUpdate) -> Result<Payment, DomainError> {
        let mut payments = self.payments.write().unwrap();
        let p = payments
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound("Payment not found".to_string()))?;
        if let Some(status) = update.status {
            p.status = status;
        }
        if let Some(v) = &update.transaction_id {
            p.transaction_id = Some(v.clone());
        }
        if let Some(v) = &update.stripe_charge_id {
            p.stripe_charge_id = Some(v.clone());
        }
        if let Some(v) = update.refund_amount {
            p.refund_amount = Some(v);
        }
        if let Some(v) = &update.refund_reason {
            p.refund_reason = Some(v.clone());
        }
        Ok(p.clone())
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Payment>, DomainError> {
        let owners = self.order_owners.read().unwrap();
        let mut payments: Vec<Payment> = self
            .payments
            .read()
            .unwrap()
            .values()
            .filter(|p| owners.get(&p.order_id) == Some(user_id))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(payments, page))
    }
}

// ============================================================================
// In-Memory Testimonial and Activity Repositories
// ============================================================================

#[derive(Default)]
pub struct InMemoryTestimonialRepository {
    testimonials: Arc<RwLock<Vec<Testimonial>>>,
}

impl InMemoryTestimonialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TestimonialRepository for InMemoryTestimonialRepository {
    async fn list(&self) -> Result<Vec<Testimonial>, DomainError> {
        let mut list = self.testimonials.read().unwrap().clone();
        list.sort_by(|a, b| {
            b.verified
                .cmp(&a.verified)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(list)
    }

    async fn create(&self, input: &NewTestimonial) -> Result<Testimonial, DomainError> {
        let testimonial = Testimonial {
            id: TestimonialId::new(),
            name: input.name.clone(),
            text: input.text.clone(),
            rating: input.rating,
            image: input.image.clone(),
            location: input.location.clone(),
            verified: input.verified,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.testimonials.write().unwrap().push(testimonial.clone());
        Ok(testimonial)
    }
}

#[derive(Default)]
pub struct InMemoryActivityRepository {
    entries: Arc<RwLock<Vec<ActivityLog>>>,
    pub should_fail: bool,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Recorded action names, oldest first
    pub fn actions(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .map(|e| e.action.clone())
            .collect()
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn record(&self, activity: &NewActivity) -> Result<(), DomainError> {
        if self.should_fail {
            return Err(DomainError::Database("Mock failure".to_string()));
        }
        self.entries.write().unwrap().push(ActivityLog {
            id: ActivityLogId::new(),
            user_id: activity.user_id,
            action: activity.action.to_string(),
            entity_type: activity.action.entity_type().to_string(),
            entity_id: activity.entity_id,
            description: activity.description.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent(&self, limit: u64) -> Result<Vec<ActivityLog>, DomainError> {
        Ok(self
            .entries
            .read()
            .unwrap()
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Mock PayPal Gateway
// ============================================================================

#[derive(Default)]
pub struct MockPayPalGateway {
    pub created: Arc<RwLock<Vec<PayPalOrderRequest>>>,
    pub refunds: Arc<RwLock<Vec<(String, PayPalRefundRequest)>>>,
    /// Purchase units returned by `capture_order`
    capture_units: Arc<RwLock<Vec<Value>>>,
    signature_valid: bool,
}

impl MockPayPalGateway {
    pub fn new() -> Self {
        Self {
            signature_valid: true,
            ..Default::default()
        }
    }

    pub fn with_invalid_signatures(mut self) -> Self {
        self.signature_valid = false;
        self
    }

    /// Make `capture_order` report a completed capture for a purchase unit
    pub fn with_capture(self, reference_id: &str, capture_id: &str, amount: &str) -> Self {
        self.capture_units.write().unwrap().push(json!({
            "reference_id": reference_id,
            "payments": {
                "captures": [{
                    "id": capture_id,
                    "status": "COMPLETED",
                    "amount": { "currency_code": "USD", "value": amount }
                }]
            }
        }));
        self
    }
}

#[async_trait]
impl PayPalGateway for MockPayPalGateway {
    async fn create_order(
        &self,
        request: &PayPalOrderRequest,
    ) -> Result<PayPalOrder, GatewayError> {
        self.created.write().unwrap().push(request.clone());
        Ok(PayPalOrder {
            id: "PAYPAL-ORDER-1".to_string(),
            status: "CREATED".to_string(),
            links: vec![crate::domain::ports::PayPalLink {
                href: "https://www.sandbox.paypal.com/checkoutnow?token=PAYPAL-ORDER-1"
                    .to_string(),
                rel: "approve".to_string(),
                method: Some("GET".to_string()),
            }],
            purchase_units: Vec::new(),
        })
    }

    async fn capture_order(&self, order_id: &str) -> Result<PayPalOrder, GatewayError> {
        Ok(PayPalOrder {
            id: order_id.to_string(),
            status: "COMPLETED".to_string(),
            links: Vec::new(),
            purchase_units: self.capture_units.read().unwrap().clone(),
        })
    }

    async fn get_order(&self, order_id: &str) -> Result<Value, GatewayError> {
        Ok(json!({ "id": order_id, "status": "APPROVED" }))
    }

    async fn refund_capture(
        &self,
        capture_id: &str,
        request: &PayPalRefundRequest,
    ) -> Result<Value, GatewayError> {
        self.refunds
            .write()
            .unwrap()
            .push((capture_id.to_string(), request.clone()));
        Ok(json!({ "id": "REFUND-1", "status": "COMPLETED" }))
    }

    async fn verify_webhook_signature(&self, _: &WebhookVerification) -> Result<bool, GatewayError> {
        Ok(self.signature_valid)
    }
}

// ============================================================================
// Mock Stripe Gateway
// ============================================================================

#[derive(Default)]
pub struct MockStripeGateway {
    intents: Arc<RwLock<HashMap<String, PaymentIntent>>>,
    pub refunds: Arc<RwLock<Vec<(String, Option<i64>, Option<String>)>>>,
}

impl MockStripeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move an intent to a new status, as the customer's actions would
    pub fn set_status(&self, intent_id: &str, status: &str) {
        if let Some(intent) = self.intents.write().unwrap().get_mut(intent_id) {
            intent.status = status.to_string();
            if status == "succeeded" {
                intent.latest_charge = Some(format!("ch_{}", intent_id));
            }
        }
    }
}

#[async_trait]
impl StripeGateway for MockStripeGateway {
    async fn create_payment_intent(
        &self,
        request: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, GatewayError> {
        let mut intents = self.intents.write().unwrap();
        let id = format!("pi_mock_{}", intents.len() + 1);
        let intent = PaymentIntent {
            id: id.clone(),
            status: "requires_payment_method".to_string(),
            amount: request.amount,
            currency: request.currency.to_lowercase(),
            client_secret: Some(format!("{}_secret", id)),
            latest_charge: None,
            metadata: HashMap::from([("order_id".to_string(), request.order_id.clone())]),
        };
        intents.insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, GatewayError> {
        self.intents
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(GatewayError::Api {
                status: 404,
                message: "No such payment_intent".to_string(),
            })
    }

    async fn create_refund(
        &self,
        payment_intent_id: &str,
        amount: Option<i64>,
        reason: Option<&str>,
    ) -> Result<StripeRefund, GatewayError> {
        let intent = self.retrieve_payment_intent(payment_intent_id).await?;
        self.refunds.write().unwrap().push((
            payment_intent_id.to_string(),
            amount,
            reason.map(str::to_string),
        ));
        Ok(StripeRefund {
            id: "re_mock".to_string(),
            status: "succeeded".to_string(),
            amount: amount.unwrap_or(intent.amount),
        })
    }
}
