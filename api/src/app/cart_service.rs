//! Cart service
//!
//! One cart per user, created on first access. Totals are recomputed and
//! stored after every change.

use std::sync::Arc;

use crate::domain::entities::{Cart, CartItem, CartItemId, Product, ProductId, UserId};
use crate::domain::ports::{CartRepository, ProductRepository};
use crate::error::{AppError, DomainError};

pub struct CartService<CR, PR>
where
    CR: CartRepository,
    PR: ProductRepository,
{
    carts: Arc<CR>,
    products: Arc<PR>,
}

impl<CR, PR> CartService<CR, PR>
where
    CR: CartRepository,
    PR: ProductRepository,
{
    pub fn new(carts: Arc<CR>, products: Arc<PR>) -> Self {
        Self { carts, products }
    }

    pub async fn get(&self, user_id: &UserId) -> Result<Cart, AppError> {
        Ok(self.carts.find_or_create(user_id).await?)
    }

    /// Add a product; an existing line for the same product is incremented
    pub async fn add(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: i32,
    ) -> Result<Cart, AppError> {
        if quantity < 1 {
            return Err(DomainError::Validation("Quantity must be at least 1".to_string()).into());
        }
        let product = self.active_product(product_id).await?;
        let cart = self.carts.find_or_create(user_id).await?;

        match cart.items.iter().find(|i| i.product_id == *product_id) {
            Some(line) => {
                let total = line.quantity.checked_add(quantity).ok_or_else(|| {
                    DomainError::Validation("Quantity is too large".to_string())
                })?;
                ensure_stock(&product, total)?;
                self.carts
                    .update_item(&line.id, total, product.effective_price())
                    .await?;
            }
            None => {
                ensure_stock(&product, quantity)?;
                self.carts
                    .add_item(&cart.id, product_id, quantity, product.effective_price())
                    .await?;
            }
        }

        tracing::debug!(user_id = %user_id, product_id = %product_id, quantity, "Added to cart");
        self.refresh(user_id).await
    }

    /// Set a line's quantity; zero removes the line
    pub async fn update_item(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
        quantity: i32,
    ) -> Result<Cart, AppError> {
        if quantity < 0 {
            return Err(DomainError::Validation("Quantity cannot be negative".to_string()).into());
        }
        let item = self.owned_item(user_id, item_id).await?;

        if quantity == 0 {
            self.carts.remove_item(item_id).await?;
        } else {
            let product = self.active_product(&item.product_id).await?;
            ensure_stock(&product, quantity)?;
            self.carts
                .update_item(item_id, quantity, product.effective_price())
                .await?;
        }

        self.refresh(user_id).await
    }

    pub async fn remove_item(&self, user_id: &UserId, item_id: &CartItemId) -> Result<Cart, AppError> {
        self.owned_item(user_id, item_id).await?;
        self.carts.remove_item(item_id).await?;
        self.refresh(user_id).await
    }

    pub async fn clear(&self, user_id: &UserId) -> Result<Cart, AppError> {
        let cart = self.carts.find_or_create(user_id).await?;
        self.carts.clear(&cart.id).await?;
        self.refresh(user_id).await
    }

    /// Total units in the cart
    pub async fn count(&self, user_id: &UserId) -> Result<i32, AppError> {
        Ok(self.carts.find_or_create(user_id).await?.item_count)
    }

    async fn active_product(&self, id: &ProductId) -> Result<Product, AppError> {
        match self.products.find_by_id(id).await? {
            Some(product) if product.is_active => Ok(product),
            _ => Err(AppError::NotFound("Product not found".to_string())),
        }
    }

    /// A line from this user's cart; lines of other carts are reported missing
    async fn owned_item(
        &self,
        user_id: &UserId,
        item_id: &CartItemId,
    ) -> Result<CartItem, AppError> {
        let cart = self.carts.find_or_create(user_id).await?;
        self.carts
            .find_item(item_id)
            .await?
            .filter(|item| item.cart_id == cart.id)
            .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))
    }

    async fn refresh(&self, user_id: &UserId) -> Result<Cart, AppError> {
        let mut cart = self.carts.find_or_create(user_id).await?;
        cart.recalculate();
        self.carts
            .save_totals(&cart.id, cart.total, cart.item_count)
            .await?;
        Ok(cart)
    }
}

fn ensure_stock(product: &Product, quantity: i32) -> Result<(), DomainError> {
    if quantity > product.stock {
        return Err(DomainError::Validation(format!(
            "Only {} unit(s) of {} in stock",
            product.stock, product.name
        )));
    }
    Ok(())
}
