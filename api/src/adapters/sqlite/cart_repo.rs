//! SQLite adapter for CartRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{Cart, CartId, CartItem, CartItemId, CartProduct, ProductId, UserId};
use crate::domain::ports::CartRepository;
use crate::entity::{cart_items, carts, products};
use crate::error::DomainError;

/// SQLite implementation of CartRepository
pub struct SqliteCartRepository {
    db: DatabaseConnection,
}

impl SqliteCartRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_cart(&self, user_id: &UserId) -> Result<Option<carts::Model>, DomainError> {
        carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    async fn load_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>, DomainError> {
        let lines = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .order_by_asc(cart_items::Column::AddedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let products: HashMap<Uuid, CartProduct> = products::Entity::find()
            .filter(products::Column::Id.is_in(product_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    CartProduct {
                        id: ProductId(p.id),
                        name: p.name,
                        price: p.price,
                        sale_price: p.sale_price,
                        on_sale: p.on_sale,
                        image: p.image,
                        stock: p.stock,
                    },
                )
            })
            .collect();

        Ok(lines
            .into_iter()
            .map(|l| {
                let product = products.get(&l.product_id).cloned();
                let mut item: CartItem = l.into();
                item.product = product;
                item
            })
            .collect())
    }
}

#[async_trait]
impl CartRepository for SqliteCartRepository {
    async fn find_or_create(&self, user_id: &UserId) -> Result<Cart, DomainError> {
        let model = match self.find_cart(user_id).await? {
            Some(model) => model,
            None => {
                let now = Utc::now();
                let created = carts::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id.0),
                    total: Set(0.0),
                    item_count: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await
                .map_err(db_err);

                match created {
                    Ok(model) => model,
                    // Lost a race with a concurrent request for the same user
                    Err(DomainError::AlreadyExists(_)) => self
                        .find_cart(user_id)
                        .await?
                        .ok_or_else(|| DomainError::Internal("Cart vanished".to_string()))?,
                    Err(e) => return Err(e),
                }
            }
        };

        let items = self.load_items(model.id).await?;
        Ok(Cart {
            id: CartId(model.id),
            user_id: UserId(model.user_id),
            total: model.total,
            item_count: model.item_count,
            items,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn find_item(&self, id: &CartItemId) -> Result<Option<CartItem>, DomainError> {
        let result = cart_items::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn add_item(
        &self,
        cart_id: &CartId,
        product_id: &ProductId,
        quantity: i32,
        price: f64,
    ) -> Result<CartItem, DomainError> {
        let now = Utc::now();
        let result = cart_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart_id.0),
            product_id: Set(product_id.0),
            quantity: Set(quantity),
            price: Set(price),
            added_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(result.into())
    }

    async fn update_item(
        &self,
        id: &CartItemId,
        quantity: i32,
        price: f64,
    ) -> Result<(), DomainError> {
        cart_items::ActiveModel {
            id: Set(id.0),
            quantity: Set(quantity),
            price: Set(price),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn remove_item(&self, id: &CartItemId) -> Result<(), DomainError> {
        let result = cart_items::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Cart item {} not found", id)));
        }
        Ok(())
    }

    async fn clear(&self, cart_id: &CartId) -> Result<(), DomainError> {
        cart_items::Entity::delete_many()
            .filter(cart_items::Column::CartId.eq(cart_id.0))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn save_totals(
        &self,
        cart_id: &CartId,
        total: f64,
        item_count: i32,
    ) -> Result<(), DomainError> {
        carts::ActiveModel {
            id: Set(cart_id.0),
            total: Set(total),
            item_count: Set(item_count),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        CartItem {
            id: CartItemId(model.id),
            cart_id: CartId(model.cart_id),
            product_id: ProductId(model.product_id),
            quantity: model.quantity,
            price: model.price,
            added_at: model.added_at,
            product: None,
        }
    }
}
