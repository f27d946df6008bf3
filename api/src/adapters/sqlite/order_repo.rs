//! SQLite adapter for OrderRepository
//!
//! Placement and cancellation run in a transaction together with the stock
//! adjustments they imply.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{db_err, from_json, to_json};
use crate::domain::entities::{
    Address, NewOrder, Order, OrderFilter, OrderId, OrderItem, OrderItemId, OrderStatus, Page,
    PageRequest, PaymentStatus, ProductId, UserId, UserSummary,
};
use crate::domain::ports::OrderRepository;
use crate::entity::{order_items, orders, products, users};
use crate::error::DomainError;

/// SQLite implementation of OrderRepository
pub struct SqliteOrderRepository {
    db: DatabaseConnection,
}

impl SqliteOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach lines and user summaries to a batch of orders
    async fn with_details(&self, models: Vec<orders::Model>) -> Result<Vec<Order>, DomainError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let user_ids: Vec<Uuid> = models.iter().map(|m| m.user_id).collect();

        let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for item in order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(order_ids))
            .order_by_asc(order_items::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?
        {
            items.entry(item.order_id).or_default().push(item.into());
        }

        let users: HashMap<Uuid, UserSummary> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    UserSummary {
                        id: UserId(u.id),
                        name: u.name,
                        surname: u.surname,
                        email: u.email,
                    },
                )
            })
            .collect();

        Ok(models
            .into_iter()
            .map(|m| {
                let lines = items.remove(&m.id).unwrap_or_default();
                let user = users.get(&m.user_id).cloned();
                to_order(m, lines, user)
            })
            .collect())
    }

    async fn load(&self, id: Uuid) -> Result<Order, DomainError> {
        let model = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::NotFound(format!("Order {} not found", id)))?;

        self.with_details(vec![model])
            .await?
            .pop()
            .ok_or_else(|| DomainError::NotFound(format!("Order {} not found", id)))
    }
}

fn filtered(filter: &OrderFilter) -> Select<orders::Entity> {
    let mut query = orders::Entity::find();
    if let Some(user_id) = filter.user_id {
        query = query.filter(orders::Column::UserId.eq(user_id.0));
    }
    if let Some(status) = filter.status {
        query = query.filter(orders::Column::Status.eq(status.to_string()));
    }
    if let Some(from) = filter.from {
        query = query.filter(orders::Column::CreatedAt.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(orders::Column::CreatedAt.lte(to));
    }
    query.order_by_desc(orders::Column::CreatedAt)
}

/// Add `delta` units to a product's stock. A negative delta only applies when
/// enough stock is left; returns whether a row changed.
async fn adjust_stock<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    delta: i32,
) -> Result<bool, DomainError> {
    let mut update = products::Entity::update_many()
        .col_expr(
            products::Column::Stock,
            Expr::col(products::Column::Stock).add(delta),
        )
        .col_expr(products::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(products::Column::Id.eq(product_id));
    if delta < 0 {
        update = update
            .filter(products::Column::Stock.gte(-delta))
            .filter(products::Column::IsActive.eq(true));
    }

    let result = update.exec(db).await.map_err(db_err)?;
    Ok(result.rows_affected > 0)
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<Order, DomainError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let billing = match &order.billing_address {
            Some(a) => Some(to_json(a)?),
            None => None,
        };

        let txn = self.db.begin().await.map_err(db_err)?;

        orders::ActiveModel {
            id: Set(id),
            user_id: Set(order.user_id.0),
            customer_name: Set(order.customer_name.clone()),
            customer_email: Set(order.customer_email.clone()),
            total: Set(order.total),
            status: Set(OrderStatus::Pending.to_string()),
            shipping_address: Set(to_json(&order.shipping_address)?),
            billing_address: Set(billing),
            payment_method: Set(order.payment_method.clone()),
            payment_status: Set(PaymentStatus::Pending.to_string()),
            tracking_number: Set(None),
            notes: Set(order.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        for item in &order.items {
            if !adjust_stock(&txn, item.product_id.0, -item.quantity).await? {
                // Dropping the transaction rolls back everything written so far
                return Err(DomainError::Validation(format!(
                    "Insufficient stock for {}",
                    item.name
                )));
            }

            order_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(id),
                product_id: Set(item.product_id.0),
                name: Set(item.name.clone()),
                quantity: Set(item.quantity),
                price: Set(item.price),
                image: Set(item.image.clone()),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;

        self.load(id).await
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        match self.load(id.0).await {
            Ok(order) => Ok(Some(order)),
            Err(DomainError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        let query = filtered(filter);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(Page::new(self.with_details(models).await?, total, page))
    }

    async fn list_all(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        let models = filtered(filter).all(&self.db).await.map_err(db_err)?;
        self.with_details(models).await
    }

    async fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, DomainError> {
        let mut model = orders::ActiveModel {
            id: Set(id.0),
            status: Set(status.to_string()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if tracking_number.is_some() {
            model.tracking_number = Set(tracking_number);
        }

        model.update(&self.db).await.map_err(db_err)?;
        self.load(id.0).await
    }

    async fn cancel(&self, id: &OrderId, from: &[OrderStatus]) -> Result<Order, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Only one caller can move the order out of `from`
        let claimed = orders::Entity::update_many()
            .col_expr(
                orders::Column::Status,
                Expr::value(OrderStatus::Cancelled.to_string()),
            )
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(id.0))
            .filter(orders::Column::Status.is_in(from.iter().map(|s| s.to_string())))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if claimed.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return match orders::Entity::find_by_id(id.0)
                .one(&self.db)
                .await
                .map_err(db_err)?
            {
                Some(order) => Err(DomainError::Conflict(format!(
                    "Order is already {}",
                    order.status
                ))),
                None => Err(DomainError::NotFound("Order not found".to_string())),
            };
        }

        let lines = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(id.0))
            .all(&txn)
            .await
            .map_err(db_err)?;

        for line in &lines {
            adjust_stock(&txn, line.product_id, line.quantity).await?;
        }

        txn.commit().await.map_err(db_err)?;

        self.load(id.0).await
    }

    async fn update_payment_status(
        &self,
        id: &OrderId,
        payment_status: PaymentStatus,
        status: Option<OrderStatus>,
    ) -> Result<(), DomainError> {
        let mut model = orders::ActiveModel {
            id: Set(id.0),
            payment_status: Set(payment_status.to_string()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(status) = status {
            model.status = Set(status.to_string());
        }

        model.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

fn to_order(model: orders::Model, items: Vec<OrderItem>, user: Option<UserSummary>) -> Order {
    Order {
        id: OrderId(model.id),
        user_id: UserId(model.user_id),
        customer_name: model.customer_name,
        customer_email: model.customer_email,
        total: model.total,
        status: model.status.parse().unwrap_or(OrderStatus::Pending),
        shipping_address: from_json::<Address>(model.shipping_address),
        billing_address: model.billing_address.map(from_json),
        payment_method: model.payment_method,
        payment_status: model.payment_status.parse().unwrap_or(PaymentStatus::Pending),
        tracking_number: model.tracking_number,
        notes: model.notes,
        items,
        user,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        OrderItem {
            id: OrderItemId(model.id),
            order_id: OrderId(model.order_id),
            product_id: ProductId(model.product_id),
            name: model.name,
            quantity: model.quantity,
            price: model.price,
            image: model.image,
        }
    }
}
