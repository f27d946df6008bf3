//! Order service
//!
//! Checkout, order history and fulfilment status changes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::app::activity::record_activity;
use crate::app::parse_field;
use crate::domain::entities::{
    is_valid_email, order_total, ActivityAction, Address, NewActivity, NewOrder, NewOrderItem,
    Order, OrderFilter, OrderId, OrderStatus, Page, PageRequest, PaymentProvider, ProductId, User,
};
use crate::domain::ports::{ActivityRepository, OrderRepository, ProductRepository};
use crate::error::{AppError, DomainError};

pub const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Checkout request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderLine>,
    pub shipping_address: Address,
    pub billing_address: Option<Address>,
    pub payment_method: String,
    pub notes: Option<String>,
}

pub struct OrderService<OR, PR, AR>
where
    OR: OrderRepository,
    PR: ProductRepository,
    AR: ActivityRepository,
{
    orders: Arc<OR>,
    products: Arc<PR>,
    activity: Arc<AR>,
}

impl<OR, PR, AR> OrderService<OR, PR, AR>
where
    OR: OrderRepository,
    PR: ProductRepository,
    AR: ActivityRepository,
{
    pub fn new(orders: Arc<OR>, products: Arc<PR>, activity: Arc<AR>) -> Self {
        Self {
            orders,
            products,
            activity,
        }
    }

    /// Place an order. Prices, names and images come from the catalog and the
    /// total is computed here, never taken from the client.
    pub async fn place(&self, user: &User, input: PlaceOrder) -> Result<Order, AppError> {
        let customer_name = input.customer_name.trim().to_string();
        let customer_email = input.customer_email.trim().to_lowercase();
        if customer_name.is_empty() {
            return Err(DomainError::Validation("Customer name is required".to_string()).into());
        }
        if !is_valid_email(&customer_email) {
            return Err(DomainError::Validation("A valid customer email is required".to_string()).into());
        }
        input
            .payment_method
            .parse::<PaymentProvider>()
            .map_err(DomainError::Validation)?;
        if input.items.is_empty() {
            return Err(DomainError::Validation("Order must contain at least one item".to_string()).into());
        }

        // Merge repeated products so the stock check sees the full quantity
        let mut quantities: Vec<(ProductId, i32)> = Vec::new();
        for line in &input.items {
            if line.quantity < 1 {
                return Err(DomainError::Validation("Quantity must be at least 1".to_string()).into());
            }
            match quantities.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, q)) => {
                    *q = q.checked_add(line.quantity).ok_or_else(|| {
                        DomainError::Validation("Quantity is too large".to_string())
                    })?
                }
                None => quantities.push((line.product_id, line.quantity)),
            }
        }

        let ids: Vec<ProductId> = quantities.iter().map(|(id, _)| *id).collect();
        let catalog: HashMap<ProductId, _> = self
            .products
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut items = Vec::with_capacity(quantities.len());
        for (product_id, quantity) in quantities {
            let product = catalog
                .get(&product_id)
                .filter(|p| p.is_active)
                .ok_or_else(|| {
                    DomainError::Validation(format!("Product {} is not available", product_id))
                })?;
            if product.stock < quantity {
                return Err(DomainError::Validation(format!(
                    "Insufficient stock for {}",
                    product.name
                ))
                .into());
            }
            items.push(NewOrderItem {
                product_id,
                name: product.name.clone(),
                quantity,
                price: product.effective_price(),
                image: product.primary_image(),
            });
        }

        let order = self
            .orders
            .create(&NewOrder {
                user_id: user.id,
                customer_name,
                customer_email,
                total: order_total(&items),
                shipping_address: input.shipping_address,
                billing_address: input.billing_address,
                payment_method: input.payment_method,
                notes: input.notes,
                items,
            })
            .await?;

        tracing::info!(order_id = %order.id, user_id = %user.id, total = order.total, "Order placed");
        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::OrderPlaced,
                format!("Order placed by {} for {:.2}", order.customer_email, order.total),
            )
            .by(user.id)
            .on(order.id.0),
        )
        .await;

        Ok(order)
    }

    /// The caller's orders, newest first
    pub async fn list_mine(
        &self,
        user: &User,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Page<Order>, AppError> {
        let filter = OrderFilter {
            user_id: Some(user.id),
            ..Default::default()
        };
        let page = PageRequest::new(page, limit, DEFAULT_PAGE_SIZE);
        Ok(self.orders.list(&filter, page).await?)
    }

    /// Visible to its owner and to admins; anyone else sees a 404
    pub async fn get(&self, user: &User, id: &OrderId) -> Result<Order, AppError> {
        self.orders
            .find_by_id(id)
            .await?
            .filter(|o| o.user_id == user.id || user.is_administrator())
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    /// Customer cancellation; stock is returned
    pub async fn cancel(&self, user: &User, id: &OrderId) -> Result<Order, AppError> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .filter(|o| o.user_id == user.id)
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if !order.status.customer_cancellable() {
            return Err(DomainError::Validation(format!(
                "Order cannot be cancelled once {}",
                order.status
            ))
            .into());
        }

        let order = self.orders.cancel(id, OrderStatus::CUSTOMER_CANCELLABLE).await?;
        tracing::info!(order_id = %id, "Order cancelled by customer");
        record_activity(
            self.activity.as_ref(),
            NewActivity::new(ActivityAction::OrderCancelled, "Order cancelled by customer")
                .by(user.id)
                .on(id.0),
        )
        .await;

        Ok(order)
    }

    /// Admin listing, optionally narrowed by status
    pub async fn list_all(
        &self,
        status: Option<&str>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Page<Order>, AppError> {
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_field::<OrderStatus>(raw)?),
            None => None,
        };
        let filter = OrderFilter {
            status,
            ..Default::default()
        };
        let page = PageRequest::new(page, limit, DEFAULT_PAGE_SIZE);
        Ok(self.orders.list(&filter, page).await?)
    }

    /// Admin status change. Cancelling goes through the stock-restoring path.
    pub async fn update_status(
        &self,
        actor: &User,
        id: &OrderId,
        status: &str,
        tracking_number: Option<String>,
    ) -> Result<Order, AppError> {
        let next = parse_field::<OrderStatus>(status)?;
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if !order.status.can_transition_to(next) {
            return Err(DomainError::Validation(format!(
                "Cannot change order status from {} to {}",
                order.status, next
            ))
            .into());
        }

        let updated = if next == OrderStatus::Cancelled {
            self.orders.cancel(id, OrderStatus::OPEN).await?
        } else {
            self.orders.update_status(id, next, tracking_number).await?
        };

        tracing::info!(order_id = %id, from = %order.status, to = %next, "Order status changed");
        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::OrderStatusChanged,
                format!("Order status changed from {} to {}", order.status, next),
            )
            .by(actor.id)
            .on(id.0),
        )
        .await;

        Ok(updated)
    }
}
