//! Shopping cart domain entities

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::entity_id;
use super::product::ProductId;
use super::user::UserId;

entity_id!(CartId);
entity_id!(CartItemId);

/// Product fields shown next to a cart line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub sale_price: Option<f64>,
    pub on_sale: bool,
    pub image: Option<String>,
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price captured when the line was added
    pub price: f64,
    pub added_at: DateTime<Utc>,
    pub product: Option<CartProduct>,
}

impl CartItem {
    pub fn subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// A user's cart; there is at most one per user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub total: f64,
    pub item_count: i32,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Recompute `total` and `item_count` from the current lines
    pub fn recalculate(&mut self) {
        let (total, count) = cart_totals(&self.items);
        self.total = total;
        self.item_count = count;
    }
}

/// `(Σ price × quantity, Σ quantity)`, with the total rounded to cents
pub fn cart_totals(items: &[CartItem]) -> (f64, i32) {
    let total: f64 = items.iter().map(CartItem::subtotal).sum();
    let count = items.iter().map(|i| i.quantity).sum();
    ((total * 100.0).round() / 100.0, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, quantity: i32) -> CartItem {
        CartItem {
            id: CartItemId::new(),
            cart_id: CartId::new(),
            product_id: ProductId::new(),
            quantity,
            price,
            added_at: Utc::now(),
            product: None,
        }
    }

    #[test]
    fn totals_sum_lines() {
        let items = vec![item(19.99, 2), item(5.0, 1)];
        assert_eq!(cart_totals(&items), (44.98, 3));
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(cart_totals(&[]), (0.0, 0));
    }
}
