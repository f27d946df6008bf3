//! Activity log entity
//!
//! Audit trail shown on the admin dashboard.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::id::entity_id;
use super::user::UserId;

entity_id!(ActivityLogId);

/// Things worth recording in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
    UserRegistered,
    UserRoleChanged,
    UserStatusToggled,
    UserDeactivated,
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    OrderPlaced,
    OrderStatusChanged,
    OrderCancelled,
    PaymentCompleted,
    PaymentRefunded,
}

impl ActivityAction {
    pub fn entity_type(self) -> &'static str {
        match self {
            ActivityAction::UserRegistered
            | ActivityAction::UserRoleChanged
            | ActivityAction::UserStatusToggled
            | ActivityAction::UserDeactivated => "user",
            ActivityAction::ProductCreated
            | ActivityAction::ProductUpdated
            | ActivityAction::ProductDeleted => "product",
            ActivityAction::OrderPlaced
            | ActivityAction::OrderStatusChanged
            | ActivityAction::OrderCancelled => "order",
            ActivityAction::PaymentCompleted | ActivityAction::PaymentRefunded => "payment",
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityAction::UserRegistered => "user_registered",
            ActivityAction::UserRoleChanged => "user_role_changed",
            ActivityAction::UserStatusToggled => "user_status_toggled",
            ActivityAction::UserDeactivated => "user_deactivated",
            ActivityAction::ProductCreated => "product_created",
            ActivityAction::ProductUpdated => "product_updated",
            ActivityAction::ProductDeleted => "product_deleted",
            ActivityAction::OrderPlaced => "order_placed",
            ActivityAction::OrderStatusChanged => "order_status_changed",
            ActivityAction::OrderCancelled => "order_cancelled",
            ActivityAction::PaymentCompleted => "payment_completed",
            ActivityAction::PaymentRefunded => "payment_refunded",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub user_id: Option<UserId>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: Option<UserId>,
    pub action: ActivityAction,
    pub entity_id: Option<Uuid>,
    pub description: String,
}

impl NewActivity {
    pub fn new(action: ActivityAction, description: impl Into<String>) -> Self {
        Self {
            user_id: None,
            action,
            entity_id: None,
            description: description.into(),
        }
    }

    pub fn by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn on(mut self, entity_id: Uuid) -> Self {
        self.entity_id = Some(entity_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_know_their_entity_type() {
        assert_eq!(ActivityAction::OrderPlaced.entity_type(), "order");
        assert_eq!(ActivityAction::ProductDeleted.entity_type(), "product");
        assert_eq!(ActivityAction::PaymentRefunded.to_string(), "payment_refunded");
    }
}
