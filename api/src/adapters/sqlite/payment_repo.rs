//! SQLite adapter for PaymentRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{
    NewPayment, OrderId, Page, PageRequest, Payment, PaymentId, PaymentProvider, PaymentUpdate,
    TransactionStatus, UserId,
};
use crate::domain::ports::PaymentRepository;
use crate::entity::{orders, payments};
use crate::error::DomainError;

/// SQLite implementation of PaymentRepository
pub struct SqlitePaymentRepository {
    db: DatabaseConnection,
}

impl SqlitePaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_one(
        &self,
        column: payments::Column,
        value: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let result = payments::Entity::find()
            .filter(column.eq(value))
            .order_by_desc(payments::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: &NewPayment) -> Result<Payment, DomainError> {
        let now = Utc::now();
        let model = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(payment.order_id.0),
            amount: Set(payment.amount),
            currency: Set(payment.currency.clone()),
            payment_method: Set(payment.payment_method.to_string()),
            status: Set(payment.status.to_string()),
            transaction_id: Set(payment.transaction_id.clone()),
            stripe_payment_intent_id: Set(payment.stripe_payment_intent_id.clone()),
            stripe_charge_id: Set(None),
            refund_amount: Set(None),
            refund_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await.map_err(db_err)?;
        Ok(result.into())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let result = payments::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_intent_id(&self, intent_id: &str) -> Result<Option<Payment>, DomainError> {
        self.find_one(payments::Column::StripePaymentIntentId, intent_id)
            .await
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        self.find_one(payments::Column::TransactionId, transaction_id)
            .await
    }

    async fn update(&self, id: &PaymentId, update: &PaymentUpdate) -> Result<Payment, DomainError> {
        let mut model = payments::ActiveModel {
            id: Set(id.0),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(v) = &update.transaction_id {
            model.transaction_id = Set(Some(v.clone()));
        }
        if let Some(v) = &update.stripe_charge_id {
            model.stripe_charge_id = Set(Some(v.clone()));
        }
        if let Some(v) = update.refund_amount {
            model.refund_amount = Set(Some(v));
        }
        if let Some(v) = &update.refund_reason {
            model.refund_reason = Set(Some(v.clone()));
        }

        let result = model.update(&self.db).await.map_err(db_err)?;
        Ok(result.into())
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Payment>, DomainError> {
        let order_ids: Vec<Uuid> = orders::Entity::find()
            .select_only()
            .column(orders::Column::Id)
            .filter(orders::Column::UserId.eq(user_id.0))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let query = payments::Entity::find()
            .filter(payments::Column::OrderId.is_in(order_ids))
            .order_by_desc(payments::Column::CreatedAt);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(Page::new(
            rows.into_iter().map(|m| m.into()).collect(),
            total,
            page,
        ))
    }
}

impl From<payments::Model> for Payment {
    fn from(model: payments::Model) -> Self {
        Payment {
            id: PaymentId(model.id),
            order_id: OrderId(model.order_id),
            amount: model.amount,
            currency: model.currency,
            payment_method: model
                .payment_method
                .parse()
                .unwrap_or(PaymentProvider::Stripe),
            status: model.status.parse().unwrap_or(TransactionStatus::Pending),
            transaction_id: model.transaction_id,
            stripe_payment_intent_id: model.stripe_payment_intent_id,
            stripe_charge_id: model.stripe_charge_id,
            refund_amount: model.refund_amount,
            refund_reason: model.refund_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
