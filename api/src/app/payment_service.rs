//! Payment service (Stripe)
//!
//! Payment intents, confirmation, refunds and Stripe webhook events. Every
//! charge is mirrored by a local `Payment` row.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::app::activity::record_activity;
use crate::domain::entities::{
    to_minor_units, ActivityAction, NewActivity, NewPayment, Order, OrderId, OrderStatus, Page,
    PageRequest, Payment, PaymentId, PaymentProvider, PaymentStatus, PaymentUpdate,
    TransactionStatus, User, DEFAULT_CURRENCY,
};
use crate::domain::ports::{
    ActivityRepository, CreatePaymentIntent, OrderRepository, PaymentIntent, PaymentRepository,
    StripeGateway,
};
use crate::error::{AppError, DomainError};

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// What the storefront needs to finish the payment with Stripe.js
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIntent {
    pub payment_id: PaymentId,
    pub payment_intent_id: String,
    pub client_secret: Option<String>,
    pub amount: f64,
    pub currency: String,
}

pub struct PaymentService<SG, OR, PR, AR>
where
    SG: StripeGateway + ?Sized,
    OR: OrderRepository,
    PR: PaymentRepository,
    AR: ActivityRepository,
{
    stripe: Arc<SG>,
    orders: Arc<OR>,
    payments: Arc<PR>,
    activity: Arc<AR>,
}

impl<SG, OR, PR, AR> PaymentService<SG, OR, PR, AR>
where
    SG: StripeGateway + ?Sized,
    OR: OrderRepository,
    PR: PaymentRepository,
    AR: ActivityRepository,
{
    pub fn new(stripe: Arc<SG>, orders: Arc<OR>, payments: Arc<PR>, activity: Arc<AR>) -> Self {
        Self {
            stripe,
            orders,
            payments,
            activity,
        }
    }

    /// Start a card payment for one of the caller's orders
    pub async fn create_intent(
        &self,
        user: &User,
        order_id: &OrderId,
        payment_method: Option<String>,
    ) -> Result<CreatedIntent, AppError> {
        let order = self.owned_order(user, order_id).await?;
        if order.payment_status == PaymentStatus::Paid {
            return Err(DomainError::Validation("Order is already paid".to_string()).into());
        }
        if order.status == OrderStatus::Cancelled {
            return Err(DomainError::Validation("Order is cancelled".to_string()).into());
        }

        let intent = self
            .stripe
            .create_payment_intent(&CreatePaymentIntent {
                amount: to_minor_units(order.total),
                currency: DEFAULT_CURRENCY.to_lowercase(),
                order_id: order.id.to_string(),
                payment_method_types: vec![payment_method.unwrap_or_else(|| "card".to_string())],
            })
            .await?;

        let payment = self
            .payments
            .create(&NewPayment {
                order_id: order.id,
                amount: order.total,
                currency: DEFAULT_CURRENCY.to_string(),
                payment_method: PaymentProvider::Stripe,
                status: TransactionStatus::Pending,
                transaction_id: None,
                stripe_payment_intent_id: Some(intent.id.clone()),
            })
            .await?;

        tracing::info!(order_id = %order.id, payment_intent = %intent.id, "Payment intent created");
        Ok(CreatedIntent {
            payment_id: payment.id,
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            amount: payment.amount,
            currency: payment.currency,
        })
    }

    /// Sync the local payment with the intent's current state
    pub async fn confirm(&self, user: &User, payment_intent_id: &str) -> Result<Payment, AppError> {
        let payment = self
            .payments
            .find_by_intent_id(payment_intent_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;
        self.owned_order(user, &payment.order_id).await?;

        let intent = self.stripe.retrieve_payment_intent(payment_intent_id).await?;
        self.apply_intent(payment, &intent).await
    }

    pub async fn get(&self, user: &User, id: &PaymentId) -> Result<Payment, AppError> {
        let payment = self
            .payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;
        self.owned_order(user, &payment.order_id).await?;
        Ok(payment)
    }

    pub async fn history(
        &self,
        user: &User,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Page<Payment>, AppError> {
        let page = PageRequest::new(page, limit, DEFAULT_PAGE_SIZE);
        Ok(self.payments.list_by_user(&user.id, page).await?)
    }

    /// Refund a completed Stripe payment, fully or partially
    pub async fn refund(
        &self,
        actor: &User,
        payment_id: &PaymentId,
        amount: Option<f64>,
        reason: Option<String>,
    ) -> Result<Payment, AppError> {
        let payment = self
            .payments
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        if payment.status != TransactionStatus::Completed {
            return Err(DomainError::Validation(
                "Only completed payments can be refunded".to_string(),
            )
            .into());
        }
        let intent_id = match (&payment.payment_method, &payment.stripe_payment_intent_id) {
            (PaymentProvider::Stripe, Some(id)) => id.clone(),
            _ => {
                return Err(DomainError::Validation(
                    "Payment was not made through Stripe".to_string(),
                )
                .into())
            }
        };
        if let Some(amount) = amount {
            if !amount.is_finite() || amount <= 0.0 || amount > payment.amount {
                return Err(DomainError::Validation(format!(
                    "Refund amount must be between 0 and {:.2}",
                    payment.amount
                ))
                .into());
            }
        }

        let refund = self
            .stripe
            .create_refund(&intent_id, amount.map(to_minor_units), reason.as_deref())
            .await?;
        tracing::info!(payment_id = %payment.id, refund_id = %refund.id, "Stripe refund created");

        let updated = self
            .payments
            .update(
                &payment.id,
                &PaymentUpdate {
                    status: Some(TransactionStatus::Refunded),
                    refund_amount: Some(amount.unwrap_or(payment.amount)),
                    refund_reason: reason,
                    ..Default::default()
                },
            )
            .await?;
        self.orders
            .update_payment_status(&payment.order_id, PaymentStatus::Refunded, None)
            .await?;

        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::PaymentRefunded,
                format!("Refunded {:.2} {}", updated.refund_amount.unwrap_or_default(), updated.currency),
            )
            .by(actor.id)
            .on(payment.order_id.0),
        )
        .await;

        Ok(updated)
    }

    /// Apply a verified Stripe webhook event
    pub async fn handle_event(&self, event: &Value) -> Result<(), AppError> {
        let event_type = event["type"].as_str().unwrap_or_default();
        let object = &event["data"]["object"];

        match event_type {
            "payment_intent.succeeded" | "payment_intent.payment_failed" => {
                let intent: PaymentIntent = serde_json::from_value(object.clone())
                    .map_err(|e| AppError::BadRequest(format!("Malformed payment intent: {}", e)))?;
                match self.payments.find_by_intent_id(&intent.id).await? {
                    Some(payment) => {
                        self.apply_intent(payment, &intent).await?;
                    }
                    None => tracing::debug!(payment_intent = %intent.id, "Event for unknown intent"),
                }
            }
            "charge.refunded" => {
                let Some(intent_id) = object["payment_intent"].as_str() else {
                    return Ok(());
                };
                let Some(payment) = self.payments.find_by_intent_id(intent_id).await? else {
                    tracing::debug!(payment_intent = intent_id, "Refund for unknown intent");
                    return Ok(());
                };
                let refunded = object["amount_refunded"]
                    .as_i64()
                    .map(|minor| minor as f64 / 100.0)
                    .unwrap_or(payment.amount);
                self.payments
                    .update(
                        &payment.id,
                        &PaymentUpdate {
                            status: Some(TransactionStatus::Refunded),
                            refund_amount: Some(refunded),
                            ..Default::default()
                        },
                    )
                    .await?;
                self.orders
                    .update_payment_status(&payment.order_id, PaymentStatus::Refunded, None)
                    .await?;
            }
            other => tracing::info!(event_type = other, "Unhandled Stripe webhook event"),
        }

        Ok(())
    }

    async fn apply_intent(&self, payment: Payment, intent: &PaymentIntent) -> Result<Payment, AppError> {
        match intent.status.as_str() {
            "succeeded" => {
                if payment.status == TransactionStatus::Completed {
                    return Ok(payment);
                }
                let updated = self
                    .payments
                    .update(
                        &payment.id,
                        &PaymentUpdate {
                            status: Some(TransactionStatus::Completed),
                            transaction_id: Some(intent.id.clone()),
                            stripe_charge_id: intent.latest_charge.clone(),
                            ..Default::default()
                        },
                    )
                    .await?;

                let order = self.orders.find_by_id(&payment.order_id).await?;
                let next = order
                    .filter(|o| o.status == OrderStatus::Pending)
                    .map(|_| OrderStatus::Processing);
                self.orders
                    .update_payment_status(&payment.order_id, PaymentStatus::Paid, next)
                    .await?;

                tracing::info!(payment_id = %payment.id, "Stripe payment completed");
                record_activity(
                    self.activity.as_ref(),
                    NewActivity::new(
                        ActivityAction::PaymentCompleted,
                        format!("Card payment of {:.2} completed", payment.amount),
                    )
                    .on(payment.order_id.0),
                )
                .await;
                Ok(updated)
            }
            "canceled" | "requires_payment_method" => {
                let updated = self
                    .payments
                    .update(
                        &payment.id,
                        &PaymentUpdate {
                            status: Some(TransactionStatus::Failed),
                            ..Default::default()
                        },
                    )
                    .await?;
                self.orders
                    .update_payment_status(&payment.order_id, PaymentStatus::Failed, None)
                    .await?;
                tracing::info!(payment_id = %payment.id, status = %intent.status, "Stripe payment failed");
                Ok(updated)
            }
            _ => Ok(payment),
        }
    }

    /// Orders are visible to their owner and to admins only
    async fn owned_order(&self, user: &User, id: &OrderId) -> Result<Order, AppError> {
        self.orders
            .find_by_id(id)
            .await?
            .filter(|o| o.user_id == user.id || user.is_administrator())
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }
}
