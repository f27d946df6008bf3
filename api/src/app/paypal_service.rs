//! PayPal service
//!
//! Builds checkout orders, captures approved payments and reacts to PayPal
//! webhooks. Amounts are computed in minor units and formatted for PayPal.

use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::app::activity::record_activity;
use crate::domain::entities::{
    format_minor_units, is_currency_code, to_minor_units, ActivityAction, NewActivity,
    NewPayment, Order, OrderId, OrderStatus, PaymentProvider, PaymentStatus, PaymentUpdate,
    TransactionStatus, User, DEFAULT_CURRENCY,
};
use crate::domain::ports::{
    ActivityRepository, AmountBreakdown, ApplicationContext, Money, OrderRepository,
    PayPalGateway, PayPalItem, PayPalOrder, PayPalOrderRequest, PayPalRefundRequest,
    PaymentRepository, PurchaseAmount, PurchaseUnit, WebhookVerification,
};
use crate::error::{AppError, DomainError};

/// Tax charged on top of the item total, in percent
pub const TAX_RATE_PERCENT: i64 = 10;
/// Largest unit price accepted for a checkout line
pub const MAX_ITEM_PRICE: f64 = 1_000_000.0;
pub const DEFAULT_REFUND_NOTE: &str = "Refund request";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayPalLineItem {
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayPalOrder {
    pub items: Vec<PayPalLineItem>,
    pub currency: Option<String>,
    pub return_url: String,
    pub cancel_url: String,
    /// Local order the payment is for
    pub order_id: Option<OrderId>,
}

/// Transmission headers PayPal sends with every webhook
#[derive(Debug, Clone, Default)]
pub struct PayPalWebhookHeaders {
    pub auth_algo: Option<String>,
    pub cert_url: Option<String>,
    pub transmission_id: Option<String>,
    pub transmission_sig: Option<String>,
    pub transmission_time: Option<String>,
}

/// Minor-unit totals of a checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub item_total: i64,
    pub tax: i64,
    pub total: i64,
}

impl Totals {
    pub fn of(items: &[PayPalLineItem]) -> Result<Self, DomainError> {
        let item_total = items
            .iter()
            .try_fold(0i64, |sum, i| {
                to_minor_units(i.price)
                    .checked_mul(i64::from(i.quantity))
                    .and_then(|line| sum.checked_add(line))
            })
            .ok_or_else(amount_too_large)?;
        Self::from_item_total(item_total)
    }

    /// Totals for an item total already in minor units
    pub fn from_item_total(item_total: i64) -> Result<Self, DomainError> {
        let tax = item_total
            .checked_mul(TAX_RATE_PERCENT)
            .and_then(|t| t.checked_add(50))
            .map(|t| t / 100)
            .ok_or_else(amount_too_large)?;
        let total = item_total.checked_add(tax).ok_or_else(amount_too_large)?;
        Ok(Self {
            item_total,
            tax,
            total,
        })
    }
}

fn amount_too_large() -> DomainError {
    DomainError::Validation("Order amount is too large".to_string())
}

pub struct PayPalService<PG, OR, PR, AR>
where
    PG: PayPalGateway + ?Sized,
    OR: OrderRepository,
    PR: PaymentRepository,
    AR: ActivityRepository,
{
    gateway: Arc<PG>,
    orders: Arc<OR>,
    payments: Arc<PR>,
    activity: Arc<AR>,
    brand_name: String,
    webhook_id: Option<String>,
}

impl<PG, OR, PR, AR> PayPalService<PG, OR, PR, AR>
where
    PG: PayPalGateway + ?Sized,
    OR: OrderRepository,
    PR: PaymentRepository,
    AR: ActivityRepository,
{
    pub fn new(
        gateway: Arc<PG>,
        orders: Arc<OR>,
        payments: Arc<PR>,
        activity: Arc<AR>,
        brand_name: String,
        webhook_id: Option<String>,
    ) -> Self {
        Self {
            gateway,
            orders,
            payments,
            activity,
            brand_name,
            webhook_id,
        }
    }

    /// Create a checkout order. When it pays for a local order, that order
    /// must belong to the caller, be payable, and the items must add up to
    /// its total.
    pub async fn create_order(
        &self,
        user: &User,
        input: &CreatePayPalOrder,
    ) -> Result<PayPalOrder, AppError> {
        let request = build_order_request(input, &self.brand_name)?;
        if let Some(order_id) = &input.order_id {
            let order = self
                .orders
                .find_by_id(order_id)
                .await?
                .filter(|o| o.user_id == user.id)
                .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
            if order.payment_status == PaymentStatus::Paid {
                return Err(DomainError::Validation("Order is already paid".to_string()).into());
            }
            if order.status == OrderStatus::Cancelled {
                return Err(DomainError::Validation("Order is cancelled".to_string()).into());
            }
            if Totals::of(&input.items)?.item_total != to_minor_units(order.total) {
                return Err(DomainError::Validation(
                    "Items do not add up to the order total".to_string(),
                )
                .into());
            }
        }

        let order = self.gateway.create_order(&request).await?;

        tracing::info!(
            paypal_order_id = %order.id,
            total = %request.purchase_units[0].amount.value,
            "PayPal order created"
        );
        Ok(order)
    }

    /// Capture an approved order. When the purchase unit references a local
    /// order, the completed capture is recorded and the order marked paid.
    pub async fn capture_order(&self, paypal_order_id: &str) -> Result<PayPalOrder, AppError> {
        let captured = self.gateway.capture_order(paypal_order_id).await?;
        tracing::info!(paypal_order_id, status = %captured.status, "PayPal order captured");

        for unit in &captured.purchase_units {
            if let Some(capture) = CompletedCapture::from_unit(unit) {
                self.record_capture(capture).await?;
            }
        }

        Ok(captured)
    }

    pub async fn order_details(&self, paypal_order_id: &str) -> Result<Value, AppError> {
        Ok(self.gateway.get_order(paypal_order_id).await?)
    }

    pub async fn refund(
        &self,
        capture_id: &str,
        amount: Option<f64>,
        reason: Option<String>,
    ) -> Result<Value, AppError> {
        if amount.is_some_and(|a| !a.is_finite() || a <= 0.0) {
            return Err(DomainError::Validation("Refund amount must be positive".to_string()).into());
        }

        let request = PayPalRefundRequest {
            amount: amount.map(|a| Money {
                currency_code: DEFAULT_CURRENCY.to_string(),
                value: format_minor_units(to_minor_units(a)),
            }),
            note_to_payer: reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REFUND_NOTE.to_string()),
        };
        let refund = self.gateway.refund_capture(capture_id, &request).await?;

        tracing::info!(capture_id, "PayPal capture refunded");
        self.mark_refunded(capture_id, amount, Some(request.note_to_payer))
            .await?;
        Ok(refund)
    }

    /// Verify and apply a webhook event
    pub async fn handle_webhook(
        &self,
        headers: PayPalWebhookHeaders,
        event: Value,
    ) -> Result<(), AppError> {
        let webhook_id = self
            .webhook_id
            .clone()
            .ok_or_else(|| AppError::Internal("PayPal webhook id is not configured".to_string()))?;

        let missing = || AppError::BadRequest("Missing PayPal transmission headers".to_string());
        let verification = WebhookVerification {
            auth_algo: headers.auth_algo.ok_or_else(missing)?,
            cert_url: headers.cert_url.ok_or_else(missing)?,
            transmission_id: headers.transmission_id.ok_or_else(missing)?,
            transmission_sig: headers.transmission_sig.ok_or_else(missing)?,
            transmission_time: headers.transmission_time.ok_or_else(missing)?,
            webhook_id,
            webhook_event: event.clone(),
        };

        if !self.gateway.verify_webhook_signature(&verification).await? {
            tracing::warn!("Rejected PayPal webhook with invalid signature");
            return Err(AppError::BadRequest("Invalid webhook signature".to_string()));
        }

        let event_type = event["event_type"].as_str().unwrap_or_default();
        let resource = &event["resource"];
        let resource_id = resource["id"].as_str().unwrap_or_default();

        match event_type {
            "PAYMENT.CAPTURE.COMPLETED" => {
                tracing::info!(capture_id = resource_id, "PayPal capture completed");
                if let Some(capture) = CompletedCapture::from_resource(resource) {
                    self.record_capture(capture).await?;
                }
            }
            "PAYMENT.CAPTURE.DENIED" => {
                tracing::warn!(capture_id = resource_id, "PayPal capture denied");
                self.mark_failed(resource_id).await?;
            }
            "PAYMENT.CAPTURE.REFUNDED" => {
                let capture_id = refunded_capture_id(resource).unwrap_or(resource_id);
                tracing::info!(capture_id, "PayPal capture refunded");
                let amount = resource["amount"]["value"]
                    .as_str()
                    .and_then(|v| v.parse::<f64>().ok());
                self.mark_refunded(capture_id, amount, None).await?;
            }
            other => tracing::info!(event_type = other, "Unhandled PayPal webhook event"),
        }

        Ok(())
    }

    async fn record_capture(&self, capture: CompletedCapture) -> Result<(), AppError> {
        let Some(order) = self.orders.find_by_id(&capture.order_id).await? else {
            tracing::warn!(order_id = %capture.order_id, "Capture references unknown order");
            return Ok(());
        };

        let existing = self
            .payments
            .find_by_transaction_id(&capture.capture_id)
            .await?;

        if !capture.covers(&order)? {
            tracing::warn!(
                order_id = %order.id,
                capture_id = %capture.capture_id,
                captured = ?capture.amount,
                expected = order.total,
                "PayPal capture amount does not match order, leaving it unpaid"
            );
            if existing.is_none() {
                self.payments
                    .create(&NewPayment {
                        order_id: order.id,
                        amount: capture.amount.unwrap_or(0.0),
                        currency: capture.currency,
                        payment_method: PaymentProvider::PayPal,
                        status: TransactionStatus::Failed,
                        transaction_id: Some(capture.capture_id),
                        stripe_payment_intent_id: None,
                    })
                    .await?;
            }
            return Ok(());
        }

        match existing {
            Some(existing) if existing.status == TransactionStatus::Completed => return Ok(()),
            Some(existing) => {
                self.payments
                    .update(
                        &existing.id,
                        &PaymentUpdate {
                            status: Some(TransactionStatus::Completed),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            None => {
                self.payments
                    .create(&NewPayment {
                        order_id: order.id,
                        amount: capture.amount.unwrap_or(order.total),
                        currency: capture.currency,
                        payment_method: PaymentProvider::PayPal,
                        status: TransactionStatus::Completed,
                        transaction_id: Some(capture.capture_id.clone()),
                        stripe_payment_intent_id: None,
                    })
                    .await?;
            }
        }

        let next = (order.status == OrderStatus::Pending).then_some(OrderStatus::Processing);
        self.orders
            .update_payment_status(&order.id, PaymentStatus::Paid, next)
            .await?;

        record_activity(
            self.activity.as_ref(),
            NewActivity::new(
                ActivityAction::PaymentCompleted,
                format!("PayPal capture {} completed", capture.capture_id),
            )
            .by(order.user_id)
            .on(order.id.0),
        )
        .await;
        Ok(())
    }

    async fn mark_failed(&self, capture_id: &str) -> Result<(), AppError> {
        let Some(payment) = self.payments.find_by_transaction_id(capture_id).await? else {
            return Ok(());
        };
        self.payments
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
        Ok(())
    }

    async fn mark_refunded(
        &self,
        capture_id: &str,
        amount: Option<f64>,
        reason: Option<String>,
    ) -> Result<(), AppError> {
        let Some(payment) = self.payments.find_by_transaction_id(capture_id).await? else {
            tracing::debug!(capture_id, "No local payment for refunded capture");
            return Ok(());
        };
        self.payments
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
                format!("PayPal capture {} refunded", capture_id),
            )
            .on(payment.order_id.0),
        )
        .await;
        Ok(())
    }
}

/// A completed capture tied to a local order
#[derive(Debug, Clone, PartialEq)]
struct CompletedCapture {
    order_id: OrderId,
    capture_id: String,
    amount: Option<f64>,
    currency: String,
}

impl CompletedCapture {
    /// From a purchase unit of a capture response
    fn from_unit(unit: &Value) -> Option<Self> {
        let order_id = unit["reference_id"].as_str()?.parse::<uuid::Uuid>().ok()?;
        let capture = unit["payments"]["captures"]
            .as_array()?
            .iter()
            .find(|c| c["status"] == "COMPLETED")?;
        Self::build(OrderId(order_id), capture)
    }

    /// From the capture resource of a webhook event. The local order id
    /// travels in `custom_id`; `related_ids.order_id` is PayPal's own order.
    fn from_resource(resource: &Value) -> Option<Self> {
        let order_id = resource["custom_id"].as_str()?.parse::<uuid::Uuid>().ok()?;
        Self::build(OrderId(order_id), resource)
    }

    /// Whether the captured amount is what the order charges, tax included
    fn covers(&self, order: &Order) -> Result<bool, DomainError> {
        let expected = Totals::from_item_total(to_minor_units(order.total))?.total;
        Ok(self.amount.map(to_minor_units) == Some(expected))
    }

    fn build(order_id: OrderId, capture: &Value) -> Option<Self> {
        Some(Self {
            order_id,
            capture_id: capture["id"].as_str()?.to_string(),
            amount: capture["amount"]["value"]
                .as_str()
                .and_then(|v| v.parse::<f64>().ok()),
            currency: capture["amount"]["currency_code"]
                .as_str()
                .unwrap_or(DEFAULT_CURRENCY)
                .to_string(),
        })
    }
}

/// Refund resources link back to their capture with `rel: "up"`
fn refunded_capture_id(resource: &Value) -> Option<&str> {
    resource["links"]
        .as_array()?
        .iter()
        .find(|l| l["rel"] == "up")?["href"]
        .as_str()?
        .rsplit('/')
        .next()
}

fn validate_url(raw: &str, field: &str) -> Result<(), DomainError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(DomainError::Validation(format!("{} must be a valid URL", field))),
    }
}

/// Validate the checkout and build the CAPTURE order PayPal expects
pub fn build_order_request(
    input: &CreatePayPalOrder,
    brand_name: &str,
) -> Result<PayPalOrderRequest, DomainError> {
    if input.items.is_empty() {
        return Err(DomainError::Validation("At least one item is required".to_string()));
    }
    for item in &input.items {
        if item.name.trim().is_empty() {
            return Err(DomainError::Validation("Item name is required".to_string()));
        }
        if item.quantity < 1 {
            return Err(DomainError::Validation("Item quantity must be at least 1".to_string()));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(DomainError::Validation("Item price must be non-negative".to_string()));
        }
        if item.price > MAX_ITEM_PRICE {
            return Err(DomainError::Validation(format!(
                "Item price cannot exceed {}",
                MAX_ITEM_PRICE
            )));
        }
    }
    validate_url(&input.return_url, "returnUrl")?;
    validate_url(&input.cancel_url, "cancelUrl")?;

    let currency = input
        .currency
        .as_deref()
        .unwrap_or(DEFAULT_CURRENCY)
        .to_uppercase();
    if !is_currency_code(&currency) {
        return Err(DomainError::Validation(format!("Invalid currency: {}", currency)));
    }

    let money = |minor: i64| Money {
        currency_code: currency.clone(),
        value: format_minor_units(minor),
    };
    let totals = Totals::of(&input.items)?;

    Ok(PayPalOrderRequest {
        intent: "CAPTURE".to_string(),
        purchase_units: vec![PurchaseUnit {
            reference_id: input.order_id.map(|id| id.to_string()),
            custom_id: input.order_id.map(|id| id.to_string()),
            amount: PurchaseAmount {
                currency_code: currency.clone(),
                value: format_minor_units(totals.total),
                breakdown: AmountBreakdown {
                    item_total: money(totals.item_total),
                    tax_total: money(totals.tax),
                },
            },
            items: input
                .items
                .iter()
                .map(|item| PayPalItem {
                    name: item.name.trim().to_string(),
                    quantity: item.quantity.to_string(),
                    unit_amount: money(to_minor_units(item.price)),
                    sku: item.sku.clone(),
                })
                .collect(),
        }],
        application_context: ApplicationContext {
            return_url: input.return_url.clone(),
            cancel_url: input.cancel_url.clone(),
            brand_name: brand_name.to_string(),
            landing_page: "BILLING".to_string(),
            user_action: "PAY_NOW".to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        test_order, test_payment, test_user, test_user_with_email, InMemoryActivityRepository,
        InMemoryOrderRepository, InMemoryPaymentRepository, MockPayPalGateway,
    };
    use serde_json::json;

    type Service = PayPalService<
        MockPayPalGateway,
        InMemoryOrderRepository,
        InMemoryPaymentRepository,
        InMemoryActivityRepository,
    >;

    struct Fixture {
        service: Service,
        gateway: Arc<MockPayPalGateway>,
        orders: Arc<InMemoryOrderRepository>,
        payments: Arc<InMemoryPaymentRepository>,
    }

    fn create_service(
        gateway: MockPayPalGateway,
        orders: InMemoryOrderRepository,
        payments: InMemoryPaymentRepository,
        webhook_id: Option<&str>,
    ) -> Fixture {
        let gateway = Arc::new(gateway);
        let orders = Arc::new(orders);
        let payments = Arc::new(payments);
        Fixture {
            service: PayPalService::new(
                gateway.clone(),
                orders.clone(),
                payments.clone(),
                Arc::new(InMemoryActivityRepository::new()),
                "Test Boutique".to_string(),
                webhook_id.map(str::to_string),
            ),
            gateway,
            orders,
            payments,
        }
    }

    fn checkout(items: Vec<(&str, i32, f64)>) -> CreatePayPalOrder {
        CreatePayPalOrder {
            items: items
                .into_iter()
                .map(|(name, quantity, price)| PayPalLineItem {
                    name: name.to_string(),
                    quantity,
                    price,
                    sku: None,
                })
                .collect(),
            currency: None,
            return_url: "https://shop.example.com/paypal/return".to_string(),
            cancel_url: "https://shop.example.com/paypal/cancel".to_string(),
            order_id: None,
        }
    }

    fn signed_headers() -> PayPalWebhookHeaders {
        PayPalWebhookHeaders {
            auth_algo: Some("SHA256withRSA".to_string()),
            cert_url: Some("https://api.paypal.com/cert".to_string()),
            transmission_id: Some("tx-1".to_string()),
            transmission_sig: Some("sig".to_string()),
            transmission_time: Some("2024-01-01T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn totals_in_minor_units() {
        let totals =
            Totals::of(&checkout(vec![("Ring", 2, 19.99), ("Chain", 1, 0.1)]).items).unwrap();

        assert_eq!(totals.item_total, 4008);
        assert_eq!(totals.tax, 401);
        assert_eq!(totals.total, 4409);
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let huge = checkout(vec![("Tiara", 2, 1e17)]);
        assert!(matches!(
            Totals::of(&huge.items),
            Err(DomainError::Validation(_))
        ));
        assert!(Totals::from_item_total(i64::MAX).is_err());
        assert!(matches!(
            build_order_request(&huge, "B"),
            Err(DomainError::Validation(msg)) if msg.contains("cannot exceed")
        ));

        let many = checkout(vec![("Ring", i32::MAX, MAX_ITEM_PRICE)]);
        let totals = Totals::of(&many.items).unwrap();
        assert_eq!(totals.item_total, 100_000_000 * i64::from(i32::MAX));
    }

    #[test]
    fn request_shape() {
        let mut input = checkout(vec![("Ring", 2, 100.0)]);
        let order_id = OrderId::new();
        input.order_id = Some(order_id);

        let request = build_order_request(&input, "Boutique").unwrap();

        assert_eq!(request.intent, "CAPTURE");
        let unit = &request.purchase_units[0];
        assert_eq!(unit.reference_id, Some(order_id.to_string()));
        assert_eq!(unit.custom_id, Some(order_id.to_string()));
        assert_eq!(unit.amount.value, "220.00");
        assert_eq!(unit.amount.breakdown.item_total.value, "200.00");
        assert_eq!(unit.amount.breakdown.tax_total.value, "20.00");
        assert_eq!(unit.items[0].quantity, "2");
        assert_eq!(unit.items[0].unit_amount.value, "100.00");
        assert_eq!(request.application_context.landing_page, "BILLING");
        assert_eq!(request.application_context.user_action, "PAY_NOW");
        assert_eq!(request.application_context.brand_name, "Boutique");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["purchase_units"][0]["amount"]["currency_code"], "USD");
        assert!(json["purchase_units"][0]["items"][0].get("sku").is_none());
    }

    #[test]
    fn request_validation() {
        assert!(build_order_request(&checkout(vec![]), "B").is_err());
        assert!(build_order_request(&checkout(vec![("", 1, 1.0)]), "B").is_err());
        assert!(build_order_request(&checkout(vec![("Ring", 0, 1.0)]), "B").is_err());
        assert!(build_order_request(&checkout(vec![("Ring", 1, -1.0)]), "B").is_err());

        let mut bad_url = checkout(vec![("Ring", 1, 1.0)]);
        bad_url.return_url = "not a url".to_string();
        assert!(build_order_request(&bad_url, "B").is_err());

        let mut bad_currency = checkout(vec![("Ring", 1, 1.0)]);
        bad_currency.currency = Some("DOLLARS".to_string());
        assert!(build_order_request(&bad_currency, "B").is_err());
    }

    #[tokio::test]
    async fn create_order_sends_request() {
        let fx = create_service(
            MockPayPalGateway::new(),
            InMemoryOrderRepository::new(),
            InMemoryPaymentRepository::new(),
            None,
        );

        let order = fx
            .service
            .create_order(&test_user(), &checkout(vec![("Ring", 1, 50.0)]))
            .await
            .unwrap();

        assert_eq!(order.status, "CREATED");
        assert!(order.links.iter().any(|l| l.rel == "approve"));
        assert_eq!(fx.gateway.created.read().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_order_checks_the_local_order() {
        let owner = test_user();
        let order = test_order(owner.id, OrderStatus::Pending);
        let mut paid = test_order(owner.id, OrderStatus::Processing);
        paid.payment_status = PaymentStatus::Paid;
        let fx = create_service(
            MockPayPalGateway::new(),
            InMemoryOrderRepository::new()
                .with_order(order.clone())
                .with_order(paid.clone()),
            InMemoryPaymentRepository::new(),
            None,
        );
        let for_order = |id: OrderId, price: f64| {
            let mut input = checkout(vec![("Gold Band", 2, price)]);
            input.order_id = Some(id);
            input
        };

        let stranger = test_user_with_email("eve@example.com");
        let err = fx
            .service
            .create_order(&stranger, &for_order(order.id, 250.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = fx
            .service
            .create_order(&owner, &for_order(order.id, 0.01))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::Validation(msg)) if msg.contains("add up")));

        let err = fx
            .service
            .create_order(&owner, &for_order(paid.id, 250.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::Validation(msg)) if msg.contains("already paid")));
        assert!(fx.gateway.created.read().unwrap().is_empty());

        fx.service
            .create_order(&owner, &for_order(order.id, 250.0))
            .await
            .unwrap();
        let sent = fx.gateway.created.read().unwrap()[0].clone();
        assert_eq!(sent.purchase_units[0].amount.value, "550.00");
    }

    #[tokio::test]
    async fn capture_records_payment_and_marks_order_paid() {
        let order = test_order(test_user().id, OrderStatus::Pending);
        let fx = create_service(
            MockPayPalGateway::new().with_capture(&order.id.to_string(), "CAPTURE-1", "550.00"),
            InMemoryOrderRepository::new().with_order(order.clone()),
            InMemoryPaymentRepository::new(),
            None,
        );

        fx.service.capture_order("PAYPAL-ORDER-1").await.unwrap();

        let payments = fx.payments.all();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].transaction_id.as_deref(), Some("CAPTURE-1"));
        assert_eq!(payments[0].status, TransactionStatus::Completed);
        assert_eq!(payments[0].amount, 550.0);

        let stored = fx.orders.get(&order.id).unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.status, OrderStatus::Processing);

        // A repeated capture notification is idempotent
        fx.service.capture_order("PAYPAL-ORDER-1").await.unwrap();
        assert_eq!(fx.payments.all().len(), 1);
    }

    #[tokio::test]
    async fn underpaid_capture_leaves_order_unpaid() {
        let order = test_order(test_user().id, OrderStatus::Pending);
        let fx = create_service(
            MockPayPalGateway::new().with_capture(&order.id.to_string(), "CAPTURE-2", "0.01"),
            InMemoryOrderRepository::new().with_order(order.clone()),
            InMemoryPaymentRepository::new(),
            None,
        );

        fx.service.capture_order("PAYPAL-ORDER-2").await.unwrap();

        let stored = fx.orders.get(&order.id).unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Pending);
        assert_eq!(stored.status, OrderStatus::Pending);
        let payments = fx.payments.all();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].status, TransactionStatus::Failed);
        assert_eq!(payments[0].amount, 0.01);
    }

    #[tokio::test]
    async fn capture_without_local_order_records_nothing() {
        let fx = create_service(
            MockPayPalGateway::new().with_capture("not-a-uuid", "CAPTURE-1", "10.00"),
            InMemoryOrderRepository::new(),
            InMemoryPaymentRepository::new(),
            None,
        );

        fx.service.capture_order("PAYPAL-ORDER-1").await.unwrap();

        assert!(fx.payments.all().is_empty());
    }

    #[tokio::test]
    async fn refund_uses_default_note() {
        let order = test_order(test_user().id, OrderStatus::Processing);
        let mut payment = test_payment(order.id, PaymentProvider::PayPal);
        payment.transaction_id = Some("CAPTURE-9".to_string());
        let fx = create_service(
            MockPayPalGateway::new(),
            InMemoryOrderRepository::new().with_order(order.clone()),
            InMemoryPaymentRepository::new().with_payment(payment),
            None,
        );

        fx.service.refund("CAPTURE-9", Some(12.5), None).await.unwrap();

        let refunds = fx.gateway.refunds.read().unwrap().clone();
        assert_eq!(refunds[0].0, "CAPTURE-9");
        assert_eq!(refunds[0].1.note_to_payer, DEFAULT_REFUND_NOTE);
        assert_eq!(
            refunds[0].1.amount,
            Some(Money {
                currency_code: "USD".to_string(),
                value: "12.50".to_string()
            })
        );
        assert_eq!(fx.payments.all()[0].status, TransactionStatus::Refunded);
        assert_eq!(
            fx.orders.get(&order.id).unwrap().payment_status,
            PaymentStatus::Refunded
        );
    }

    #[tokio::test]
    async fn refund_rejects_non_positive_amount() {
        let fx = create_service(
            MockPayPalGateway::new(),
            InMemoryOrderRepository::new(),
            InMemoryPaymentRepository::new(),
            None,
        );

        assert!(fx.service.refund("CAPTURE-9", Some(0.0), None).await.is_err());
    }

    #[tokio::test]
    async fn webhook_without_id_is_internal_error() {
        let fx = create_service(
            MockPayPalGateway::new(),
            InMemoryOrderRepository::new(),
            InMemoryPaymentRepository::new(),
            None,
        );

        let err = fx
            .service
            .handle_webhook(signed_headers(), json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_is_rejected() {
        let fx = create_service(
            MockPayPalGateway::new().with_invalid_signatures(),
            InMemoryOrderRepository::new(),
            InMemoryPaymentRepository::new(),
            Some("WH-1"),
        );

        let err = fx
            .service
            .handle_webhook(signed_headers(), json!({ "event_type": "PAYMENT.CAPTURE.COMPLETED" }))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("signature")));
    }

    #[tokio::test]
    async fn webhook_missing_headers_is_bad_request() {
        let fx = create_service(
            MockPayPalGateway::new(),
            InMemoryOrderRepository::new(),
            InMemoryPaymentRepository::new(),
            Some("WH-1"),
        );

        let err = fx
            .service
            .handle_webhook(PayPalWebhookHeaders::default(), json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn webhook_completed_capture_uses_custom_id() {
        let order = test_order(test_user().id, OrderStatus::Pending);
        let fx = create_service(
            MockPayPalGateway::new(),
            InMemoryOrderRepository::new().with_order(order.clone()),
            InMemoryPaymentRepository::new(),
            Some("WH-1"),
        );

        fx.service
            .handle_webhook(
                signed_headers(),
                json!({
                    "id": "WH-EVENT-1",
                    "event_type": "PAYMENT.CAPTURE.COMPLETED",
                    "resource": {
                        "id": "CAPTURE-5",
                        "status": "COMPLETED",
                        "amount": { "currency_code": "USD", "value": "550.00" },
                        "custom_id": order.id.to_string(),
                        "final_capture": true,
                        "supplementary_data": {
                            "related_ids": { "order_id": "5O190127TN364715T" }
                        },
                        "links": [
                            { "href": "https://api.paypal.com/v2/payments/captures/CAPTURE-5", "rel": "self" },
                            { "href": "https://api.paypal.com/v2/checkout/orders/5O190127TN364715T", "rel": "up" }
                        ]
                    }
                }),
            )
            .await
            .unwrap();

        let payments = fx.payments.all();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].transaction_id.as_deref(), Some("CAPTURE-5"));
        assert_eq!(payments[0].status, TransactionStatus::Completed);
        assert_eq!(
            fx.orders.get(&order.id).unwrap().payment_status,
            PaymentStatus::Paid
        );
    }

    #[tokio::test]
    async fn webhook_denied_marks_payment_failed() {
        let order = test_order(test_user().id, OrderStatus::Pending);
        let mut payment = test_payment(order.id, PaymentProvider::PayPal);
        payment.status = TransactionStatus::Pending;
        payment.transaction_id = Some("CAPTURE-7".to_string());
        let fx = create_service(
            MockPayPalGateway::new(),
            InMemoryOrderRepository::new().with_order(order.clone()),
            InMemoryPaymentRepository::new().with_payment(payment),
            Some("WH-1"),
        );

        fx.service
            .handle_webhook(
                signed_headers(),
                json!({
                    "event_type": "PAYMENT.CAPTURE.DENIED",
                    "resource": { "id": "CAPTURE-7" }
                }),
            )
            .await
            .unwrap();

        assert_eq!(fx.payments.all()[0].status, TransactionStatus::Failed);
        assert_eq!(
            fx.orders.get(&order.id).unwrap().payment_status,
            PaymentStatus::Failed
        );
    }

    #[tokio::test]
    async fn webhook_refund_follows_up_link() {
        let order = test_order(test_user().id, OrderStatus::Processing);
        let mut payment = test_payment(order.id, PaymentProvider::PayPal);
        payment.transaction_id = Some("CAPTURE-3".to_string());
        let fx = create_service(
            MockPayPalGateway::new(),
            InMemoryOrderRepository::new().with_order(order),
            InMemoryPaymentRepository::new().with_payment(payment),
            Some("WH-1"),
        );

        fx.service
            .handle_webhook(
                signed_headers(),
                json!({
                    "event_type": "PAYMENT.CAPTURE.REFUNDED",
                    "resource": {
                        "id": "REFUND-1",
                        "amount": { "currency_code": "USD", "value": "100.00" },
                        "links": [
                            { "href": "https://api.paypal.com/v2/payments/refunds/REFUND-1", "rel": "self" },
                            { "href": "https://api.paypal.com/v2/payments/captures/CAPTURE-3", "rel": "up" }
                        ]
                    }
                }),
            )
            .await
            .unwrap();

        let stored = &fx.payments.all()[0];
        assert_eq!(stored.status, TransactionStatus::Refunded);
        assert_eq!(stored.refund_amount, Some(100.0));
    }
}
