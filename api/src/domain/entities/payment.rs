//! Payment domain entity
//!
//! Local record of a charge made through Stripe or PayPal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::entity_id;
use super::order::OrderId;

entity_id!(
    /// Unique identifier for a payment
    PaymentId
);

pub const DEFAULT_CURRENCY: &str = "USD";

/// Payment provider that processed the charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    PayPal,
}

impl std::fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentProvider::Stripe => write!(f, "stripe"),
            PaymentProvider::PayPal => write!(f, "paypal"),
        }
    }
}

impl std::str::FromStr for PaymentProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stripe" | "card" => Ok(PaymentProvider::Stripe),
            "paypal" => Ok(PaymentProvider::PayPal),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

/// Lifecycle of a single payment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Failed => write!(f, "failed"),
            TransactionStatus::Refunded => write!(f, "refunded"),
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            "refunded" => Ok(TransactionStatus::Refunded),
            _ => Err(format!("Unknown transaction status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub amount: f64,
    pub currency: String,
    pub payment_method: PaymentProvider,
    pub status: TransactionStatus,
    pub transaction_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_charge_id: Option<String>,
    pub refund_amount: Option<f64>,
    pub refund_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub amount: f64,
    pub currency: String,
    pub payment_method: PaymentProvider,
    pub status: TransactionStatus,
    pub transaction_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
}

/// Partial payment update; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct PaymentUpdate {
    pub status: Option<TransactionStatus>,
    pub transaction_id: Option<String>,
    pub stripe_charge_id: Option<String>,
    pub refund_amount: Option<f64>,
    pub refund_reason: Option<String>,
}

/// Convert a decimal amount to integer minor units (cents)
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Format minor units as a two-decimal string ("12.30")
pub fn format_minor_units(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let minor = minor.abs();
    format!("{}{}.{:02}", sign, minor / 100, minor % 100)
}

pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}
