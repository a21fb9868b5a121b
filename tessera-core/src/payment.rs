use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::invoice::{Invoice, InvoiceStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// A 3-D Secure challenge was issued and is awaiting resolution.
    Init,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Init => "INIT",
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INIT" => Ok(PaymentStatus::Init),
            "SUCCESS" => Ok(PaymentStatus::Success),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

/// One attempt to settle an invoice via the gateway. An invoice may accumulate
/// multiple attempts (a failed attempt followed by a retry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub uuid: Uuid,
    pub invoice_uuid: Uuid,
    /// Gateway-assigned id, opaque to this service. Absent until the gateway
    /// has acknowledged the charge.
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    /// Minor units of `currency`, copied from the invoice at charge time.
    pub amount: i64,
    pub currency: String,
    pub payer_uuid: Uuid,
    pub error_message: Option<String>,
    /// Integrity token binding (amount, currency, payer, transaction, invoice).
    pub signature: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields the orchestrator supplies when recording a new charge attempt.
/// The store assigns the uuid and timestamps.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub invoice_uuid: Uuid,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub amount: i64,
    pub currency: String,
    pub payer_uuid: Uuid,
    pub error_message: Option<String>,
    pub signature: String,
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Persist a new charge attempt
    async fn create(
        &self,
        payment: NewPayment,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>>;

    /// Persist a settled attempt and move its invoice in the same transaction.
    /// A crash between the two writes must never be observable.
    async fn create_settled(
        &self,
        payment: NewPayment,
        invoice_status: InvoiceStatus,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>>;

    /// Look up an attempt by gateway transaction id, with its invoice eagerly
    /// resolved; the confirmation flow needs both.
    async fn get_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<(Payment, Option<Invoice>)>, Box<dyn std::error::Error + Send + Sync>>;

    /// Move a payment to a new status
    async fn update_status(
        &self,
        uuid: Uuid,
        status: PaymentStatus,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>>;

    /// Move a payment and its invoice to their resolved statuses in the same
    /// transaction. Same atomicity requirement as `create_settled`.
    async fn settle(
        &self,
        payment_uuid: Uuid,
        payment_status: PaymentStatus,
        invoice_uuid: Uuid,
        invoice_status: InvoiceStatus,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>>;
}
