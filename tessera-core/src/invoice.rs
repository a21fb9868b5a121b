use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invoice status in the payment lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Waiting,
    Paid,
    Failed,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Waiting => "WAITING",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Failed => "FAILED",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }

    /// Paid and Cancelled invoices accept no further charge attempts.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(InvoiceStatus::Pending),
            "WAITING" => Ok(InvoiceStatus::Waiting),
            "PAID" => Ok(InvoiceStatus::Paid),
            "FAILED" => Ok(InvoiceStatus::Failed),
            "CANCELLED" => Ok(InvoiceStatus::Cancelled),
            other => Err(format!("unknown invoice status: {}", other)),
        }
    }
}

/// A billable request for a fixed amount in a fixed currency. Issued by an
/// external invoicing flow; this service only moves its status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub uuid: Uuid,
    /// Monetary value in minor units of `currency`.
    pub value: i64,
    pub currency: String,
    pub status: InvoiceStatus,
    /// Integrity token binding (value, currency, uuid). See `signing`.
    pub signature: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Fetch an invoice by identifier
    async fn get_by_uuid(
        &self,
        uuid: Uuid,
    ) -> Result<Option<Invoice>, Box<dyn std::error::Error + Send + Sync>>;

    /// Move an invoice to a new lifecycle status
    async fn update_status(
        &self,
        uuid: Uuid,
        status: InvoiceStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
