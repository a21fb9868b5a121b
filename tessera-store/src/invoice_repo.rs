use async_trait::async_trait;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use tessera_core::invoice::{Invoice, InvoiceRepository, InvoiceStatus};

pub struct StoreInvoiceRepository {
    pool: PgPool,
}

impl StoreInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying. Status is kept as text in the
// database and parsed on the way out.
#[derive(sqlx::FromRow)]
pub(crate) struct InvoiceRow {
    pub(crate) uuid: Uuid,
    pub(crate) value: i64,
    pub(crate) currency: String,
    pub(crate) status: String,
    pub(crate) signature: String,
    pub(crate) created_at: chrono::DateTime<chrono::Utc>,
    pub(crate) updated_at: chrono::DateTime<chrono::Utc>,
}

impl InvoiceRow {
    pub(crate) fn into_invoice(self) -> Result<Invoice, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Invoice {
            uuid: self.uuid,
            value: self.value,
            currency: self.currency,
            status: InvoiceStatus::from_str(&self.status)?,
            signature: self.signature,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl InvoiceRepository for StoreInvoiceRepository {
    async fn get_by_uuid(
        &self,
        uuid: Uuid,
    ) -> Result<Option<Invoice>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<InvoiceRow> = sqlx::query_as(
            "SELECT uuid, value, currency, status, signature, created_at, updated_at FROM invoices WHERE uuid = $1",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    async fn update_status(
        &self,
        uuid: Uuid,
        status: InvoiceStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let result =
            sqlx::query("UPDATE invoices SET status = $1, updated_at = NOW() WHERE uuid = $2")
                .bind(status.as_str())
                .bind(uuid)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(format!("invoice {} not found", uuid).into());
        }
        Ok(())
    }
}
