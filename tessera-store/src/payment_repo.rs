use async_trait::async_trait;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use tessera_core::invoice::{Invoice, InvoiceStatus};
use tessera_core::payment::{NewPayment, Payment, PaymentRepository, PaymentStatus};

use crate::invoice_repo::InvoiceRow;

pub struct StorePaymentRepository {
    pool: PgPool,
}

impl StorePaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    uuid: Uuid,
    invoice_uuid: Uuid,
    transaction_id: Option<String>,
    status: String,
    amount: i64,
    currency: String,
    payer_uuid: Uuid,
    error_message: Option<String>,
    signature: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Payment {
            uuid: self.uuid,
            invoice_uuid: self.invoice_uuid,
            transaction_id: self.transaction_id,
            status: PaymentStatus::from_str(&self.status)?,
            amount: self.amount,
            currency: self.currency,
            payer_uuid: self.payer_uuid,
            error_message: self.error_message,
            signature: self.signature,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl PaymentRepository for StorePaymentRepository {
    async fn create(
        &self,
        payment: NewPayment,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        let row: PaymentRow = sqlx::query_as(
            r#"
            INSERT INTO payments (uuid, invoice_uuid, transaction_id, status, amount, currency, payer_uuid, error_message, signature)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING uuid, invoice_uuid, transaction_id, status, amount, currency, payer_uuid, error_message, signature, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payment.invoice_uuid)
        .bind(&payment.transaction_id)
        .bind(payment.status.as_str())
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.payer_uuid)
        .bind(&payment.error_message)
        .bind(&payment.signature)
        .fetch_one(&self.pool)
        .await?;

        row.into_payment()
    }

    async fn create_settled(
        &self,
        payment: NewPayment,
        invoice_status: InvoiceStatus,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        let row: PaymentRow = sqlx::query_as(
            r#"
            INSERT INTO payments (uuid, invoice_uuid, transaction_id, status, amount, currency, payer_uuid, error_message, signature)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING uuid, invoice_uuid, transaction_id, status, amount, currency, payer_uuid, error_message, signature, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payment.invoice_uuid)
        .bind(&payment.transaction_id)
        .bind(payment.status.as_str())
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.payer_uuid)
        .bind(&payment.error_message)
        .bind(&payment.signature)
        .fetch_one(&mut *tx)
        .await?;

        let updated =
            sqlx::query("UPDATE invoices SET status = $1, updated_at = NOW() WHERE uuid = $2")
                .bind(invoice_status.as_str())
                .bind(payment.invoice_uuid)
                .execute(&mut *tx)
                .await?;
        if updated.rows_affected() == 0 {
            // Dropping tx rolls the payment insert back.
            return Err(format!("invoice {} not found", payment.invoice_uuid).into());
        }

        tx.commit().await?;
        row.into_payment()
    }

    async fn get_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<(Payment, Option<Invoice>)>, Box<dyn std::error::Error + Send + Sync>> {
        let payment_row: Option<PaymentRow> = sqlx::query_as(
            "SELECT uuid, invoice_uuid, transaction_id, status, amount, currency, payer_uuid, error_message, signature, created_at, updated_at FROM payments WHERE transaction_id = $1",
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = payment_row {
            let payment = row.into_payment()?;

            let invoice_row: Option<InvoiceRow> = sqlx::query_as(
                "SELECT uuid, value, currency, status, signature, created_at, updated_at FROM invoices WHERE uuid = $1",
            )
            .bind(payment.invoice_uuid)
            .fetch_optional(&self.pool)
            .await?;
            let invoice = invoice_row.map(InvoiceRow::into_invoice).transpose()?;

            return Ok(Some((payment, invoice)));
        }

        Ok(None)
    }

    async fn update_status(
        &self,
        uuid: Uuid,
        status: PaymentStatus,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            UPDATE payments SET status = $1, updated_at = NOW() WHERE uuid = $2
            RETURNING uuid, invoice_uuid, transaction_id, status, amount, currency, payer_uuid, error_message, signature, created_at, updated_at
            "#,
        )
        .bind(status.as_str())
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_payment(),
            None => Err(format!("payment {} not found", uuid).into()),
        }
    }

    async fn settle(
        &self,
        payment_uuid: Uuid,
        payment_status: PaymentStatus,
        invoice_uuid: Uuid,
        invoice_status: InvoiceStatus,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            UPDATE payments SET status = $1, updated_at = NOW() WHERE uuid = $2
            RETURNING uuid, invoice_uuid, transaction_id, status, amount, currency, payer_uuid, error_message, signature, created_at, updated_at
            "#,
        )
        .bind(payment_status.as_str())
        .bind(payment_uuid)
        .fetch_optional(&mut *tx)
        .await?;
        let row = match row {
            Some(row) => row,
            None => return Err(format!("payment {} not found", payment_uuid).into()),
        };

        let updated =
            sqlx::query("UPDATE invoices SET status = $1, updated_at = NOW() WHERE uuid = $2")
                .bind(invoice_status.as_str())
                .bind(invoice_uuid)
                .execute(&mut *tx)
                .await?;
        if updated.rows_affected() == 0 {
            return Err(format!("invoice {} not found", invoice_uuid).into());
        }

        tx.commit().await?;
        row.into_payment()
    }
}
