//! In-memory adapters backing the flow and api test suites.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use tessera_core::invoice::{Invoice, InvoiceRepository, InvoiceStatus};
use tessera_core::lock::ChargeLock;
use tessera_core::payment::{NewPayment, Payment, PaymentRepository, PaymentStatus};

#[derive(Default, Clone)]
pub struct InMemoryInvoiceStore {
    invoices: Arc<RwLock<HashMap<Uuid, Invoice>>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, invoice: Invoice) {
        self.invoices.write().await.insert(invoice.uuid, invoice);
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceStore {
    async fn get_by_uuid(
        &self,
        uuid: Uuid,
    ) -> Result<Option<Invoice>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.invoices.read().await.get(&uuid).cloned())
    }

    async fn update_status(
        &self,
        uuid: Uuid,
        status: InvoiceStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut invoices = self.invoices.write().await;
        match invoices.get_mut(&uuid) {
            Some(invoice) => {
                invoice.status = status;
                invoice.updated_at = Utc::now();
                Ok(())
            }
            None => Err(format!("invoice {} not found", uuid).into()),
        }
    }
}

#[derive(Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
    invoices: InMemoryInvoiceStore,
}

impl InMemoryPaymentStore {
    /// The invoice store is shared so settlement can move both records.
    pub fn new(invoices: InMemoryInvoiceStore) -> Self {
        Self {
            payments: Arc::new(RwLock::new(HashMap::new())),
            invoices,
        }
    }

    pub async fn count(&self) -> usize {
        self.payments.read().await.len()
    }

    pub async fn get(&self, uuid: Uuid) -> Option<Payment> {
        self.payments.read().await.get(&uuid).cloned()
    }

    fn build(new: NewPayment) -> Payment {
        let now = Utc::now();
        Payment {
            uuid: Uuid::new_v4(),
            invoice_uuid: new.invoice_uuid,
            transaction_id: new.transaction_id,
            status: new.status,
            amount: new.amount,
            currency: new.currency,
            payer_uuid: new.payer_uuid,
            error_message: new.error_message,
            signature: new.signature,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentStore {
    async fn create(
        &self,
        payment: NewPayment,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        let payment = Self::build(payment);
        self.payments
            .write()
            .await
            .insert(payment.uuid, payment.clone());
        Ok(payment)
    }

    async fn create_settled(
        &self,
        payment: NewPayment,
        invoice_status: InvoiceStatus,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        // Lock order is always payments then invoices. The invoice moves
        // first: if it is unknown, neither record is written.
        let mut payments = self.payments.write().await;
        self.invoices
            .update_status(payment.invoice_uuid, invoice_status)
            .await?;

        let payment = Self::build(payment);
        payments.insert(payment.uuid, payment.clone());
        Ok(payment)
    }

    async fn get_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<(Payment, Option<Invoice>)>, Box<dyn std::error::Error + Send + Sync>> {
        let payment = self
            .payments
            .read()
            .await
            .values()
            .find(|p| p.transaction_id.as_deref() == Some(transaction_id))
            .cloned();

        if let Some(payment) = payment {
            let invoice = self.invoices.get_by_uuid(payment.invoice_uuid).await?;
            return Ok(Some((payment, invoice)));
        }
        Ok(None)
    }

    async fn update_status(
        &self,
        uuid: Uuid,
        status: PaymentStatus,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&uuid) {
            Some(payment) => {
                payment.status = status;
                payment.updated_at = Utc::now();
                Ok(payment.clone())
            }
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
        let mut payments = self.payments.write().await;
        if !payments.contains_key(&payment_uuid) {
            return Err(format!("payment {} not found", payment_uuid).into());
        }

        // Both records move or neither does.
        self.invoices
            .update_status(invoice_uuid, invoice_status)
            .await?;

        let payment = payments
            .get_mut(&payment_uuid)
            .ok_or_else(|| format!("payment {} not found", payment_uuid))?;
        payment.status = payment_status;
        payment.updated_at = Utc::now();
        Ok(payment.clone())
    }
}

/// In-memory stand-in for the Redis charge lock. TTLs are ignored; tests
/// drive the lock lifecycle explicitly.
#[derive(Default, Clone)]
pub struct InMemoryChargeLock {
    held: Arc<RwLock<HashSet<Uuid>>>,
}

impl InMemoryChargeLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChargeLock for InMemoryChargeLock {
    async fn acquire(
        &self,
        invoice_uuid: Uuid,
        _ttl_seconds: u64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.held.write().await.insert(invoice_uuid))
    }

    async fn release(
        &self,
        invoice_uuid: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.held.write().await.remove(&invoice_uuid);
        Ok(())
    }
}
