use async_trait::async_trait;
use uuid::Uuid;

/// Advisory lock serializing charge attempts per invoice, so two concurrent
/// requests cannot both observe PENDING and double-charge. Implementations
/// give the lock a TTL so a crashed holder cannot block an invoice forever.
#[async_trait]
pub trait ChargeLock: Send + Sync {
    /// True if the lock was taken; false if another attempt already holds it.
    async fn acquire(
        &self,
        invoice_uuid: Uuid,
        ttl_seconds: u64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn release(
        &self,
        invoice_uuid: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
