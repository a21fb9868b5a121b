use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult};
use tracing::debug;
use uuid::Uuid;

use tessera_core::lock::ChargeLock;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Advisory per-invoice charge lock. Taken once per `initiate` attempt;
    /// the TTL frees the invoice if the holder dies mid-flow.
    pub async fn acquire_invoice_lock(
        &self,
        invoice_uuid: Uuid,
        ttl_seconds: u64,
    ) -> Result<bool, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("charge:{}", invoice_uuid);

        // SET NX: only set if key does not exist
        let result: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await?;

        if result.is_some() {
            debug!("Charge lock taken for invoice {}", invoice_uuid);
        }
        Ok(result.is_some())
    }

    pub async fn release_invoice_lock(&self, invoice_uuid: Uuid) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("charge:{}", invoice_uuid);
        conn.del(key).await
    }

    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}

#[async_trait]
impl ChargeLock for RedisClient {
    async fn acquire(
        &self,
        invoice_uuid: Uuid,
        ttl_seconds: u64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.acquire_invoice_lock(invoice_uuid, ttl_seconds).await?)
    }

    async fn release(
        &self,
        invoice_uuid: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.release_invoice_lock(invoice_uuid).await?;
        Ok(())
    }
}
