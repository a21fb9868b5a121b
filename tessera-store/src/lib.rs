pub mod app_config;
pub mod database;
pub mod invoice_repo;
pub mod memory;
pub mod payment_repo;
pub mod redis_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use invoice_repo::StoreInvoiceRepository;
pub use memory::{InMemoryChargeLock, InMemoryInvoiceStore, InMemoryPaymentStore};
pub use payment_repo::StorePaymentRepository;
pub use redis_repo::RedisClient;
