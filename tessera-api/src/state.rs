use std::sync::Arc;

use tessera_flow::PaymentFlow;
use tessera_store::RedisClient;

#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<PaymentFlow>,
    pub redis: Arc<RedisClient>,
}
