pub mod http;
pub mod mock;

pub use http::{CardGatewayClient, GatewayConfig};
pub use mock::MockGateway;
