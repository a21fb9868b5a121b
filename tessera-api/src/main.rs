use std::net::SocketAddr;
use std::sync::Arc;

use tessera_api::{app, state::AppState};
use tessera_core::signing::JwtSigner;
use tessera_flow::{PaymentFlow, TracingTelemetry};
use tessera_gateway::{CardGatewayClient, GatewayConfig};
use tessera_store::{
    Config, DbClient, RedisClient, StoreInvoiceRepository, StorePaymentRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tessera_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Tessera API on port {}", config.server.port);

    // Postgres Connection
    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Redis Connection
    let redis = RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");
    let redis = Arc::new(redis);

    // Card gateway client
    let gateway = CardGatewayClient::new(GatewayConfig {
        base_url: config.gateway.base_url.clone(),
        public_id: config.gateway.public_id.clone(),
        api_secret: config.gateway.api_secret.clone(),
        timeout_seconds: config.gateway.timeout_seconds,
    })
    .expect("Failed to build gateway client");

    let flow = PaymentFlow::new(
        Arc::new(StoreInvoiceRepository::new(db.pool.clone())),
        Arc::new(StorePaymentRepository::new(db.pool.clone())),
        Arc::new(gateway),
        Arc::new(JwtSigner::new(&config.signing.secret)),
        redis.clone(),
        Arc::new(TracingTelemetry),
        config.payments.finish_3ds_url.clone(),
    );

    let app_state = AppState {
        flow: Arc::new(flow),
        redis,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
