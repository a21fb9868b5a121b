use async_trait::async_trait;

use tessera_shared::models::events::{
    ChallengeIssuedEvent, ChallengeResolvedEvent, ChargeSettledEvent,
};

/// Diagnostics sink for the payment flow. Injected alongside the stores so
/// the flow never reaches for a process-wide logger; a failing sink must
/// not fail the payment it describes.
#[async_trait]
pub trait PaymentTelemetry: Send + Sync {
    async fn log_charge_settled(
        &self,
        event: ChargeSettledEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn log_challenge_issued(
        &self,
        event: ChallengeIssuedEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn log_challenge_resolved(
        &self,
        event: ChallengeResolvedEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Default sink: structured log lines through `tracing`.
pub struct TracingTelemetry;

#[async_trait]
impl PaymentTelemetry for TracingTelemetry {
    async fn log_charge_settled(
        &self,
        event: ChargeSettledEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if event.success {
            tracing::info!(
                "Charge settled: invoice {} paid by payment {}",
                event.invoice_uuid,
                event.payment_uuid
            );
        } else {
            tracing::warn!(
                "Charge declined: invoice {} failed on payment {}",
                event.invoice_uuid,
                event.payment_uuid
            );
        }
        Ok(())
    }

    async fn log_challenge_issued(
        &self,
        event: ChallengeIssuedEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            "3-D Secure challenge issued for invoice {}: transaction {} at {}",
            event.invoice_uuid,
            event.transaction_id,
            event.acs_url
        );
        Ok(())
    }

    async fn log_challenge_resolved(
        &self,
        event: ChallengeResolvedEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            "3-D Secure challenge resolved for transaction {}: success={}",
            event.transaction_id,
            event.success
        );
        Ok(())
    }
}
